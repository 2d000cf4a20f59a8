//! Errors raised while building the microphone

use core::fmt;
use usb_device::UsbError;

/// Errors that prevent the microphone from being constructed.
///
/// Every variant describes a descriptor authoring mistake or a bus allocation
/// failure. Nothing in this list is produced once streaming is underway; a
/// rejected isochronous packet is reported as
/// [`FrameOutcome::Dropped`](crate::FrameOutcome::Dropped), not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Only mono streams are supported.
    UnsupportedChannelCount(u8),
    /// Only two-byte subframes (S16LE) are supported.
    UnsupportedSubframeSize(u8),
    /// The bit resolution is zero, or exceeds the subframe size.
    InvalidBitResolution {
        /// Declared `bBitResolution`.
        bits: u8,
        /// Declared `bSubframeSize`.
        subframe_size: u8,
    },
    /// The sample rate doesn't produce a whole number of samples per 1ms
    /// frame, or doesn't fit in the 24 bit `tSamFreq` field.
    InvalidSampleRate(u32),
    /// The packet size exceeds the full-speed isochronous limit of 1023 bytes.
    BandwidthExceeded(usize),
    /// The tone frequency is zero, or at or above the Nyquist frequency.
    InvalidTone {
        /// Requested tone frequency, in Hz.
        frequency: u32,
        /// Stream sample rate, in Hz.
        sample_rate: u32,
    },
    /// An entity uses the reserved ID 0, or shares its ID with another entity.
    DuplicateEntityId(u8),
    /// A source ID doesn't name any entity in the topology.
    UnresolvedSource(u8),
    /// The source references loop, or don't end at exactly one streaming
    /// output terminal.
    BrokenChain,
    /// A descriptor block ran out of space.
    DescriptorOverflow,
    /// The USB bus couldn't satisfy an allocation.
    Usb(UsbError),
}

impl From<UsbError> for Error {
    fn from(err: UsbError) -> Self {
        Error::Usb(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedChannelCount(channels) => {
                write!(f, "{channels} channels requested; only mono is supported")
            }
            Error::UnsupportedSubframeSize(size) => {
                write!(f, "{size} byte subframes requested; only 2 byte subframes are supported")
            }
            Error::InvalidBitResolution {
                bits,
                subframe_size,
            } => write!(
                f,
                "bit resolution {bits} doesn't fit a {subframe_size} byte subframe"
            ),
            Error::InvalidSampleRate(rate) => write!(f, "unusable sample rate {rate} Hz"),
            Error::BandwidthExceeded(size) => {
                write!(f, "packet size {size} exceeds the isochronous limit")
            }
            Error::InvalidTone {
                frequency,
                sample_rate,
            } => write!(
                f,
                "tone of {frequency} Hz can't be represented at {sample_rate} Hz"
            ),
            Error::DuplicateEntityId(id) => write!(f, "entity ID {id} is reserved or reused"),
            Error::UnresolvedSource(id) => write!(f, "source ID {id} names no entity"),
            Error::BrokenChain => f.write_str("entity chain doesn't end at one streaming terminal"),
            Error::DescriptorOverflow => f.write_str("descriptor block overflow"),
            Error::Usb(err) => write!(f, "USB error: {err:?}"),
        }
    }
}
