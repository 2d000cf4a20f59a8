//! Type I PCM stream format

use crate::Error;

/// The largest payload a full-speed isochronous endpoint may declare.
pub const MAX_PACKET_SIZE: usize = 1023;

/// USB frames per second at full speed.
const FRAMES_PER_SECOND: u32 = 1000;

/// The largest value `tSamFreq` can carry.
pub(crate) const MAX_SAMPLE_RATE: u32 = 0xFF_FFFF;

/// One discrete-rate, Type I PCM stream format.
///
/// The format is described once, and both the format type descriptor and the
/// endpoint's `wMaxPacketSize` are derived from it. They can't disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    sample_rate: u32,
    channels: u8,
    subframe_size: u8,
    bit_resolution: u8,
}

impl StreamFormat {
    /// 48kHz, mono, signed 16 bit little endian. 96 bytes per packet.
    pub const MONO_48K_S16: StreamFormat = StreamFormat {
        sample_rate: 48_000,
        channels: 1,
        subframe_size: 2,
        bit_resolution: 16,
    };

    /// Describe a stream format.
    ///
    /// Returns an error if the format can't be streamed by this microphone.
    /// See [`validate`](StreamFormat::validate).
    pub fn new(
        sample_rate: u32,
        channels: u8,
        subframe_size: u8,
        bit_resolution: u8,
    ) -> Result<Self, Error> {
        let format = StreamFormat {
            sample_rate,
            channels,
            subframe_size,
            bit_resolution,
        };
        format.validate()?;
        Ok(format)
    }

    /// Check the format against what the descriptors and frame producer support.
    ///
    /// - mono only
    /// - two byte subframes, with a bit resolution no wider than the subframe
    /// - an integral number of samples per 1ms frame
    /// - a packet that fits in one full-speed isochronous transaction
    pub fn validate(&self) -> Result<(), Error> {
        if self.channels != 1 {
            return Err(Error::UnsupportedChannelCount(self.channels));
        }
        if self.subframe_size != 2 {
            return Err(Error::UnsupportedSubframeSize(self.subframe_size));
        }
        if self.bit_resolution == 0 || self.bit_resolution > self.subframe_size.saturating_mul(8) {
            return Err(Error::InvalidBitResolution {
                bits: self.bit_resolution,
                subframe_size: self.subframe_size,
            });
        }
        if self.sample_rate == 0
            || self.sample_rate > MAX_SAMPLE_RATE
            || self.sample_rate % FRAMES_PER_SECOND != 0
        {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        let packet_size = self.packet_size();
        if packet_size > MAX_PACKET_SIZE {
            return Err(Error::BandwidthExceeded(packet_size));
        }
        Ok(())
    }

    /// Sample rate, in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `bNrChannels`.
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    /// `bSubframeSize`, in bytes.
    pub const fn subframe_size(&self) -> u8 {
        self.subframe_size
    }

    /// `bBitResolution`.
    pub const fn bit_resolution(&self) -> u8 {
        self.bit_resolution
    }

    /// Samples, per channel, carried in each 1ms packet.
    pub const fn samples_per_packet(&self) -> usize {
        (self.sample_rate / FRAMES_PER_SECOND) as usize
    }

    /// Bytes in every packet, and the endpoint's `wMaxPacketSize`.
    ///
    /// `sample_rate × channels × subframe_size / 1000`
    pub const fn packet_size(&self) -> usize {
        self.samples_per_packet() * self.channels as usize * self.subframe_size as usize
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::MONO_48K_S16
    }
}
