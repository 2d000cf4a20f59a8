//! Per-frame packet production
//!
//! Call [`FrameProducer::on_frame`] once per USB frame: from a 1ms timer
//! interrupt, or from a start-of-frame handler. When the host is listening,
//! each call synthesizes one packet and hands it to the isochronous endpoint.
//! Otherwise, the call does nothing.
//!
//! A packet is always exactly [`StreamFormat::packet_size`] bytes. The host
//! sized its receive buffers from `wMaxPacketSize`, and the producer never
//! sends anything shorter or longer.
//!
//! At most one packet is in flight. If the endpoint is still busy with the
//! previous packet, the new one is dropped; it isn't queued or retried.
//! The tone keeps advancing through dropped frames, so it stays in step with
//! the host's clock.

use crate::descriptor::{StreamFormat, MAX_PACKET_SIZE};
use crate::state::StreamState;
use crate::tone::ToneGenerator;
use crate::Error;
use usb_device::{
    bus::UsbBus,
    endpoint::{Endpoint, EndpointAddress, EndpointIn},
    UsbError,
};

/// The single-packet write primitive of the USB stack.
pub trait PacketWriter {
    /// The endpoint this writer transmits on.
    fn address(&self) -> EndpointAddress;
    /// Queue one packet for transmission.
    ///
    /// Returns `Err(UsbError::WouldBlock)` if the previous packet hasn't been
    /// consumed.
    fn write_packet(&self, packet: &[u8]) -> usb_device::Result<usize>;
}

impl<B: UsbBus> PacketWriter for EndpointIn<'_, B> {
    fn address(&self) -> EndpointAddress {
        Endpoint::address(self)
    }

    fn write_packet(&self, packet: &[u8]) -> usb_device::Result<usize> {
        self.write(packet)
    }
}

/// What happened during one frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not configured, not streaming, or no endpoint. Nothing was written.
    Idle,
    /// A packet of this many bytes was queued.
    Sent(usize),
    /// The packet was rejected by the endpoint, and discarded.
    Dropped,
}

/// Produces one PCM packet per frame while streaming.
pub struct FrameProducer {
    tone: ToneGenerator,
    packet: [u8; MAX_PACKET_SIZE],
    packet_size: usize,
    subframe_size: usize,
    /// Stream epoch the tone was last restarted for.
    epoch: Option<u32>,
}

impl FrameProducer {
    /// Create a producer that emits `tone` in `format`.
    ///
    /// The tone's sample rate must match the format's.
    pub fn new(format: &StreamFormat, tone: ToneGenerator) -> Result<Self, Error> {
        format.validate()?;
        if tone.sample_rate() != format.sample_rate() {
            return Err(Error::InvalidTone {
                frequency: tone.frequency(),
                sample_rate: format.sample_rate(),
            });
        }
        Ok(Self {
            tone,
            packet: [0; MAX_PACKET_SIZE],
            packet_size: format.packet_size(),
            subframe_size: usize::from(format.subframe_size()),
            epoch: None,
        })
    }

    /// A producer for the default 1kHz tone.
    pub fn with_defaults(format: &StreamFormat) -> Result<Self, Error> {
        Self::new(format, ToneGenerator::with_defaults(format.sample_rate())?)
    }

    /// Bytes in every packet this producer sends.
    pub fn packet_size(&self) -> usize {
        self.packet_size
    }

    /// The tone source.
    pub fn tone(&self) -> &ToneGenerator {
        &self.tone
    }

    /// Handle one frame tick.
    ///
    /// `writer` must be the endpoint bound in `state`. If the state's endpoint
    /// handle doesn't match the writer, the call is a no-op.
    pub fn on_frame<W: PacketWriter + ?Sized>(
        &mut self,
        state: &StreamState,
        writer: &W,
    ) -> FrameOutcome {
        let Some(active) = state.active() else {
            return FrameOutcome::Idle;
        };
        if active.endpoint != writer.address() {
            return FrameOutcome::Idle;
        }

        // A new epoch means the host re-selected the streaming alternate
        // setting. Start the waveform over.
        if self.epoch != Some(active.epoch) {
            self.tone.reset();
            self.epoch = Some(active.epoch);
        }

        let packet = &mut self.packet[..self.packet_size];
        self.tone.fill_le(packet, self.subframe_size);

        match writer.write_packet(packet) {
            Ok(written) => {
                trace!("EP{} WROTE {}", active.endpoint.index(), written);
                FrameOutcome::Sent(written)
            }
            Err(UsbError::WouldBlock) => FrameOutcome::Dropped,
            Err(_err) => {
                warn!("EP{} WRITE {:?}", active.endpoint.index(), _err);
                FrameOutcome::Dropped
            }
        }
    }
}
