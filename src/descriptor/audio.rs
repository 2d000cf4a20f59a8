//! Class-specific descriptor blocks
//!
//! Three blocks trail standard descriptors in the configuration:
//!
//! | Block | Follows | Contents |
//! | ----- | ------- | -------- |
//! | [`ControlBlock`] | AudioControl interface | Header, Input Terminal, Feature Unit, Output Terminal |
//! | [`StreamingBlock`] | AudioStreaming interface, alt 1 | AS General, Type I Format |
//! | [`EndpointBlock`] | Isochronous endpoint | AS Isochronous Audio Data Endpoint |

use super::block::DescriptorBlock;
use super::codes::{self, ac, descriptor_type::*};
use super::format::StreamFormat;
use super::topology::Topology;
use crate::Error;

bitflags::bitflags! {
    /// `bmAttributes` of the class-specific isochronous endpoint descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EndpointControls: u8 {
        const SAMPLING_FREQUENCY = 1 << 0;
        const PITCH = 1 << 1;
        const MAX_PACKETS_ONLY = 1 << 7;
    }
}

/// AudioControl block. The default topology needs 39 bytes.
pub type ControlBlock = DescriptorBlock<64>;
/// AudioStreaming block for alternate setting 1.
pub type StreamingBlock = DescriptorBlock<32>;
/// Class-specific endpoint block.
pub type EndpointBlock = DescriptorBlock<8>;

/// Offset of `wTotalLength` within the AC header.
const HEADER_TOTAL_LENGTH: usize = 5;

/// Serialize the AudioControl interface's class-specific descriptors.
///
/// `stream_interface` is the streaming interface number, listed in the
/// header's interface collection. The header's `wTotalLength` is computed
/// after all entities are written.
pub fn control_block(topology: &Topology, stream_interface: u8) -> Result<ControlBlock, Error> {
    topology.validate()?;
    let mut block = ControlBlock::new();

    let header = block.descriptor(CS_INTERFACE, |f| {
        f.u8(ac::HEADER)?
            .u16(codes::BCD_ADC_1_00)?
            .u16(0)? // wTotalLength
            .u8(1)? // bInCollection
            .u8(stream_interface)?;
        Ok(())
    })?;

    let input = &topology.input;
    block.descriptor(CS_INTERFACE, |f| {
        f.u8(ac::INPUT_TERMINAL)?
            .u8(input.id)?
            .u16(input.terminal_type)?
            .u8(input.assoc_terminal)?
            .u8(input.channels)?
            .u16(input.channel_config)?
            .u8(0)? // iChannelNames
            .u8(0)?; // iTerminal
        Ok(())
    })?;

    let feature = &topology.feature;
    block.descriptor(CS_INTERFACE, |f| {
        f.u8(ac::FEATURE_UNIT)?
            .u8(feature.id)?
            .u8(feature.source)?
            .u8(feature.control_size())?;
        for controls in [feature.master, feature.channel] {
            let bytes = controls.bits().to_le_bytes();
            for &byte in &bytes[..usize::from(feature.control_size())] {
                f.u8(byte)?;
            }
        }
        f.u8(0)?; // iFeature
        Ok(())
    })?;

    let output = &topology.output;
    block.descriptor(CS_INTERFACE, |f| {
        f.u8(ac::OUTPUT_TERMINAL)?
            .u8(output.id)?
            .u16(output.terminal_type)?
            .u8(output.assoc_terminal)?
            .u8(output.source)?
            .u8(0)?; // iTerminal
        Ok(())
    })?;

    let total_length = u16::try_from(block.len() - header).map_err(|_| Error::DescriptorOverflow)?;
    block.patch_u16(header + HEADER_TOTAL_LENGTH, total_length)?;
    Ok(block)
}

/// Serialize the AudioStreaming interface's class-specific descriptors for
/// the operational alternate setting.
///
/// The terminal link is the topology's output terminal.
pub fn streaming_block(topology: &Topology, format: &StreamFormat) -> Result<StreamingBlock, Error> {
    topology.validate()?;
    format.validate()?;
    if topology.input.channels != format.channels() {
        return Err(Error::UnsupportedChannelCount(topology.input.channels));
    }
    let mut block = StreamingBlock::new();

    block.descriptor(CS_INTERFACE, |f| {
        f.u8(codes::r#as::GENERAL)?
            .u8(topology.output.id)? // bTerminalLink
            .u8(0)? // bDelay
            .u16(codes::FORMAT_PCM)?;
        Ok(())
    })?;

    block.descriptor(CS_INTERFACE, |f| {
        f.u8(codes::r#as::FORMAT_TYPE)?
            .u8(codes::FORMAT_TYPE_I)?
            .u8(format.channels())?
            .u8(format.subframe_size())?
            .u8(format.bit_resolution())?
            .u8(1)? // bSamFreqType: one discrete rate
            .u24(format.sample_rate())?;
        Ok(())
    })?;

    Ok(block)
}

/// Serialize the class-specific isochronous endpoint descriptor.
///
/// Lock delay is always zero.
pub fn endpoint_block(controls: EndpointControls) -> Result<EndpointBlock, Error> {
    let mut block = EndpointBlock::new();
    block.descriptor(CS_ENDPOINT, |f| {
        f.u8(codes::EP_GENERAL)?
            .u8(controls.bits())?
            .u8(0)? // bLockDelayUnits
            .u16(0)?; // wLockDelay
        Ok(())
    })?;
    Ok(block)
}
