//! USB Audio 1.0 descriptor topology
//!
//! The microphone's descriptors are generated, not written out by hand. You
//! describe the entity graph with a [`Topology`] and the stream with a
//! [`StreamFormat`]; the block builders in this module serialize them and
//! fill in every length field from the bytes that were actually emitted.
//!
//! ```
//! use usbd_uac1_mic::descriptor::{self, StreamFormat, Topology};
//!
//! let topology = Topology::microphone();
//! let control = descriptor::control_block(&topology, 1).unwrap();
//!
//! // Header + input terminal + feature unit + output terminal.
//! assert_eq!(control.len(), 39);
//! assert_eq!(control.descriptors().count(), 4);
//!
//! let format = StreamFormat::MONO_48K_S16;
//! assert_eq!(format.packet_size(), 96);
//! ```
//!
//! Standard descriptors (device, configuration, interface, and endpoint) are
//! produced by `usb-device`. The configuration's `wTotalLength` is computed
//! there, too. See [`Microphone`](crate::Microphone) for how the blocks are
//! attached to the standard descriptors.

mod audio;
mod block;
pub mod codes;
mod format;
mod topology;

pub use audio::{
    control_block, endpoint_block, streaming_block, ControlBlock, EndpointBlock, EndpointControls,
    StreamingBlock,
};
pub use block::{DescriptorBlock, Descriptors};
pub use format::{StreamFormat, MAX_PACKET_SIZE};
pub(crate) use format::MAX_SAMPLE_RATE;
pub use topology::{
    FeatureControls, FeatureUnit, InputTerminal, OutputTerminal, Topology, FEATURE_UNIT_ID,
    INPUT_TERMINAL_ID, OUTPUT_TERMINAL_ID,
};
