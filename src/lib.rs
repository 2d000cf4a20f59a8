//! A USB Audio Class 1.0 microphone
//!
//! `usbd-uac1-mic` is a [`usb-device`] class that enumerates as a mono,
//! 48kHz, 16 bit microphone, and streams a test tone over an isochronous IN
//! endpoint. It runs on any `UsbBus` implementation with isochronous
//! support.
//!
//! The crate has three parts:
//!
//! - [`descriptor`] builds the class-specific descriptors from an entity
//!   [`Topology`](descriptor::Topology) and a
//!   [`StreamFormat`](descriptor::StreamFormat).
//! - [`StreamState`] tracks configuration and the streaming alternate
//!   setting. It's shared between the USB interrupt and the frame tick.
//! - [`FrameProducer`] writes one packet per 1ms frame while the host is
//!   listening.
//!
//! [`Microphone`] is the `UsbClass` that ties them to the USB stack.
//!
//! # Example
//!
//! Keep the state in a `static`, so that a timer interrupt can reach it.
//!
//! ```ignore
//! use usbd_uac1_mic::{device, FrameProducer, Microphone, SerialNumber, StreamState};
//! use usbd_uac1_mic::descriptor::StreamFormat;
//!
//! static STREAM_STATE: StreamState = StreamState::new();
//!
//! let bus_adapter = // Your UsbBus, from your HAL...
//! let bus = usb_device::bus::UsbBusAllocator::new(bus_adapter);
//!
//! let mut mic = Microphone::with_defaults(&bus, &STREAM_STATE).unwrap();
//! let serial = SerialNumber::from_unique_id(read_unique_id());
//! let mut device = device::build(&bus, serial.as_str()).unwrap();
//! let mut producer = FrameProducer::with_defaults(&StreamFormat::MONO_48K_S16).unwrap();
//!
//! loop {
//!     device.poll(&mut [&mut mic]);
//!     mic.on_device_state(device.state());
//!     if one_millisecond_elapsed() {
//!         producer.on_frame(&STREAM_STATE, mic.endpoint());
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `log` routes internal diagnostics through the [`log`] crate.
//! - `defmt-03` enables `defmt` support in `usb-device`.
//!
//! [`usb-device`]: https://crates.io/crates/usb-device
//! [`log`]: https://crates.io/crates/log

#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod log;

mod class;
pub mod descriptor;
pub mod device;
mod error;
mod frame;
mod serial;
mod state;
pub mod tone;

#[cfg(test)]
mod test_bus;

pub use class::{Microphone, STREAM_ENDPOINT};
pub use error::Error;
pub use frame::{FrameOutcome, FrameProducer, PacketWriter};
pub use serial::{SerialNumber, SERIAL_LEN};
pub use state::{
    Active, StreamState, StreamStatus, ALT_STREAMING, ALT_ZERO_BANDWIDTH, CONFIGURATION_VALUE,
};
pub use tone::ToneGenerator;
