//! Streaming state shared between the control path and the frame tick
//!
//! [`StreamState`] is written from the USB control path (configuration and
//! alternate setting changes, bus resets) and read from the frame tick, which
//! may be a timer interrupt that preempts the control path at any point.
//! It's a collection of atomics, so you can keep it in a `static`:
//!
//! ```
//! use usbd_uac1_mic::{StreamState, StreamStatus};
//!
//! static STREAM_STATE: StreamState = StreamState::new();
//! assert_eq!(STREAM_STATE.status(), StreamStatus::Unconfigured);
//! ```
//!
//! # Ordering
//!
//! Writers only ever run in one context, so every update is a plain
//! `load` / `store`. No read-modify-write atomics are needed, which keeps
//! the type usable on ARMv6-M.
//!
//! - When enabling, the endpoint handle and `configured` are stored before
//!   `streaming` is allowed to become `true`.
//! - When disabling, `streaming` is cleared before `configured` and the
//!   endpoint handle.
//!
//! The reader checks `streaming` first, with acquire ordering. If it
//! observes `true`, it also observes the handle that was bound before it.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use usb_device::endpoint::EndpointAddress;

/// `bConfigurationValue` of the only configuration.
pub const CONFIGURATION_VALUE: u8 = 1;

/// Endpoint handle meaning "no endpoint." Zero can never be an IN address.
const NO_ENDPOINT: u8 = 0;
/// Interface number meaning "not yet bound to a streaming interface."
const UNBOUND: u8 = 0xFF;

/// Alternate setting with no endpoints.
pub const ALT_ZERO_BANDWIDTH: u8 = 0;
/// Alternate setting with the isochronous endpoint.
pub const ALT_STREAMING: u8 = 1;

/// What the microphone is doing, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Not configured. The frame producer is idle.
    Unconfigured,
    /// Configured, streaming interface on alternate setting 0.
    Idle,
    /// Configured, streaming interface on alternate setting 1.
    Streaming,
}

/// A snapshot of the state the frame producer needs, taken only when
/// streaming is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Active {
    /// The bound isochronous IN endpoint.
    pub endpoint: EndpointAddress,
    /// Counts every enable of the stream.
    pub epoch: u32,
}

/// Streaming state machine.
///
/// See the module-level documentation for the ordering rules.
pub struct StreamState {
    configured: AtomicBool,
    streaming: AtomicBool,
    endpoint: AtomicU8,
    interface: AtomicU8,
    epoch: AtomicU32,
}

impl StreamState {
    /// Unconfigured, not streaming, no endpoint, no interface.
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
            endpoint: AtomicU8::new(NO_ENDPOINT),
            interface: AtomicU8::new(UNBOUND),
            epoch: AtomicU32::new(0),
        }
    }

    /// Record which interface number carries the stream.
    ///
    /// `SET_INTERFACE` requests for any other interface are ignored.
    pub fn bind_interface(&self, interface: u8) {
        self.interface.store(interface, Ordering::Release);
    }

    /// The streaming interface number, if bound.
    pub fn stream_interface(&self) -> Option<u8> {
        let interface = self.interface.load(Ordering::Acquire);
        (interface != UNBOUND).then_some(interface)
    }

    /// Handle `SET_CONFIGURATION(value)`.
    ///
    /// The only configuration binds `endpoint` and lands in
    /// [`Idle`](StreamStatus::Idle), even when the stream was running; the
    /// host must select alternate setting 1 again. A value of 0 deconfigures.
    /// Any other value doesn't name a configuration, and is ignored.
    pub fn set_configuration(&self, value: u8, endpoint: EndpointAddress) -> StreamStatus {
        match value {
            0 => self.deconfigure(),
            CONFIGURATION_VALUE => {
                self.streaming.store(false, Ordering::Release);
                self.endpoint.store(endpoint.into(), Ordering::Release);
                self.configured.store(true, Ordering::Release);
                debug!("CONFIGURED EP {:02X}", u8::from(endpoint));
                StreamStatus::Idle
            }
            _ => {
                warn!("IGNORED CONFIGURATION {}", value);
                self.status()
            }
        }
    }

    /// Handle `SET_INTERFACE(interface, alt_setting)`.
    ///
    /// Only the bound streaming interface, in a configured device, with
    /// alternate setting 0 or 1, changes anything.
    pub fn set_interface(&self, interface: u8, alt_setting: u8) -> StreamStatus {
        if self.stream_interface() != Some(interface) || !self.configured.load(Ordering::Acquire) {
            return self.status();
        }

        match alt_setting {
            ALT_STREAMING => {
                if !self.streaming.load(Ordering::Acquire) {
                    let epoch = self.epoch.load(Ordering::Relaxed).wrapping_add(1);
                    self.epoch.store(epoch, Ordering::Release);
                    self.streaming.store(true, Ordering::Release);
                    debug!("STREAMING ON (epoch {})", epoch);
                }
            }
            ALT_ZERO_BANDWIDTH => {
                self.streaming.store(false, Ordering::Release);
                debug!("STREAMING OFF");
            }
            _ => {}
        }
        self.status()
    }

    /// Leave the configured state.
    ///
    /// `streaming` is always cleared, and it's cleared first.
    pub fn deconfigure(&self) -> StreamStatus {
        self.streaming.store(false, Ordering::Release);
        self.configured.store(false, Ordering::Release);
        self.endpoint.store(NO_ENDPOINT, Ordering::Release);
        StreamStatus::Unconfigured
    }

    /// Handle a USB bus reset, or a detach.
    pub fn reset(&self) -> StreamStatus {
        debug!("STREAM RESET");
        self.deconfigure()
    }

    /// The current state.
    pub fn status(&self) -> StreamStatus {
        if !self.configured.load(Ordering::Acquire) {
            StreamStatus::Unconfigured
        } else if self.streaming.load(Ordering::Acquire) {
            StreamStatus::Streaming
        } else {
            StreamStatus::Idle
        }
    }

    /// The streaming interface's current alternate setting.
    pub fn alt_setting(&self) -> u8 {
        if self.streaming.load(Ordering::Acquire) {
            ALT_STREAMING
        } else {
            ALT_ZERO_BANDWIDTH
        }
    }

    /// Returns `Some` only if the device is configured, streaming, and has an
    /// endpoint bound. This is the frame producer's precondition.
    pub fn active(&self) -> Option<Active> {
        if !self.streaming.load(Ordering::Acquire) || !self.configured.load(Ordering::Acquire) {
            return None;
        }
        let endpoint = self.endpoint.load(Ordering::Acquire);
        (endpoint != NO_ENDPOINT).then(|| Active {
            endpoint: EndpointAddress::from(endpoint),
            epoch: self.epoch.load(Ordering::Acquire),
        })
    }

    /// Indicates if the streaming flag is set.
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Indicates if the device is configured.
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self::new()
    }
}
