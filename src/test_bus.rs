//! A host-side `UsbBus` for tests
//!
//! Records every endpoint allocation and write, and plays queued SETUP
//! packets into endpoint 0 so that a real `UsbDevice` can be driven
//! through enumeration.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use usb_device::{
    bus::{PollResult, UsbBus},
    endpoint::{EndpointAddress, EndpointType},
    Result, UsbDirection, UsbError,
};

/// An allocated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub address: EndpointAddress,
    pub max_packet_size: u16,
    pub interval: u8,
}

/// Everything the bus saw.
#[derive(Debug, Default)]
pub struct Recorder {
    next_index: usize,
    pub allocations: Vec<Allocation>,
    pub writes: Vec<(EndpointAddress, Vec<u8>)>,
    /// Endpoints that answer writes with `WouldBlock`.
    pub busy: Vec<EndpointAddress>,
    setups: VecDeque<[u8; 8]>,
    in_complete: u16,
}

impl Recorder {
    /// Payloads written to `address`, in order.
    pub fn written_to(&self, address: u8) -> Vec<&[u8]> {
        let address = EndpointAddress::from(address);
        self.writes
            .iter()
            .filter(|(ep, _)| *ep == address)
            .map(|(_, data)| data.as_slice())
            .collect()
    }

    /// Forget all writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

/// Cloning shares the recorder, so a test keeps a handle after the bus moves
/// into the allocator.
#[derive(Clone)]
pub struct MockBus {
    recorder: Arc<Mutex<Recorder>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            recorder: Arc::new(Mutex::new(Recorder {
                next_index: 1,
                ..Recorder::default()
            })),
        }
    }

    pub fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap()
    }

    /// Queue a SETUP packet on endpoint 0.
    pub fn setup(&self, request_type: u8, request: u8, value: u16, index: u16, length: u16) {
        let mut packet = [0; 8];
        packet[0] = request_type;
        packet[1] = request;
        packet[2..4].copy_from_slice(&value.to_le_bytes());
        packet[4..6].copy_from_slice(&index.to_le_bytes());
        packet[6..8].copy_from_slice(&length.to_le_bytes());
        self.recorder().setups.push_back(packet);
    }
}

impl UsbBus for MockBus {
    fn alloc_ep(
        &mut self,
        ep_dir: UsbDirection,
        ep_addr: Option<EndpointAddress>,
        _ep_type: EndpointType,
        max_packet_size: u16,
        interval: u8,
    ) -> Result<EndpointAddress> {
        let mut recorder = self.recorder();
        let address = match ep_addr {
            Some(address) => address,
            None => {
                let index = recorder.next_index;
                recorder.next_index += 1;
                EndpointAddress::from_parts(index, ep_dir)
            }
        };
        if address.direction() != ep_dir {
            return Err(UsbError::InvalidEndpoint);
        }
        if recorder.allocations.iter().any(|a| a.address == address) {
            return Err(UsbError::InvalidEndpoint);
        }
        recorder.allocations.push(Allocation {
            address,
            max_packet_size,
            interval,
        });
        Ok(address)
    }

    fn enable(&mut self) {}

    fn reset(&self) {}

    fn set_device_address(&self, _addr: u8) {}

    fn write(&self, ep_addr: EndpointAddress, buf: &[u8]) -> Result<usize> {
        let mut recorder = self.recorder();
        if recorder.busy.contains(&ep_addr) {
            return Err(UsbError::WouldBlock);
        }
        recorder.writes.push((ep_addr, buf.to_vec()));
        recorder.in_complete |= 1 << ep_addr.index();
        Ok(buf.len())
    }

    fn read(&self, ep_addr: EndpointAddress, buf: &mut [u8]) -> Result<usize> {
        if ep_addr.index() != 0 {
            return Err(UsbError::WouldBlock);
        }
        let packet = self
            .recorder()
            .setups
            .pop_front()
            .ok_or(UsbError::WouldBlock)?;
        buf.get_mut(..packet.len())
            .ok_or(UsbError::BufferOverflow)?
            .copy_from_slice(&packet);
        Ok(packet.len())
    }

    fn set_stalled(&self, _ep_addr: EndpointAddress, _stalled: bool) {}

    fn is_stalled(&self, _ep_addr: EndpointAddress) -> bool {
        false
    }

    fn suspend(&self) {}

    fn resume(&self) {}

    fn poll(&self) -> PollResult {
        let mut recorder = self.recorder();
        // Only endpoint 0 completions drive the control pipe. Report them on
        // their own, before the next SETUP.
        let ep_in_complete = core::mem::take(&mut recorder.in_complete) & 1;
        if ep_in_complete != 0 {
            return PollResult::Data {
                ep_out: 0,
                ep_in_complete,
                ep_setup: 0,
            };
        }
        if !recorder.setups.is_empty() {
            return PollResult::Data {
                ep_out: 0,
                ep_in_complete: 0,
                ep_setup: 1,
            };
        }
        PollResult::None
    }
}
