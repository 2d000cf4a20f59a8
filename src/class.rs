//! The microphone's `UsbClass` implementation

use crate::descriptor::{
    self, codes, ControlBlock, EndpointBlock, EndpointControls, StreamFormat, StreamingBlock,
    Topology,
};
use crate::state::{StreamState, StreamStatus, ALT_STREAMING, ALT_ZERO_BANDWIDTH};
use crate::Error;

use usb_device::{
    bus::{InterfaceNumber, UsbBus, UsbBusAllocator},
    class::{ControlOut, UsbClass},
    control::{Recipient, Request, RequestType},
    descriptor::DescriptorWriter,
    device::UsbDeviceState,
    endpoint::{
        EndpointAddress, EndpointIn, EndpointType, IsochronousSynchronizationType,
        IsochronousUsageType,
    },
};

/// Address of the isochronous IN endpoint.
pub const STREAM_ENDPOINT: u8 = 0x81;

/// Polling interval of the isochronous endpoint, in frames.
const STREAM_INTERVAL: u8 = 1;

/// A UAC1 microphone: one AudioControl interface, and one AudioStreaming
/// interface with a zero-bandwidth alternate setting and a streaming
/// alternate setting.
///
/// The class owns the descriptors and the endpoint. It forwards
/// `SET_CONFIGURATION`, alternate setting changes and bus resets into the
/// shared [`StreamState`]. Device state changes that `usb-device` makes
/// without a request reaching the class are forwarded by the application
/// with [`on_device_state`](Microphone::on_device_state).
pub struct Microphone<'a, B: UsbBus> {
    control_if: InterfaceNumber,
    stream_if: InterfaceNumber,
    endpoint: EndpointIn<'a, B>,
    control: ControlBlock,
    streaming: StreamingBlock,
    ep_block: EndpointBlock,
    state: &'a StreamState,
}

impl<'a, B: UsbBus> Microphone<'a, B> {
    /// Allocate the interfaces and the endpoint, and serialize the class
    /// descriptors.
    ///
    /// Fails if the topology or format is invalid, or if the bus can't
    /// provide endpoint 0x81 with a `format.packet_size()` payload.
    pub fn new(
        alloc: &'a UsbBusAllocator<B>,
        state: &'a StreamState,
        format: &StreamFormat,
        topology: &Topology,
    ) -> Result<Self, Error> {
        // Everything that can be checked without the bus is checked first.
        let streaming = descriptor::streaming_block(topology, format)?;
        let ep_block = descriptor::endpoint_block(EndpointControls::empty())?;

        let control_if = alloc.interface();
        let stream_if = alloc.interface();
        let control = descriptor::control_block(topology, stream_if.into())?;

        let endpoint = alloc.alloc(
            Some(EndpointAddress::from(STREAM_ENDPOINT)),
            EndpointType::Isochronous {
                synchronization: IsochronousSynchronizationType::Asynchronous,
                usage: IsochronousUsageType::Data,
            },
            format.packet_size() as u16,
            STREAM_INTERVAL,
        )?;

        state.bind_interface(stream_if.into());
        debug!(
            "MICROPHONE AC {} AS {} EP {:02X} MPS {}",
            u8::from(control_if),
            u8::from(stream_if),
            STREAM_ENDPOINT,
            format.packet_size()
        );

        Ok(Self {
            control_if,
            stream_if,
            endpoint,
            control,
            streaming,
            ep_block,
            state,
        })
    }

    /// The default microphone: 48kHz mono S16LE behind the default topology.
    pub fn with_defaults(
        alloc: &'a UsbBusAllocator<B>,
        state: &'a StreamState,
    ) -> Result<Self, Error> {
        Self::new(
            alloc,
            state,
            &StreamFormat::MONO_48K_S16,
            &Topology::microphone(),
        )
    }

    /// The isochronous IN endpoint. Pass it to
    /// [`FrameProducer::on_frame`](crate::FrameProducer::on_frame).
    pub fn endpoint(&self) -> &EndpointIn<'a, B> {
        &self.endpoint
    }

    /// The AudioControl interface number.
    pub fn control_interface(&self) -> InterfaceNumber {
        self.control_if
    }

    /// The AudioStreaming interface number.
    pub fn stream_interface(&self) -> InterfaceNumber {
        self.stream_if
    }

    /// The current streaming state.
    pub fn status(&self) -> StreamStatus {
        self.state.status()
    }

    /// Track the USB device state.
    ///
    /// `SET_CONFIGURATION` reaches the class directly. This covers the rest:
    /// a device that falls back to `Default` or `Addressed` is no longer
    /// configured. Call this after every `UsbDevice::poll` with
    /// `UsbDevice::state()`.
    pub fn on_device_state(&self, device_state: UsbDeviceState) -> StreamStatus {
        match device_state {
            UsbDeviceState::Default | UsbDeviceState::Addressed if self.state.is_configured() => {
                self.state.deconfigure()
            }
            _ => self.state.status(),
        }
    }
}

impl<B: UsbBus> UsbClass<B> for Microphone<'_, B> {
    fn get_configuration_descriptors(
        &self,
        writer: &mut DescriptorWriter,
    ) -> usb_device::Result<()> {
        writer.interface(
            self.control_if,
            codes::AUDIO,
            codes::subclass::AUDIOCONTROL,
            0x00,
        )?;
        for desc in self.control.descriptors() {
            writer.write(desc[1], &desc[2..])?;
        }

        writer.interface_alt(
            self.stream_if,
            ALT_ZERO_BANDWIDTH,
            codes::AUDIO,
            codes::subclass::AUDIOSTREAMING,
            0x00,
            None,
        )?;
        writer.interface_alt(
            self.stream_if,
            ALT_STREAMING,
            codes::AUDIO,
            codes::subclass::AUDIOSTREAMING,
            0x00,
            None,
        )?;
        for desc in self.streaming.descriptors() {
            writer.write(desc[1], &desc[2..])?;
        }

        // Audio class endpoints carry bRefresh and bSynchAddress.
        writer.endpoint_ex(&self.endpoint, |extra| {
            let extra = extra
                .get_mut(..2)
                .ok_or(usb_device::UsbError::BufferOverflow)?;
            extra.fill(0);
            Ok(2)
        })?;
        for desc in self.ep_block.descriptors() {
            writer.write(desc[1], &desc[2..])?;
        }

        Ok(())
    }

    fn get_alt_setting(&mut self, interface: InterfaceNumber) -> Option<u8> {
        (interface == self.stream_if).then(|| self.state.alt_setting())
    }

    fn set_alt_setting(&mut self, interface: InterfaceNumber, alternative: u8) -> bool {
        if interface != self.stream_if {
            return false;
        }
        match alternative {
            ALT_ZERO_BANDWIDTH | ALT_STREAMING => {
                self.state.set_interface(interface.into(), alternative);
                true
            }
            _ => false,
        }
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        let req = xfer.request();
        // Observe only. usb-device accepts the request and moves the device
        // to the configured state.
        if req.request_type == RequestType::Standard
            && req.recipient == Recipient::Device
            && req.request == Request::SET_CONFIGURATION
        {
            self.state
                .set_configuration(req.value as u8, self.endpoint.address());
        }
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::{Microphone, STREAM_ENDPOINT};
    use crate::descriptor::{StreamFormat, Topology};
    use crate::test_bus::MockBus;
    use crate::{
        Error, FrameOutcome, FrameProducer, StreamState, StreamStatus, CONFIGURATION_VALUE,
    };

    use std::vec::Vec;
    use usb_device::{
        bus::UsbBusAllocator,
        class::UsbClass,
        device::{UsbDevice, UsbDeviceState},
        endpoint::EndpointAddress,
    };

    const GET_DESCRIPTOR: u8 = 6;
    const SET_CONFIGURATION: u8 = 9;
    const SET_INTERFACE: u8 = 11;
    const CONFIGURATION: u16 = 2 << 8;

    /// Configure without a bus, as the class would on `SET_CONFIGURATION(1)`.
    fn configure(state: &StreamState, mic: &Microphone<'_, MockBus>) {
        state.set_configuration(CONFIGURATION_VALUE, mic.endpoint().address());
    }

    fn poll_all(device: &mut UsbDevice<'_, MockBus>, mic: &mut Microphone<'_, MockBus>) {
        for _ in 0..8 {
            device.poll(&mut [&mut *mic]);
        }
        mic.on_device_state(device.state());
    }

    #[test]
    fn allocates_iso_endpoint() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mic = Microphone::with_defaults(&alloc, &state).unwrap();

        assert_eq!(u8::from(mic.control_interface()), 0);
        assert_eq!(u8::from(mic.stream_interface()), 1);
        assert_eq!(state.stream_interface(), Some(1));
        assert_eq!(mic.endpoint().address(), EndpointAddress::from(STREAM_ENDPOINT));

        let recorder = bus.recorder();
        let iso = recorder
            .allocations
            .iter()
            .find(|a| a.address == EndpointAddress::from(STREAM_ENDPOINT))
            .unwrap();
        assert_eq!(iso.max_packet_size, 96);
        assert_eq!(iso.interval, 1);
    }

    #[test]
    fn mismatched_topology_allocates_nothing() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let format = StreamFormat::MONO_48K_S16;
        let topology = Topology {
            input: crate::descriptor::InputTerminal {
                channels: 2,
                ..Topology::microphone().input
            },
            ..Topology::microphone()
        };
        assert!(matches!(
            Microphone::new(&alloc, &state, &format, &topology),
            Err(Error::UnsupportedChannelCount(_))
        ));
        assert!(bus.recorder().allocations.is_empty());
        assert_eq!(state.stream_interface(), None);
    }

    #[test]
    fn alt_settings() {
        let alloc = UsbBusAllocator::new(MockBus::new());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let control = mic.control_interface();
        let stream = mic.stream_interface();

        assert_eq!(mic.get_alt_setting(control), None);
        assert_eq!(mic.get_alt_setting(stream), Some(0));

        assert!(!mic.set_alt_setting(control, 0));
        assert!(!mic.set_alt_setting(stream, 2));
        assert!(mic.set_alt_setting(stream, 1));
        // Not configured yet.
        assert_eq!(mic.status(), StreamStatus::Unconfigured);
        assert_eq!(mic.get_alt_setting(stream), Some(0));

        configure(&state, &mic);
        assert_eq!(mic.status(), StreamStatus::Idle);
        assert!(mic.set_alt_setting(stream, 1));
        assert_eq!(mic.status(), StreamStatus::Streaming);
        assert_eq!(mic.get_alt_setting(stream), Some(1));

        assert!(mic.set_alt_setting(stream, 0));
        assert_eq!(mic.status(), StreamStatus::Idle);
    }

    #[test]
    fn device_state_tracking() {
        let alloc = UsbBusAllocator::new(MockBus::new());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let stream = mic.stream_interface();

        assert_eq!(mic.on_device_state(UsbDeviceState::Addressed), StreamStatus::Unconfigured);
        configure(&state, &mic);
        mic.set_alt_setting(stream, 1);

        // Polling again in the configured state changes nothing.
        assert_eq!(mic.on_device_state(UsbDeviceState::Configured), StreamStatus::Streaming);
        assert_eq!(mic.on_device_state(UsbDeviceState::Suspend), StreamStatus::Streaming);
        assert_eq!(mic.on_device_state(UsbDeviceState::Default), StreamStatus::Unconfigured);
        assert!(!state.is_streaming());
    }

    #[test]
    fn bus_reset_stops_stream() {
        let alloc = UsbBusAllocator::new(MockBus::new());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let stream = mic.stream_interface();
        configure(&state, &mic);
        mic.set_alt_setting(stream, 1);

        UsbClass::reset(&mut mic);
        assert_eq!(mic.status(), StreamStatus::Unconfigured);
        assert!(state.active().is_none());
    }

    #[test]
    fn enumerate_and_stream() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let mut producer = FrameProducer::with_defaults(&StreamFormat::MONO_48K_S16).unwrap();
        let mut device = crate::device::build(&alloc, "00000000000000000000000A").unwrap();

        // Configuration descriptor.
        bus.setup(0x80, GET_DESCRIPTOR, CONFIGURATION, 0, 0xFF);
        poll_all(&mut device, &mut mic);
        let config: Vec<u8> = bus.recorder().written_to(0x80).concat();
        bus.recorder().clear_writes();

        assert_eq!(config.len(), 109);
        assert_eq!(u16::from_le_bytes([config[2], config[3]]), 109);
        assert_eq!(config[4], 2, "bNumInterfaces");

        let mut layout = Vec::new();
        let mut rest = config.as_slice();
        while !rest.is_empty() {
            let (desc, tail) = rest.split_at(usize::from(rest[0]));
            layout.push((desc[0], desc[1]));
            rest = tail;
            if desc[1] == 0x05 {
                assert_eq!(desc, [9, 0x05, 0x81, 0x05, 96, 0, 1, 0, 0]);
            }
            if desc[1] == 0x04 {
                let expected_endpoints = u8::from(desc[2] == 1 && desc[3] == 1);
                assert_eq!(desc[4], expected_endpoints, "bNumEndpoints");
            }
        }
        assert_eq!(
            layout,
            [
                (9, 0x02),
                (9, 0x04),
                (9, 0x24),
                (12, 0x24),
                (9, 0x24),
                (9, 0x24),
                (9, 0x04),
                (9, 0x04),
                (7, 0x24),
                (11, 0x24),
                (9, 0x05),
                (7, 0x25),
            ]
        );

        // Nothing streams before the host selects alternate setting 1.
        bus.setup(0x00, SET_CONFIGURATION, 1, 0, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(device.state(), UsbDeviceState::Configured);
        assert_eq!(mic.status(), StreamStatus::Idle);
        assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Idle);

        bus.setup(0x01, SET_INTERFACE, 1, 1, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(mic.status(), StreamStatus::Streaming);

        bus.recorder().clear_writes();
        for _ in 0..10 {
            assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Sent(96));
        }
        {
            let recorder = bus.recorder();
            let packets = recorder.written_to(STREAM_ENDPOINT);
            assert_eq!(packets.len(), 10);
            assert!(packets.iter().all(|p| p.len() == 96));
        }

        bus.setup(0x01, SET_INTERFACE, 0, 1, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(mic.status(), StreamStatus::Idle);

        bus.recorder().clear_writes();
        assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Idle);
        assert!(bus.recorder().written_to(STREAM_ENDPOINT).is_empty());
    }

    #[test]
    fn busy_endpoint_drops() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let mut producer = FrameProducer::with_defaults(&StreamFormat::MONO_48K_S16).unwrap();
        let _device = crate::device::build(&alloc, "0").unwrap();

        let stream = mic.stream_interface();
        configure(&state, &mic);
        mic.set_alt_setting(stream, 1);

        bus.recorder()
            .busy
            .push(EndpointAddress::from(STREAM_ENDPOINT));
        assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Dropped);
        bus.recorder().busy.clear();
        assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Sent(96));
        assert_eq!(bus.recorder().written_to(STREAM_ENDPOINT).len(), 1);
    }

    #[test]
    fn reconfigure_stops_stream() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let mut producer = FrameProducer::with_defaults(&StreamFormat::MONO_48K_S16).unwrap();
        let mut device = crate::device::build(&alloc, "0").unwrap();

        bus.setup(0x00, SET_CONFIGURATION, 1, 0, 0);
        poll_all(&mut device, &mut mic);
        bus.setup(0x01, SET_INTERFACE, 1, 1, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(mic.status(), StreamStatus::Streaming);

        bus.setup(0x00, SET_CONFIGURATION, 1, 0, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(device.state(), UsbDeviceState::Configured);
        assert_eq!(mic.status(), StreamStatus::Idle);
        assert!(!state.is_streaming());
        assert_eq!(producer.on_frame(&state, mic.endpoint()), FrameOutcome::Idle);
    }

    #[test]
    fn set_interface_follows_set_configuration_in_one_poll() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let mut device = crate::device::build(&alloc, "0").unwrap();

        // Both requests are handled before the application looks at the
        // device state.
        bus.setup(0x00, SET_CONFIGURATION, 1, 0, 0);
        bus.setup(0x01, SET_INTERFACE, 1, 1, 0);
        for _ in 0..8 {
            device.poll(&mut [&mut mic]);
        }
        assert_eq!(mic.status(), StreamStatus::Streaming);
    }

    #[test]
    fn set_configuration_zero_deconfigures() {
        let bus = MockBus::new();
        let alloc = UsbBusAllocator::new(bus.clone());
        let state = StreamState::new();
        let mut mic = Microphone::with_defaults(&alloc, &state).unwrap();
        let mut device = crate::device::build(&alloc, "0").unwrap();

        bus.setup(0x00, SET_CONFIGURATION, 1, 0, 0);
        poll_all(&mut device, &mut mic);
        bus.setup(0x01, SET_INTERFACE, 1, 1, 0);
        poll_all(&mut device, &mut mic);

        bus.setup(0x00, SET_CONFIGURATION, 0, 0, 0);
        poll_all(&mut device, &mut mic);
        assert_eq!(mic.status(), StreamStatus::Unconfigured);
        assert!(!state.is_streaming());
    }
}
