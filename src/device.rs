//! Device-level descriptor values
//!
//! The class only describes its interfaces. The device descriptor and the
//! string table come from here, through `usb-device`'s builder.

use usb_device::{
    bus::{UsbBus, UsbBusAllocator},
    descriptor::lang_id::LangID,
    device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbRev, UsbVidPid},
    prelude::BuilderError,
};

/// pid.codes test VID.
pub const VENDOR_ID: u16 = 0x1209;
/// pid.codes test PID.
pub const PRODUCT_ID: u16 = 0x0002;
/// `bcdDevice`
pub const DEVICE_RELEASE: u16 = 0x0100;
/// Endpoint 0 max packet size.
pub const MAX_PACKET_SIZE_0: u8 = 64;
/// Bus powered, at most this many milliamps.
pub const MAX_POWER_MA: usize = 100;

/// `iManufacturer`
pub const MANUFACTURER: &str = "Your Manufacturer";
/// `iProduct`
pub const PRODUCT: &str = "STM32F411 UAC1 Microphone";

/// Build the `UsbDevice`.
///
/// Call this after [`Microphone::new`](crate::Microphone::new), so that the
/// class has its endpoint before the allocator is frozen. `serial` is usually
/// [`SerialNumber::as_str`](crate::SerialNumber::as_str).
///
/// The string table has three entries, manufacturer, product and serial, at
/// indices 1, 2 and 3.
pub fn build<'a, B: UsbBus>(
    alloc: &'a UsbBusAllocator<B>,
    serial: &'a str,
) -> Result<UsbDevice<'a, B>, BuilderError> {
    let device = UsbDeviceBuilder::new(alloc, UsbVidPid(VENDOR_ID, PRODUCT_ID))
        .usb_rev(UsbRev::Usb200)
        .device_class(0x00)
        .device_sub_class(0x00)
        .device_protocol(0x00)
        .device_release(DEVICE_RELEASE)
        .self_powered(false)
        .strings(&[StringDescriptors::new(LangID::EN_US)
            .manufacturer(MANUFACTURER)
            .product(PRODUCT)
            .serial_number(serial)])?
        .max_packet_size_0(MAX_PACKET_SIZE_0)?
        .max_power(MAX_POWER_MA)?
        .build();
    debug!("DEVICE {:04X}:{:04X} SERIAL {}", VENDOR_ID, PRODUCT_ID, serial);
    Ok(device)
}
