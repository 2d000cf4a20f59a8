//! Serial number string from the MCU's unique ID

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Number of characters in the serial string.
pub const SERIAL_LEN: usize = 24;

/// A 96 bit device unique ID, formatted as 24 uppercase hex digits.
///
/// The words are printed most significant first: `uid[2]`, `uid[1]`, then
/// `uid[0]`.
///
/// ```
/// use usbd_uac1_mic::SerialNumber;
///
/// let serial = SerialNumber::from_unique_id([0x0033_0021, 0x3236_5114, 0x0000_ABCD]);
/// assert_eq!(serial.as_str(), "0000ABCD3236511400330021");
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SerialNumber([u8; SERIAL_LEN]);

impl SerialNumber {
    /// Format a 96 bit unique ID, read once at startup.
    pub const fn from_unique_id(uid: [u32; 3]) -> Self {
        let words = [uid[2], uid[1], uid[0]];
        let mut digits = [0; SERIAL_LEN];
        let mut idx = 0;
        while idx < SERIAL_LEN {
            let word = words[idx / 8];
            let shift = 28 - 4 * (idx % 8);
            digits[idx] = HEX[((word >> shift) & 0xF) as usize];
            idx += 1;
        }
        Self(digits)
    }

    /// The serial, suitable for the string descriptor.
    pub fn as_str(&self) -> &str {
        // Only ASCII hex digits are ever stored.
        core::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl core::fmt::Debug for SerialNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SerialNumber").field(&self.as_str()).finish()
    }
}
