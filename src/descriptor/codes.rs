//! Class codes and descriptor constants for USB Audio Device Class 1.0

/// Audio interface class.
pub const AUDIO: u8 = 0x01;

/// Audio interface subclasses.
pub mod subclass {
    pub const AUDIOCONTROL: u8 = 0x01;
    pub const AUDIOSTREAMING: u8 = 0x02;
}

/// Class-specific descriptor types.
pub mod descriptor_type {
    pub const CS_INTERFACE: u8 = 0x24;
    pub const CS_ENDPOINT: u8 = 0x25;
}

/// AudioControl interface descriptor subtypes.
pub mod ac {
    pub const HEADER: u8 = 0x01;
    pub const INPUT_TERMINAL: u8 = 0x02;
    pub const OUTPUT_TERMINAL: u8 = 0x03;
    pub const FEATURE_UNIT: u8 = 0x06;
}

/// AudioStreaming interface descriptor subtypes.
pub mod r#as {
    pub const GENERAL: u8 = 0x01;
    pub const FORMAT_TYPE: u8 = 0x02;
}

/// Class-specific endpoint descriptor subtype.
pub const EP_GENERAL: u8 = 0x01;

/// `bcdADC` for Audio Device Class 1.0.
pub const BCD_ADC_1_00: u16 = 0x0100;

/// `bFormatType` for Type I formats.
pub const FORMAT_TYPE_I: u8 = 0x01;

/// `wFormatTag` for Type I PCM.
pub const FORMAT_PCM: u16 = 0x0001;

/// Terminal types, from the USB Audio Terminal Types document.
pub mod terminal {
    /// A terminal dealing with a signal carried over an endpoint.
    pub const USB_STREAMING: u16 = 0x0101;
    /// A generic microphone.
    pub const MICROPHONE: u16 = 0x0201;
    /// A generic speaker.
    pub const SPEAKER: u16 = 0x0301;
}
