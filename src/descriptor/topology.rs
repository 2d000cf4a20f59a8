//! The audio function's entity graph
//!
//! A microphone needs three entities. The Input Terminal represents the
//! capsule, the Feature Unit sits in the middle of the path, and the Output
//! Terminal hands samples to the streaming interface:
//!
//! ```text
//!  ┌────────────┐     ┌──────────────┐     ┌────────────────┐
//!  │ IT (mic) 1 │ ──▶ │ FU (inert) 2 │ ──▶ │ OT (stream) 3  │ ──▶ bTerminalLink
//!  └────────────┘     └──────────────┘     └────────────────┘
//! ```
//!
//! Each entity names its upstream neighbor by ID. [`Topology::validate`]
//! walks those references from the output terminal and rejects anything that
//! isn't a single chain.

use super::codes::terminal;
use crate::Error;

bitflags::bitflags! {
    /// Feature Unit controls (`bmaControls`).
    ///
    /// The microphone advertises none of these.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FeatureControls: u16 {
        const MUTE = 1 << 0;
        const VOLUME = 1 << 1;
        const BASS = 1 << 2;
        const MID = 1 << 3;
        const TREBLE = 1 << 4;
        const GRAPHIC_EQUALIZER = 1 << 5;
        const AUTOMATIC_GAIN = 1 << 6;
        const DELAY = 1 << 7;
        const BASS_BOOST = 1 << 8;
        const LOUDNESS = 1 << 9;
    }
}

/// Entity ID of the microphone input terminal.
pub const INPUT_TERMINAL_ID: u8 = 1;
/// Entity ID of the feature unit.
pub const FEATURE_UNIT_ID: u8 = 2;
/// Entity ID of the USB streaming output terminal.
pub const OUTPUT_TERMINAL_ID: u8 = 3;

/// Where the signal enters the audio function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTerminal {
    pub id: u8,
    pub terminal_type: u16,
    pub assoc_terminal: u8,
    pub channels: u8,
    /// Spatial location bitmap. Zero for mono.
    pub channel_config: u16,
}

/// A feature unit with one control bitmap for the master channel, and one
/// for the (only) logical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureUnit {
    pub id: u8,
    pub source: u8,
    pub master: FeatureControls,
    pub channel: FeatureControls,
}

impl FeatureUnit {
    /// `bControlSize`: the smallest width that holds every advertised control.
    pub fn control_size(&self) -> u8 {
        if (self.master | self.channel).bits() > 0xFF {
            2
        } else {
            1
        }
    }
}

/// Where the signal leaves the audio function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTerminal {
    pub id: u8,
    pub terminal_type: u16,
    pub assoc_terminal: u8,
    pub source: u8,
}

/// The full entity graph.
///
/// Serialization order is always input terminal, feature unit, output terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub input: InputTerminal,
    pub feature: FeatureUnit,
    pub output: OutputTerminal,
}

impl Topology {
    /// Mono microphone → inert feature unit → USB streaming.
    pub const fn microphone() -> Self {
        Topology {
            input: InputTerminal {
                id: INPUT_TERMINAL_ID,
                terminal_type: terminal::MICROPHONE,
                assoc_terminal: 0,
                channels: 1,
                channel_config: 0,
            },
            feature: FeatureUnit {
                id: FEATURE_UNIT_ID,
                source: INPUT_TERMINAL_ID,
                master: FeatureControls::empty(),
                channel: FeatureControls::empty(),
            },
            output: OutputTerminal {
                id: OUTPUT_TERMINAL_ID,
                terminal_type: terminal::USB_STREAMING,
                assoc_terminal: 0,
                source: FEATURE_UNIT_ID,
            },
        }
    }

    /// `(id, source)` for every entity. Terminals that originate a signal
    /// have no source.
    fn entities(&self) -> [(u8, Option<u8>); 3] {
        [
            (self.input.id, None),
            (self.feature.id, Some(self.feature.source)),
            (self.output.id, Some(self.output.source)),
        ]
    }

    /// Check that the IDs form one acyclic chain from the input terminal to a
    /// single USB streaming output terminal.
    pub fn validate(&self) -> Result<(), Error> {
        let entities = self.entities();

        for (index, &(id, _)) in entities.iter().enumerate() {
            if id == 0 || entities[..index].iter().any(|&(other, _)| other == id) {
                return Err(Error::DuplicateEntityId(id));
            }
        }

        for &(_, source) in &entities {
            if let Some(source) = source {
                if !entities.iter().any(|&(id, _)| id == source) {
                    return Err(Error::UnresolvedSource(source));
                }
            }
        }

        if self.output.terminal_type != terminal::USB_STREAMING
            || self.input.terminal_type == terminal::USB_STREAMING
        {
            return Err(Error::BrokenChain);
        }

        // Walk upstream from the output terminal. A chain that covers every
        // entity reaches the source-less input terminal in exactly two hops;
        // anything else loops, or leaves an entity dangling.
        let mut current = self.output.id;
        let mut hops = 0;
        loop {
            let (_, source) = entities
                .iter()
                .find(|&&(id, _)| id == current)
                .copied()
                .ok_or(Error::UnresolvedSource(current))?;
            match source {
                Some(source) if hops < entities.len() => {
                    current = source;
                    hops += 1;
                }
                Some(_) => return Err(Error::BrokenChain),
                None => break,
            }
        }

        if hops + 1 == entities.len() {
            Ok(())
        } else {
            Err(Error::BrokenChain)
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::microphone()
    }
}
