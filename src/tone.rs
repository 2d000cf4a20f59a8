//! Phase-accumulated sine tone
//!
//! The phase is counted in units of `1 / sample_rate` of a cycle, so it's an
//! integer that advances by the tone frequency on every sample and wraps at
//! the sample rate. There's no drift: after `sample_rate` samples the phase
//! is exactly where it started, and a tone whose frequency divides the sample
//! rate repeats bit-for-bit.

use crate::descriptor::MAX_SAMPLE_RATE;
use crate::Error;
use core::f32::consts::TAU;
use micromath::F32Ext;

/// Default tone frequency, in Hz.
pub const DEFAULT_FREQUENCY: u32 = 1_000;

/// Default peak amplitude, leaving some headroom below `i16::MAX`.
pub const DEFAULT_AMPLITUDE: i16 = 30_000;

/// A sine oscillator producing signed 16 bit samples.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    sample_rate: u32,
    frequency: u32,
    amplitude: i16,
    phase: u32,
}

impl ToneGenerator {
    /// Create a tone of `frequency` Hz at `sample_rate` Hz.
    ///
    /// The frequency must be above zero, and below half the sample rate. The
    /// sample rate must fit in the 24 bit `tSamFreq` field.
    pub fn new(sample_rate: u32, frequency: u32, amplitude: i16) -> Result<Self, Error> {
        if sample_rate > MAX_SAMPLE_RATE {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        if frequency == 0 || u64::from(frequency) * 2 >= u64::from(sample_rate) {
            return Err(Error::InvalidTone {
                frequency,
                sample_rate,
            });
        }
        Ok(Self {
            sample_rate,
            frequency,
            amplitude,
            phase: 0,
        })
    }

    /// The default 1kHz tone at `sample_rate` Hz.
    pub fn with_defaults(sample_rate: u32) -> Result<Self, Error> {
        Self::new(sample_rate, DEFAULT_FREQUENCY, DEFAULT_AMPLITUDE)
    }

    /// Sample rate, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Tone frequency, in Hz.
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Current phase, in `[0, sample_rate)`.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Restart the tone at phase zero.
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// The sample for `phase`, without advancing.
    pub fn sample_at(&self, phase: u32) -> i16 {
        let angle = TAU * (phase % self.sample_rate) as f32 / self.sample_rate as f32;
        (F32Ext::sin(angle) * f32::from(self.amplitude)) as i16
    }

    /// Produce the next sample, and advance the phase by one sample period.
    pub fn next_sample(&mut self) -> i16 {
        let sample = self.sample_at(self.phase);
        self.phase += self.frequency;
        if self.phase >= self.sample_rate {
            self.phase -= self.sample_rate;
        }
        sample
    }

    /// Fill `pcm` with little-endian samples, one per `bytes_per_sample`
    /// bytes. Trailing bytes that can't hold a whole sample are zeroed.
    pub fn fill_le(&mut self, pcm: &mut [u8], bytes_per_sample: usize) {
        if bytes_per_sample == 0 {
            pcm.fill(0);
            return;
        }
        let mut chunks = pcm.chunks_exact_mut(bytes_per_sample);
        for chunk in &mut chunks {
            let sample = self.next_sample().to_le_bytes();
            chunk.fill(0);
            let width = chunk.len().min(sample.len());
            chunk[..width].copy_from_slice(&sample[..width]);
        }
        chunks.into_remainder().fill(0);
    }
}
