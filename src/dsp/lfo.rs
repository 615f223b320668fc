//! # Modulation Oscillator
//!
//! A slow sine LFO that wobbles every delay line's read position by the
//! same amount. Moving the taps a little breaks up the metallic ringing a
//! static delay network tends to produce.

use std::f32::consts::TAU;

/// Sine LFO with its phase kept in `[0, 1)`.
pub struct ModulationOscillator {
    phase: f32,
    /// Phase step per sample, `frequency / sample_rate`.
    increment: f32,
}

impl ModulationOscillator {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            increment: 0.0,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Set the rate the oscillator runs at.
    ///
    /// The phase is measured in cycles rather than radians, so one sample
    /// moves it by `frequency_hz / sample_rate`: at 1 Hz and 48 kHz that is
    /// 1/48000 of a cycle. The current phase is kept, which means a rate
    /// change bends the waveform instead of making it jump.
    pub fn set_frequency(&mut self, frequency_hz: f32, sample_rate: f32) {
        self.increment = frequency_hz / sample_rate;
    }

    /// Step one sample forward and return the new value in `[-1, 1]`.
    ///
    /// The phase moves first and the sine is taken afterwards, so the very
    /// first call already returns `sin(2π · increment)` rather than
    /// `sin(0)`. At zero frequency the phase never leaves 0 and the output
    /// stays at exactly 0, which leaves the delay taps where they are.
    ///
    /// `rem_euclid` keeps the phase in `[0, 1)` even for increments of a
    /// whole cycle or more, so `f32` precision doesn't degrade over hours
    /// of playback.
    pub fn advance(&mut self) -> f32 {
        self.phase = (self.phase + self.increment).rem_euclid(1.0);
        (self.phase * TAU).sin()
    }

    /// Return to phase 0. The rate is kept.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Default for ModulationOscillator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A quarter of the sample rate puts the sine at its peak after one step.
    #[test]
    fn test_quarter_cycle_step() {
        let mut lfo = ModulationOscillator::new();
        lfo.set_frequency(1.0, 4.0);
        let value = lfo.advance();
        assert!((lfo.phase() - 0.25).abs() < 1e-6);
        assert!((value - 1.0).abs() < 1e-6, "Expected 1.0, got {value}");
    }

    /// The phase wraps instead of growing, even over very long runs.
    #[test]
    fn test_phase_stays_in_unit_range() {
        let mut lfo = ModulationOscillator::new();
        lfo.set_frequency(10.0, 44100.0);
        for _ in 0..1_000_000 {
            let value = lfo.advance();
            assert!((0.0..1.0).contains(&lfo.phase()));
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    /// Zero frequency holds the oscillator at phase 0, i.e. no modulation.
    #[test]
    fn test_zero_frequency_is_static() {
        let mut lfo = ModulationOscillator::new();
        lfo.set_frequency(0.0, 48000.0);
        for _ in 0..100 {
            assert_eq!(lfo.advance(), 0.0);
        }
    }

    /// Changing the rate continues from the current phase.
    #[test]
    fn test_frequency_change_keeps_phase() {
        let mut lfo = ModulationOscillator::new();
        lfo.set_frequency(1.0, 8.0);
        lfo.advance();
        lfo.set_frequency(2.0, 8.0);
        lfo.advance();
        assert!((lfo.phase() - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut lfo = ModulationOscillator::new();
        lfo.set_frequency(3.0, 100.0);
        lfo.advance();
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }
}
