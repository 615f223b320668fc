//! # One-Pole Damping Filters
//!
//! Real rooms absorb high frequencies faster than low ones, so each trip
//! around the reverb's feedback loop should lose a little top end. A
//! one-pole lowpass on every delay line does exactly that with one multiply
//! and two adds per sample.
//!
//! ## The Filter Equation
//!
//! ```text
//! state += coeff * (input - state)
//! ```
//!
//! `state` chases `input` by a fraction `coeff` of the remaining distance
//! each sample:
//!
//! - `coeff = 1.0`  → state jumps straight to the input (no filtering)
//! - `coeff = 0.5`  → state moves halfway each sample (moderate filtering)
//! - `coeff → 0.0`  → state barely moves (heavy filtering)
//!
//! ## Mapping the Damping Control
//!
//! ```text
//! coeff = 1.0 - damping * 0.95
//! ```
//!
//! With damping at its maximum of 1.0 the coefficient bottoms out at 0.05
//! rather than 0.0, so the loop darkens heavily but never goes silent.
//!
//! Because the output is always a weighted average of the previous state and
//! the input, it can never exceed the largest input it has seen. That keeps
//! the feedback loop's gain at or below the feedback control.

use super::delay_line::LINE_COUNT;

/// Scale applied to the damping control before it lowers the coefficient.
const DAMPING_SCALE: f32 = 0.95;

/// Convert the 0..1 damping control into a filter coefficient.
pub fn damping_coefficient(damping: f32) -> f32 {
    1.0 - damping * DAMPING_SCALE
}

/// A one-pole (6 dB/octave) lowpass filter.
pub struct OnePoleFilter {
    /// How far the state moves toward the input each sample.
    /// Range: 0.05 (heavy damping) to 1.0 (passthrough).
    coefficient: f32,

    /// The running output, the filter's only memory.
    state: f32,
}

impl OnePoleFilter {
    /// Create a filter initialized to passthrough (`coefficient = 1.0`).
    pub fn new() -> Self {
        Self {
            coefficient: 1.0,
            state: 0.0,
        }
    }

    /// Set the coefficient from the 0..1 damping control.
    pub fn set_damping(&mut self, damping: f32) {
        self.coefficient = damping_coefficient(damping);
    }

    /// Process one sample through the filter.
    pub fn process(&mut self, input: f32) -> f32 {
        self.state += self.coefficient * (input - self.state);
        self.state
    }

    /// Reset the filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

impl Default for OnePoleFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// One damping filter per delay line.
pub struct DampingFilterBank {
    filters: [OnePoleFilter; LINE_COUNT],
}

impl DampingFilterBank {
    pub fn new() -> Self {
        Self {
            filters: std::array::from_fn(|_| OnePoleFilter::new()),
        }
    }

    /// Apply the same damping control to every line.
    pub fn set_damping(&mut self, damping: f32) {
        for filter in &mut self.filters {
            filter.set_damping(damping);
        }
    }

    /// Filter the tap read from delay line `line`.
    pub fn process(&mut self, line: usize, input: f32) -> f32 {
        self.filters[line].process(input)
    }

    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}

impl Default for DampingFilterBank {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A fresh filter passes input through unchanged.
    #[test]
    fn test_passthrough_when_coefficient_one() {
        let mut filter = OnePoleFilter::new();

        for input in [1.0, 0.5, -0.3] {
            let output = filter.process(input);
            assert!(
                (output - input).abs() < 1e-6,
                "Filter should pass {input} through unchanged, got {output}"
            );
        }
    }

    /// Zero damping is also passthrough; full damping leaves 5% of the step.
    #[test]
    fn test_coefficient_mapping() {
        assert_eq!(damping_coefficient(0.0), 1.0);
        assert!((damping_coefficient(1.0) - 0.05).abs() < 1e-6);
        assert!((damping_coefficient(0.1) - 0.905).abs() < 1e-6);

        let mut filter = OnePoleFilter::new();
        filter.set_damping(1.0);
        let first = filter.process(1.0);
        assert!((first - 0.05).abs() < 1e-6, "Expected 0.05, got {first}");
    }

    /// Heavy damping should strongly attenuate the Nyquist frequency.
    #[test]
    fn test_filter_attenuates_high_freq() {
        let mut filter = OnePoleFilter::new();
        filter.set_damping(1.0);

        let mut max_output = 0.0_f32;
        for i in 0..1000 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            let output = filter.process(input);
            if i > 100 {
                max_output = max_output.max(output.abs());
            }
        }

        // Steady-state Nyquist gain is c / (2 - c) ≈ 0.026 for c = 0.05.
        assert!(
            max_output < 0.05,
            "Expected heavy attenuation, got max output {max_output}"
        );
    }

    /// The output never leaves the range of its inputs, so the filter can't
    /// add energy to the feedback loop.
    #[test]
    fn test_output_bounded_by_input() {
        for damping in [0.0, 0.3, 0.7, 1.0] {
            let mut filter = OnePoleFilter::new();
            filter.set_damping(damping);
            for i in 0..5000 {
                let input = ((i * 7919) % 200) as f32 / 100.0 - 1.0;
                let output = filter.process(input);
                assert!(output.abs() <= 1.0, "damping {damping}: output {output}");
            }
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = OnePoleFilter::new();
        filter.set_damping(0.5);

        filter.process(1.0);
        assert!(filter.state.abs() > 0.0);

        filter.reset();
        assert!(filter.state.abs() < 1e-6);
    }

    /// DC passes a lowpass regardless of damping.
    #[test]
    fn test_dc_passes_through() {
        let mut filter = OnePoleFilter::new();
        filter.set_damping(1.0);

        let mut output = 0.0;
        for _ in 0..10000 {
            output = filter.process(1.0);
        }

        assert!(
            (output - 1.0).abs() < 1e-4,
            "DC signal should pass through lowpass, got {output}"
        );
    }

    /// Each line keeps its own state.
    #[test]
    fn test_bank_filters_are_independent() {
        let mut bank = DampingFilterBank::new();
        bank.set_damping(0.5);

        let a = bank.process(0, 1.0);
        let b = bank.process(1, 0.0);
        let a2 = bank.process(0, 1.0);

        assert!((a - 0.525).abs() < 1e-6, "got {a}");
        assert_eq!(b, 0.0);
        assert!(a2 > a);

        bank.reset();
        assert!((bank.process(0, 1.0) - 0.525).abs() < 1e-6);
    }
}
