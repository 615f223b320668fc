//! # Reverb Engine
//!
//! Wires the DSP primitives into an eight-line feedback delay network.
//!
//! ```text
//!                    ┌──────────────── per line j = 0..7 ───────────────┐
//!  in L ─► pre ─► ┐  │                                                  │
//!                 ├─►│ diffused (L for even j, R for odd j) × 0.5       │
//!  in R ─► pre ─► ┘  │          │                                       │
//!   (shared 4-stage  │          ▼                                       │
//!    allpass chain)  │  ┌──►(+)──► [delay line j] ──► [damping j] ──┬──►│──► wet L / wet R
//!                    │  │                                           │   │
//!                    │  └────────────── × feedback ◄────────────────┘   │
//!                    └──────────────────────────────────────────────────┘
//!
//!  out = dry + (wet_sum / 4) × 0.5
//! ```
//!
//! Lines never exchange signal with each other: each one only feeds back
//! into itself. Even lines take the diffused left signal and sum into the
//! left output; odd lines do the same for the right.
//!
//! Every buffer is allocated in [`ReverbEngine::new`]. Processing only
//! touches pre-allocated state, so it is safe to run on the audio thread.

use nih_plug::nih_debug_assert_eq;

use crate::dsp::allpass::{self, AllpassDiffuser};
use crate::dsp::delay_line::{DelayLineBank, LINE_COUNT};
use crate::dsp::filter::DampingFilterBank;
use crate::dsp::lfo::ModulationOscillator;
use crate::dsp::pre_delay::PreDelayBuffer;

/// Longest delay any line can hold, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 10.0;

/// Sample rate used when the host hasn't provided one.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Each line's delay relative to the base `delay_time × size`.
pub const DELAY_RATIOS: [f32; LINE_COUNT] = [1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7];

/// Scale on the diffused signal entering each line.
const LINE_INPUT_GAIN: f32 = 0.5;

/// Scale on the averaged wet signal before it is added to the dry input.
const WET_GAIN: f32 = 0.5;

/// Lines summed into each output channel.
const LINES_PER_CHANNEL: f32 = (LINE_COUNT / 2) as f32;

/// Maximum modulation excursion at full depth, in seconds.
const MOD_DEPTH_SECONDS: f32 = 0.1;

/// The seven reverb controls as plain values, resolved once per block.
///
/// Values are expected to already be within their declared ranges; the
/// engine does not check them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbSettings {
    /// Base delay in seconds (0 to 10).
    pub delay_time: f32,
    /// Multiplier on every line's delay (0.5 to 5).
    pub size: f32,
    /// High-frequency loss per feedback pass (0 to 1).
    pub damping: f32,
    /// Diffuser strength (0 to 1), scaled by 0.7 into the stage gain.
    pub diffusion: f32,
    /// Per-line feedback gain (0 to 1).
    pub feedback: f32,
    /// Modulation depth (0 to 1), where 1 swings the taps by ±100 ms.
    pub mod_depth: f32,
    /// Modulation rate in Hz (0 to 10).
    pub mod_freq: f32,
}

impl Default for ReverbSettings {
    fn default() -> Self {
        Self {
            delay_time: 2.0,
            size: 3.0,
            damping: 0.1,
            diffusion: 0.707,
            feedback: 0.2,
            mod_depth: 0.0,
            mod_freq: 0.1,
        }
    }
}

impl ReverbSettings {
    /// Gain of each diffuser stage.
    pub fn diffusion_gain(&self) -> f32 {
        allpass::diffusion_gain(self.diffusion)
    }

    /// Peak modulation offset in samples.
    pub fn modulation_depth_samples(&self, sample_rate: f32) -> f32 {
        self.mod_depth * MOD_DEPTH_SECONDS * sample_rate
    }

    /// Unmodulated delay of line `line`, in seconds.
    pub fn line_delay_seconds(&self, line: usize) -> f32 {
        self.delay_time * DELAY_RATIOS[line] * self.size
    }
}

/// Values derived from [`ReverbSettings`] that stay fixed for a block.
///
/// Computing them once in [`ReverbEngine::set_settings`] keeps the
/// per-sample loop down to the arithmetic that actually changes per sample.
struct BlockCoefficients {
    /// Gain of each diffuser stage (`diffusion × 0.7`).
    diffusion_gain: f32,
    feedback: f32,
    /// Peak modulation offset in samples (`mod_depth × 0.1 × sample_rate`).
    mod_depth_samples: f32,
    /// Unmodulated delay of each line, in samples.
    line_delays: [f32; LINE_COUNT],
}

/// All reverb state for one stream.
pub struct ReverbEngine {
    sample_rate: f32,
    pre_delay: PreDelayBuffer,
    diffuser: AllpassDiffuser,
    lines: DelayLineBank,
    damping: DampingFilterBank,
    lfo: ModulationOscillator,
    coefficients: BlockCoefficients,
}

impl ReverbEngine {
    /// Allocate every buffer for `sample_rate`. The sizes are fixed for the
    /// lifetime of the engine. The engine starts out with the default
    /// settings applied.
    pub fn new(sample_rate: f32) -> Self {
        let capacity = (f64::from(MAX_DELAY_SECONDS) * f64::from(sample_rate)).ceil() as usize;
        let mut engine = Self {
            sample_rate,
            pre_delay: PreDelayBuffer::new(sample_rate),
            diffuser: AllpassDiffuser::new(),
            lines: DelayLineBank::new(capacity),
            damping: DampingFilterBank::new(),
            lfo: ModulationOscillator::new(),
            coefficients: BlockCoefficients {
                diffusion_gain: 0.0,
                feedback: 0.0,
                mod_depth_samples: 0.0,
                line_delays: [0.0; LINE_COUNT],
            },
        };
        engine.set_settings(&ReverbSettings::default());
        engine
    }

    /// Samples each delay line can hold.
    pub fn delay_capacity(&self) -> usize {
        self.lines.capacity()
    }

    /// Apply the block's parameter values.
    ///
    /// Call once per block before processing its samples. Only coefficients
    /// change here; buffers, cursors and the oscillator phase carry on, so
    /// the tail continues smoothly across blocks.
    pub fn set_settings(&mut self, settings: &ReverbSettings) {
        self.damping.set_damping(settings.damping);
        self.lfo.set_frequency(settings.mod_freq, self.sample_rate);

        self.coefficients = BlockCoefficients {
            diffusion_gain: settings.diffusion_gain(),
            feedback: settings.feedback,
            mod_depth_samples: settings.modulation_depth_samples(self.sample_rate),
            line_delays: std::array::from_fn(|line| {
                settings.line_delay_seconds(line) * self.sample_rate
            }),
        };
    }

    /// Return every buffer, cursor, filter and the oscillator to the
    /// freshly constructed state. Nothing is reallocated, and the current
    /// settings stay applied.
    pub fn reset(&mut self) {
        self.pre_delay.clear();
        self.diffuser.clear();
        self.lines.clear();
        self.damping.reset();
        self.lfo.reset();
    }

    /// Process one stereo sample with the settings from the last
    /// [`set_settings`](Self::set_settings) call.
    pub fn process_sample(&mut self, input_l: f32, input_r: f32) -> (f32, f32) {
        let coefficients = &self.coefficients;

        let mod_value = self.lfo.advance();
        let mod_offset = mod_value * coefficients.mod_depth_samples;

        let (pre_l, pre_r) = self.pre_delay.process(input_l, input_r);
        let (diffused_l, diffused_r) =
            self.diffuser
                .process_stereo(pre_l, pre_r, coefficients.diffusion_gain);

        let max_delay = (self.lines.capacity() - 1) as f32;

        let mut wet_sum_l = 0.0;
        let mut wet_sum_r = 0.0;
        for (line, &base_delay) in coefficients.line_delays.iter().enumerate() {
            let delay = (base_delay + mod_offset).clamp(1.0, max_delay);

            // Read before write: the tap never includes this sample.
            let delayed = self.damping.process(line, self.lines.read(line, delay));

            let left_line = line % 2 == 0;
            let diffused = if left_line { diffused_l } else { diffused_r };
            self.lines.write(
                line,
                diffused * LINE_INPUT_GAIN + delayed * coefficients.feedback,
            );
            self.lines.advance(line);

            if left_line {
                wet_sum_l += delayed;
            } else {
                wet_sum_r += delayed;
            }
        }

        let wet_l = wet_sum_l / LINES_PER_CHANNEL;
        let wet_r = wet_sum_r / LINES_PER_CHANNEL;

        (input_l + wet_l * WET_GAIN, input_r + wet_r * WET_GAIN)
    }

    /// Process a block with `settings` held for every sample in it.
    ///
    /// The output slices define the block length. A single present input
    /// channel feeds both sides; no input at all is treated as silence, as
    /// are any input samples missing past the end of a short slice.
    pub fn process_block(
        &mut self,
        input_l: Option<&[f32]>,
        input_r: Option<&[f32]>,
        output_l: &mut [f32],
        output_r: &mut [f32],
        settings: &ReverbSettings,
    ) {
        nih_debug_assert_eq!(output_l.len(), output_r.len());
        self.set_settings(settings);

        let (source_l, source_r): (&[f32], &[f32]) = match (input_l, input_r) {
            (Some(left), Some(right)) => (left, right),
            (Some(mono), None) | (None, Some(mono)) => (mono, mono),
            (None, None) => (&[], &[]),
        };

        for (i, (out_l, out_r)) in output_l.iter_mut().zip(output_r.iter_mut()).enumerate() {
            let in_l = source_l.get(i).copied().unwrap_or(0.0);
            let in_r = source_r.get(i).copied().unwrap_or(0.0);
            (*out_l, *out_r) = self.process_sample(in_l, in_r);
        }
    }
}

impl Default for ReverbEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
