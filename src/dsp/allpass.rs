//! # Allpass Diffusion
//!
//! Before the input reaches the delay network it is smeared by a chain of
//! four short allpass-style filters. A sharp transient (a snare hit, a
//! consonant) comes out as a dense burst of small echoes, which the long
//! delay lines then turn into a smooth tail instead of distinct repeats.
//!
//! Each stage, for input `x` at cursor `c`:
//!
//! ```text
//! delayed   = buffer[c]
//! output    = -x + delayed
//! buffer[c] = x + delayed * gain
//! c         = (c + 1) % len
//! ```
//!
//! The stage lengths are short and roughly coprime so their echo patterns
//! don't line up with each other.
//!
//! ## Shared Stereo State
//!
//! The diffuser has ONE set of four stages. Each sample, the left signal
//! passes through all four, then the right signal passes through the same
//! four, so every cursor moves twice per sample and left-channel energy
//! leaks into the right channel's output (and vice versa). This coupling
//! narrows the stereo image and is part of the reverb's sound.

/// Lengths of the four stages, in samples, in processing order.
pub const ALLPASS_LENGTHS: [usize; 4] = [142, 107, 379, 277];

/// Scale applied to the 0..1 diffusion control to get the stage gain.
const DIFFUSION_SCALE: f32 = 0.7;

/// Convert the diffusion control into the stage gain.
pub fn diffusion_gain(diffusion: f32) -> f32 {
    diffusion * DIFFUSION_SCALE
}

/// A single diffusion stage: a fixed ring buffer with one cursor.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
}

impl AllpassFilter {
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            pos: 0,
        }
    }

    #[cfg(test)]
    pub fn length(&self) -> usize {
        self.buffer.len()
    }

    /// Run one sample through the stage and return its output.
    ///
    /// The slot under the cursor holds what the stage stored `len` steps
    /// ago. The output is that stored value minus the new input:
    ///
    /// ```text
    /// output = -input + delayed
    /// ```
    ///
    /// and the slot is refilled with the input plus a `gain`-scaled copy of
    /// the old value, so each echo comes back `gain` times quieter than the
    /// one before it:
    ///
    /// ```text
    /// buffer[pos] = input + delayed * gain
    /// ```
    ///
    /// With `gain` at 0 the stage is a plain inverted-dry plus delayed-dry
    /// pair. The cursor moves one slot per call, so a stage shared by two
    /// channels moves twice per sample.
    pub fn process(&mut self, input: f32, gain: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = -input + delayed;
        self.buffer[self.pos] = input + delayed * gain;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// The four-stage diffusion chain shared by both channels.
pub struct AllpassDiffuser {
    stages: [AllpassFilter; 4],
}

impl AllpassDiffuser {
    pub fn new() -> Self {
        Self {
            stages: ALLPASS_LENGTHS.map(AllpassFilter::new),
        }
    }

    /// Run one signal through all four stages in order.
    pub fn process(&mut self, input: f32, gain: f32) -> f32 {
        self.stages
            .iter_mut()
            .fold(input, |signal, stage| stage.process(signal, gain))
    }

    /// Diffuse left, then right, through the same stages.
    pub fn process_stereo(&mut self, left: f32, right: f32, gain: f32) -> (f32, f32) {
        let left = self.process(left, gain);
        let right = self.process(right, gain);
        (left, right)
    }

    pub fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
    }
}

impl Default for AllpassDiffuser {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
