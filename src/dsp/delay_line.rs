//! # Delay Lines (Ring Buffers)
//!
//! The reverb's feedback network is built from eight long delay lines. Each
//! one is a circular buffer with a single write head: every sample we read
//! an older value from somewhere behind the head, write a new value at the
//! head, and then move the head forward by one slot.
//!
//! ## Read Position
//!
//! The read position is measured backwards from the write head:
//!
//! ```text
//! read_pos = write_pos - delay_samples   (wrapped into [0, len))
//! ```
//!
//! When `delay_samples` has a fractional part, the result is blended between
//! the two neighbouring slots `floor(read_pos)` and `floor(read_pos) + 1`,
//! weighted by the fractional part of `read_pos`. The modulation oscillator
//! moves the delay continuously, so this linear interpolation is what keeps
//! the read head from stepping audibly between whole samples.
//!
//! ## Ordering
//!
//! For every sample the caller must:
//!
//! 1. `read()` using the write head *before* anything is written,
//! 2. `write()` the new value at that same head position,
//! 3. `advance()` the head.
//!
//! Because of this ordering the value read never contains the sample being
//! written, which is what makes a line behave like a conventional feedback
//! delay.

use nih_plug::nih_debug_assert;

/// Number of lines in the feedback network.
pub const LINE_COUNT: usize = 8;

/// A single ring buffer with a fractional read and an integer write.
///
/// The buffer is allocated once at construction and never resized; only
/// the write head moves.
pub struct DelayLine {
    /// Stored samples, all silence at construction.
    buffer: Vec<f32>,

    /// Where the next sample will be written. Always in `[0, buffer_len)`.
    write_pos: usize,

    buffer_len: usize,
}

impl DelayLine {
    /// Create a delay line holding `capacity` samples.
    ///
    /// A capacity below 2 is raised to 2 so the wrap arithmetic and the
    /// `[1, capacity - 1]` clamp used by the engine stay well defined.
    pub fn new(capacity: usize) -> Self {
        let buffer_len = capacity.max(2);
        Self {
            buffer: vec![0.0; buffer_len],
            write_pos: 0,
            buffer_len,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer_len
    }

    /// Store `sample` at the write head. Does NOT advance the head.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Read `delay_samples` behind the write head with linear interpolation.
    ///
    /// Valid delays are `[0, capacity]`. The engine always clamps to
    /// `[1, capacity - 1]` before calling.
    ///
    /// # How the index math works
    ///
    /// Splitting the delay into whole and fractional parts keeps the index
    /// arithmetic in integers, so a whole-sample delay lands exactly on one
    /// slot (no rounding from a large float position):
    ///
    /// ```text
    /// newer = (write_pos + len - delay_int) % len      // floor(read_pos) + 1
    /// older = (newer + len - 1) % len                  // floor(read_pos)
    /// out   = newer * (1 - delay_frac) + older * delay_frac
    /// ```
    ///
    /// The fraction of `read_pos` is `1 - delay_frac`, so this is the same
    /// blend as interpolating forward from `floor(read_pos)`.
    pub fn read(&self, delay_samples: f32) -> f32 {
        nih_debug_assert!(
            (0.0..=self.buffer_len as f32).contains(&delay_samples),
            "delay of {} samples is outside the line",
            delay_samples
        );

        let delay_int = delay_samples as usize;
        let delay_frac = delay_samples - delay_int as f32;

        let newer = (self.write_pos + self.buffer_len - delay_int % self.buffer_len)
            % self.buffer_len;
        let older = (newer + self.buffer_len - 1) % self.buffer_len;

        self.buffer[newer] * (1.0 - delay_frac) + self.buffer[older] * delay_frac
    }

    /// Move the write head forward one slot, wrapping at the end.
    pub fn advance(&mut self) {
        self.write_pos = (self.write_pos + 1) % self.buffer_len;
    }

    /// Silence the buffer and return the head to slot 0.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// The eight delay lines of the feedback network, all sized to the same
/// maximum delay.
pub struct DelayLineBank {
    lines: [DelayLine; LINE_COUNT],
}

impl DelayLineBank {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: std::array::from_fn(|_| DelayLine::new(capacity)),
        }
    }

    /// Capacity shared by every line, in samples.
    pub fn capacity(&self) -> usize {
        self.lines[0].capacity()
    }

    /// Read line `line`, `delay_samples` behind its write head.
    ///
    /// Call this first for a given sample, before [`write`](Self::write)
    /// touches the same line. A delay of exactly `d` whole samples returns
    /// the value written `d` samples ago; anything between two whole delays
    /// is a linear blend of the two stored values, see [`DelayLine::read`].
    pub fn read(&self, line: usize, delay_samples: f32) -> f32 {
        self.lines[line].read(delay_samples)
    }

    /// Store `sample` at line `line`'s write head.
    ///
    /// The head stays where it is, so a read made earlier in the same
    /// sample and this write refer to the same slot: the value that just
    /// left the line is replaced by the value entering it. In the reverb
    /// that value is the diffused input plus the damped feedback.
    pub fn write(&mut self, line: usize, sample: f32) {
        self.lines[line].write(sample);
    }

    /// Move line `line`'s write head one slot forward, wrapping at the end.
    ///
    /// Call once per sample after the write. Every line advances on every
    /// sample, so all eight heads stay at the same index and the lines
    /// differ only in how far behind the head they are read.
    pub fn advance(&mut self, line: usize) {
        self.lines[line].advance();
    }

    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
