//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks the reverb engine wires together:
//!
//! - **`delay_line`**: the eight long ring buffers of the feedback network,
//!   with fractional (interpolated) reads.
//!
//! - **`allpass`**: the four-stage diffuser that smears transients before
//!   they enter the network.
//!
//! - **`filter`**: one-pole lowpass filters that darken each line's
//!   feedback, one per delay line.
//!
//! - **`lfo`**: the sine oscillator that modulates delay read positions.
//!
//! - **`pre_delay`**: the stereo buffers in front of the diffuser.

pub mod allpass;
pub mod delay_line;
pub mod filter;
pub mod lfo;
pub mod pre_delay;
