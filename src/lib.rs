//! # Loveless Reverb — An AU/VST3/CLAP Reverb Plugin
//!
//! A feedback-delay-network reverb built with
//! [nih-plug](https://github.com/robbert-vdh/nih-plug). Outputs Audio Unit
//! (AUv2), VST3, and CLAP formats from a single codebase.
//!
//! ## Signal Flow
//!
//! ```text
//! Input L/R ──┬──────────────────────────────────────────────────────(+)──► Output L/R
//!             │                                                       ▲
//!             └─► [Pre-Delay] ─► [4 × Allpass] ─► [8 Delay Lines] ─► × 0.5
//!                  (20 ms,        (shared by        (each damped and
//!                   per channel)   both channels)    fed back into itself)
//! ```
//!
//! The DSP lives in the `engine` and `dsp` modules; this file adapts it
//! to the host.

mod dsp;
mod engine;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use engine::{ReverbEngine, ReverbSettings};
use nih_plug::prelude::*;
use params::ReverbParams;

/// The main plugin struct.
///
/// Parameters are shared with the host through an `Arc`; the engine is
/// owned by the audio thread and only touched in `process()` and `reset()`.
struct LovelessReverb {
    params: Arc<ReverbParams>,

    /// Built in `initialize()` once the sample rate is known.
    engine: Option<ReverbEngine>,

    /// True when the host gives us one input channel. The single channel
    /// then feeds both sides of the engine.
    mono_input: bool,

    /// Copies of the dry input, sized in `initialize()`.
    scratch: InputScratch,
}

/// Holds the dry input while the engine writes its output over the host
/// buffer in place.
///
/// Blocks longer than the scratch space are processed in scratch-sized
/// pieces. The engine keeps its state between pieces, so the result is the
/// same as one long block.
struct InputScratch {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl InputScratch {
    fn new(max_block_size: usize) -> Self {
        let len = max_block_size.max(1);
        Self {
            left: vec![0.0; len],
            right: vec![0.0; len],
        }
    }

    /// Run `engine` over `left`/`right` in place.
    ///
    /// With `mono_input` the right channel's contents are ignored and the
    /// left channel feeds both sides of the engine.
    fn process(
        &mut self,
        engine: &mut ReverbEngine,
        left: &mut [f32],
        right: &mut [f32],
        mono_input: bool,
        settings: &ReverbSettings,
    ) {
        let piece = self.left.len();
        for (out_l, out_r) in left.chunks_mut(piece).zip(right.chunks_mut(piece)) {
            let in_l = &mut self.left[..out_l.len()];
            in_l.copy_from_slice(out_l);

            let in_r = if mono_input {
                None
            } else {
                let in_r = &mut self.right[..out_r.len()];
                in_r.copy_from_slice(out_r);
                Some(&*in_r)
            };

            engine.process_block(Some(&*in_l), in_r, out_l, out_r, settings);
        }
    }
}

impl Default for LovelessReverb {
    fn default() -> Self {
        Self {
            params: Arc::new(ReverbParams::default()),
            engine: None,
            mono_input: false,
            scratch: InputScratch::new(0),
        }
    }
}

impl Plugin for LovelessReverb {
    const NAME: &'static str = "Loveless Reverb";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The reverb always produces stereo. A mono track is upmixed by
    // duplicating its channel.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Allocate the engine for the host's sample rate.
    ///
    /// This is the only place buffers are allocated. The longest delay line
    /// holds 10 seconds, so at 48 kHz each of the eight lines is 480 000
    /// samples (about 1.9 MB), roughly 15 MB in total.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            nih_warn!("Rejecting unusable sample rate {sample_rate}");
            return false;
        }

        self.mono_input = audio_io_layout
            .main_input_channels
            .is_some_and(|channels| channels.get() == 1);

        let engine = ReverbEngine::new(sample_rate);
        self.scratch = InputScratch::new(buffer_config.max_buffer_size as usize);
        nih_log!(
            "Reverb initialized at {} Hz, {} samples per delay line, mono input: {}",
            sample_rate,
            engine.delay_capacity(),
            self.mono_input
        );
        self.engine = Some(engine);

        true
    }

    /// Clear the tail when playback stops so stale reverb doesn't bleed
    /// into the next play.
    fn reset(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
    }

    /// Run the engine over the block in place.
    ///
    /// Parameters are snapshotted once up front and held for every sample
    /// in the block. The dry input is copied to scratch space first because
    /// the host buffer is both input and output.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // The reverb stays active after every block, with or without input.
        let Some(engine) = self.engine.as_mut() else {
            return ProcessStatus::KeepAlive;
        };
        let settings = self.params.settings();

        if let [left, right, ..] = buffer.as_slice() {
            self.scratch
                .process(engine, left, right, self.mono_input, &settings);
        }

        ProcessStatus::KeepAlive
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for LovelessReverb {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-reverb-v1";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A modulated feedback-delay-network reverb");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Reverb,
    ];
}

impl Vst3Plugin for LovelessReverb {
    // Must be exactly 16 ASCII bytes.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssReverb_v001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Reverb];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// Entry points the host uses to discover the plugin: `clap_entry` for
// CLAP, `GetPluginFactory` for VST3, and `GetPluginFactoryAUV2` (through
// clap-wrapper) so Logic Pro can load it as an Audio Unit.

nih_export_clap!(LovelessReverb);
nih_export_vst3!(LovelessReverb);

clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;

    /// Both layouts deliver stereo out, and stereo in is preferred.
    #[test]
    fn test_layouts_are_stereo_out() {
        let layouts = LovelessReverb::AUDIO_IO_LAYOUTS;
        assert_eq!(layouts[0].main_input_channels, NonZeroU32::new(2));
        assert_eq!(layouts[1].main_input_channels, NonZeroU32::new(1));
        assert!(layouts
            .iter()
            .all(|layout| layout.main_output_channels == NonZeroU32::new(2)));
    }

    #[test]
    fn test_vst3_class_id_is_sixteen_bytes() {
        assert_eq!(LovelessReverb::VST3_CLASS_ID.len(), 16);
        assert!(LovelessReverb::VST3_CLASS_ID.is_ascii());
    }

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len).map(|n| (n as f32 * 0.37).sin() * 0.8).collect()
    }

    /// The mono layout ignores whatever sits in the right channel and
    /// duplicates the left input, the same as a mono block.
    #[test]
    fn test_mono_input_ignores_right_channel() {
        let settings = ReverbSettings {
            delay_time: 0.005,
            size: 1.0,
            feedback: 0.6,
            ..ReverbSettings::default()
        };
        let input = test_signal(256);

        let mut engine = ReverbEngine::new(8000.0);
        let mut left = input.clone();
        let mut right = vec![0.9; input.len()];
        InputScratch::new(256).process(&mut engine, &mut left, &mut right, true, &settings);

        let mut reference = ReverbEngine::new(8000.0);
        let mut expected_l = vec![0.0; input.len()];
        let mut expected_r = vec![0.0; input.len()];
        reference.process_block(
            Some(&input),
            Some(&input),
            &mut expected_l,
            &mut expected_r,
            &settings,
        );

        assert_eq!(left, expected_l);
        assert_eq!(right, expected_r);
    }

    /// A host block longer than the scratch space gives the same output as
    /// one block processed in a single call.
    #[test]
    fn test_long_block_processed_in_pieces() {
        let settings = ReverbSettings {
            delay_time: 0.002,
            size: 1.0,
            feedback: 0.5,
            ..ReverbSettings::default()
        };
        let input_l = test_signal(100);
        let input_r: Vec<f32> = input_l.iter().map(|x| x * -0.5).collect();

        let mut engine = ReverbEngine::new(8000.0);
        let mut left = input_l.clone();
        let mut right = input_r.clone();
        InputScratch::new(16).process(&mut engine, &mut left, &mut right, false, &settings);

        let mut reference = ReverbEngine::new(8000.0);
        let mut expected_l = vec![0.0; input_l.len()];
        let mut expected_r = vec![0.0; input_l.len()];
        reference.process_block(
            Some(&input_l),
            Some(&input_r),
            &mut expected_l,
            &mut expected_r,
            &settings,
        );

        assert_eq!(left, expected_l);
        assert_eq!(right, expected_r);
    }

    /// Reset before initialize is a no-op rather than a panic.
    #[test]
    fn test_reset_without_engine() {
        let mut plugin = LovelessReverb::default();
        plugin.reset();
        assert!(plugin.engine.is_none());
    }
}
