//! # Plugin Parameters
//!
//! The seven knobs the host sees. Each has:
//!
//! - A **unique string ID** (`#[id = "..."]`) used to save and recall
//!   presets. Once published, never change these IDs or existing presets
//!   will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **linear range** and a **default value**.
//!
//! ## No Smoothing
//!
//! The reverb reads its parameters once per processing block and holds them
//! for the whole block, so none of these parameters carry a smoother.
//! `ReverbParams::settings()` takes that once-per-block snapshot.

use nih_plug::prelude::*;

use crate::engine::ReverbSettings;

/// All user-facing parameters for the Loveless Reverb plugin.
#[derive(Params)]
pub struct ReverbParams {
    /// **Delay Time** — base length of the delay network, in seconds.
    ///
    /// Every line's delay is this value times its ratio (1.0 to 1.7) times
    /// Size.
    #[id = "delay"]
    pub delay_time: FloatParam,

    /// **Size** — stretches all eight lines together. Larger sizes mean a
    /// longer wait before the first reflection returns.
    #[id = "size"]
    pub size: FloatParam,

    /// **Damping** — how much high end each pass through the loop loses.
    #[id = "damp"]
    pub damping: FloatParam,

    /// **Diffusion** — how strongly transients are smeared before entering
    /// the network.
    #[id = "diff"]
    pub diffusion: FloatParam,

    /// **Feedback** — how much of each line's output is fed back into it.
    /// At 100% the tail only decays through damping.
    #[id = "fdbk"]
    pub feedback: FloatParam,

    /// **Mod Depth** — how far the LFO swings the delay taps (up to
    /// ±100 ms at 100%).
    #[id = "mdep"]
    pub mod_depth: FloatParam,

    /// **Mod Rate** — LFO frequency.
    #[id = "mfrq"]
    pub mod_freq: FloatParam,
}

impl ReverbParams {
    /// Snapshot the current values for one processing block.
    pub fn settings(&self) -> ReverbSettings {
        ReverbSettings {
            delay_time: self.delay_time.value(),
            size: self.size.value(),
            damping: self.damping.value(),
            diffusion: self.diffusion.value(),
            feedback: self.feedback.value(),
            mod_depth: self.mod_depth.value(),
            mod_freq: self.mod_freq.value(),
        }
    }
}

impl Default for ReverbParams {
    fn default() -> Self {
        let defaults = ReverbSettings::default();

        Self {
            delay_time: FloatParam::new(
                "Delay Time",
                defaults.delay_time,
                FloatRange::Linear {
                    min: 0.0,
                    max: 10.0,
                },
            )
            .with_unit(" s")
            .with_value_to_string(formatters::v2s_f32_rounded(2))
            .with_step_size(0.01),

            size: FloatParam::new(
                "Size",
                defaults.size,
                FloatRange::Linear { min: 0.5, max: 5.0 },
            )
            .with_unit("x")
            .with_value_to_string(formatters::v2s_f32_rounded(2)),

            damping: percentage_param("Damping", defaults.damping),
            diffusion: percentage_param("Diffusion", defaults.diffusion),
            feedback: percentage_param("Feedback", defaults.feedback),
            mod_depth: percentage_param("Mod Depth", defaults.mod_depth),

            mod_freq: FloatParam::new(
                "Mod Rate",
                defaults.mod_freq,
                FloatRange::Linear {
                    min: 0.0,
                    max: 10.0,
                },
            )
            .with_unit(" Hz")
            .with_value_to_string(formatters::v2s_f32_rounded(2)),
        }
    }
}

/// A 0..1 control displayed as a percentage: 0.707 → "70.7%".
fn percentage_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(name, default, FloatRange::Linear { min: 0.0, max: 1.0 })
        .with_unit("%")
        .with_value_to_string(formatters::v2s_f32_percentage(1))
        .with_string_to_value(formatters::s2v_f32_percentage())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh parameters snapshot to the engine's default settings.
    #[test]
    fn test_defaults_match_engine() {
        let params = ReverbParams::default();
        assert_eq!(params.settings(), ReverbSettings::default());
    }

    /// The preset IDs are part of the saved-state format.
    #[test]
    fn test_parameter_ids_are_stable() {
        let params = ReverbParams::default();
        let mut ids: Vec<String> = params
            .param_map()
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();
        ids.sort();

        assert_eq!(
            ids,
            ["damp", "delay", "diff", "fdbk", "mdep", "mfrq", "size"]
        );
    }
}
