//! Typed views over the option cache.
//!
//! Each accessor reads one option and applies the same fallback the host
//! menu would show, so callers never deal with raw strings.

use crate::audio::PacingMode;
use crate::logging::LogLevel;
use crate::options::{OptionCache, keys};

/// Internal resolution multiplier range.
pub const EFB_SCALE_RANGE: std::ops::RangeInclusive<u32> = 1..=6;

/// Snapshot of the options the wrapper itself consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub audio_method: PacingMode,
    /// Configured mixer rate (Hz)
    pub mixer_rate: u32,
    pub precision_frame_timing: bool,
    /// Internal resolution multiplier
    pub efb_scale: u32,
    pub crop_overscan: bool,
    pub widescreen_hack: bool,
    /// Wii system widescreen setting
    pub widescreen: bool,
    /// CPU clock override as a fraction of the stock clock
    pub cpu_clock_rate: f32,
    pub log_level: LogLevel,
    pub rumble: bool,
    pub wiimote_continuous_scanning: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_method: PacingMode::PushSamples,
            mixer_rate: 32000,
            precision_frame_timing: false,
            efb_scale: 1,
            crop_overscan: false,
            widescreen_hack: false,
            widescreen: true,
            cpu_clock_rate: 1.0,
            log_level: LogLevel::Info,
            rumble: true,
            wiimote_continuous_scanning: false,
        }
    }
}

impl Settings {
    pub fn read(cache: &OptionCache) -> Self {
        let defaults = Self::default();
        Self {
            audio_method: audio_method(cache),
            mixer_rate: mixer_rate(cache),
            precision_frame_timing: cache.get(
                keys::general::PRECISION_FRAME_TIMING,
                defaults.precision_frame_timing,
            ),
            efb_scale: efb_scale(cache),
            crop_overscan: cache.get(keys::gfx_settings::CROP_OVERSCAN, defaults.crop_overscan),
            widescreen_hack: cache.get(
                keys::gfx_settings::WIDESCREEN_HACK,
                defaults.widescreen_hack,
            ),
            widescreen: cache.get(keys::sysconf::WIDESCREEN, defaults.widescreen),
            cpu_clock_rate: cpu_clock_rate(cache),
            log_level: log_level(cache),
            rumble: cache.get(keys::sysconf::ENABLE_RUMBLE, defaults.rumble),
            wiimote_continuous_scanning: cache.get(
                keys::sysconf::WIIMOTE_CONTINUOUS_SCANNING,
                defaults.wiimote_continuous_scanning,
            ),
        }
    }
}

pub fn audio_method(cache: &OptionCache) -> PacingMode {
    cache.get(keys::audio::CALL_BACK_AUDIO, PacingMode::PushSamples)
}

/// Mixer rate, restricted to the two supported families.
pub fn mixer_rate(cache: &OptionCache) -> u32 {
    match cache.get(keys::audio::MIXER_RATE, 32000_u32) {
        48000 => 48000,
        _ => 32000,
    }
}

pub fn efb_scale(cache: &OptionCache) -> u32 {
    let scale = cache.get(keys::gfx_settings::EFB_SCALE, 1_u32);
    scale.clamp(*EFB_SCALE_RANGE.start(), *EFB_SCALE_RANGE.end())
}

/// `"150%"` reads as `1.5`.
pub fn cpu_clock_rate(cache: &OptionCache) -> f32 {
    let percent = cache.get(keys::general::CPU_CLOCK_RATE, 100.0_f32);
    if percent > 0.0 { percent / 100.0 } else { 1.0 }
}

pub fn log_level(cache: &OptionCache) -> LogLevel {
    cache.get(keys::interface::LOG_LEVEL, LogLevel::Info)
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;

    use super::*;
    use crate::test_utils::FakeEnvironment;

    fn cache(env: &FakeEnvironment) -> OptionCache {
        OptionCache::from_definitions(env, &HashMap::new())
    }

    #[test]
    fn test_defaults_match_option_table() {
        let env = FakeEnvironment::new();
        assert_eq!(Settings::read(&cache(&env)), Settings::default());
    }

    #[test]
    fn test_host_values_are_typed() {
        let env = FakeEnvironment::new()
            .with_variable(keys::audio::CALL_BACK_AUDIO, "Async Callback")
            .with_variable(keys::audio::MIXER_RATE, "48000")
            .with_variable(keys::gfx_settings::EFB_SCALE, "3")
            .with_variable(keys::general::CPU_CLOCK_RATE, "150%")
            .with_variable(keys::interface::LOG_LEVEL, "Debug")
            .with_variable(keys::general::PRECISION_FRAME_TIMING, "enabled");
        let settings = Settings::read(&cache(&env));

        assert_eq!(settings.audio_method, PacingMode::AsyncCallback);
        assert_eq!(settings.mixer_rate, 48000);
        assert_eq!(settings.efb_scale, 3);
        assert!((settings.cpu_clock_rate - 1.5).abs() < f32::EPSILON);
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert!(settings.precision_frame_timing);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let env = FakeEnvironment::new()
            .with_variable(keys::audio::MIXER_RATE, "44100")
            .with_variable(keys::gfx_settings::EFB_SCALE, "12")
            .with_variable(keys::general::CPU_CLOCK_RATE, "0%");
        let cache = cache(&env);

        assert_eq!(mixer_rate(&cache), 32000);
        assert_eq!(efb_scale(&cache), 6);
        assert_eq!(cpu_clock_rate(&cache), 1.0);
    }
}
