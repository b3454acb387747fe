//! Delivery mode selection

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::timing::FrameTiming;
use crate::environment::{AudioCallbackHandler, Environment};
use crate::options::OptionValue;

/// How audio reaches the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingMode {
    /// The emulator pushes samples as it produces them.
    #[default]
    PushSamples,
    /// One frame's worth of samples is pushed per emulated frame.
    SyncPerFrame,
    /// The host pulls samples through a registered callback.
    AsyncCallback,
}

impl PacingMode {
    /// Value used in the `dolphin_call_back_audio_method` option.
    pub fn option_label(self) -> &'static str {
        match self {
            PacingMode::PushSamples => "Push Samples",
            PacingMode::SyncPerFrame => "Sync Per Frame",
            PacingMode::AsyncCallback => "Async Callback",
        }
    }

    /// Whether this mode needs the host audio and frame-time callbacks.
    pub fn needs_host_callbacks(self) -> bool {
        !matches!(self, PacingMode::PushSamples)
    }
}

impl fmt::Display for PacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_label())
    }
}

impl OptionValue for PacingMode {
    fn parse_option(raw: &str) -> Option<Self> {
        match raw {
            "Push Samples" => Some(PacingMode::PushSamples),
            "Sync Per Frame" => Some(PacingMode::SyncPerFrame),
            "Async Callback" => Some(PacingMode::AsyncCallback),
            // Older builds exposed the method as a plain toggle.
            _ => bool::parse_option(raw).map(|enabled| {
                if enabled {
                    PacingMode::AsyncCallback
                } else {
                    PacingMode::PushSamples
                }
            }),
        }
    }

    fn format_option(&self) -> String {
        self.option_label().to_string()
    }
}

/// Outcome of host capability negotiation for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    /// Mode actually in effect
    pub mode: PacingMode,
    /// Host accepted the audio callback
    pub audio_callback: bool,
    /// Host accepted the frame-time callback
    pub frame_time_callback: bool,
    /// Host accepted the buffer status callback
    pub buffer_status: bool,
}

/// Register host callbacks and pick the effective mode.
///
/// The audio callback is only requested when `preference` needs it. Frame
/// timing is always negotiated since the frame throttle depends on it. If a
/// callback the preferred mode needs is refused, the stream falls back to
/// [`PacingMode::PushSamples`] for its whole lifetime.
pub fn negotiate(
    env: &dyn Environment,
    preference: PacingMode,
    audio_handler: Arc<dyn AudioCallbackHandler>,
    timing: &Arc<FrameTiming>,
) -> Negotiation {
    let audio_callback = preference.needs_host_callbacks() && env.set_audio_callback(audio_handler);
    if preference.needs_host_callbacks() && !audio_callback {
        debug!("Async audio callback not supported, falling back to push");
    }

    let frame_time_callback = timing.negotiate(env);

    let mode = if preference.needs_host_callbacks() && audio_callback && frame_time_callback {
        preference
    } else {
        PacingMode::PushSamples
    };

    if mode != preference {
        info!("Audio method '{}' unavailable, using '{}'", preference, mode);
    }

    Negotiation {
        mode,
        audio_callback,
        frame_time_callback,
        buffer_status: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        for mode in [
            PacingMode::PushSamples,
            PacingMode::SyncPerFrame,
            PacingMode::AsyncCallback,
        ] {
            assert_eq!(PacingMode::parse_option(mode.option_label()), Some(mode));
        }
        assert_eq!(PacingMode::parse_option("enabled"), Some(PacingMode::AsyncCallback));
        assert_eq!(PacingMode::parse_option("disabled"), Some(PacingMode::PushSamples));
        assert_eq!(PacingMode::parse_option("Sometimes"), None);
    }
}
