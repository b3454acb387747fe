//! Mixer sample-rate selection

use super::PacingMode;
use crate::system::SystemInfo;

/// Rate used when nothing else is known.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// GameCube DSP rate for the 32 kHz family (clock-divided).
const GAMECUBE_RATE_32K: u32 = 32029;
/// GameCube DSP rate for the 48 kHz family (clock-divided).
const GAMECUBE_RATE_48K: u32 = 48043;

/// Pick the mixer rate.
///
/// In order: a rate the mixer already runs at, the fixed hardware rate for
/// push mode, the host's preferred rate, then [`DEFAULT_SAMPLE_RATE`].
pub fn resolve_sample_rate(
    mixer_rate: u32,
    mode: PacingMode,
    system: SystemInfo,
    configured_rate: u32,
    host_rate: Option<u32>,
) -> u32 {
    if mixer_rate != 0 {
        return mixer_rate;
    }

    if mode == PacingMode::PushSamples {
        return if system.is_wii() {
            configured_rate
        } else if configured_rate == 32000 {
            GAMECUBE_RATE_32K
        } else {
            GAMECUBE_RATE_48K
        };
    }

    host_rate
        .filter(|rate| *rate != 0)
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}
