//! Host environment protocol
//!
//! The frontend exposes a string-keyed query/set protocol. Every request may be
//! unsupported by a given host; callers treat `None`/`false` as "capability not
//! available" and fall back, never as an error.
//!
//! Callbacks the host fires back into the core (audio requests, measured frame
//! time, buffer status) are modelled as handler traits. Implementations must be
//! callable from a host-owned thread concurrently with the main poll thread.

use std::path::PathBuf;
use std::sync::Arc;

use crate::av_info::SystemAvInfo;
use crate::options::OptionDefinition;

/// Invoked by the host when it wants audio (async callback delivery).
pub trait AudioCallbackHandler: Send + Sync {
    /// Host asks for audio now.
    fn on_audio_requested(&self);

    /// Host audio driver was started (`true`) or stopped (`false`).
    fn on_audio_state(&self, enabled: bool);
}

/// Invoked by the host with the measured duration of each presented frame.
pub trait FrameTimeHandler: Send + Sync {
    fn on_frame_time(&self, usec: i64);
}

/// Invoked by the host with its audio buffer state.
pub trait BufferStatusHandler: Send + Sync {
    fn on_buffer_status(&self, active: bool, occupancy: u32, underrun_likely: bool);
}

/// Query/set protocol offered by the frontend.
pub trait Environment: Send + Sync {
    /// Current value of a host variable, `None` if unset or unsupported.
    fn get_variable(&self, key: &str) -> Option<String>;

    /// Whether any variable changed since the last call.
    ///
    /// `None` means the host cannot tell; callers must assume a change.
    fn variables_updated(&self) -> Option<bool>;

    /// Publish the option table to the host.
    fn set_variables(&self, definitions: &[OptionDefinition]) -> bool;

    /// Refresh rate the host presents at.
    fn target_refresh_rate(&self) -> Option<f32>;

    /// Output sample rate the host prefers.
    fn target_sample_rate(&self) -> Option<u32>;

    /// Whether the host is currently fast-forwarding.
    fn fast_forwarding(&self) -> Option<bool>;

    /// Host system directory (BIOS, config files).
    fn system_directory(&self) -> Option<PathBuf>;

    /// Register the async audio callback.
    fn set_audio_callback(&self, handler: Arc<dyn AudioCallbackHandler>) -> bool;

    /// Register the frame time callback with the expected frame duration.
    fn set_frame_time_callback(&self, reference_usec: i64, handler: Arc<dyn FrameTimeHandler>)
    -> bool;

    /// Register the audio buffer status callback.
    fn set_audio_buffer_status_callback(&self, handler: Arc<dyn BufferStatusHandler>) -> bool;

    /// Full AV info change (may reinitialise the host video driver).
    fn set_system_av_info(&self, info: &SystemAvInfo) -> bool;

    /// Geometry-only change.
    fn set_geometry(&self, info: &SystemAvInfo) -> bool;
}
