//! Audio pacing
//!
//! Decides when and how much audio reaches the host. Three delivery modes are
//! supported (see [`PacingMode`]); exactly one is active per stream and only
//! its entry point emits samples:
//!
//! - [`AudioStream::update`] for [`PacingMode::PushSamples`]
//! - [`AudioStream::push_audio_for_frame`] for [`PacingMode::SyncPerFrame`]
//! - [`AudioStream::process_audio_callback`] for [`PacingMode::AsyncCallback`]
//!
//! Samples are interleaved stereo `i16`. Counts are in sample frames (one
//! left/right pair) throughout.

mod batch;
mod metrics;
mod mode;
mod sample_rate;
mod stream;
mod timing;


pub use batch::SampleBatcher;
pub use metrics::DeliveryMetrics;
pub use mode::{Negotiation, PacingMode, negotiate};
pub use sample_rate::{DEFAULT_SAMPLE_RATE, resolve_sample_rate};
pub use stream::{AudioStream, BufferStatus, StreamConfig};
pub use timing::{
    DEFAULT_REFRESH_RATE, DEFAULT_SPIN_WINDOW, FrameThrottle, FrameTiming, target_frame_duration,
};

/// Smallest batch handed to the host (sample frames).
pub const MIN_SAMPLES: u32 = 96;
/// Largest batch handed to the host (sample frames).
pub const MAX_SAMPLES: u32 = 512;

/// Emulator-side audio source.
pub trait Mixer: Send {
    /// Rate the mixer currently produces, 0 if not configured yet.
    fn sample_rate(&self) -> u32;

    fn set_sample_rate(&mut self, rate: u32);

    /// Fill `buffer` with `frames` interleaved stereo frames.
    ///
    /// `buffer` holds at least `frames * 2` samples. Returns the number of
    /// frames actually produced; the remainder is silence.
    fn mix(&mut self, buffer: &mut [i16], frames: usize) -> usize;
}

/// Host-side audio consumer (`retro_audio_sample_batch_t`).
pub trait AudioSink: Send {
    /// Hand `frames` interleaved stereo frames to the host.
    ///
    /// Returns how many frames the host accepted.
    fn deliver(&mut self, samples: &[i16], frames: usize) -> usize;
}
