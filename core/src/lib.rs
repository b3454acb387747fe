//! Dolphin libretro core - host integration layer
//!
//! This crate provides the pieces of the libretro wrapper that sit between
//! the frontend and the emulator: audio pacing and the typed option cache.
//!
//! # Architecture
//!
//! - [`Environment`] - Host query/set protocol (implemented over the C ABI by [`ffi::RetroEnvironment`])
//! - [`OptionCache`] - Typed, change-tracked view of the host options
//! - [`AudioStream`] - Mode-negotiated sample delivery (push, per-frame, async callback)
//! - [`CoreSession`] - Per-run context driving the option poll, AV info and frame pacing

pub mod audio;
pub mod av_info;
pub mod config;
pub mod environment;
pub mod error;
pub mod ffi;
pub mod logging;
pub mod options;
pub mod session;
pub mod settings;
pub mod system;
#[cfg(test)]
pub mod test_utils;

// Re-export host protocol
pub use environment::{AudioCallbackHandler, BufferStatusHandler, Environment, FrameTimeHandler};

// Re-export audio pacing types
pub use audio::{
    AudioSink, AudioStream, FrameThrottle, FrameTiming, MAX_SAMPLES, MIN_SAMPLES, Mixer,
    PacingMode, SampleBatcher, StreamConfig,
};

// Re-export option types
pub use options::{OptionCache, OptionDefinition, OptionValue};

pub use av_info::SystemAvInfo;
pub use config::CoreConfig;
pub use error::ConfigError;
pub use logging::{HostLogger, LogLevel, LogLevelHandle};
pub use session::{CoreSession, FrameEvents};
pub use settings::Settings;
pub use system::{Region, SystemInfo, SystemKind};
