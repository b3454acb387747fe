//! Shared test utilities for unit tests

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

use crate::audio::{AudioSink, Mixer};
use crate::av_info::SystemAvInfo;
use crate::environment::{
    AudioCallbackHandler, BufferStatusHandler, Environment, FrameTimeHandler,
};
use crate::options::OptionDefinition;

// ============================================================================
// Fake host environment
// ============================================================================

/// Scripted host state behind [`FakeEnvironment`].
pub struct FakeHost {
    /// Values returned by `get_variable`
    pub variables: HashMap<String, String>,
    /// Next answer of `variables_updated`. `Some(true)` is consumed by one query.
    pub updated: Option<bool>,
    pub refresh_rate: Option<f32>,
    pub sample_rate: Option<u32>,
    pub fast_forwarding: Option<bool>,
    pub system_directory: Option<PathBuf>,

    // Capability switches
    pub accept_variables: bool,
    pub accept_audio_callback: bool,
    pub accept_frame_time_callback: bool,
    pub accept_buffer_status_callback: bool,
    pub accept_av_info: bool,

    // Recorded calls
    pub get_variable_calls: usize,
    pub published: Vec<String>,
    pub audio_handler: Option<Arc<dyn AudioCallbackHandler>>,
    pub frame_time_reference: Option<i64>,
    pub frame_time_handler: Option<Arc<dyn FrameTimeHandler>>,
    pub buffer_status_handler: Option<Arc<dyn BufferStatusHandler>>,
    pub av_info_calls: Vec<SystemAvInfo>,
    pub geometry_calls: Vec<SystemAvInfo>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            variables: HashMap::new(),
            updated: Some(false),
            refresh_rate: Some(60.0),
            sample_rate: Some(48000),
            fast_forwarding: Some(false),
            system_directory: None,
            accept_variables: true,
            accept_audio_callback: true,
            accept_frame_time_callback: true,
            accept_buffer_status_callback: true,
            accept_av_info: true,
            get_variable_calls: 0,
            published: Vec::new(),
            audio_handler: None,
            frame_time_reference: None,
            frame_time_handler: None,
            buffer_status_handler: None,
            av_info_calls: Vec::new(),
            geometry_calls: Vec::new(),
        }
    }
}

/// In-memory host with every capability switched on by default.
#[derive(Default)]
pub struct FakeEnvironment {
    host: Mutex<FakeHost>,
}

impl FakeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that supports nothing beyond plain variable reads.
    pub fn bare() -> Self {
        let env = Self::new();
        {
            let mut host = env.host();
            host.updated = None;
            host.refresh_rate = None;
            host.sample_rate = None;
            host.fast_forwarding = None;
            host.accept_variables = false;
            host.accept_audio_callback = false;
            host.accept_frame_time_callback = false;
            host.accept_buffer_status_callback = false;
            host.accept_av_info = false;
        }
        env
    }

    /// Seed a value without flagging a change.
    pub fn with_variable(self, key: &str, value: &str) -> Self {
        self.host().variables.insert(key.to_string(), value.to_string());
        self
    }

    /// Change a value the way a user editing the host menu would.
    pub fn set_variable(&self, key: &str, value: &str) {
        let mut host = self.host();
        host.variables.insert(key.to_string(), value.to_string());
        if host.updated.is_some() {
            host.updated = Some(true);
        }
    }

    pub fn host(&self) -> MutexGuard<'_, FakeHost> {
        self.host.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire the registered async audio callback.
    pub fn fire_audio_callback(&self) {
        let handler = self.host().audio_handler.clone();
        if let Some(handler) = handler {
            handler.on_audio_requested();
        }
    }

    /// Fire the registered audio state callback.
    pub fn fire_audio_state(&self, enabled: bool) {
        let handler = self.host().audio_handler.clone();
        if let Some(handler) = handler {
            handler.on_audio_state(enabled);
        }
    }

    pub fn fire_frame_time(&self, usec: i64) {
        let handler = self.host().frame_time_handler.clone();
        if let Some(handler) = handler {
            handler.on_frame_time(usec);
        }
    }

    pub fn fire_buffer_status(&self, active: bool, occupancy: u32, underrun: bool) {
        let handler = self.host().buffer_status_handler.clone();
        if let Some(handler) = handler {
            handler.on_buffer_status(active, occupancy, underrun);
        }
    }
}

impl Environment for FakeEnvironment {
    fn get_variable(&self, key: &str) -> Option<String> {
        let mut host = self.host();
        host.get_variable_calls += 1;
        host.variables.get(key).cloned()
    }

    fn variables_updated(&self) -> Option<bool> {
        let mut host = self.host();
        let answer = host.updated;
        if answer == Some(true) {
            host.updated = Some(false);
        }
        answer
    }

    fn set_variables(&self, definitions: &[OptionDefinition]) -> bool {
        let mut host = self.host();
        if !host.accept_variables {
            return false;
        }
        host.published = definitions.iter().map(|d| d.key.to_string()).collect();
        true
    }

    fn target_refresh_rate(&self) -> Option<f32> {
        self.host().refresh_rate
    }

    fn target_sample_rate(&self) -> Option<u32> {
        self.host().sample_rate
    }

    fn fast_forwarding(&self) -> Option<bool> {
        self.host().fast_forwarding
    }

    fn system_directory(&self) -> Option<PathBuf> {
        self.host().system_directory.clone()
    }

    fn set_audio_callback(&self, handler: Arc<dyn AudioCallbackHandler>) -> bool {
        let mut host = self.host();
        if !host.accept_audio_callback {
            return false;
        }
        host.audio_handler = Some(handler);
        true
    }

    fn set_frame_time_callback(
        &self,
        reference_usec: i64,
        handler: Arc<dyn FrameTimeHandler>,
    ) -> bool {
        let mut host = self.host();
        if !host.accept_frame_time_callback {
            return false;
        }
        host.frame_time_reference = Some(reference_usec);
        host.frame_time_handler = Some(handler);
        true
    }

    fn set_audio_buffer_status_callback(&self, handler: Arc<dyn BufferStatusHandler>) -> bool {
        let mut host = self.host();
        if !host.accept_buffer_status_callback {
            return false;
        }
        host.buffer_status_handler = Some(handler);
        true
    }

    fn set_system_av_info(&self, info: &SystemAvInfo) -> bool {
        let mut host = self.host();
        host.av_info_calls.push(*info);
        host.accept_av_info
    }

    fn set_geometry(&self, info: &SystemAvInfo) -> bool {
        let mut host = self.host();
        host.geometry_calls.push(*info);
        host.accept_av_info
    }
}

// ============================================================================
// Audio doubles
// ============================================================================

#[derive(Debug, Default)]
pub struct MixerLog {
    pub sample_rate: u32,
    /// Frame counts requested by each `mix` call
    pub mixes: Vec<usize>,
}

/// Mixer that fills buffers with a running frame counter and records calls.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct CountingMixer {
    log: Arc<Mutex<MixerLog>>,
}

impl CountingMixer {
    /// Mixer that reports `rate` before the stream configures it (0 = unset).
    pub fn with_rate(rate: u32) -> Self {
        let mixer = Self::default();
        mixer.log().sample_rate = rate;
        mixer
    }

    pub fn log(&self) -> MutexGuard<'_, MixerLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mix_calls(&self) -> Vec<usize> {
        self.log().mixes.clone()
    }
}

impl Mixer for CountingMixer {
    fn sample_rate(&self) -> u32 {
        self.log().sample_rate
    }

    fn set_sample_rate(&mut self, rate: u32) {
        self.log().sample_rate = rate;
    }

    fn mix(&mut self, buffer: &mut [i16], frames: usize) -> usize {
        let mut log = self.log();
        let base = log.mixes.iter().sum::<usize>();
        for (i, frame) in buffer.chunks_exact_mut(2).take(frames).enumerate() {
            let v = ((base + i) % i16::MAX as usize) as i16;
            frame[0] = v;
            frame[1] = -v;
        }
        log.mixes.push(frames);
        frames
    }
}

/// Sink that records every delivered batch. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    batches: Arc<Mutex<Vec<Vec<i16>>>>,
}

impl RecordingSink {
    /// Frame count of each delivered batch.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|b| b.len() / 2)
            .collect()
    }

    pub fn total_frames(&self) -> usize {
        self.batch_sizes().iter().sum()
    }

    pub fn batches(&self) -> Vec<Vec<i16>> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioSink for RecordingSink {
    fn deliver(&mut self, samples: &[i16], frames: usize) -> usize {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(samples[..frames * 2].to_vec());
        frames
    }
}
