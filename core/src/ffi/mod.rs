//! libretro ABI adapters
//!
//! [`RetroEnvironment`] implements [`Environment`] over the raw environment
//! callback the frontend hands to `retro_set_environment`. [`RetroLogger`] and
//! [`RetroAudioSink`] wrap the log and audio batch callbacks.
//!
//! # Callback trampolines
//!
//! libretro callbacks carry no user data pointer, so registered handlers are
//! kept in process-wide slots and reached through `extern "C"` trampolines.
//! Registering a handler replaces the previous one of the same kind.


use std::ffi::{CStr, CString, c_char, c_uint, c_void};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

pub use rust_libretro_sys as sys;
use tracing::warn;

use crate::audio::AudioSink;
use crate::av_info::SystemAvInfo;
use crate::environment::{
    AudioCallbackHandler, BufferStatusHandler, Environment, FrameTimeHandler,
};
use crate::logging::{HostLogger, LogLevel};
use crate::options::OptionDefinition;

static AUDIO_HANDLER: RwLock<Option<Arc<dyn AudioCallbackHandler>>> = RwLock::new(None);
static FRAME_TIME_HANDLER: RwLock<Option<Arc<dyn FrameTimeHandler>>> = RwLock::new(None);
static BUFFER_STATUS_HANDLER: RwLock<Option<Arc<dyn BufferStatusHandler>>> = RwLock::new(None);

fn load_handler<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn store_handler<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>, handler: Option<Arc<T>>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = handler;
}

unsafe extern "C" fn audio_callback_trampoline() {
    if let Some(handler) = load_handler(&AUDIO_HANDLER) {
        handler.on_audio_requested();
    }
}

unsafe extern "C" fn audio_set_state_trampoline(enabled: bool) {
    if let Some(handler) = load_handler(&AUDIO_HANDLER) {
        handler.on_audio_state(enabled);
    }
}

unsafe extern "C" fn frame_time_trampoline(usec: sys::retro_usec_t) {
    if let Some(handler) = load_handler(&FRAME_TIME_HANDLER) {
        handler.on_frame_time(usec);
    }
}

unsafe extern "C" fn buffer_status_trampoline(
    active: bool,
    occupancy: c_uint,
    underrun_likely: bool,
) {
    if let Some(handler) = load_handler(&BUFFER_STATUS_HANDLER) {
        handler.on_buffer_status(active, occupancy, underrun_likely);
    }
}

/// Drop every registered handler (`retro_deinit`).
pub fn clear_handlers() {
    store_handler(&AUDIO_HANDLER, None);
    store_handler(&FRAME_TIME_HANDLER, None);
    store_handler(&BUFFER_STATUS_HANDLER, None);
}

/// [`Environment`] over a frontend's `retro_environment_t`.
#[derive(Debug, Clone, Copy)]
pub struct RetroEnvironment {
    callback: unsafe extern "C" fn(cmd: c_uint, data: *mut c_void) -> bool,
}

impl RetroEnvironment {
    /// Wrap the callback passed to `retro_set_environment`. `None` if null.
    pub fn new(callback: sys::retro_environment_t) -> Option<Self> {
        callback.map(|callback| Self { callback })
    }

    /// Issue one environment command.
    ///
    /// # Safety
    ///
    /// `T` must be the type the frontend expects for `cmd`.
    unsafe fn call<T>(&self, cmd: c_uint, data: &mut T) -> bool {
        unsafe { (self.callback)(cmd, (data as *mut T).cast::<c_void>()) }
    }

    /// Query the frontend's log interface.
    pub fn log_interface(&self) -> Option<RetroLogger> {
        let mut log = sys::retro_log_callback { log: None };
        // SAFETY: GET_LOG_INTERFACE fills a `retro_log_callback`.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_GET_LOG_INTERFACE, &mut log) };
        if !ok {
            return None;
        }
        log.log.map(|printf| RetroLogger { printf })
    }
}

impl Environment for RetroEnvironment {
    fn get_variable(&self, key: &str) -> Option<String> {
        let key = CString::new(key).ok()?;
        let mut variable = sys::retro_variable {
            key: key.as_ptr(),
            value: std::ptr::null(),
        };
        // SAFETY: GET_VARIABLE takes a `retro_variable` whose key outlives the call.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_GET_VARIABLE, &mut variable) };
        if !ok || variable.value.is_null() {
            return None;
        }
        // SAFETY: the frontend returned a NUL-terminated string valid until the
        // next environment call; it is copied immediately.
        let value = unsafe { CStr::from_ptr(variable.value) };
        Some(value.to_string_lossy().into_owned())
    }

    fn variables_updated(&self) -> Option<bool> {
        let mut updated = false;
        // SAFETY: GET_VARIABLE_UPDATE writes a `bool`.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_GET_VARIABLE_UPDATE, &mut updated) };
        ok.then_some(updated)
    }

    fn set_variables(&self, definitions: &[OptionDefinition]) -> bool {
        let mut strings = Vec::with_capacity(definitions.len());
        for def in definitions {
            match (CString::new(def.key), CString::new(def.variable_string())) {
                (Ok(key), Ok(value)) => strings.push((key, value)),
                _ => warn!("Option '{}' contains a NUL byte, not published", def.key),
            }
        }

        let mut variables: Vec<sys::retro_variable> = strings
            .iter()
            .map(|(key, value)| sys::retro_variable {
                key: key.as_ptr(),
                value: value.as_ptr(),
            })
            .collect();
        variables.push(sys::retro_variable {
            key: std::ptr::null(),
            value: std::ptr::null(),
        });

        // SAFETY: SET_VARIABLES takes a NULL-terminated `retro_variable` array;
        // `strings` keeps every pointer alive for the duration of the call.
        unsafe {
            (self.callback)(
                sys::RETRO_ENVIRONMENT_SET_VARIABLES,
                variables.as_mut_ptr().cast::<c_void>(),
            )
        }
    }

    fn target_refresh_rate(&self) -> Option<f32> {
        let mut rate = 0.0_f32;
        // SAFETY: GET_TARGET_REFRESH_RATE writes a `float`.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_GET_TARGET_REFRESH_RATE, &mut rate) };
        ok.then_some(rate)
    }

    // libretro.h (through GET_SAVESTATE_CONTEXT, id 72) has no output rate
    // query; the frontend resamples whatever rate the AV info reports.
    fn target_sample_rate(&self) -> Option<u32> {
        None
    }

    fn fast_forwarding(&self) -> Option<bool> {
        let mut fast_forwarding = false;
        // SAFETY: GET_FASTFORWARDING writes a `bool`.
        let ok = unsafe {
            self.call(sys::RETRO_ENVIRONMENT_GET_FASTFORWARDING, &mut fast_forwarding)
        };
        ok.then_some(fast_forwarding)
    }

    fn system_directory(&self) -> Option<PathBuf> {
        let mut dir: *const c_char = std::ptr::null();
        // SAFETY: GET_SYSTEM_DIRECTORY writes a `const char *`.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_GET_SYSTEM_DIRECTORY, &mut dir) };
        if !ok || dir.is_null() {
            return None;
        }
        // SAFETY: non-null NUL-terminated path owned by the frontend.
        let dir = unsafe { CStr::from_ptr(dir) };
        Some(PathBuf::from(dir.to_string_lossy().into_owned()))
    }

    fn set_audio_callback(&self, handler: Arc<dyn AudioCallbackHandler>) -> bool {
        store_handler(&AUDIO_HANDLER, Some(handler));
        let mut callback = sys::retro_audio_callback {
            callback: Some(audio_callback_trampoline),
            set_state: Some(audio_set_state_trampoline),
        };
        // SAFETY: SET_AUDIO_CALLBACK reads a `retro_audio_callback`.
        let ok = unsafe { self.call(sys::RETRO_ENVIRONMENT_SET_AUDIO_CALLBACK, &mut callback) };
        if !ok {
            store_handler(&AUDIO_HANDLER, None);
        }
        ok
    }

    fn set_frame_time_callback(
        &self,
        reference_usec: i64,
        handler: Arc<dyn FrameTimeHandler>,
    ) -> bool {
        store_handler(&FRAME_TIME_HANDLER, Some(handler));
        let mut callback = sys::retro_frame_time_callback {
            callback: Some(frame_time_trampoline),
            reference: reference_usec,
        };
        // SAFETY: SET_FRAME_TIME_CALLBACK reads a `retro_frame_time_callback`.
        let ok =
            unsafe { self.call(sys::RETRO_ENVIRONMENT_SET_FRAME_TIME_CALLBACK, &mut callback) };
        if !ok {
            store_handler(&FRAME_TIME_HANDLER, None);
        }
        ok
    }

    fn set_audio_buffer_status_callback(&self, handler: Arc<dyn BufferStatusHandler>) -> bool {
        store_handler(&BUFFER_STATUS_HANDLER, Some(handler));
        let mut callback = sys::retro_audio_buffer_status_callback {
            callback: Some(buffer_status_trampoline),
        };
        // SAFETY: SET_AUDIO_BUFFER_STATUS_CALLBACK reads a
        // `retro_audio_buffer_status_callback`.
        let ok = unsafe {
            self.call(
                sys::RETRO_ENVIRONMENT_SET_AUDIO_BUFFER_STATUS_CALLBACK,
                &mut callback,
            )
        };
        if !ok {
            store_handler(&BUFFER_STATUS_HANDLER, None);
        }
        ok
    }

    fn set_system_av_info(&self, info: &SystemAvInfo) -> bool {
        let mut info = to_raw_av_info(info);
        // SAFETY: SET_SYSTEM_AV_INFO reads a `retro_system_av_info`.
        unsafe { self.call(sys::RETRO_ENVIRONMENT_SET_SYSTEM_AV_INFO, &mut info) }
    }

    fn set_geometry(&self, info: &SystemAvInfo) -> bool {
        let mut geometry = to_raw_av_info(info).geometry;
        // SAFETY: SET_GEOMETRY reads a `retro_game_geometry`.
        unsafe { self.call(sys::RETRO_ENVIRONMENT_SET_GEOMETRY, &mut geometry) }
    }
}

/// Convert to the C layout for `retro_get_system_av_info`.
pub fn to_raw_av_info(info: &SystemAvInfo) -> sys::retro_system_av_info {
    sys::retro_system_av_info {
        geometry: sys::retro_game_geometry {
            base_width: info.geometry.base_width,
            base_height: info.geometry.base_height,
            max_width: info.geometry.max_width,
            max_height: info.geometry.max_height,
            aspect_ratio: info.geometry.aspect_ratio,
        },
        timing: sys::retro_system_timing {
            fps: info.timing.fps,
            sample_rate: info.timing.sample_rate,
        },
    }
}

/// [`HostLogger`] over the frontend's `retro_log_printf_t`.
#[derive(Clone, Copy)]
pub struct RetroLogger {
    printf: unsafe extern "C" fn(sys::retro_log_level, *const c_char, ...),
}

impl RetroLogger {
    fn level(level: LogLevel) -> sys::retro_log_level {
        match level {
            LogLevel::Debug => sys::retro_log_level::RETRO_LOG_DEBUG,
            LogLevel::Info => sys::retro_log_level::RETRO_LOG_INFO,
            LogLevel::Warn => sys::retro_log_level::RETRO_LOG_WARN,
            LogLevel::Error => sys::retro_log_level::RETRO_LOG_ERROR,
        }
    }
}

impl HostLogger for RetroLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let Ok(message) = CString::new(message.replace('\0', "")) else {
            return;
        };
        // SAFETY: the message goes through "%s" so the frontend never
        // interprets it as a format string.
        unsafe { (self.printf)(Self::level(level), c"%s\n".as_ptr(), message.as_ptr()) };
    }
}

/// [`AudioSink`] over the frontend's `retro_audio_sample_batch_t`.
#[derive(Debug, Clone, Copy)]
pub struct RetroAudioSink {
    batch: unsafe extern "C" fn(data: *const i16, frames: usize) -> usize,
}

impl RetroAudioSink {
    /// Wrap the callback passed to `retro_set_audio_sample_batch`. `None` if null.
    pub fn new(batch: sys::retro_audio_sample_batch_t) -> Option<Self> {
        batch.map(|batch| Self { batch })
    }
}

impl AudioSink for RetroAudioSink {
    fn deliver(&mut self, samples: &[i16], frames: usize) -> usize {
        let frames = frames.min(samples.len() / 2);
        // SAFETY: `samples` holds at least `frames` interleaved stereo frames.
        unsafe { (self.batch)(samples.as_ptr(), frames) }
    }
}
