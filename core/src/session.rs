//! Per-run core context
//!
//! [`CoreSession`] owns everything the wrapper keeps between `retro_load_game`
//! and `retro_unload_game`: the option cache, frame timing, the throttle and
//! the audio stream. The host loop calls [`CoreSession::begin_frame`] before
//! running the emulator for one frame and [`CoreSession::end_frame`] after.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::audio::{AudioSink, AudioStream, FrameThrottle, FrameTiming, Mixer, StreamConfig};
use crate::av_info::{SystemAvInfo, VideoParams};
use crate::config::CoreConfig;
use crate::environment::Environment;
use crate::logging::{LogLevel, LogLevelHandle};
use crate::options::{OptionCache, keys};
use crate::settings::{self, Settings};
use crate::system::SystemInfo;

const VIDEO_LISTENER: &str = "video";
const INPUT_LISTENER: &str = "input";
const LOGGING_LISTENER: &str = "logging";

const VIDEO_KEYS: &[&str] = &[keys::gfx_settings::EFB_SCALE, keys::gfx_settings::CROP_OVERSCAN];

/// Changes that require the controllers to be reconfigured.
const CONTROLLER_KEYS: &[&str] = &[
    keys::wiimote::IR_MODE,
    keys::wiimote::IR_OFFSET,
    keys::wiimote::IR_YAW,
    keys::wiimote::IR_PITCH,
    keys::sysconf::ENABLE_RUMBLE,
];

/// What changed at the start of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameEvents {
    /// Options whose value changed this frame
    pub options_changed: usize,
    pub fast_forwarding: bool,
    /// New log level, if the option changed
    pub log_level: Option<LogLevel>,
    /// AV info pushed with `SET_SYSTEM_AV_INFO`
    pub av_info: Option<SystemAvInfo>,
    /// AV info pushed with `SET_GEOMETRY`
    pub geometry: Option<SystemAvInfo>,
    /// Controller options changed; the emulator should reset its controllers
    pub reset_controllers: bool,
    /// New Wiimote continuous scanning value, if it changed
    pub continuous_scanning: Option<bool>,
}

pub struct CoreSession<M, S> {
    env: Arc<dyn Environment>,
    config: CoreConfig,
    options: OptionCache,
    settings: Settings,
    system: SystemInfo,
    timing: Arc<FrameTiming>,
    throttle: FrameThrottle,
    audio: Arc<AudioStream<M, S>>,
    log_level: Option<LogLevelHandle>,
    widescreen: bool,
    fast_forwarding: bool,
}

impl<M, S> CoreSession<M, S>
where
    M: Mixer + 'static,
    S: AudioSink + 'static,
{
    /// Publish options, read them and start audio.
    ///
    /// `config` is normally the result of [`crate::config::load`]; its option
    /// overrides replace built-in defaults before the host values are read.
    pub fn start(
        env: Arc<dyn Environment>,
        config: CoreConfig,
        system: SystemInfo,
        mixer: M,
        sink: S,
    ) -> Self {
        OptionCache::publish(env.as_ref());

        let mut options = OptionCache::from_definitions(env.as_ref(), &config.options);
        options.subscribe(VIDEO_LISTENER, VIDEO_KEYS);
        options.subscribe(INPUT_LISTENER, CONTROLLER_KEYS);
        options.subscribe(INPUT_LISTENER, &[keys::sysconf::WIIMOTE_CONTINUOUS_SCANNING]);
        options.subscribe(LOGGING_LISTENER, &[keys::interface::LOG_LEVEL]);

        let settings = Settings::read(&options);
        let timing = Arc::new(FrameTiming::new(system.region));
        let audio = AudioStream::start(
            env.as_ref(),
            StreamConfig {
                preference: settings.audio_method,
                configured_rate: settings.mixer_rate,
                system,
            },
            timing.clone(),
            mixer,
            sink,
        );
        audio.set_emulation_started(true);

        let widescreen = settings.widescreen_hack || (system.is_wii() && settings.widescreen);
        let throttle = FrameThrottle::new(config.pacing.spin_window());

        info!(
            "Session started: {:?} {:?}, efb_scale={}, audio={}",
            system.kind,
            system.region,
            settings.efb_scale,
            audio.mode()
        );

        Self {
            env,
            config,
            options,
            settings,
            system,
            timing,
            throttle,
            audio,
            log_level: None,
            widescreen,
            fast_forwarding: false,
        }
    }

    /// Attach the runtime log filter and apply the configured level.
    pub fn attach_log_level(&mut self, handle: LogLevelHandle) {
        handle.set(self.settings.log_level);
        self.log_level = Some(handle);
    }

    /// Pre-frame housekeeping.
    ///
    /// `game_widescreen` is the aspect the emulator currently renders, if it
    /// reports one.
    pub fn begin_frame(&mut self, game_widescreen: Option<bool>) -> FrameEvents {
        let mut events = FrameEvents {
            options_changed: self.options.poll_for_changes(self.env.as_ref()),
            ..FrameEvents::default()
        };
        if events.options_changed > 0 {
            self.settings = Settings::read(&self.options);
        }

        self.fast_forwarding = self.env.fast_forwarding().unwrap_or(false);
        events.fast_forwarding = self.fast_forwarding;

        if self
            .options
            .is_updated_for(LOGGING_LISTENER, keys::interface::LOG_LEVEL)
        {
            let level = settings::log_level(&self.options);
            if let Some(handle) = &self.log_level {
                handle.set(level);
            }
            events.log_level = Some(level);
        }

        if self.options.any_updated_for(VIDEO_LISTENER, VIDEO_KEYS) {
            let info = self.av_info();
            if self.env.set_system_av_info(&info) {
                debug!(
                    "AV info updated: {}x{}",
                    info.geometry.base_width, info.geometry.base_height
                );
            }
            events.av_info = Some(info);
        }

        if let Some(widescreen) = game_widescreen
            && widescreen != self.widescreen
        {
            self.widescreen = widescreen;
            let info = self.av_info();
            self.env.set_geometry(&info);
            debug!("Aspect ratio changed to {}", info.geometry.aspect_ratio);
            events.geometry = Some(info);
        }

        events.reset_controllers = self.options.any_updated_for(INPUT_LISTENER, CONTROLLER_KEYS);
        if self
            .options
            .is_updated_for(INPUT_LISTENER, keys::sysconf::WIIMOTE_CONTINUOUS_SCANNING)
        {
            events.continuous_scanning = Some(self.settings.wiimote_continuous_scanning);
        }

        events
    }

    /// Post-frame delivery and pacing.
    ///
    /// Returns how long the throttle waited.
    pub fn end_frame(&mut self) -> Duration {
        self.audio.push_audio_for_frame();

        if self.should_throttle() {
            self.throttle.throttle(self.timing.target_duration())
        } else {
            Duration::ZERO
        }
    }

    /// Current AV info from options, region and the active sample rate.
    pub fn av_info(&self) -> SystemAvInfo {
        SystemAvInfo::compute(&VideoParams {
            efb_scale: self.settings.efb_scale,
            crop_overscan: self.settings.crop_overscan,
            widescreen: self.widescreen,
            region: self.system.region,
            sample_rate: self.audio.sample_rate(),
        })
    }

    /// Stop audio and forget throttle history (`retro_unload_game`).
    pub fn shutdown(&mut self) {
        self.audio.set_emulation_started(false);
        self.audio.stop();
        self.throttle.reset();
        info!("Session stopped");
    }
}

impl<M, S> CoreSession<M, S> {
    fn should_throttle(&self) -> bool {
        self.settings.precision_frame_timing && self.timing.has_callback() && !self.fast_forwarding
    }

    pub fn options(&self) -> &OptionCache {
        &self.options
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn system(&self) -> SystemInfo {
        self.system
    }

    pub fn audio(&self) -> &Arc<AudioStream<M, S>> {
        &self.audio
    }

    pub fn timing(&self) -> &Arc<FrameTiming> {
        &self.timing
    }

    pub fn is_widescreen(&self) -> bool {
        self.widescreen
    }

    pub fn is_fast_forwarding(&self) -> bool {
        self.fast_forwarding
    }
}
