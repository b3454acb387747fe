//! Audio stream: mode-gated delivery from the mixer to the host

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, info, trace};

use super::batch::SampleBatcher;
use super::metrics::DeliveryMetrics;
use super::mode::{Negotiation, PacingMode, negotiate};
use super::sample_rate::resolve_sample_rate;
use super::timing::FrameTiming;
use super::{AudioSink, MAX_SAMPLES, MIN_SAMPLES, Mixer};
use crate::environment::{AudioCallbackHandler, BufferStatusHandler, Environment};
use crate::system::SystemInfo;

/// Inputs fixed at stream start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Mode requested by the user
    pub preference: PacingMode,
    /// Value of the mixer rate option
    pub configured_rate: u32,
    pub system: SystemInfo,
}

/// Host audio buffer state, written from the host's status callback.
#[derive(Debug, Default)]
pub struct BufferStatus {
    supported: AtomicBool,
    occupancy: AtomicU32,
    underrun: AtomicBool,
    underruns: AtomicU64,
}

impl BufferStatus {
    pub fn is_supported(&self) -> bool {
        self.supported.load(Ordering::Relaxed)
    }

    pub fn occupancy(&self) -> u32 {
        self.occupancy.load(Ordering::Relaxed)
    }

    pub fn underrun_likely(&self) -> bool {
        self.underrun.load(Ordering::Relaxed)
    }

    /// Underrun reports since the last call.
    pub fn take_underruns(&self) -> u64 {
        self.underruns.swap(0, Ordering::Relaxed)
    }
}

impl BufferStatusHandler for BufferStatus {
    // Occupancy is meaningful whether or not the host driver is active.
    fn on_buffer_status(&self, _active: bool, occupancy: u32, underrun_likely: bool) {
        self.occupancy.store(occupancy, Ordering::Relaxed);
        self.underrun.store(underrun_likely, Ordering::Relaxed);
        if underrun_likely {
            self.underruns.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// State touched only while delivering.
struct StreamState<M, S> {
    mixer: M,
    sink: S,
    batcher: SampleBatcher,
    /// Interleaved stereo scratch buffer, `MAX_SAMPLES` frames
    buffer: Vec<i16>,
    /// Fractional sample frames left over by per-frame delivery
    frame_carry: f64,
    metrics: DeliveryMetrics,
}

/// One running audio stream.
///
/// Shared between the emulation thread and the host audio callback thread.
/// Mode and timing are read lock-free; mixing and delivery serialise on an
/// internal mutex.
pub struct AudioStream<M, S> {
    mode: OnceLock<Negotiation>,
    sample_rate: AtomicU32,
    timing: Arc<FrameTiming>,
    buffer_status: Arc<BufferStatus>,
    /// Host audio driver started (`set_state(true)`)
    driver_active: AtomicBool,
    /// Emulation thread launched
    emulation_started: AtomicBool,
    /// Sound system marked running
    running: AtomicBool,
    state: Mutex<StreamState<M, S>>,
}

impl<M, S> AudioStream<M, S>
where
    M: Mixer + 'static,
    S: AudioSink + 'static,
{
    /// Negotiate host capabilities, configure the mixer and start the stream.
    ///
    /// Never fails: unsupported capabilities degrade to push delivery.
    pub fn start(
        env: &dyn Environment,
        config: StreamConfig,
        timing: Arc<FrameTiming>,
        mixer: M,
        sink: S,
    ) -> Arc<Self> {
        let stream = Arc::new(Self {
            mode: OnceLock::new(),
            sample_rate: AtomicU32::new(0),
            timing,
            buffer_status: Arc::new(BufferStatus::default()),
            driver_active: AtomicBool::new(false),
            emulation_started: AtomicBool::new(false),
            running: AtomicBool::new(false),
            state: Mutex::new(StreamState {
                mixer,
                sink,
                batcher: SampleBatcher::new(),
                buffer: vec![0; MAX_SAMPLES as usize * 2],
                frame_carry: 0.0,
                metrics: DeliveryMetrics::new(),
            }),
        });

        let handler: Arc<dyn AudioCallbackHandler> = stream.clone();
        let mut negotiation = negotiate(env, config.preference, handler, &stream.timing);

        let status_handler: Arc<dyn BufferStatusHandler> = stream.buffer_status.clone();
        negotiation.buffer_status = env.set_audio_buffer_status_callback(status_handler);
        stream
            .buffer_status
            .supported
            .store(negotiation.buffer_status, Ordering::Relaxed);
        if negotiation.buffer_status {
            debug!("Registered audio buffer status callback");
        } else {
            debug!("Audio buffer status callback not supported");
        }

        // First and only initialisation of the cell.
        let _ = stream.mode.set(negotiation);

        {
            let mut state = stream.lock_state();
            let rate = resolve_sample_rate(
                state.mixer.sample_rate(),
                negotiation.mode,
                config.system,
                config.configured_rate,
                env.target_sample_rate(),
            );
            state.mixer.set_sample_rate(rate);
            stream.sample_rate.store(rate, Ordering::Relaxed);
            info!("Audio stream started: mode={}, rate={}Hz", negotiation.mode, rate);
        }

        stream.running.store(true, Ordering::Relaxed);
        stream
    }

    /// Push-mode entry point: the emulator produced `frames` sample frames.
    ///
    /// Returns the number of frames delivered by this call.
    pub fn update(&self, frames: u32) -> u32 {
        if self.mode() != PacingMode::PushSamples {
            return 0;
        }

        let mut guard = self.lock_state();
        let state = &mut *guard;
        let delivered = state.batcher.push(frames, |n| {
            mix_and_deliver(
                &mut state.mixer,
                &mut state.sink,
                &mut state.buffer,
                &mut state.metrics,
                n,
            )
        });
        self.log_metrics(state);
        delivered
    }

    /// Per-frame entry point: deliver one emulated frame's worth of audio.
    ///
    /// Fractions of a sample frame are carried between calls and batches
    /// smaller than [`MIN_SAMPLES`] wait for the next frame.
    pub fn push_audio_for_frame(&self) -> u32 {
        if self.mode() != PacingMode::SyncPerFrame || !self.is_running() {
            return 0;
        }

        let mut guard = self.lock_state();
        let state = &mut *guard;

        let exact = self.timing.samples_per_frame(self.sample_rate()) + state.frame_carry;
        let whole = exact.floor().max(0.0);
        state.frame_carry = exact - whole;

        let delivered = state.batcher.push(whole as u32, |n| {
            mix_and_deliver(
                &mut state.mixer,
                &mut state.sink,
                &mut state.buffer,
                &mut state.metrics,
                n,
            )
        });
        self.log_metrics(state);
        delivered
    }

    /// Async entry point: the host asked for audio.
    pub fn process_audio_callback(&self) -> u32 {
        if self.mode() != PacingMode::AsyncCallback {
            return 0;
        }

        let ready = self.is_driver_active() && self.is_emulation_started() && self.is_running();
        let overfull = self.buffer_status.is_supported()
            && self.buffer_status.occupancy() >= MAX_SAMPLES;

        let mut guard = self.lock_state();
        let state = &mut *guard;

        if !ready || overfull {
            trace!("Audio callback skipped (ready={}, overfull={})", ready, overfull);
            state.metrics.record_skip();
            self.log_metrics(state);
            return 0;
        }

        let due = self.timing.samples_per_frame(self.sample_rate()) as u32;
        let frames = due.clamp(MIN_SAMPLES, MAX_SAMPLES);
        mix_and_deliver(
            &mut state.mixer,
            &mut state.sink,
            &mut state.buffer,
            &mut state.metrics,
            frames,
        );
        self.log_metrics(state);
        frames
    }

    fn log_metrics(&self, state: &mut StreamState<M, S>) {
        if self.buffer_status.is_supported() {
            let underruns = self.buffer_status.take_underruns();
            state.metrics.underruns += underruns;
            state.metrics.record_occupancy(self.buffer_status.occupancy());
        }
        state.metrics.maybe_log(self.mode(), self.sample_rate());
    }
}

impl<M, S> AudioStream<M, S> {
    /// Mode in effect (push until negotiation completed).
    pub fn mode(&self) -> PacingMode {
        self.mode.get().map(|n| n.mode).unwrap_or_default()
    }

    pub fn negotiation(&self) -> Option<Negotiation> {
        self.mode.get().copied()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    pub fn timing(&self) -> &Arc<FrameTiming> {
        &self.timing
    }

    pub fn buffer_status(&self) -> &Arc<BufferStatus> {
        &self.buffer_status
    }

    /// Frames carried by the batcher.
    pub fn pending(&self) -> u32 {
        self.lock_state().batcher.pending()
    }

    pub fn is_driver_active(&self) -> bool {
        self.driver_active.load(Ordering::Relaxed)
    }

    pub fn is_emulation_started(&self) -> bool {
        self.emulation_started.load(Ordering::Relaxed)
    }

    pub fn set_emulation_started(&self, started: bool) {
        self.emulation_started.store(started, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    /// Stop delivering and drop any carried frames.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        let mut state = self.lock_state();
        state.batcher.reset();
        state.frame_carry = 0.0;
    }

    fn lock_state(&self) -> MutexGuard<'_, StreamState<M, S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M, S> AudioCallbackHandler for AudioStream<M, S>
where
    M: Mixer + 'static,
    S: AudioSink + 'static,
{
    fn on_audio_requested(&self) {
        self.process_audio_callback();
    }

    fn on_audio_state(&self, enabled: bool) {
        debug!("Host audio driver {}", if enabled { "started" } else { "stopped" });
        self.driver_active.store(enabled, Ordering::Relaxed);
    }
}

/// Mix `frames` sample frames into the scratch buffer and hand them over.
fn mix_and_deliver<M: Mixer, S: AudioSink>(
    mixer: &mut M,
    sink: &mut S,
    buffer: &mut [i16],
    metrics: &mut DeliveryMetrics,
    frames: u32,
) {
    let frames = (frames.min(MAX_SAMPLES)) as usize;
    let samples = &mut buffer[..frames * 2];

    let produced = mixer.mix(samples, frames).min(frames);
    samples[produced * 2..].fill(0);

    let accepted = sink.deliver(samples, frames);
    metrics.record_batch(frames, accepted);
}
