//! Frame timing negotiation and throttling

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::environment::{Environment, FrameTimeHandler};
use crate::system::Region;

/// Refresh rate assumed when the host reports none (or nonsense).
pub const DEFAULT_REFRESH_RATE: f64 = 60.0;

/// Default window spent spin-waiting at the end of a throttle.
pub const DEFAULT_SPIN_WINDOW: Duration = Duration::from_micros(500);

/// Expected frame duration in microseconds for a host refresh rate.
///
/// Rates below 1 Hz, non-finite rates and a missing rate all resolve to
/// [`DEFAULT_REFRESH_RATE`].
pub fn target_frame_duration(refresh_rate: Option<f32>) -> i64 {
    let rate = refresh_rate
        .map(f64::from)
        .filter(|rate| rate.is_finite() && *rate >= 1.0)
        .unwrap_or(DEFAULT_REFRESH_RATE);
    (1_000_000.0 / rate).round() as i64
}

/// Host-declared and host-measured frame cadence.
///
/// `measured` is written from the host's frame-time callback, possibly on
/// another thread. Fields are independent relaxed atomics.
#[derive(Debug)]
pub struct FrameTiming {
    /// Expected frame duration (µs), set at negotiation
    target_usec: AtomicI64,
    /// Last duration reported by the host (µs)
    measured_usec: AtomicI64,
    /// Whether the host accepted the frame-time callback
    has_callback: AtomicBool,
    /// Fallback divisor source when no callback exists
    region: Region,
}

impl FrameTiming {
    pub fn new(region: Region) -> Self {
        let target = target_frame_duration(None);
        Self {
            target_usec: AtomicI64::new(target),
            measured_usec: AtomicI64::new(target),
            has_callback: AtomicBool::new(false),
            region,
        }
    }

    /// Query the host refresh rate and register for measured frame times.
    ///
    /// Returns whether the host accepted the callback.
    pub fn negotiate(self: &Arc<Self>, env: &dyn Environment) -> bool {
        let refresh_rate = env.target_refresh_rate();
        let target = target_frame_duration(refresh_rate);
        self.target_usec.store(target, Ordering::Relaxed);
        self.measured_usec.store(target, Ordering::Relaxed);

        let handler: Arc<dyn FrameTimeHandler> = self.clone();
        let accepted = env.set_frame_time_callback(target, handler);
        self.has_callback.store(accepted, Ordering::Relaxed);

        if accepted {
            debug!(
                "Frame time callback registered (refresh={:?}, reference={}µs)",
                refresh_rate, target
            );
        } else {
            debug!("Frame time callback not supported, using fixed region timing");
        }
        accepted
    }

    pub fn target_usec(&self) -> i64 {
        self.target_usec.load(Ordering::Relaxed)
    }

    pub fn measured_usec(&self) -> i64 {
        self.measured_usec.load(Ordering::Relaxed)
    }

    pub fn has_callback(&self) -> bool {
        self.has_callback.load(Ordering::Relaxed)
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Duration of one frame in microseconds.
    ///
    /// With a negotiated callback this is the last measured duration (or the
    /// target before the first measurement). Without one it is the fixed
    /// 60 Hz / 50 Hz region divisor.
    pub fn frame_duration_usec(&self) -> i64 {
        if self.has_callback() {
            let measured = self.measured_usec();
            if measured > 0 {
                measured
            } else {
                self.target_usec()
            }
        } else {
            (1_000_000.0 / self.region.nominal_refresh_rate()).round() as i64
        }
    }

    /// Sample frames covering one frame at `sample_rate`, before clamping.
    pub fn samples_per_frame(&self, sample_rate: u32) -> f64 {
        self.frame_duration_usec() as f64 * f64::from(sample_rate) / 1_000_000.0
    }

    /// Target duration as a [`Duration`], for the throttle.
    pub fn target_duration(&self) -> Duration {
        Duration::from_micros(self.target_usec().max(0) as u64)
    }
}

impl FrameTimeHandler for FrameTiming {
    fn on_frame_time(&self, usec: i64) {
        // Hosts report 0 on pause/resume; keep the last real measurement.
        if usec > 0 {
            self.measured_usec.store(usec, Ordering::Relaxed);
        }
    }
}

/// Coarse-sleep-then-spin frame limiter.
///
/// OS sleep granularity is too coarse for sub-millisecond pacing, so the last
/// `spin_window` of each wait is spent in a spin loop.
#[derive(Debug)]
pub struct FrameThrottle {
    last_frame: Option<Instant>,
    spin_window: Duration,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_SPIN_WINDOW)
    }
}

impl FrameThrottle {
    pub fn new(spin_window: Duration) -> Self {
        Self {
            last_frame: None,
            spin_window,
        }
    }

    pub fn spin_window(&self) -> Duration {
        self.spin_window
    }

    /// Block until `target` has elapsed since the previous call.
    ///
    /// The first call only records the time. Returns how long this call
    /// waited.
    pub fn throttle(&mut self, target: Duration) -> Duration {
        let start = Instant::now();
        if let Some(last) = self.last_frame {
            let deadline = last + target;
            if start < deadline {
                let remaining = deadline - start;
                if remaining > self.spin_window {
                    std::thread::sleep(remaining - self.spin_window);
                }
                while Instant::now() < deadline {
                    std::hint::spin_loop();
                }
            }
        }

        let now = Instant::now();
        self.last_frame = Some(now);
        let waited = now - start;
        trace!("Frame throttle waited {:?}", waited);
        waited
    }

    /// Forget the previous frame so the next call does not wait.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    pub fn last_frame(&self) -> Option<Instant> {
        self.last_frame
    }
}
