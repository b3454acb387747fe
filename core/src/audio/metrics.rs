//! Delivery health monitoring

use std::time::{Duration, Instant};

use tracing::debug;

use super::PacingMode;

const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Per-interval delivery counters, logged at `debug` once per second.
#[derive(Debug, Clone)]
pub struct DeliveryMetrics {
    /// Batches handed to the host
    pub batches: u64,
    /// Sample frames handed to the host
    pub frames_delivered: u64,
    /// Sample frames the host reported as accepted
    pub frames_accepted: u64,
    /// Async callbacks that delivered nothing
    pub skipped_callbacks: u64,
    /// Buffer status reports with the underrun flag set, folded in by the stream
    pub underruns: u64,
    /// Highest host buffer occupancy seen this interval
    pub occupancy_max: u32,
    last_log_time: Instant,
}

impl Default for DeliveryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryMetrics {
    pub fn new() -> Self {
        Self {
            batches: 0,
            frames_delivered: 0,
            frames_accepted: 0,
            skipped_callbacks: 0,
            underruns: 0,
            occupancy_max: 0,
            last_log_time: Instant::now(),
        }
    }

    pub fn record_batch(&mut self, frames: usize, accepted: usize) {
        self.batches += 1;
        self.frames_delivered += frames as u64;
        self.frames_accepted += accepted as u64;
    }

    pub fn record_skip(&mut self) {
        self.skipped_callbacks += 1;
    }

    pub fn record_occupancy(&mut self, occupancy: u32) {
        self.occupancy_max = self.occupancy_max.max(occupancy);
    }

    /// Log and reset the counters if the interval elapsed.
    pub fn maybe_log(&mut self, mode: PacingMode, sample_rate: u32) {
        if self.last_log_time.elapsed() < LOG_INTERVAL {
            return;
        }

        debug!(
            "AUDIO [{}@{}Hz]: batches={}, frames={}, accepted={}, skipped={}, underruns={}, occ_max={}",
            mode,
            sample_rate,
            self.batches,
            self.frames_delivered,
            self.frames_accepted,
            self.skipped_callbacks,
            self.underruns,
            self.occupancy_max,
        );

        *self = Self::new();
    }
}
