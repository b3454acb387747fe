//! Sample batching for pushed audio

use super::{MAX_SAMPLES, MIN_SAMPLES};

/// Accumulates produced-but-undelivered sample frames.
///
/// Each push delivers as many full [`MAX_SAMPLES`] batches as are pending,
/// then flushes the remainder if it reached [`MIN_SAMPLES`]. Anything smaller
/// is carried to the next push, so `pending() < MIN_SAMPLES` after every call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleBatcher {
    pending: u32,
}

impl SampleBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames carried over from previous pushes.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    /// Add `frames` and invoke `deliver` once per batch that is due.
    ///
    /// Returns the total number of frames handed to `deliver`.
    pub fn push(&mut self, frames: u32, mut deliver: impl FnMut(u32)) -> u32 {
        self.pending = self.pending.saturating_add(frames);
        let mut delivered = 0;

        while self.pending >= MAX_SAMPLES {
            deliver(MAX_SAMPLES);
            self.pending -= MAX_SAMPLES;
            delivered += MAX_SAMPLES;
        }

        if self.pending >= MIN_SAMPLES {
            deliver(self.pending);
            delivered += self.pending;
            self.pending = 0;
        }

        delivered
    }

    /// Drop carried frames (stream restart).
    pub fn reset(&mut self) {
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(batcher: &mut SampleBatcher, frames: u32) -> Vec<u32> {
        let mut batches = Vec::new();
        batcher.push(frames, |n| batches.push(n));
        batches
    }

    #[test]
    fn test_large_push_splits_and_carries() {
        let mut batcher = SampleBatcher::new();
        assert_eq!(push(&mut batcher, 600), vec![512]);
        assert_eq!(batcher.pending(), 88);

        assert_eq!(push(&mut batcher, 10), vec![98]);
        assert_eq!(batcher.pending(), 0);
    }

    #[test]
    fn test_small_pushes_accumulate() {
        let mut batcher = SampleBatcher::new();
        assert!(push(&mut batcher, 50).is_empty());
        assert!(push(&mut batcher, 45).is_empty());
        assert_eq!(batcher.pending(), 95);
        assert_eq!(push(&mut batcher, 1), vec![96]);
    }

    #[test]
    fn test_exact_multiple_of_max() {
        let mut batcher = SampleBatcher::new();
        assert_eq!(push(&mut batcher, 1024), vec![512, 512]);
        assert_eq!(batcher.pending(), 0);
    }

    #[test]
    fn test_zero_push_is_noop() {
        let mut batcher = SampleBatcher::new();
        assert!(push(&mut batcher, 0).is_empty());
        assert_eq!(batcher.pending(), 0);
    }

    #[test]
    fn test_conservation_over_sequence() {
        let mut batcher = SampleBatcher::new();
        let inputs = [0, 1, 95, 96, 97, 511, 512, 513, 1500, 3, 7, 2048, 40];
        let mut total_in = 0;
        let mut total_out = 0;

        for n in inputs {
            total_in += n;
            let mut out = 0;
            let delivered = batcher.push(n, |batch| {
                assert!((MIN_SAMPLES..=MAX_SAMPLES).contains(&batch));
                out += batch;
            });
            assert_eq!(delivered, out);
            total_out += out;
            assert!(batcher.pending() < MIN_SAMPLES);
        }

        assert_eq!(total_out, total_in - batcher.pending());
    }
}
