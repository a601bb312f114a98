//! Fixed-capacity telemetry buffer with nearest-time lookup.
//!
//! Samples are kept in arrival order and never re-sorted; once full, each
//! push overwrites the oldest sample.

use std::fmt;

use contracts::Timestamped;
use ringbuf::{traits::*, HeapRb};

/// Per-stream FIFO buffer
pub struct SampleBuffer<T> {
    samples: HeapRb<T>,
    capacity: usize,
    evicted: u64,
    out_of_order: u64,
    last_timestamp: Option<f64>,
}

impl<T> fmt::Debug for SampleBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("len", &self.samples.occupied_len())
            .field("capacity", &self.capacity)
            .field("evicted", &self.evicted)
            .finish()
    }
}

impl<T: Timestamped> SampleBuffer<T> {
    /// Create a buffer holding at most `capacity` samples (minimum 1)
    #[inline]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: HeapRb::new(capacity),
            capacity,
            evicted: 0,
            out_of_order: 0,
            last_timestamp: None,
        }
    }

    /// Append a sample, returning the evicted oldest one if the buffer was full
    #[inline]
    pub fn push(&mut self, sample: T) -> Option<T> {
        let timestamp = sample.timestamp();

        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                self.out_of_order += 1;
            }
        }
        self.last_timestamp = Some(timestamp);

        let evicted = if self.samples.is_full() {
            self.evicted += 1;
            self.samples.try_pop()
        } else {
            None
        };

        // Cannot fail: a slot was freed above when the buffer was full
        let _ = self.samples.try_push(sample);
        evicted
    }

    /// Sample minimizing `|t - target|`; ties go to the earliest inserted
    #[inline]
    pub fn nearest(&self, target: f64) -> Option<&T> {
        self.samples.iter().min_by(|a, b| {
            let da = (a.timestamp() - target).abs();
            let db = (b.timestamp() - target).abs();
            da.total_cmp(&db)
        })
    }

    /// Most recently inserted sample
    #[inline]
    pub fn latest(&self) -> Option<&T> {
        self.samples.iter().last()
    }

    /// Samples in insertion order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples dropped by FIFO eviction
    #[inline]
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }

    /// Samples that arrived with a timestamp earlier than their predecessor
    #[inline]
    pub fn out_of_order_count(&self) -> u64 {
        self.out_of_order
    }
}
