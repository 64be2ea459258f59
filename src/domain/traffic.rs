use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::DetectError;

// ============================================================================
// TrafficSeries: per-bucket packet counts over a capture's time range
// ============================================================================

/// A regular count series derived from raw capture timestamps.
///
/// Buckets are contiguous and fixed-width. Buckets with no packets are
/// present with count zero, so indices map 1:1 onto wall-clock offsets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrafficSeries {
    /// Start of the first bucket, in whole seconds since epoch
    pub start_sec: i64,
    /// Bucket width in seconds
    pub bucket_width_secs: u64,
    /// One count per bucket, no gaps
    pub counts: Vec<u64>,
}

impl TrafficSeries {
    /// Resample raw capture timestamps (seconds since epoch) into a
    /// contiguous count series spanning the capture's full time range.
    ///
    /// The span is computed from the earliest and latest timestamp, so a
    /// capture whose packets are slightly out of file order still
    /// aggregates correctly.
    pub fn from_timestamps(timestamps: &[f64], bucket_width_secs: u64) -> Result<Self, DetectError> {
        if bucket_width_secs == 0 {
            return Err(DetectError::InvalidParameter {
                name: "bucket_width_secs",
                reason: "bucket width must be at least one second".to_string(),
            });
        }
        if timestamps.is_empty() {
            return Err(DetectError::EmptyCapture);
        }
        if timestamps.iter().any(|ts| !ts.is_finite()) {
            return Err(DetectError::InvalidData);
        }

        let width = bucket_width_secs as i64;
        let bucket_of = |ts: f64| (ts.floor() as i64).div_euclid(width);

        let mut min_bucket = i64::MAX;
        let mut max_bucket = i64::MIN;
        for &ts in timestamps {
            let bucket = bucket_of(ts);
            min_bucket = min_bucket.min(bucket);
            max_bucket = max_bucket.max(bucket);
        }

        let n_buckets = (max_bucket - min_bucket + 1) as usize;
        let mut counts = vec![0u64; n_buckets];
        for &ts in timestamps {
            counts[(bucket_of(ts) - min_bucket) as usize] += 1;
        }

        Ok(TrafficSeries {
            start_sec: min_bucket * width,
            bucket_width_secs,
            counts,
        })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Start of bucket `idx`, in whole seconds since epoch
    pub fn bucket_start_sec(&self, idx: usize) -> i64 {
        self.start_sec + idx as i64 * self.bucket_width_secs as i64
    }

    /// Start of the capture's first bucket as a UTC datetime
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_sec, 0)
    }

    /// Counts as floats, for model fitting
    pub fn counts_f64(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }
}
