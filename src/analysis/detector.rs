//! The detection pipeline: aggregate capture timestamps into a traffic
//! series, fit the forecasting model, score one-step prediction errors
//! against a global residual threshold.

use itertools::{Itertools, izip};
use statrs::statistics::Statistics;

use crate::analysis::arima::Arima;
use crate::analysis::error::DetectError;
use crate::config::AnalysisConfig;
use crate::domain::TrafficSeries;

/// Everything one detection run produces.
///
/// The three series share length and bucket index, and none of them is
/// mutated after the run: the UI (or any other consumer) only reads.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Observed per-bucket packet counts
    pub traffic: TrafficSeries,
    /// One-step model prediction per bucket
    pub predicted: Vec<f64>,
    /// True where |observed - predicted| exceeded the threshold
    pub anomalies: Vec<bool>,
    /// Mean squared prediction error over the whole series
    pub mse: f64,
    /// Absolute deviation above which a bucket is flagged
    pub threshold: f64,
}

impl DetectionReport {
    pub fn anomaly_count(&self) -> usize {
        self.anomalies.iter().filter(|&&flag| flag).count()
    }

    /// Bucket indices of all flagged anomalies
    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.anomalies.iter().positions(|&flag| flag).collect()
    }
}

/// Run the full detector over raw capture timestamps.
///
/// Steps: resample into fixed-width count buckets, fit the
/// (ar_lags, differencing, 0) model, take one-step non-dynamic
/// predictions over the whole series, compute a single global mse, and
/// flag every bucket whose absolute deviation exceeds
/// `anomaly_multiplier * sqrt(mse)`.
///
/// The mse is deliberately global rather than rolling; a local error
/// estimate would change which buckets get flagged in non-stationary
/// traffic, and this detector reproduces the global behavior.
pub fn detect_anomalies(
    timestamps: &[f64],
    config: &AnalysisConfig,
) -> Result<DetectionReport, DetectError> {
    let traffic = TrafficSeries::from_timestamps(timestamps, config.bucket_width_secs)?;
    let observed = traffic.counts_f64();

    let mut model = Arima::new(config.ar_lags, config.differencing)?;
    model.fit(&observed)?;
    let predicted = model.predict_in_sample()?;
    debug_assert_eq!(predicted.len(), observed.len());

    let mse = izip!(&observed, &predicted)
        .map(|(obs, pred)| (obs - pred).powi(2))
        .mean();
    let threshold = config.anomaly_multiplier * mse.sqrt();

    let anomalies: Vec<bool> = izip!(&observed, &predicted)
        .map(|(obs, pred)| (obs - pred).abs() > threshold)
        .collect();

    log::info!(
        "fitted ({}, {}, 0) over {} buckets: mse {:.4}, threshold {:.4}",
        config.ar_lags,
        config.differencing,
        observed.len(),
        mse,
        threshold
    );

    Ok(DetectionReport {
        traffic,
        predicted,
        anomalies,
        mse,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    /// Constant-rate capture: `rate` packets in every second of `secs`,
    /// starting at epoch second `start`.
    fn constant_rate(start: u64, secs: u64, rate: u64) -> Vec<f64> {
        let mut timestamps = Vec::new();
        for s in 0..secs {
            for p in 0..rate {
                timestamps.push((start + s) as f64 + (p as f64 + 0.5) / rate as f64);
            }
        }
        timestamps
    }

    #[test]
    fn test_report_series_share_length_and_index() {
        let timestamps = constant_rate(1_700_000_000, 60, 7);
        let report = detect_anomalies(&timestamps, &ANALYSIS).unwrap();

        assert_eq!(report.traffic.len(), 60);
        assert_eq!(report.predicted.len(), 60);
        assert_eq!(report.anomalies.len(), 60);
        assert_eq!(report.traffic.start_sec, 1_700_000_000);
    }

    #[test]
    fn test_flag_formula_holds_everywhere() {
        // Mildly varying traffic so the threshold is nonzero
        let mut timestamps = constant_rate(100, 90, 10);
        timestamps.extend(constant_rate(190, 30, 14));
        let report = detect_anomalies(&timestamps, &ANALYSIS).unwrap();

        let observed = report.traffic.counts_f64();
        for (i, flag) in report.anomalies.iter().enumerate() {
            let expected = (observed[i] - report.predicted[i]).abs() > report.threshold;
            assert_eq!(*flag, expected, "flag mismatch at bucket {}", i);
        }
    }

    #[test]
    fn test_spiked_second_is_the_only_anomaly() {
        // 120 seconds at 10 packets/second, with second 60 spiked to 200
        let mut timestamps = Vec::new();
        for s in 0..120u64 {
            let rate = if s == 60 { 200 } else { 10 };
            timestamps.extend(constant_rate(1_000 + s, 1, rate));
        }
        let report = detect_anomalies(&timestamps, &ANALYSIS).unwrap();

        assert_eq!(report.traffic.counts[60], 200);
        assert_eq!(
            report.anomaly_indices(),
            vec![60],
            "only the spiked second should be flagged (threshold {:.2})",
            report.threshold
        );
    }

    #[test]
    fn test_ten_packet_capture_fails_with_insufficient_data() {
        // 2 packets/second for 5 seconds aggregates to [2, 2, 2, 2, 2],
        // which is too short for a 5-lag model: the detector must fail
        // rather than produce output.
        let timestamps = constant_rate(500, 5, 2);
        let err = detect_anomalies(&timestamps, &ANALYSIS).unwrap_err();
        assert!(
            matches!(err, DetectError::InsufficientData { actual: 5, lags: 5, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_empty_capture_fails_at_aggregation() {
        let err = detect_anomalies(&[], &ANALYSIS).unwrap_err();
        assert_eq!(err, DetectError::EmptyCapture);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut timestamps = constant_rate(42, 80, 9);
        timestamps.extend(constant_rate(90, 1, 120));

        let a = detect_anomalies(&timestamps, &ANALYSIS).unwrap();
        let b = detect_anomalies(&timestamps, &ANALYSIS).unwrap();

        assert_eq!(a.traffic, b.traffic);
        assert_eq!(a.predicted, b.predicted);
        assert_eq!(a.anomalies, b.anomalies);
        assert_eq!(a.mse.to_bits(), b.mse.to_bits());
    }

    #[test]
    fn test_quiet_seconds_appear_as_zero_buckets() {
        // Packets only in the first and last ten seconds of a minute
        let mut timestamps = constant_rate(0, 10, 12);
        timestamps.extend(constant_rate(50, 10, 12));
        let report = detect_anomalies(&timestamps, &ANALYSIS).unwrap();

        assert_eq!(report.traffic.len(), 60);
        for s in 10..50 {
            assert_eq!(report.traffic.counts[s], 0, "second {} should be empty", s);
        }
    }

    #[test]
    fn test_custom_threshold_multiplier() {
        // A lax multiplier must flag a subset of what a strict one flags
        let mut timestamps = constant_rate(0, 100, 10);
        timestamps.extend(constant_rate(100, 1, 60));
        timestamps.extend(constant_rate(101, 19, 10));

        let strict = AnalysisConfig {
            anomaly_multiplier: 1.0,
            ..ANALYSIS
        };
        let lax = AnalysisConfig {
            anomaly_multiplier: 4.0,
            ..ANALYSIS
        };

        let strict_report = detect_anomalies(&timestamps, &strict).unwrap();
        let lax_report = detect_anomalies(&timestamps, &lax).unwrap();

        for (s, l) in izip!(&strict_report.anomalies, &lax_report.anomalies) {
            if *l {
                assert!(*s, "lax flag without the corresponding strict flag");
            }
        }
        assert!(strict_report.anomaly_count() >= lax_report.anomaly_count());
    }
}
