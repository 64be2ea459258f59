//! Analysis and computation configuration

use serde::{Deserialize, Serialize};

/// The Master Analysis Configuration
///
/// The defaults below reproduce the reference detector: one-second
/// buckets, a (5, 1, 0) autoregressive-integrated model, and an anomaly
/// threshold of two residual standard errors. All four are overridable
/// from the command line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    // Width of one traffic bucket in seconds
    pub bucket_width_secs: u64,
    // Autoregressive lag order (the `p` in (p, d, 0))
    pub ar_lags: usize,
    // Differencing passes before fitting (the `d` in (p, d, 0))
    pub differencing: usize,
    // A bucket is anomalous when |observed - predicted| exceeds
    // anomaly_multiplier * sqrt(mse) for the global residual mse
    pub anomaly_multiplier: f64,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    bucket_width_secs: 1,
    ar_lags: 5,
    differencing: 1,
    anomaly_multiplier: 2.0,
};

impl Default for AnalysisConfig {
    fn default() -> Self {
        ANALYSIS
    }
}
