// Core modules
pub mod analysis;
pub mod capture;
pub mod config;
pub mod domain;
pub mod ui;

// Re-export commonly used types
pub use analysis::{Arima, DetectError, DetectionReport, detect_anomalies};
pub use capture::read_capture;
pub use domain::TrafficSeries;
pub use ui::PacketPulseApp;

use crate::config::{ANALYSIS, AnalysisConfig};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the packet capture file to analyze
    pub capture: PathBuf,

    /// Number of autoregressive lags in the forecasting model
    #[arg(long, default_value_t = ANALYSIS.ar_lags)]
    pub ar_lags: usize,

    /// Differencing passes applied to the series before fitting
    #[arg(long, default_value_t = ANALYSIS.differencing)]
    pub differencing: usize,

    /// Flag buckets deviating more than this multiple of the residual RMSE
    #[arg(long, default_value_t = ANALYSIS.anomaly_multiplier)]
    pub threshold: f64,

    /// Bucket width for the traffic count series, in seconds
    #[arg(long, default_value_t = ANALYSIS.bucket_width_secs)]
    pub bucket_secs: u64,
}

impl Cli {
    /// Build the effective analysis configuration from the parsed arguments.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            bucket_width_secs: self.bucket_secs,
            ar_lags: self.ar_lags,
            differencing: self.differencing,
            anomaly_multiplier: self.threshold,
        }
    }
}

/// Main application entry point - creates the GUI app
/// This is the public API for the binary to call
pub fn run_app(
    cc: &eframe::CreationContext,
    capture_name: String,
    report: DetectionReport,
) -> Box<dyn eframe::App> {
    let app = ui::PacketPulseApp::new(cc, capture_name, report);
    Box::new(app)
}
