// Traffic forecasting and anomaly scoring
pub mod arima;
pub mod detector;
pub mod error;

// Re-export commonly used types
pub use arima::Arima;
pub use detector::{DetectionReport, detect_anomalies};
pub use error::DetectError;
