use thiserror::Error;

/// Error taxonomy for the detection pipeline.
///
/// Nothing here is recovered from: every variant propagates to the
/// caller and terminates the run with the underlying cause attached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// The capture contained no packets matching the protocol filter,
    /// so there is nothing to aggregate or fit.
    #[error("capture contained no matching packets; nothing to aggregate")]
    EmptyCapture,

    /// The bucketed series is too short for the configured lag order.
    #[error("insufficient data: {actual} buckets, at least {required} required for {lags} autoregressive lags")]
    InsufficientData {
        required: usize,
        actual: usize,
        lags: usize,
    },

    /// A model or aggregation parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The series contains NaN or infinite values.
    #[error("series contains non-finite values")]
    InvalidData,

    /// Prediction was requested before the model was fitted.
    #[error("model has not been fitted")]
    NotFitted,
}
