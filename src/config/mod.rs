//! Configuration module for the packet-pulse application.

pub mod analysis;
pub mod plot;

// Re-export commonly used items
pub use analysis::{ANALYSIS, AnalysisConfig};
pub use plot::PLOT_CONFIG;
