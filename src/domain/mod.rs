// Domain types and value objects
pub mod traffic;

// Re-export commonly used types
pub use traffic::TrafficSeries;
