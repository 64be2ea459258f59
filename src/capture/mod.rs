// Packet capture ingestion
pub mod reader;

// Re-export commonly used items
pub use reader::read_capture;
