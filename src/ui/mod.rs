// User interface components
pub mod app;
pub mod plot_view;

// Re-export main app
pub use app::PacketPulseApp;
