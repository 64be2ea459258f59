//! Plot visualization configuration

use eframe::egui::Color32;

pub struct PlotConfig {
    pub observed_color: Color32,
    pub predicted_color: Color32,
    pub anomaly_color: Color32,
    /// Width of the observed traffic line
    pub observed_line_width: f32,
    /// Width of the predicted traffic line
    pub predicted_line_width: f32,
    /// Radius of anomaly markers
    pub anomaly_marker_radius: f32,
    /// Axis labels
    pub x_axis_label: &'static str,
    pub y_axis_label: &'static str,
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    observed_color: Color32::from_rgb(100, 149, 237), // Cornflower blue
    predicted_color: Color32::from_rgb(200, 0, 0),    // Red
    anomaly_color: Color32::from_rgb(255, 165, 0),    // Orange
    observed_line_width: 1.5,
    predicted_line_width: 1.0,
    anomaly_marker_radius: 4.0,
    x_axis_label: "Time (s since capture start)",
    y_axis_label: "Packets per bucket",
};
