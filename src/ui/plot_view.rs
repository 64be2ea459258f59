use eframe::egui;
use egui_plot::{AxisHints, Corner, HPlacement, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::analysis::DetectionReport;
use crate::config::PLOT_CONFIG;
use crate::ui::app::PlotVisibility;

/// Point data prepared once per report; the report never changes after
/// detection, so this is computed on first show and reused every frame.
struct PlotCache {
    observed: Vec<[f64; 2]>,
    predicted: Vec<[f64; 2]>,
    anomalies: Vec<[f64; 2]>,
}

#[derive(Default)]
pub struct PlotView {
    cache: Option<PlotCache>,
}

impl PlotView {
    pub fn new() -> Self {
        Self { cache: None }
    }

    pub fn show_traffic_plot(
        &mut self,
        ui: &mut egui::Ui,
        report: &DetectionReport,
        visibility: &PlotVisibility,
    ) {
        let cache = self.cache.get_or_insert_with(|| build_plot_cache(report));

        let legend = Legend::default().position(Corner::RightTop);

        Plot::new("traffic_plot")
            .legend(legend)
            .custom_x_axes(vec![create_x_axis()])
            .custom_y_axes(vec![create_y_axis()])
            .show(ui, |plot_ui| {
                let observed = Line::new("TCP traffic", PlotPoints::new(cache.observed.clone()))
                    .color(PLOT_CONFIG.observed_color)
                    .width(PLOT_CONFIG.observed_line_width);
                plot_ui.line(observed);

                if visibility.show_predicted {
                    let predicted =
                        Line::new("Predicted traffic", PlotPoints::new(cache.predicted.clone()))
                            .color(PLOT_CONFIG.predicted_color)
                            .width(PLOT_CONFIG.predicted_line_width);
                    plot_ui.line(predicted);
                }

                if visibility.show_anomalies && !cache.anomalies.is_empty() {
                    let anomalies =
                        Points::new("Anomalies", PlotPoints::new(cache.anomalies.clone()))
                            .color(PLOT_CONFIG.anomaly_color)
                            .shape(MarkerShape::Circle)
                            .radius(PLOT_CONFIG.anomaly_marker_radius)
                            .highlight(true);
                    plot_ui.points(anomalies);
                }
            });
    }
}

fn build_plot_cache(report: &DetectionReport) -> PlotCache {
    let width = report.traffic.bucket_width_secs as f64;
    let x_of = |idx: usize| idx as f64 * width;

    let observed: Vec<[f64; 2]> = report
        .traffic
        .counts
        .iter()
        .enumerate()
        .map(|(idx, &count)| [x_of(idx), count as f64])
        .collect();

    let predicted: Vec<[f64; 2]> = report
        .predicted
        .iter()
        .enumerate()
        .map(|(idx, &pred)| [x_of(idx), pred])
        .collect();

    // Anomaly markers sit on the observed value of the flagged bucket
    let anomalies: Vec<[f64; 2]> = report
        .anomaly_indices()
        .into_iter()
        .map(|idx| [x_of(idx), report.traffic.counts[idx] as f64])
        .collect();

    PlotCache {
        observed,
        predicted,
        anomalies,
    }
}

fn create_x_axis() -> AxisHints<'static> {
    AxisHints::new_x()
        .label(PLOT_CONFIG.x_axis_label)
        .formatter(|grid_mark, _range| format!("{:.0}", grid_mark.value))
}

fn create_y_axis() -> AxisHints<'static> {
    AxisHints::new_y()
        .label(PLOT_CONFIG.y_axis_label)
        .formatter(|grid_mark, _range| format!("{:.0}", grid_mark.value))
        .placement(HPlacement::Left)
}
