use eframe::{Frame, egui};

use crate::analysis::DetectionReport;
use crate::ui::plot_view::PlotView;

/// Which plot layers are currently visible.
///
/// The observed traffic line is always drawn; the model output layers
/// can be toggled from the top panel.
#[derive(Clone, Copy)]
pub struct PlotVisibility {
    pub show_predicted: bool,
    pub show_anomalies: bool,
}

impl Default for PlotVisibility {
    fn default() -> Self {
        Self {
            show_predicted: true,
            show_anomalies: true,
        }
    }
}

pub struct PacketPulseApp {
    capture_name: String,
    report: DetectionReport,
    visibility: PlotVisibility,
    plot: PlotView,
}

impl PacketPulseApp {
    pub fn new(
        _cc: &eframe::CreationContext,
        capture_name: String,
        report: DetectionReport,
    ) -> Self {
        Self {
            capture_name,
            report,
            visibility: PlotVisibility::default(),
            plot: PlotView::new(),
        }
    }

    fn summary_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.heading(&self.capture_name);
            ui.separator();

            if let Some(start) = self.report.traffic.start_datetime() {
                ui.label(format!("capture start: {} UTC", start.format("%Y-%m-%d %H:%M:%S")));
                ui.separator();
            }

            let total_packets: u64 = self.report.traffic.counts.iter().sum();
            ui.label(format!("{} TCP packets", total_packets));
            ui.label(format!("{} buckets", self.report.traffic.len()));
            ui.label(format!("rmse {:.2}", self.report.mse.sqrt()));

            let anomaly_count = self.report.anomaly_count();
            let anomaly_text = format!("{} anomalies", anomaly_count);
            if anomaly_count > 0 {
                ui.colored_label(egui::Color32::ORANGE, anomaly_text);
            } else {
                ui.label(anomaly_text);
            }

            ui.separator();
            ui.checkbox(&mut self.visibility.show_predicted, "Predicted");
            ui.checkbox(&mut self.visibility.show_anomalies, "Anomalies");
        });
    }
}

impl eframe::App for PacketPulseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        egui::TopBottomPanel::top("summary_panel").show(ctx, |ui| {
            self.summary_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot.show_traffic_plot(ui, &self.report, &self.visibility);
        });
    }
}
