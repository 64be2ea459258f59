use anyhow::Context;
use clap::Parser;
use eframe::NativeOptions;
use std::path::PathBuf;

use packet_pulse::{Cli, detect_anomalies, read_capture, run_app};

const APP_STATE_PATH: &str = "app_state.json";

fn main() -> anyhow::Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Capture Reading (Blocking)
    let timestamps = read_capture(&args.capture)?;

    // D. Anomaly Detection
    let config = args.analysis_config();
    let report = detect_anomalies(&timestamps, &config)
        .with_context(|| format!("anomaly detection failed for {}", args.capture.display()))?;

    log::info!(
        "detected {} anomalous buckets out of {} ({} packets, rmse {:.3})",
        report.anomaly_count(),
        report.traffic.len(),
        timestamps.len(),
        report.mse.sqrt()
    );

    // E. Run Native App
    let capture_name = args
        .capture
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.capture.display().to_string());

    let options = NativeOptions {
        persistence_path: Some(PathBuf::from(APP_STATE_PATH)),
        ..Default::default()
    };

    eframe::run_native(
        "Packet Pulse - TCP Traffic Anomalies",
        options,
        Box::new(move |cc| Ok(run_app(cc, capture_name, report))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run the chart window: {e}"))
}
