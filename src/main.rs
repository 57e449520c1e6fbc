use beacon_scanner::domain::beacon::BeaconTracker;
use beacon_scanner::domain::models::{AppEvent, MessageSeverity, StatusMessage};
use beacon_scanner::domain::settings::SettingsService;
use beacon_scanner::infrastructure::bluetooth::{
    default_host, BleScanController, ChannelObserver,
};
use beacon_scanner::infrastructure::logging::init_logger;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_service = SettingsService::new()?;
    let settings = settings_service.get().clone();

    let _logging_guard = init_logger(&settings.log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    info!("Starting Beacon Scanner");
    match settings_service.load_error() {
        Some(reason) => info!(
            "Using default settings ({}): {}",
            settings_service.path().display(),
            reason
        ),
        None => info!("Settings file: {}", settings_service.path().display()),
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let host = default_host();
    let mut controller = BleScanController::new(
        host.as_ref(),
        Arc::new(ChannelObserver::new(event_tx.clone())),
    );

    let status = match controller.start_scan() {
        Ok(()) => StatusMessage {
            message: "Scanning for beacons...".to_string(),
            severity: MessageSeverity::Success,
        },
        Err(e) => StatusMessage {
            message: format!("Failed to start scan: {}", e),
            severity: MessageSeverity::Error,
        },
    };
    let _ = event_tx.send(AppEvent::LogMessage(status));

    let mut tracker = BeaconTracker::new(settings.beacon.clone());
    let mut report = tokio::time::interval(settings.report_interval());
    let mut was_scanning = controller.is_scanning();

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => match event {
                AppEvent::DeviceFound(observation) => {
                    tracker.observe(&observation);
                }
                AppEvent::LogMessage(status) => match status.severity {
                    MessageSeverity::Error => error!("{}", status.message),
                    MessageSeverity::Warning => warn!("{}", status.message),
                    MessageSeverity::Info | MessageSeverity::Success => info!("{}", status.message),
                },
            },
            _ = report.tick() => {
                for reading in tracker.readings() {
                    println!("{}", reading.summary_line());
                }

                let scanning = controller.is_scanning();
                if was_scanning && !scanning {
                    let _ = event_tx.send(AppEvent::LogMessage(StatusMessage {
                        message: "Scan was stopped by the platform; restart to resume".to_string(),
                        severity: MessageSeverity::Warning,
                    }));
                }
                was_scanning = scanning;
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    controller.stop_scan();
    Ok(())
}
