//! BLE Scan Controller
//!
//! Owns one scan session over a platform LE scanner and relays discovered
//! devices to a single observer.

use crate::domain::models::{DeviceObservation, ScanFailureCode, ScanSettings};
use crate::infrastructure::bluetooth::error::{PlatformError, ScanError};
use crate::infrastructure::bluetooth::observer::DeviceObserver;
use crate::infrastructure::bluetooth::platform::{
    BluetoothHost, LeScanner, ScanCallback, ScanRecord,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Callback registered with the platform scanner.
///
/// Shares the session flag with the controller so a failure delivered on a
/// platform thread is visible to `is_scanning`.
struct SessionCallback {
    active: Arc<AtomicBool>,
    observer: Arc<dyn DeviceObserver>,
}

impl ScanCallback for SessionCallback {
    fn on_scan_result(&self, result: ScanRecord) {
        let Some(device) = result.device else {
            return;
        };

        let observation = DeviceObservation {
            address: device.address,
            name: device.name.unwrap_or_default(),
            signal_strength: result.rssi,
        };
        debug!(
            "Device found: {} ({}) RSSI: {}",
            observation.address, observation.name, observation.signal_strength
        );

        self.observer.on_device_discovered(observation);
    }

    fn on_batch_scan_results(&self, results: Vec<ScanRecord>) {
        for result in results {
            self.on_scan_result(result);
        }
    }

    fn on_scan_failed(&self, code: ScanFailureCode) {
        error!("BLE scan failed: {}", code);
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Lifecycle controller for one BLE scan session
pub struct BleScanController {
    scanner: Option<Box<dyn LeScanner>>,
    callback: Arc<dyn ScanCallback>,
    active: Arc<AtomicBool>,
}

impl BleScanController {
    /// Bind to the host's LE scanner.
    ///
    /// Availability is resolved here once; a host without a scanner yields a
    /// controller whose `start_scan` always fails.
    pub fn new(host: &dyn BluetoothHost, observer: Arc<dyn DeviceObserver>) -> Self {
        let scanner = host.le_scanner();
        if scanner.is_some() {
            debug!("BLE scanner initialized successfully");
        } else {
            warn!("BluetoothLeScanner is not available");
        }

        let active = Arc::new(AtomicBool::new(false));
        let callback: Arc<dyn ScanCallback> = Arc::new(SessionCallback {
            active: active.clone(),
            observer,
        });

        Self {
            scanner,
            callback,
            active,
        }
    }

    /// Whether a platform scanner was found at construction
    pub fn is_available(&self) -> bool {
        self.scanner.is_some()
    }

    /// Start scanning with low latency and immediate reporting.
    ///
    /// Starting an already running session succeeds without registering
    /// the callback again.
    pub fn start_scan(&mut self) -> Result<(), ScanError> {
        let Some(scanner) = self.scanner.as_mut() else {
            error!("BluetoothLeScanner is not available");
            return Err(ScanError::ScannerUnavailable);
        };

        if self.active.load(Ordering::SeqCst) {
            warn!("Scan already in progress");
            return Ok(());
        }

        // Raised before registering: a failure callback delivered while the
        // platform call is still in flight must be able to clear it.
        self.active.store(true, Ordering::SeqCst);
        match scanner.start_scan(&ScanSettings::LOW_LATENCY_IMMEDIATE, self.callback.clone()) {
            Ok(()) => {
                info!("BLE scan started successfully");
                Ok(())
            }
            Err(PlatformError::PermissionDenied(msg)) => {
                self.active.store(false, Ordering::SeqCst);
                error!("Security exception when starting scan: {}", msg);
                Err(ScanError::PermissionDenied(msg))
            }
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                error!("Error starting scan: {}", e);
                Err(e.into())
            }
        }
    }

    /// Stop scanning. Safe to call unconditionally; failures are only logged.
    pub fn stop_scan(&mut self) {
        let Some(scanner) = self.scanner.as_mut() else {
            return;
        };
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        match scanner.stop_scan(&self.callback) {
            Ok(()) => {
                self.active.store(false, Ordering::SeqCst);
                info!("BLE scan stopped");
            }
            Err(PlatformError::PermissionDenied(msg)) => {
                error!("Security exception when stopping scan: {}", msg);
            }
            Err(e) => {
                error!("Error stopping scan: {}", e);
            }
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The callback registered with the platform, for delivering results
    /// directly in tests.
    #[cfg(test)]
    fn callback(&self) -> &Arc<dyn ScanCallback> {
        &self.callback
    }
}

impl Drop for BleScanController {
    fn drop(&mut self) {
        self.stop_scan();
    }
}
