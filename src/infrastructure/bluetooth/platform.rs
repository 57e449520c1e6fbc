//! Platform Boundary
//!
//! The traits a host Bluetooth stack implements so the scan controller can
//! drive it. Implementations only submit requests; they never block until
//! the radio actually starts or stops.

use crate::domain::models::{ScanFailureCode, ScanSettings};
use crate::infrastructure::bluetooth::error::PlatformError;
use std::sync::Arc;

/// Device record attached to a scan result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub address: String,
    /// `None` when the platform withholds the name
    pub name: Option<String>,
}

/// One result as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// Absent when the platform delivered a result without a device
    pub device: Option<DeviceRecord>,
    pub rssi: i16,
}

impl ScanRecord {
    pub fn new(address: impl Into<String>, name: Option<String>, rssi: i16) -> Self {
        Self {
            device: Some(DeviceRecord {
                address: address.into(),
                name,
            }),
            rssi,
        }
    }
}

/// Receiver of platform scan callbacks, invoked on platform threads.
pub trait ScanCallback: Send + Sync {
    fn on_scan_result(&self, result: ScanRecord);

    fn on_batch_scan_results(&self, results: Vec<ScanRecord>);

    fn on_scan_failed(&self, code: ScanFailureCode);
}

/// A low-energy scanner handle.
///
/// The callback passed to `stop_scan` is the same `Arc` that was registered
/// with `start_scan`.
pub trait LeScanner: Send {
    fn start_scan(
        &mut self,
        settings: &ScanSettings,
        callback: Arc<dyn ScanCallback>,
    ) -> Result<(), PlatformError>;

    fn stop_scan(&mut self, callback: &Arc<dyn ScanCallback>) -> Result<(), PlatformError>;
}

/// Host environment exposing a Bluetooth manager, adapter and LE scanner.
pub trait BluetoothHost {
    /// Resolve the LE scanner; `None` when the host has no manager, no
    /// adapter, or an adapter without LE support.
    fn le_scanner(&self) -> Option<Box<dyn LeScanner>>;
}

/// Stop the handle in `slot` and release it only once the stop succeeded.
///
/// On failure the handle stays in place so a later call can try again.
pub fn stop_then_release<W>(
    slot: &mut Option<W>,
    stop: impl FnOnce(&W) -> Result<(), PlatformError>,
) -> Result<(), PlatformError> {
    if let Some(handle) = slot.as_ref() {
        stop(handle)?;
    }
    *slot = None;
    Ok(())
}

/// Host without any Bluetooth capability
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableHost;

impl BluetoothHost for UnavailableHost {
    fn le_scanner(&self) -> Option<Box<dyn LeScanner>> {
        None
    }
}

/// Host for the current target platform.
#[cfg(windows)]
pub fn default_host() -> Box<dyn BluetoothHost> {
    Box::new(crate::infrastructure::bluetooth::winrt::WinRtHost)
}

/// Host for the current target platform.
#[cfg(not(windows))]
pub fn default_host() -> Box<dyn BluetoothHost> {
    tracing::warn!("Native BLE scanning not available on this platform");
    Box::new(UnavailableHost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_stop_keeps_handle() {
        let mut slot = Some("watcher");

        let result = stop_then_release(&mut slot, |_| {
            Err(PlatformError::Other("stop failed".to_string()))
        });
        assert_eq!(result, Err(PlatformError::Other("stop failed".to_string())));
        assert_eq!(slot, Some("watcher"));

        let mut stopped = Vec::new();
        stop_then_release(&mut slot, |w| {
            stopped.push(*w);
            Ok(())
        })
        .unwrap();
        assert_eq!(slot, None);
        assert_eq!(stopped, vec!["watcher"]);
    }

    #[test]
    fn test_empty_slot_is_ok() {
        let mut slot: Option<u8> = None;
        let result = stop_then_release(&mut slot, |_| -> Result<(), PlatformError> {
            panic!("nothing to stop")
        });
        assert_eq!(result, Ok(()));
    }
}
