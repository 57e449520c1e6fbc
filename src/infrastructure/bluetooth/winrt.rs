//! WinRT Backend
//!
//! Drives a `BluetoothLEAdvertisementWatcher` on behalf of the scan
//! controller.

use crate::domain::models::{ScanFailureCode, ScanMode, ScanSettings};
use crate::infrastructure::bluetooth::error::PlatformError;
use crate::infrastructure::bluetooth::platform::{
    stop_then_release, BluetoothHost, LeScanner, ScanCallback, ScanRecord,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use windows::Devices::Bluetooth::Advertisement::{
    BluetoothLEAdvertisementReceivedEventArgs, BluetoothLEAdvertisementWatcher,
    BluetoothLEAdvertisementWatcherStoppedEventArgs, BluetoothLEScanningMode,
};
use windows::Devices::Bluetooth::{BluetoothAdapter, BluetoothError};
use windows::Foundation::TypedEventHandler;
use windows::Win32::Foundation::E_ACCESSDENIED;

/// Host backed by the default Windows Bluetooth adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct WinRtHost;

impl BluetoothHost for WinRtHost {
    fn le_scanner(&self) -> Option<Box<dyn LeScanner>> {
        let adapter = match BluetoothAdapter::GetDefaultAsync().and_then(|op| op.get()) {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!("No Bluetooth adapter found: {}", e);
                return None;
            }
        };

        match adapter.IsLowEnergySupported() {
            Ok(true) => {
                info!("Using Bluetooth adapter {:?}", adapter.DeviceId().ok());
                Some(Box::new(AdvertisementScanner::default()))
            }
            Ok(false) => {
                warn!("Bluetooth adapter does not support Low Energy");
                None
            }
            Err(e) => {
                warn!("Could not query Bluetooth adapter: {}", e);
                None
            }
        }
    }
}

/// LE scanner built on the advertisement watcher
#[derive(Default)]
pub struct AdvertisementScanner {
    watcher: Option<BluetoothLEAdvertisementWatcher>,
}

impl AdvertisementScanner {
    fn start_watcher(
        &mut self,
        settings: &ScanSettings,
        callback: Arc<dyn ScanCallback>,
    ) -> windows::core::Result<()> {
        let watcher = BluetoothLEAdvertisementWatcher::new()?;
        let mode = match settings.mode {
            ScanMode::LowLatency | ScanMode::Balanced => BluetoothLEScanningMode::Active,
            ScanMode::LowPower => BluetoothLEScanningMode::Passive,
        };
        watcher.SetScanningMode(mode)?;

        let on_result = callback.clone();
        let received = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementReceivedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let name = args.Advertisement()?.LocalName()?.to_string();
                    let address = format_address(args.BluetoothAddress()?);
                    let rssi = args.RawSignalStrengthInDBm()?;

                    on_result.on_scan_result(ScanRecord::new(
                        address,
                        (!name.is_empty()).then_some(name),
                        rssi,
                    ));
                }
                Ok(())
            },
        );

        let on_stopped = callback;
        let stopped = TypedEventHandler::new(
            move |_: windows::core::Ref<BluetoothLEAdvertisementWatcher>,
                  args: windows::core::Ref<BluetoothLEAdvertisementWatcherStoppedEventArgs>| {
                if let Some(args) = args.as_ref() {
                    let error = args.Error()?;
                    if error != BluetoothError::Success {
                        on_stopped.on_scan_failed(failure_code(error));
                    }
                }
                Ok(())
            },
        );

        watcher.Received(&received)?;
        watcher.Stopped(&stopped)?;
        watcher.Start()?;
        self.watcher = Some(watcher);
        Ok(())
    }
}

impl LeScanner for AdvertisementScanner {
    fn start_scan(
        &mut self,
        settings: &ScanSettings,
        callback: Arc<dyn ScanCallback>,
    ) -> Result<(), PlatformError> {
        stop_then_release(&mut self.watcher, |watcher| {
            watcher.Stop().map_err(platform_error)
        })?;
        self.start_watcher(settings, callback)
            .map_err(platform_error)
    }

    fn stop_scan(&mut self, _callback: &Arc<dyn ScanCallback>) -> Result<(), PlatformError> {
        stop_then_release(&mut self.watcher, |watcher| {
            debug!("Stopping advertisement watcher");
            watcher.Stop().map_err(platform_error)
        })
    }
}

impl Drop for AdvertisementScanner {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            let _ = watcher.Stop();
        }
    }
}

fn platform_error(e: windows::core::Error) -> PlatformError {
    if e.code() == E_ACCESSDENIED {
        PlatformError::PermissionDenied(e.message().to_string())
    } else {
        PlatformError::Other(format!("{:?}", e))
    }
}

fn failure_code(error: BluetoothError) -> ScanFailureCode {
    match error {
        BluetoothError::NotSupported => ScanFailureCode::FeatureUnsupported,
        BluetoothError::ResourceInUse => ScanFailureCode::OutOfHardwareResources,
        BluetoothError::OtherError => ScanFailureCode::InternalError,
        other => ScanFailureCode::Other(other.0),
    }
}

/// Format a 48-bit Bluetooth address as `AA:BB:CC:DD:EE:FF`
pub fn format_address(address: u64) -> String {
    let bytes = address.to_be_bytes();
    bytes[2..]
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
