//! BLE beacon scanning: a scan lifecycle controller over the host Bluetooth
//! stack, plus RSSI smoothing and distance estimation for tracked beacons.

pub mod domain;
pub mod infrastructure;

pub use domain::models::DeviceObservation;
pub use infrastructure::bluetooth::{BleScanController, DeviceObserver, ScanError};
