//! Bluetooth Module
//!
//! BLE scan lifecycle over the host's Bluetooth stack.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   BleScanController                      │
//! │   (start / stop / status, owns the session flag)         │
//! └───────────┬─────────────────────────────┬───────────────┘
//!             │ registers                   │ forwards
//!             ▼                             ▼
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │  Platform (LeScanner) │──────▶│   DeviceObserver     │
//! │  - WinRT watcher      │ calls │   - closures         │
//! │  - unavailable host   │ back  │   - event channel    │
//! └──────────────────────┘        └──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`platform`] - Traits the host Bluetooth stack implements
//! - [`observer`] - Sink for discovered devices
//! - [`scanner`] - The scan controller
//! - [`error`] - Start failures and platform errors

pub mod error;
pub mod observer;
pub mod platform;
pub mod scanner;
#[cfg(windows)]
pub mod winrt;

// Re-export main controller for convenience
pub use error::{PlatformError, ScanError};
pub use observer::{ChannelObserver, DeviceObserver};
pub use platform::{default_host, BluetoothHost, LeScanner, ScanCallback, ScanRecord};
pub use scanner::BleScanController;
