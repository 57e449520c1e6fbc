use thiserror::Error;

/// Synchronous failures of [`BleScanController::start_scan`].
///
/// [`BleScanController::start_scan`]: super::scanner::BleScanController::start_scan
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("BLE scanner is not available on this host")]
    ScannerUnavailable,
    #[error("permission denied when starting scan: {0}")]
    PermissionDenied(String),
    #[error("error starting scan: {0}")]
    ScanStartFailed(String),
}

/// Errors reported by a platform scanner implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Other(String),
}

impl From<PlatformError> for ScanError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::PermissionDenied(msg) => ScanError::PermissionDenied(msg),
            PlatformError::Other(msg) => ScanError::ScanStartFailed(msg),
        }
    }
}
