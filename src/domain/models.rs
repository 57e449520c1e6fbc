use serde::{Deserialize, Serialize};

/// One discovered-device event as reported by the platform scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceObservation {
    /// Hardware address, e.g. `AA:BB:CC:DD:EE:FF`
    pub address: String,
    /// Display name, empty when the platform withholds it
    pub name: String,
    /// RSSI in dBm
    pub signal_strength: i16,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    DeviceFound(DeviceObservation),
    LogMessage(StatusMessage),
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

/// Scanner duty cycle requested from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    LowPower,
    Balanced,
    LowLatency,
}

/// Settings handed to the platform scanner when a scan is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub mode: ScanMode,
    /// Batching window in milliseconds; zero reports every result immediately
    pub report_delay_ms: u64,
}

impl ScanSettings {
    /// The only policy the controller uses: lowest latency, no batching.
    pub const LOW_LATENCY_IMMEDIATE: ScanSettings = ScanSettings {
        mode: ScanMode::LowLatency,
        report_delay_ms: 0,
    };
}

/// Reason code delivered with an asynchronous scan failure.
///
/// Numbering follows the platform's `SCAN_FAILED_*` constants; anything else
/// is kept verbatim in [`ScanFailureCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanFailureCode {
    AlreadyStarted,
    ApplicationRegistrationFailed,
    InternalError,
    FeatureUnsupported,
    OutOfHardwareResources,
    ScanningTooFrequently,
    Other(i32),
}

impl From<i32> for ScanFailureCode {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::AlreadyStarted,
            2 => Self::ApplicationRegistrationFailed,
            3 => Self::InternalError,
            4 => Self::FeatureUnsupported,
            5 => Self::OutOfHardwareResources,
            6 => Self::ScanningTooFrequently,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for ScanFailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "scan already started"),
            Self::ApplicationRegistrationFailed => write!(f, "application registration failed"),
            Self::InternalError => write!(f, "internal error"),
            Self::FeatureUnsupported => write!(f, "feature unsupported"),
            Self::OutOfHardwareResources => write!(f, "out of hardware resources"),
            Self::ScanningTooFrequently => write!(f, "scanning too frequently"),
            Self::Other(code) => write!(f, "error code {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_code_decoding() {
        assert_eq!(ScanFailureCode::from(2), ScanFailureCode::ApplicationRegistrationFailed);
        assert_eq!(ScanFailureCode::from(6), ScanFailureCode::ScanningTooFrequently);
        assert_eq!(ScanFailureCode::from(42), ScanFailureCode::Other(42));
        assert_eq!(ScanFailureCode::from(42).to_string(), "error code 42");
    }

    #[test]
    fn test_fixed_scan_policy() {
        let settings = ScanSettings::LOW_LATENCY_IMMEDIATE;
        assert_eq!(settings.mode, ScanMode::LowLatency);
        assert_eq!(settings.report_delay_ms, 0);
    }
}
