use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_false(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "beacon_scanner".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Which devices count as tracked beacons and how their distance is estimated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconSettings {
    /// Case-insensitive fragment matched against the advertised name
    #[serde(default = "default_name_fragment")]
    pub target_name_fragment: String,
    #[serde(default = "default_target_addresses")]
    pub target_addresses: Vec<String>,
    /// Measured power at 1 m, in dBm
    #[serde(default = "default_tx_power")]
    pub tx_power: i16,
    /// Environmental factor of the path loss model
    #[serde(default = "default_path_loss_exponent")]
    pub path_loss_exponent: f64,
    /// Readings kept per beacon for the median filter
    #[serde(default = "default_rssi_history_len")]
    pub rssi_history_len: usize,
}

impl Default for BeaconSettings {
    fn default() -> Self {
        Self {
            target_name_fragment: default_name_fragment(),
            target_addresses: default_target_addresses(),
            tx_power: default_tx_power(),
            path_loss_exponent: default_path_loss_exponent(),
            rssi_history_len: default_rssi_history_len(),
        }
    }
}

fn default_name_fragment() -> String {
    "meeblue".to_string()
}
fn default_target_addresses() -> Vec<String> {
    vec![
        "DD:2B:7C:C0:A0:84".to_string(),
        "EB:3B:E8:48:F4:90".to_string(),
    ]
}
fn default_tx_power() -> i16 {
    -40
}
fn default_path_loss_exponent() -> f64 {
    2.0
}
fn default_rssi_history_len() -> usize {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_settings: LogSettings,

    #[serde(default)]
    pub beacon: BeaconSettings,

    /// How often the binary prints the smoothed readings; see
    /// [`Settings::report_interval`]
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

/// Shortest report period honoured, so a zero or tiny value cannot spin the
/// report loop
pub const MIN_REPORT_INTERVAL_MS: u64 = 50;

impl Settings {
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms.max(MIN_REPORT_INTERVAL_MS))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_settings: LogSettings::default(),
            beacon: BeaconSettings::default(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

fn default_report_interval_ms() -> u64 {
    500
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
    /// Why the file was not used, when defaults were substituted
    load_error: Option<String>,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::load_from(settings_path))
    }

    /// Load from an explicit path, falling back to defaults when the file is
    /// missing or unreadable.
    ///
    /// Settings are read before logging exists, so the fallback reason is
    /// kept for [`SettingsService::load_error`] instead of being logged here.
    pub fn load_from(settings_path: PathBuf) -> Self {
        let (settings, load_error) = match Self::load_from_file(&settings_path) {
            Ok(settings) => (settings, None),
            Err(e) => (Settings::default(), Some(e.to_string())),
        };

        Self {
            settings,
            settings_path,
            load_error,
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BeaconScanner");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn add_target_address(&mut self, address: &str) -> anyhow::Result<()> {
        let known = self
            .settings
            .beacon
            .target_addresses
            .iter()
            .any(|a| a.eq_ignore_ascii_case(address));
        if !known {
            self.settings
                .beacon
                .target_addresses
                .push(address.to_ascii_uppercase());
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "beacon_scanner_settings_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = scratch_path("missing");
        let _ = fs::remove_file(&path);

        let service = SettingsService::load_from(path);
        assert!(service.load_error().is_some());
        let settings = service.get();
        assert_eq!(settings.beacon.target_name_fragment, "meeblue");
        assert_eq!(settings.beacon.tx_power, -40);
        assert_eq!(settings.beacon.rssi_history_len, 4);
        assert_eq!(settings.report_interval_ms, 500);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let path = scratch_path("partial");
        fs::write(&path, r#"{ "beacon": { "tx_power": -59 } }"#).unwrap();

        let service = SettingsService::load_from(path);
        assert_eq!(service.load_error(), None);
        assert_eq!(service.get().beacon.tx_power, -59);
        assert_eq!(service.get().beacon.path_loss_exponent, 2.0);
        assert_eq!(service.get().log_settings.level, "info");
    }

    #[test]
    fn test_invalid_json_keeps_reason() {
        let path = scratch_path("invalid");
        fs::write(&path, "{ not json").unwrap();

        let service = SettingsService::load_from(path);
        assert!(service.load_error().is_some());
        assert_eq!(service.get().report_interval_ms, 500);
    }

    #[test]
    fn test_report_interval_floor() {
        let mut settings = Settings::default();
        assert_eq!(settings.report_interval(), Duration::from_millis(500));

        settings.report_interval_ms = 0;
        assert_eq!(
            settings.report_interval(),
            Duration::from_millis(MIN_REPORT_INTERVAL_MS)
        );
    }

    #[test]
    fn test_add_target_address_persists_once() {
        let path = scratch_path("targets");
        let _ = fs::remove_file(&path);

        let mut service = SettingsService::load_from(path.clone());
        service.add_target_address("aa:bb:cc:dd:ee:ff").unwrap();
        service.add_target_address("AA:BB:CC:DD:EE:FF").unwrap();

        let reloaded = SettingsService::load_from(path);
        let targets = &reloaded.get().beacon.target_addresses;
        assert_eq!(
            targets.iter().filter(|a| *a == "AA:BB:CC:DD:EE:FF").count(),
            1
        );
    }
}
