//! Beacon Tracking
//!
//! Filters observations down to the configured beacons, smooths their RSSI
//! with a short median window and estimates distance with the log-distance
//! path loss model.

use crate::domain::models::DeviceObservation;
use crate::domain::settings::BeaconSettings;
use std::collections::{BTreeMap, VecDeque};

/// Smoothed state of one tracked beacon
#[derive(Debug, Clone, PartialEq)]
pub struct BeaconReading {
    pub address: String,
    pub name: String,
    /// Most recent raw RSSI
    pub rssi: i16,
    /// Median over the history window
    pub smoothed_rssi: f64,
    /// `None` when the reading cannot be converted to a distance
    pub distance_m: Option<f64>,
}

impl BeaconReading {
    pub fn summary_line(&self) -> String {
        match self.distance_m {
            Some(distance) => format!(
                "{} - {} dB - {:.2} m",
                self.address, self.rssi, distance
            ),
            None => format!("{} - {} dB - ? m", self.address, self.rssi),
        }
    }
}

#[derive(Debug, Default)]
struct BeaconHistory {
    name: String,
    readings: VecDeque<i16>,
}

pub struct BeaconTracker {
    settings: BeaconSettings,
    name_fragment: String,
    history: BTreeMap<String, BeaconHistory>,
}

impl BeaconTracker {
    pub fn new(settings: BeaconSettings) -> Self {
        Self {
            name_fragment: settings.target_name_fragment.to_lowercase(),
            settings,
            history: BTreeMap::new(),
        }
    }

    pub fn is_target(&self, observation: &DeviceObservation) -> bool {
        if !self.name_fragment.is_empty()
            && observation.name.to_lowercase().contains(&self.name_fragment)
        {
            return true;
        }

        self.settings
            .target_addresses
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&observation.address))
    }

    /// Record an observation; returns the updated reading for tracked beacons.
    pub fn observe(&mut self, observation: &DeviceObservation) -> Option<BeaconReading> {
        if !self.is_target(observation) {
            return None;
        }

        let window = self.settings.rssi_history_len.max(1);
        let key = observation.address.to_ascii_uppercase();
        let entry = self.history.entry(key.clone()).or_default();
        if !observation.name.is_empty() {
            entry.name = observation.name.clone();
        }
        entry.readings.push_back(observation.signal_strength);
        while entry.readings.len() > window {
            entry.readings.pop_front();
        }

        let reading = self.reading_for(&key);
        if let Some(reading) = &reading {
            tracing::debug!("Beacon found: {}", reading.summary_line());
        }
        reading
    }

    /// Current reading for every tracked beacon, ordered by address
    pub fn readings(&self) -> Vec<BeaconReading> {
        self.history
            .keys()
            .filter_map(|address| self.reading_for(address))
            .collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn reading_for(&self, address: &str) -> Option<BeaconReading> {
        let entry = self.history.get(address)?;
        let rssi = *entry.readings.back()?;
        let smoothed_rssi = median(entry.readings.iter().copied())?;

        Some(BeaconReading {
            address: address.to_string(),
            name: entry.name.clone(),
            rssi,
            smoothed_rssi,
            distance_m: estimate_distance(
                smoothed_rssi,
                self.settings.tx_power,
                self.settings.path_loss_exponent,
            ),
        })
    }
}

/// Median of the readings; even-length windows average the two middle values.
pub fn median(readings: impl IntoIterator<Item = i16>) -> Option<f64> {
    let mut sorted: Vec<i16> = readings.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// Log-distance path loss: `10 ^ ((tx_power - rssi) / (10 * n))`.
///
/// An RSSI of exactly zero means the platform had no measurement.
pub fn estimate_distance(rssi: f64, tx_power: i16, path_loss_exponent: f64) -> Option<f64> {
    if rssi == 0.0 || path_loss_exponent <= 0.0 {
        return None;
    }
    let ratio = (tx_power as f64 - rssi) / (10.0 * path_loss_exponent);
    Some(10f64.powf(ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(address: &str, name: &str, rssi: i16) -> DeviceObservation {
        DeviceObservation {
            address: address.to_string(),
            name: name.to_string(),
            signal_strength: rssi,
        }
    }

    #[test]
    fn test_target_matching() {
        let tracker = BeaconTracker::new(BeaconSettings::default());
        assert!(tracker.is_target(&observation("11:22:33:44:55:66", "MeeBlue-42", -70)));
        assert!(tracker.is_target(&observation("dd:2b:7c:c0:a0:84", "", -70)));
        assert!(!tracker.is_target(&observation("11:22:33:44:55:66", "Headphones", -70)));
    }

    #[test]
    fn test_non_targets_are_ignored() {
        let mut tracker = BeaconTracker::new(BeaconSettings::default());
        assert!(tracker
            .observe(&observation("11:22:33:44:55:66", "Watch", -50))
            .is_none());
        assert!(tracker.readings().is_empty());
    }

    #[test]
    fn test_median() {
        assert_eq!(median([-70]), Some(-70.0));
        assert_eq!(median([-60, -80, -70]), Some(-70.0));
        assert_eq!(median([-60, -80, -70, -90]), Some(-75.0));
        assert_eq!(median(std::iter::empty()), None);
    }

    #[test]
    fn test_distance_estimate() {
        // At the reference power the distance is one metre.
        let d = estimate_distance(-40.0, -40, 2.0).unwrap();
        assert!((d - 1.0).abs() < 1e-9);

        // 20 dB weaker with n = 2 is ten metres.
        let d = estimate_distance(-60.0, -40, 2.0).unwrap();
        assert!((d - 10.0).abs() < 1e-9);

        assert_eq!(estimate_distance(0.0, -40, 2.0), None);
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut tracker = BeaconTracker::new(BeaconSettings::default());
        for rssi in [-40, -90, -90, -90, -90] {
            tracker.observe(&observation("AA:BB:CC:DD:EE:FF", "meeblue", rssi));
        }

        let reading = tracker.readings().pop().unwrap();
        // The -40 reading has fallen out of the four-sample window.
        assert_eq!(reading.smoothed_rssi, -90.0);
        assert_eq!(reading.rssi, -90);
    }

    #[test]
    fn test_summary_line() {
        let mut tracker = BeaconTracker::new(BeaconSettings::default());
        let reading = tracker
            .observe(&observation("dd:2b:7c:c0:a0:84", "", -60))
            .unwrap();
        assert_eq!(reading.address, "DD:2B:7C:C0:A0:84");
        assert_eq!(reading.summary_line(), "DD:2B:7C:C0:A0:84 - -60 dB - 10.00 m");
    }
}
