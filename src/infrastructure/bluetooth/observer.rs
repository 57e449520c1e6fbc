//! Observer hook receiving every discovered device.

use crate::domain::models::{AppEvent, DeviceObservation};
use tokio::sync::mpsc;

/// One-way sink for discovered devices.
///
/// Called synchronously from the platform callback thread, once per event
/// and in callback order, so implementations must return quickly.
pub trait DeviceObserver: Send + Sync {
    fn on_device_discovered(&self, observation: DeviceObservation);
}

impl<F> DeviceObserver for F
where
    F: Fn(DeviceObservation) + Send + Sync,
{
    fn on_device_discovered(&self, observation: DeviceObservation) {
        self(observation)
    }
}

/// Forwards observations into the application event channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    event_sender: mpsc::UnboundedSender<AppEvent>,
}

impl ChannelObserver {
    pub fn new(event_sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { event_sender }
    }
}

impl DeviceObserver for ChannelObserver {
    fn on_device_discovered(&self, observation: DeviceObservation) {
        // The receiver going away only means nobody is listening anymore.
        let _ = self.event_sender.send(AppEvent::DeviceFound(observation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_emits_device_found() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let observer = ChannelObserver::new(tx);
        observer.on_device_discovered(DeviceObservation {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: "Beacon1".to_string(),
            signal_strength: -67,
        });

        match rx.try_recv() {
            Ok(AppEvent::DeviceFound(device)) => assert_eq!(device.name, "Beacon1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel::<AppEvent>();
        drop(rx);
        ChannelObserver::new(tx).on_device_discovered(DeviceObservation {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            name: String::new(),
            signal_strength: -80,
        });
    }
}
