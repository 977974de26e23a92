//! Update signal dispatcher
//!
//! The SDK push callback fires a per-device signal; every entity of that
//! device subscribes to it and refreshes its state when it arrives.

use dashmap::DashMap;
use landroid_core::UPDATE_SIGNAL;
use tokio::sync::broadcast;
use tracing::trace;

/// Default channel capacity for a signal
const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Name of the update signal for a device
pub fn update_signal(device_name: &str) -> String {
    format!("{}_{}", UPDATE_SIGNAL, device_name)
}

/// Named broadcast signals without payload
pub struct Dispatcher {
    signals: DashMap<String, broadcast::Sender<()>>,
    capacity: usize,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            signals: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to a signal
    pub fn connect(&self, signal: &str) -> broadcast::Receiver<()> {
        trace!(signal = %signal, "Connecting to signal");
        self.signals
            .entry(signal.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Fire a signal, returning how many receivers were notified
    pub fn send(&self, signal: &str) -> usize {
        trace!(signal = %signal, "Sending signal");
        match self.signals.get(signal) {
            // No active receivers is not an error
            Some(sender) => sender.send(()).unwrap_or(0),
            None => 0,
        }
    }

    /// Number of signals anyone ever connected to
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_name() {
        assert_eq!(update_signal("Mow Betty"), "landroid_cloud_update_Mow Betty");
    }

    #[tokio::test]
    async fn test_send_reaches_all_subscribers() {
        let dispatcher = Dispatcher::new();
        let mut first = dispatcher.connect("sig");
        let mut second = dispatcher.connect("sig");

        assert_eq!(dispatcher.send("sig"), 2);
        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[test]
    fn test_receiver_waits_for_signal() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.connect("sig");
        let mut recv = tokio_test::task::spawn(async move { rx.recv().await });

        tokio_test::assert_pending!(recv.poll());
        dispatcher.send("sig");
        assert!(recv.is_woken());
        tokio_test::assert_ready_ok!(recv.poll());
    }

    #[test]
    fn test_send_without_subscribers() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.send("nobody"), 0);
        assert_eq!(dispatcher.signal_count(), 0);
    }

    #[test]
    fn test_signals_are_independent() {
        let dispatcher = Dispatcher::new();
        let mut a = dispatcher.connect("a");
        let _b = dispatcher.connect("b");

        dispatcher.send("b");
        assert!(a.try_recv().is_err());
    }
}
