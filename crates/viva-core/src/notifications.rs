//! Typed notification broadcasting.
//!
//! The NotificationBus carries "show toast" notifications from the core to
//! whichever UI surfaces are listening (CLI, desktop shell, tests). It is
//! configured into the HTTP client explicitly rather than reached through
//! ambient global state.
//!
//! # Example
//!
//! ```rust
//! use viva_core::notifications::{Notification, NotificationBus};
//!
//! let bus = NotificationBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.notify(Notification::error("Session expired, please sign in again."));
//!
//! let toast = rx.try_recv().unwrap();
//! assert_eq!(toast.message, "Session expired, please sign in again.");
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Name of the event a UI surface should render as a toast.
pub const SHOW_TOAST_EVENT: &str = "show-toast";

/// Default channel capacity for the bus.
/// Slow subscribers that fall further behind than this miss notifications.
const DEFAULT_CAPACITY: usize = 64;

/// Severity tag attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        };
        f.write_str(s)
    }
}

/// A human-readable message plus a severity tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,

    #[serde(rename = "type")]
    pub kind: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: Severity) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

/// Broadcast channel for notifications.
///
/// Uses a tokio broadcast channel, so every subscriber sees every
/// notification published after it subscribed. Publishing never blocks and
/// works outside an async runtime.
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with the given buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification to all subscribers.
    ///
    /// Returns how many subscribers received it. With no subscribers the
    /// notification is dropped and 0 is returned.
    pub fn notify(&self, notification: Notification) -> usize {
        log::debug!(
            "{} [{}] {}",
            SHOW_TOAST_EVENT,
            notification.kind,
            notification.message
        );
        self.sender.send(notification).unwrap_or(0)
    }

    /// Subscribe to all future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod notification {
        use super::*;

        #[test]
        fn serializes_with_type_field() {
            let n = Notification::error("expired");
            let value = serde_json::to_value(&n).unwrap();
            assert_eq!(value["message"], "expired");
            assert_eq!(value["type"], "error");
        }

        #[test]
        fn deserializes_from_toast_payload() {
            let n: Notification =
                serde_json::from_str(r#"{"message":"saved","type":"success"}"#).unwrap();
            assert_eq!(n.kind, Severity::Success);
            assert_eq!(n.message, "saved");
        }

        #[test]
        fn severity_display_matches_wire_form() {
            assert_eq!(Severity::Warning.to_string(), "warning");
            assert_eq!(
                serde_json::to_value(Severity::Info).unwrap(),
                serde_json::json!("info")
            );
        }
    }

    mod bus {
        use super::*;

        #[test]
        fn new_has_no_subscribers() {
            let bus = NotificationBus::new();
            assert_eq!(bus.subscriber_count(), 0);
        }

        #[test]
        fn dropped_subscriber_decrements_count() {
            let bus = NotificationBus::new();
            let rx = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 1);

            drop(rx);
            assert_eq!(bus.subscriber_count(), 0);
        }

        #[test]
        fn notify_without_subscribers_returns_zero() {
            let bus = NotificationBus::new();
            assert_eq!(bus.notify(Notification::error("x")), 0);
        }

        #[test]
        fn notify_reaches_every_subscriber() {
            let bus = NotificationBus::new();
            let mut rx1 = bus.subscribe();
            let mut rx2 = bus.subscribe();

            let count = bus.notify(Notification::error("expired"));
            assert_eq!(count, 2);

            assert_eq!(rx1.try_recv().unwrap().message, "expired");
            assert_eq!(rx2.try_recv().unwrap().kind, Severity::Error);
        }

        #[tokio::test]
        async fn async_subscriber_receives_in_order() {
            let bus = NotificationBus::new();
            let mut rx = bus.subscribe();

            bus.notify(Notification::new("one", Severity::Info));
            bus.notify(Notification::new("two", Severity::Warning));

            assert_eq!(rx.recv().await.unwrap().message, "one");
            assert_eq!(rx.recv().await.unwrap().message, "two");
        }

        #[test]
        fn late_subscriber_misses_old_notifications() {
            let bus = NotificationBus::new();
            bus.notify(Notification::error("early"));

            let mut late = bus.subscribe();
            assert!(late.try_recv().is_err());
        }
    }
}
