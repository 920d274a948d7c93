//! System notifications - the toast surface the trigger system posts to.

use std::time::{Duration, Instant};

/// Content of one system notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Id of the trigger that produced this notification.
    pub trigger_id: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone)]
struct ActiveNotification {
    notification: Notification,
    expires_at: Instant,
}

/// Holds the currently visible notifications.
///
/// Each notification auto-dismisses after a fixed duration unless the player
/// dismisses it earlier. Expiry is driven by the session loop passing the
/// current instant, which keeps the behavior deterministic under test.
#[derive(Debug)]
pub struct NotificationCenter {
    active: Vec<ActiveNotification>,
    duration: Duration,
}

impl NotificationCenter {
    /// Create a center with the given display duration.
    pub fn new(duration: Duration) -> Self {
        Self {
            active: Vec::new(),
            duration,
        }
    }

    /// Post a notification at the given instant.
    pub fn post_at(&mut self, notification: Notification, now: Instant) {
        self.active.push(ActiveNotification {
            notification,
            expires_at: now + self.duration,
        });
    }

    /// Post a notification now.
    pub fn post(&mut self, notification: Notification) {
        self.post_at(notification, Instant::now());
    }

    /// Dismiss a notification by its trigger id. Unknown ids are ignored.
    pub fn dismiss(&mut self, trigger_id: &str) {
        self.active.retain(|n| n.notification.trigger_id != trigger_id);
    }

    /// Drop every notification whose display time has elapsed.
    pub fn expire(&mut self, now: Instant) {
        self.active.retain(|n| n.expires_at > now);
    }

    /// The currently visible notifications, oldest first.
    pub fn active(&self) -> Vec<&Notification> {
        self.active.iter().map(|n| &n.notification).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
