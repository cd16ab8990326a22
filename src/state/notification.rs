//! Notifications pushed to the display, and the sinks that carry them

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use super::TimerSnapshot;

pub const TOAST_TITLE: &str = "Focus Timer";

/// Ambient indicator state for badge rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeStatus {
    Running,
    Paused,
    Stopped,
}

/// A message pushed to the window, tagged with its channel name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum UiNotification {
    #[serde(rename_all = "camelCase")]
    TimerUpdate {
        remaining_seconds: u64,
        is_focus_period: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_running: Option<bool>,
    },
    ShowToast {
        title: String,
        description: String,
    },
    #[serde(rename = "pomo-update-badge", rename_all = "camelCase")]
    UpdateBadge {
        status: BadgeStatus,
        is_focus_period: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remaining_seconds: Option<u64>,
    },
    TimerStatus(Option<TimerSnapshot>),
}

impl UiNotification {
    /// Toast announcing which period just began
    pub fn period_toast(is_focus_period: bool) -> Self {
        let description = if is_focus_period { "Focus started" } else { "Break started" };
        UiNotification::ShowToast {
            title: TOAST_TITLE.to_string(),
            description: description.to_string(),
        }
    }

    /// Channel name the display listens on
    pub fn channel(&self) -> &'static str {
        match self {
            UiNotification::TimerUpdate { .. } => "timer-update",
            UiNotification::ShowToast { .. } => "show-toast",
            UiNotification::UpdateBadge { .. } => "pomo-update-badge",
            UiNotification::TimerStatus(_) => "timer-status",
        }
    }
}

/// A window or display handle that accepts pushed notifications
pub trait NotificationSink: Send + Sync {
    fn push(&self, notification: UiNotification);
}

/// Fans notifications out to every connected display
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<UiNotification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiNotification> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn push(&self, notification: UiNotification) {
        // No display connected is not an error
        if self.tx.send(notification).is_err() {
            debug!("No display subscribed, notification dropped");
        }
    }
}

/// Delivers notifications to a single in-process receiver
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UiNotification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn push(&self, notification: UiNotification) {
        if self.tx.send(notification).is_err() {
            debug!("Notification receiver closed, notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn toast_text_follows_period() {
        assert_eq!(
            UiNotification::period_toast(false),
            UiNotification::ShowToast {
                title: TOAST_TITLE.to_string(),
                description: "Break started".to_string(),
            }
        );
    }

    #[test]
    fn badge_serializes_with_channel_tag() {
        let badge = UiNotification::UpdateBadge {
            status: BadgeStatus::Stopped,
            is_focus_period: true,
            remaining_seconds: None,
        };
        assert_eq!(badge.channel(), "pomo-update-badge");
        assert_eq!(
            serde_json::to_value(&badge).unwrap(),
            json!({
                "channel": "pomo-update-badge",
                "payload": {"status": "stopped", "isFocusPeriod": true}
            })
        );
    }

    #[test]
    fn empty_status_reply_is_null() {
        let reply = UiNotification::TimerStatus(None);
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"channel": "timer-status", "payload": null})
        );
    }

    #[tokio::test]
    async fn broadcast_sink_without_subscribers_does_not_panic() {
        let sink = BroadcastSink::new(4);
        sink.push(UiNotification::period_toast(true));

        let mut rx = sink.subscribe();
        sink.push(UiNotification::TimerStatus(None));
        assert_eq!(rx.recv().await.unwrap(), UiNotification::TimerStatus(None));
    }
}
