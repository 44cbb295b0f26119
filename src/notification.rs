use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::constants::NOTIFICATION_DISMISS_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    Success,
    Congratulations,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn congratulations(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Congratulations,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notification>,
    generation: u64,
}

/// Holds at most one visible notification.
///
/// Success notifications clear themselves after the dismiss delay unless the user
/// dismissed them first or a newer notification replaced them. Other kinds stay
/// until dismissed.
#[derive(Debug, Clone)]
pub struct NotificationSlot {
    slot: Arc<Mutex<Slot>>,
    dismiss_after: Duration,
}

impl Default for NotificationSlot {
    fn default() -> Self {
        Self::new(Duration::from_millis(NOTIFICATION_DISMISS_MS))
    }
}

impl NotificationSlot {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            dismiss_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called from within a tokio runtime when `notification` auto-dismisses.
    pub fn show(&self, notification: Notification) {
        let auto_dismiss = notification.kind == NotificationKind::Success;
        let generation = {
            let mut slot = self.lock();
            slot.generation += 1;
            slot.current = Some(notification);
            slot.generation
        };
        if !auto_dismiss {
            return;
        }
        let slot = self.slot.clone();
        let delay = self.dismiss_after;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation && slot.current.is_some() {
                debug!("auto-dismissing notification");
                slot.current = None;
            }
        });
    }

    pub fn dismiss(&self) {
        self.lock().current = None;
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().current.clone()
    }
}
