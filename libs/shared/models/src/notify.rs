use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingCreated,
    StatusChanged,
    ReviewSubmitted,
    ProviderRemoved,
}

/// Outbound notification event. Dispatch is best-effort: failures are
/// logged by the caller and never roll back the triggering operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_entity: Uuid,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        related_entity: Uuid,
    ) -> Self {
        Self {
            recipient_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_entity,
        }
    }
}

/// Notification dispatcher boundary (delivery transport lives outside
/// this core).
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Default dispatcher that only records the event in the log stream.
pub struct TracingDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn dispatch(&self, notification: Notification) -> anyhow::Result<()> {
        info!(
            recipient = %notification.recipient_id,
            kind = ?notification.kind,
            "notification: {}",
            notification.title
        );
        Ok(())
    }
}
