use std::sync::Arc;

use tracing::warn;

use shared_models::{Notification, NotificationDispatcher};

pub mod admin;
pub mod booking;
pub mod conflict;
pub mod consistency;
pub mod lifecycle;
pub mod rating;
pub mod review;

pub use admin::AdminService;
pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use consistency::BookingLockRegistry;
pub use lifecycle::AppointmentLifecycleService;
pub use rating::RatingAggregator;
pub use review::ReviewService;

/// Fire-and-forget notification dispatch. Runs after the triggering state
/// change has committed; failures are logged and never propagated.
pub(crate) fn spawn_dispatch(
    dispatcher: Arc<dyn NotificationDispatcher>,
    notification: Notification,
) {
    tokio::spawn(async move {
        if let Err(err) = dispatcher.dispatch(notification).await {
            warn!("Notification dispatch failed: {}", err);
        }
    });
}
