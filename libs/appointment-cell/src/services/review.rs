// libs/appointment-cell/src/services/review.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use provider_cell::models::Provider;
use shared_models::{AuthContext, Notification, NotificationKind, NotificationDispatcher};
use shared_store::Collection;

use crate::models::{Appointment, AppointmentStatus, BookingError, Review};
use crate::services::rating::RatingAggregator;
use crate::services::spawn_dispatch;

pub struct ReviewService {
    appointments: Arc<Collection<Appointment>>,
    providers: Arc<Collection<Provider>>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    rating: RatingAggregator,
}

impl ReviewService {
    pub fn new(
        appointments: Arc<Collection<Appointment>>,
        providers: Arc<Collection<Provider>>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let rating = RatingAggregator::new(Arc::clone(&appointments), Arc::clone(&providers));
        Self {
            appointments,
            providers,
            dispatcher,
            rating,
        }
    }

    /// Attach a review to a completed appointment. Only the appointment's
    /// own user may review, exactly once. The provider's average rating is
    /// recomputed synchronously before returning.
    pub async fn attach_review(
        &self,
        appointment_id: Uuid,
        rating: u8,
        comment: Option<String>,
        actor: AuthContext,
    ) -> Result<Appointment, BookingError> {
        debug!(
            "Review requested on appointment {} by {}",
            appointment_id, actor.user_id
        );

        if !(1..=5).contains(&rating) {
            return Err(BookingError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        let current = self
            .appointments
            .get(appointment_id)
            .await
            .map_err(|_| BookingError::NotFound)?;

        if actor.user_id != current.user_id {
            return Err(BookingError::Forbidden);
        }

        let updated = self
            .appointments
            .try_update(appointment_id, |apt: &mut Appointment| {
                if apt.status != AppointmentStatus::Completed {
                    return Err(BookingError::NotCompleted);
                }
                if apt.review.is_some() {
                    return Err(BookingError::AlreadyReviewed);
                }
                apt.review = Some(Review {
                    rating,
                    comment,
                    created_at: Utc::now(),
                });
                apt.updated_at = Utc::now();
                Ok(apt.clone())
            })
            .await?;

        let average = self.rating.recompute(updated.provider_id).await?;
        info!(
            "Review attached to appointment {}; provider {} now rated {}",
            appointment_id, updated.provider_id, average
        );

        if let Some(provider) = self.providers.try_get(updated.provider_id).await {
            spawn_dispatch(
                Arc::clone(&self.dispatcher),
                Notification::new(
                    provider.owner_id,
                    NotificationKind::ReviewSubmitted,
                    "New review",
                    format!("Appointment rated {}/5", rating),
                    updated.id,
                ),
            );
        }

        Ok(updated)
    }
}
