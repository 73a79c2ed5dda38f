// libs/appointment-cell/src/services/rating.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use provider_cell::models::Provider;
use shared_store::Collection;

use crate::models::{Appointment, BookingError};

/// Recomputes a provider's average rating from scratch whenever a review
/// lands. Full scan is fine at expected review volumes; switch to a
/// (count, sum) pair if that ever changes.
pub struct RatingAggregator {
    appointments: Arc<Collection<Appointment>>,
    providers: Arc<Collection<Provider>>,
}

impl RatingAggregator {
    pub fn new(
        appointments: Arc<Collection<Appointment>>,
        providers: Arc<Collection<Provider>>,
    ) -> Self {
        Self {
            appointments,
            providers,
        }
    }

    /// Arithmetic mean of every attached review rating for the provider,
    /// rounded to one decimal; 0.0 when no reviews exist. Persists the
    /// result on the provider document and returns it.
    pub async fn recompute(&self, provider_id: Uuid) -> Result<f64, BookingError> {
        let ratings: Vec<u8> = self
            .appointments
            .find(|apt| apt.provider_id == provider_id && apt.review.is_some())
            .await
            .into_iter()
            .filter_map(|apt| apt.review.map(|review| review.rating))
            .collect();

        let average = if ratings.is_empty() {
            0.0
        } else {
            let sum: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
            let mean = f64::from(sum) / ratings.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        debug!(
            "Recomputed rating for provider {}: {} from {} reviews",
            provider_id,
            average,
            ratings.len()
        );

        self.providers
            .try_update(provider_id, |provider: &mut Provider| {
                provider.average_rating = average;
                provider.updated_at = Utc::now();
                Ok::<(), BookingError>(())
            })
            .await
            .map_err(|err| match err {
                BookingError::Storage(shared_store::StoreError::NotFound) => {
                    BookingError::ProviderNotFound
                }
                other => other,
            })?;

        info!("Provider {} average rating is now {}", provider_id, average);
        Ok(average)
    }
}
