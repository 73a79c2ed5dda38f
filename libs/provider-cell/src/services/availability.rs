// libs/provider-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::Collection;

use crate::models::{Provider, ScheduleError, TimeSlot, Weekday, WeeklyTemplate};
use crate::services::provider::remap_not_found;

/// Owns the weekly-template side of a provider document: template reads,
/// targeted availability flips, and the bulk configuration overwrite.
pub struct AvailabilityService {
    providers: Arc<Collection<Provider>>,
}

impl AvailabilityService {
    pub fn new(providers: Arc<Collection<Provider>>) -> Self {
        Self { providers }
    }

    pub async fn get_weekly_template(
        &self,
        provider_id: Uuid,
    ) -> Result<WeeklyTemplate, ScheduleError> {
        debug!("Fetching weekly template for provider {}", provider_id);

        let provider = self
            .providers
            .get(provider_id)
            .await
            .map_err(|_| ScheduleError::ProviderNotFound)?;

        Ok(provider.template)
    }

    /// Flip one slot's availability flag. No side effects beyond the
    /// targeted slot; the mutation runs inside the provider document's
    /// atomic read-modify-write.
    pub async fn set_slot_availability(
        &self,
        provider_id: Uuid,
        weekday: Weekday,
        slot_start: NaiveTime,
        available: bool,
    ) -> Result<TimeSlot, ScheduleError> {
        debug!(
            "Setting slot {} {} for provider {} to available={}",
            weekday, slot_start, provider_id, available
        );

        self.providers
            .try_update(provider_id, |provider: &mut Provider| {
                let slot = provider
                    .template
                    .slot_mut(weekday, slot_start)
                    .ok_or(ScheduleError::SlotNotFound)?;
                slot.available = available;
                let snapshot = slot.clone();
                provider.updated_at = Utc::now();
                Ok(snapshot)
            })
            .await
            .map_err(remap_not_found)
    }

    /// Bulk overwrite of the weekly template (provider/admin configuration
    /// path). The incoming template is validated the same way as at
    /// registration.
    pub async fn set_weekly_template(
        &self,
        provider_id: Uuid,
        template: WeeklyTemplate,
    ) -> Result<(), ScheduleError> {
        if template.is_empty() {
            return Err(ScheduleError::Validation(
                "weekly template must cover at least one weekday".to_string(),
            ));
        }
        template.validate()?;

        self.providers
            .try_update(provider_id, |provider: &mut Provider| {
                provider.template = template;
                provider.updated_at = Utc::now();
                Ok::<(), ScheduleError>(())
            })
            .await
            .map_err(remap_not_found)?;

        info!("Weekly template replaced for provider {}", provider_id);
        Ok(())
    }
}
