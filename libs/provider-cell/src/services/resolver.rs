// libs/provider-cell/src/services/resolver.rs
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_store::Collection;

use crate::models::{Provider, ScheduleError, TimeSlot, Weekday};

/// Maps a calendar date onto a provider's weekly template and returns the
/// currently bookable slots. Pure read; racing bookers are serialized by
/// the booking side, not here.
pub struct SlotResolver {
    providers: Arc<Collection<Provider>>,
}

impl SlotResolver {
    pub fn new(providers: Arc<Collection<Provider>>) -> Self {
        Self { providers }
    }

    /// Parse `date` (`YYYY-MM-DD`) and return it with its canonical
    /// weekday.
    pub fn resolve_date(date: &str) -> Result<(NaiveDate, Weekday), ScheduleError> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ScheduleError::InvalidDate)?;
        Ok((parsed, Weekday::from(parsed.weekday())))
    }

    pub async fn resolve_available_slots(
        &self,
        provider_id: Uuid,
        date: &str,
    ) -> Result<Vec<TimeSlot>, ScheduleError> {
        let (parsed, weekday) = Self::resolve_date(date)?;
        debug!(
            "Resolving available slots for provider {} on {} ({})",
            provider_id, parsed, weekday
        );

        let provider = self
            .providers
            .get(provider_id)
            .await
            .map_err(|_| ScheduleError::ProviderNotFound)?;

        let slots = provider
            .template
            .day(weekday)
            .ok_or(ScheduleError::NoScheduleForDay { weekday })?;

        let available: Vec<TimeSlot> = slots
            .iter()
            .filter(|slot| slot.available)
            .cloned()
            .collect();

        debug!(
            "Provider {} has {} available slots on {}",
            provider_id,
            available.len(),
            parsed
        );
        Ok(available)
    }
}
