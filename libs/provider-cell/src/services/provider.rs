// libs/provider-cell/src/services/provider.rs
use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_store::Collection;

use crate::models::{Provider, RegisterProviderRequest, ScheduleError, WeeklyTemplate};

pub struct ProviderService {
    providers: Arc<Collection<Provider>>,
}

impl ProviderService {
    pub fn new(providers: Arc<Collection<Provider>>) -> Self {
        Self { providers }
    }

    /// Register a provider with its weekly template. The template is fixed
    /// from this point on; only slot availability flags change later.
    pub async fn register(
        &self,
        request: RegisterProviderRequest,
    ) -> Result<Provider, ScheduleError> {
        if request.name.trim().is_empty() {
            return Err(ScheduleError::Validation(
                "provider name must not be empty".to_string(),
            ));
        }
        if request.template.is_empty() {
            return Err(ScheduleError::Validation(
                "weekly template must cover at least one weekday".to_string(),
            ));
        }
        // Deserialized requests bypass WeeklyTemplate::new.
        request.template.validate()?;

        let now = Utc::now();
        let provider = Provider {
            id: Uuid::new_v4(),
            owner_id: request.owner_id,
            name: request.name,
            is_open: true,
            average_rating: 0.0,
            template: request.template,
            created_at: now,
            updated_at: now,
        };

        self.providers.insert(provider.id, provider.clone()).await?;
        info!("Provider {} registered ({})", provider.id, provider.name);
        Ok(provider)
    }

    /// Register with plain opening hours; the template is generated over
    /// the standard week at the configured default granularity.
    pub async fn register_with_hours(
        &self,
        config: &AppConfig,
        owner_id: Uuid,
        name: String,
        open: NaiveTime,
        close: NaiveTime,
    ) -> Result<Provider, ScheduleError> {
        let template = WeeklyTemplate::standard_week(open, close, config.default_slot_minutes)?;
        self.register(RegisterProviderRequest {
            owner_id,
            name,
            template,
        })
        .await
    }

    pub async fn get(&self, provider_id: Uuid) -> Result<Provider, ScheduleError> {
        self.providers
            .get(provider_id)
            .await
            .map_err(|_| ScheduleError::ProviderNotFound)
    }

    /// Manual open/closed override, independent of the weekly schedule.
    pub async fn set_open(&self, provider_id: Uuid, open: bool) -> Result<Provider, ScheduleError> {
        debug!("Setting provider {} open flag to {}", provider_id, open);

        let updated = self
            .providers
            .try_update(provider_id, |provider: &mut Provider| {
                provider.is_open = open;
                provider.updated_at = Utc::now();
                Ok::<Provider, ScheduleError>(provider.clone())
            })
            .await
            .map_err(remap_not_found)?;

        Ok(updated)
    }
}

pub(crate) fn remap_not_found(err: ScheduleError) -> ScheduleError {
    match err {
        ScheduleError::Storage(shared_store::StoreError::NotFound) => {
            ScheduleError::ProviderNotFound
        }
        other => other,
    }
}
