// libs/appointment-cell/src/services/admin.rs
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use provider_cell::models::Provider;
use shared_models::AuthContext;
use shared_store::Collection;

use crate::models::{Appointment, BookingError};

/// Administrative operations that cross the provider/appointment boundary.
pub struct AdminService {
    providers: Arc<Collection<Provider>>,
    appointments: Arc<Collection<Appointment>>,
}

impl AdminService {
    pub fn new(
        providers: Arc<Collection<Provider>>,
        appointments: Arc<Collection<Appointment>>,
    ) -> Self {
        Self {
            providers,
            appointments,
        }
    }

    /// Remove a provider and cascade-delete every appointment referencing
    /// it. This is the only path that physically deletes appointments;
    /// cancellation everywhere else is a status, not a removal.
    pub async fn remove_provider(
        &self,
        provider_id: Uuid,
        actor: AuthContext,
    ) -> Result<Vec<Appointment>, BookingError> {
        if !actor.is_admin() {
            warn!(
                "Non-admin {} attempted provider removal for {}",
                actor.user_id, provider_id
            );
            return Err(BookingError::Forbidden);
        }

        self.providers
            .remove(provider_id)
            .await
            .map_err(|_| BookingError::ProviderNotFound)?;

        let removed = self
            .appointments
            .remove_where(|apt| apt.provider_id == provider_id)
            .await;

        info!(
            "Provider {} removed with {} cascaded appointments",
            provider_id,
            removed.len()
        );
        Ok(removed)
    }
}
