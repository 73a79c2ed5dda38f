// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use provider_cell::models::Provider;
use shared_models::{AuthContext, Notification, NotificationKind, NotificationDispatcher};
use shared_store::Collection;

use crate::models::{Appointment, AppointmentStatus, BookingError};
use crate::services::spawn_dispatch;

/// Drives the appointment status lifecycle:
/// pending → {confirmed, cancelled}; confirmed → {completed, cancelled};
/// completed and cancelled are terminal.
pub struct AppointmentLifecycleService {
    appointments: Arc<Collection<Appointment>>,
    providers: Arc<Collection<Provider>>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AppointmentLifecycleService {
    pub fn new(
        appointments: Arc<Collection<Appointment>>,
        providers: Arc<Collection<Provider>>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            appointments,
            providers,
            dispatcher,
        }
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Pending => {
                &[AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
            }
            AppointmentStatus::Confirmed => {
                &[AppointmentStatus::Completed, AppointmentStatus::Cancelled]
            }
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed | AppointmentStatus::Cancelled => &[],
        }
    }

    /// Apply a status transition on behalf of `actor`. The transition
    /// commits atomically on the appointment document; the counter-party
    /// notification goes out afterwards, fire-and-forget.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        requested: AppointmentStatus,
        actor: AuthContext,
    ) -> Result<Appointment, BookingError> {
        debug!(
            "Transition requested on appointment {} to {} by {}",
            appointment_id, requested, actor.user_id
        );

        let current = self
            .appointments
            .get(appointment_id)
            .await
            .map_err(|_| BookingError::NotFound)?;

        let owner_id = self
            .providers
            .try_get(current.provider_id)
            .await
            .map(|provider| provider.owner_id);

        self.authorize(&current, requested, owner_id, actor)?;

        let updated = self
            .appointments
            .try_update(appointment_id, |apt: &mut Appointment| {
                // Re-checked under the document lock: a racing transition
                // may have landed since the read above.
                if requested == apt.status
                    || !Self::valid_transitions(apt.status).contains(&requested)
                {
                    warn!(
                        "Invalid status transition on appointment {}: {} -> {}",
                        appointment_id, apt.status, requested
                    );
                    return Err(BookingError::InvalidTransition(apt.status));
                }
                apt.status = requested;
                apt.updated_at = Utc::now();
                Ok(apt.clone())
            })
            .await?;

        info!(
            "Appointment {} transitioned to {}",
            appointment_id, updated.status
        );

        // Notify the counter-party: provider for user-initiated changes,
        // user otherwise.
        let recipient = if actor.user_id == updated.user_id {
            owner_id
        } else {
            Some(updated.user_id)
        };
        if let Some(recipient) = recipient {
            spawn_dispatch(
                Arc::clone(&self.dispatcher),
                Notification::new(
                    recipient,
                    NotificationKind::StatusChanged,
                    "Appointment status updated",
                    format!("Appointment is now {}", updated.status),
                    updated.id,
                ),
            );
        }

        Ok(updated)
    }

    fn authorize(
        &self,
        appointment: &Appointment,
        requested: AppointmentStatus,
        owner_id: Option<Uuid>,
        actor: AuthContext,
    ) -> Result<(), BookingError> {
        if actor.is_admin() {
            return Ok(());
        }
        if owner_id == Some(actor.user_id) {
            return Ok(());
        }
        if actor.user_id == appointment.user_id {
            // Plain users may only cancel their own appointments; there is
            // no user-initiated confirm or complete path.
            if requested == AppointmentStatus::Cancelled {
                return Ok(());
            }
            return Err(BookingError::Forbidden);
        }
        Err(BookingError::Forbidden)
    }
}
