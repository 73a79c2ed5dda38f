// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use provider_cell::models::{Provider, ScheduleError};
use provider_cell::services::SlotResolver;
use shared_config::AppConfig;
use shared_models::{Notification, NotificationKind, NotificationDispatcher, ServiceCatalog};
use shared_store::Collection;

use crate::models::{
    Appointment, AppointmentStatus, BookingError, BookingRules, ReserveRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::consistency::BookingLockRegistry;
use crate::services::spawn_dispatch;

pub struct AppointmentBookingService {
    providers: Arc<Collection<Provider>>,
    appointments: Arc<Collection<Appointment>>,
    catalog: Arc<dyn ServiceCatalog>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    conflict_service: ConflictDetectionService,
    locks: BookingLockRegistry,
    rules: BookingRules,
}

impl AppointmentBookingService {
    pub fn new(
        config: &AppConfig,
        providers: Arc<Collection<Provider>>,
        appointments: Arc<Collection<Appointment>>,
        catalog: Arc<dyn ServiceCatalog>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let rules = BookingRules::from_config(config);
        let conflict_service = ConflictDetectionService::new(Arc::clone(&appointments), &rules);

        Self {
            providers,
            appointments,
            catalog,
            dispatcher,
            conflict_service,
            locks: BookingLockRegistry::new(),
            rules,
        }
    }

    /// Reserve a slot: validate the request, serialize against racing
    /// reservations for the same slot, create the pending appointment, and
    /// flip the matched slot unavailable. The booking-created notification
    /// goes out after everything has committed.
    pub async fn reserve(&self, request: ReserveRequest) -> Result<Appointment, BookingError> {
        info!(
            "Reserving slot for user {} with provider {} on {} {}",
            request.user_id, request.provider_id, request.date, request.time
        );

        // Step 1: syntactic validation, then the past/horizon check.
        let time = parse_strict_time(&request.time)?;
        let (date, weekday) = SlotResolver::resolve_date(&request.date)?;

        let now = Utc::now().naive_utc();
        let requested = date.and_time(time);
        if requested <= now {
            return Err(BookingError::PastDateTime);
        }
        if requested > now + Duration::days(self.rules.max_advance_booking_days) {
            return Err(BookingError::Validation(format!(
                "bookings may be placed at most {} days ahead",
                self.rules.max_advance_booking_days
            )));
        }

        // Step 2: serialize the check-then-act section per slot key.
        let _guard = self.locks.acquire(request.provider_id, date, time).await;

        let provider = self
            .providers
            .get(request.provider_id)
            .await
            .map_err(|_| BookingError::ProviderNotFound)?;

        if !provider.is_open {
            return Err(BookingError::ProviderClosed);
        }

        let slots = provider
            .template
            .day(weekday)
            .ok_or(ScheduleError::NoScheduleForDay { weekday })?;
        let slot = slots
            .iter()
            .find(|slot| slot.start_time == time)
            .ok_or(BookingError::SlotNotFound)?;
        if !slot.available {
            return Err(BookingError::SlotUnavailable);
        }

        // Step 3: collision window over existing bookings.
        if self
            .conflict_service
            .has_conflicting_appointment(request.provider_id, date, time, None)
            .await
        {
            return Err(BookingError::ConflictingAppointment);
        }

        // Step 4: price snapshot. A pre-validated final price (coupon path)
        // wins over the raw catalog price.
        let total_price = match request.final_price {
            Some(price) if price >= 0.0 => price,
            Some(_) => {
                return Err(BookingError::Validation(
                    "final price must not be negative".to_string(),
                ))
            }
            None => {
                let offering = self
                    .catalog
                    .offering(request.service_id)
                    .await
                    .ok_or(BookingError::ServiceNotFound)?;
                offering.price
            }
        };

        // Step 5: create the appointment, then flip the slot inside the
        // provider document's atomic update.
        let created_at = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            provider_id: request.provider_id,
            service_id: request.service_id,
            vehicle_id: request.vehicle_id,
            date,
            time,
            status: AppointmentStatus::Pending,
            total_price,
            notes: request.notes,
            review: None,
            created_at,
            updated_at: created_at,
        };
        self.appointments
            .insert(appointment.id, appointment.clone())
            .await?;

        let flip = self
            .providers
            .try_update(request.provider_id, |provider: &mut Provider| {
                let slot = provider
                    .template
                    .slot_mut(weekday, time)
                    .ok_or(BookingError::SlotNotFound)?;
                slot.available = false;
                provider.updated_at = Utc::now();
                Ok::<(), BookingError>(())
            })
            .await;

        if let Err(err) = flip {
            // Roll the appointment back rather than leave a booking whose
            // slot was never taken.
            warn!(
                "Slot flip failed for appointment {}, rolling back: {}",
                appointment.id, err
            );
            let _ = self.appointments.remove(appointment.id).await;
            return Err(err);
        }

        debug!(
            "Slot {} {} taken for provider {}",
            date, time, request.provider_id
        );

        spawn_dispatch(
            Arc::clone(&self.dispatcher),
            Notification::new(
                provider.owner_id,
                NotificationKind::BookingCreated,
                "New appointment request",
                format!("Appointment requested for {} at {}", date, time),
                appointment.id,
            ),
        );

        info!("Appointment {} reserved (pending)", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        self.appointments
            .get(appointment_id)
            .await
            .map_err(|_| BookingError::NotFound)
    }

    pub async fn appointments_for_provider(&self, provider_id: Uuid) -> Vec<Appointment> {
        self.appointments
            .find(|apt| apt.provider_id == provider_id)
            .await
    }

    pub async fn appointments_for_user(&self, user_id: Uuid) -> Vec<Appointment> {
        self.appointments.find(|apt| apt.user_id == user_id).await
    }
}

/// Strict `HH:MM`, 24-hour. Rejects shorthand forms chrono would accept.
fn parse_strict_time(raw: &str) -> Result<NaiveTime, BookingError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit();

    if !well_formed {
        return Err(BookingError::Validation(
            "time must be HH:MM, 24-hour".to_string(),
        ));
    }

    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| BookingError::Validation("time must be HH:MM, 24-hour".to_string()))
}
