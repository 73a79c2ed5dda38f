// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_store::Collection;

use crate::models::{Appointment, BookingRules};

/// Detects bookings that collide with a requested start time. Slot
/// identity alone is not enough: templates can be reconfigured between
/// bookings, so anything starting inside the ±window around an existing
/// non-cancelled appointment is treated as a conflict.
pub struct ConflictDetectionService {
    appointments: Arc<Collection<Appointment>>,
    window_minutes: i64,
}

impl ConflictDetectionService {
    pub fn new(appointments: Arc<Collection<Appointment>>, rules: &BookingRules) -> Self {
        Self {
            appointments,
            window_minutes: rules.collision_window_minutes,
        }
    }

    /// True when some non-cancelled appointment for the provider starts
    /// strictly inside the collision window around the requested moment.
    /// The comparison is datetime-based, so a window reaching across
    /// midnight still catches the neighbouring day's bookings. Starts
    /// exactly one window apart do not conflict, which keeps templates at
    /// window granularity bookable back to back.
    pub async fn has_conflicting_appointment(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
    ) -> bool {
        debug!(
            "Checking collision window ({} min) for provider {} at {} {}",
            self.window_minutes, provider_id, date, time
        );

        let requested = date.and_time(time);
        let window = self.window_minutes;
        let conflicting = self
            .appointments
            .find(|apt| {
                apt.provider_id == provider_id
                    && apt.status.blocks_slot()
                    && Some(apt.id) != exclude_appointment_id
                    && apt.minutes_from(requested).abs() < window
            })
            .await;

        if !conflicting.is_empty() {
            warn!(
                "Conflict detected for provider {} at {} {} - {} overlapping appointments",
                provider_id,
                date,
                time,
                conflicting.len()
            );
            return true;
        }

        false
    }
}
