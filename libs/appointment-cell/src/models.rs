// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use provider_cell::ScheduleError;
use shared_config::AppConfig;
use shared_store::StoreError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    /// Price snapshot taken at booking time; never recomputed.
    pub total_price: f64,
    pub notes: Option<String>,
    pub review: Option<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Signed minutes between this appointment's start and the given
    /// moment. Datetime-based so windows spanning midnight compare
    /// correctly.
    pub fn minutes_from(&self, when: NaiveDateTime) -> i64 {
        (when - self.date.and_time(self.time)).num_minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// A booking still holds its slot and counts for collision checks
    /// unless it has been cancelled.
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Review embedded on the appointment it rates. At most one per
/// appointment, attached only after completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub user_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub vehicle_id: Uuid,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Wall-clock start, strict `HH:MM` 24-hour.
    pub time: String,
    pub notes: Option<String>,
    /// Pre-validated final price (coupon arithmetic happens outside the
    /// core). When absent the catalog price is snapshotted as-is.
    pub final_price: Option<f64>,
}

// ==============================================================================
// BOOKING RULES
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingRules {
    /// Half-width of the collision window around an existing booking's
    /// start time, in minutes.
    pub collision_window_minutes: i64,
    pub max_advance_booking_days: i64,
}

impl BookingRules {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            collision_window_minutes: config.collision_window_minutes,
            max_advance_booking_days: config.max_advance_booking_days,
        }
    }
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            collision_window_minutes: 30,
            max_advance_booking_days: 90,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error("appointment not found")]
    NotFound,

    #[error("provider not found")]
    ProviderNotFound,

    #[error("service not found in catalog")]
    ServiceNotFound,

    #[error("provider is currently closed")]
    ProviderClosed,

    #[error("no slot starts at the requested time")]
    SlotNotFound,

    #[error("slot is no longer available")]
    SlotUnavailable,

    #[error("requested date and time are in the past")]
    PastDateTime,

    #[error("an existing appointment conflicts with the requested time")]
    ConflictingAppointment,

    #[error("invalid status transition from {0}")]
    InvalidTransition(AppointmentStatus),

    #[error("actor is not permitted to perform this operation")]
    Forbidden,

    #[error("appointment is not completed")]
    NotCompleted,

    #[error("appointment already has a review")]
    AlreadyReviewed,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
