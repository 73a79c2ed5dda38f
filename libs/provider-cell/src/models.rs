// libs/provider-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

// ==============================================================================
// WEEKDAY
// ==============================================================================

/// Canonical weekday identifier, Monday-first (ISO numbering). All modules
/// use this one convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// ISO weekday number, 1 = Monday through 7 = Sunday.
    pub fn iso_number(&self) -> u8 {
        match self {
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
            Weekday::Sunday => 7,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weekday::Monday => write!(f, "monday"),
            Weekday::Tuesday => write!(f, "tuesday"),
            Weekday::Wednesday => write!(f, "wednesday"),
            Weekday::Thursday => write!(f, "thursday"),
            Weekday::Friday => write!(f, "friday"),
            Weekday::Saturday => write!(f, "saturday"),
            Weekday::Sunday => write!(f, "sunday"),
        }
    }
}

// ==============================================================================
// WEEKLY TEMPLATE
// ==============================================================================

/// A fixed wall-clock interval on some weekday during which the provider
/// can be booked. Slots are created at registration time and never added
/// or removed afterwards; only `available` toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub available: bool,
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            available: true,
        }
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// Recurring, non-date-specific schedule: an ordered sequence of
/// non-overlapping slots per weekday.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyTemplate {
    days: BTreeMap<Weekday, Vec<TimeSlot>>,
}

impl WeeklyTemplate {
    /// Build a template from explicit per-day slot lists, validating that
    /// every slot has `start < end` and that slots within one weekday are
    /// ordered and non-overlapping.
    pub fn new(days: BTreeMap<Weekday, Vec<TimeSlot>>) -> Result<Self, ScheduleError> {
        let template = Self { days };
        template.validate()?;
        Ok(template)
    }

    /// Re-check the template invariants. Required wherever a template
    /// enters from outside `new`, e.g. deserialized request payloads.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        for (weekday, slots) in &self.days {
            for slot in slots {
                if slot.start_time >= slot.end_time {
                    return Err(ScheduleError::Validation(format!(
                        "slot on {} has start {} not before end {}",
                        weekday, slot.start_time, slot.end_time
                    )));
                }
            }
            for pair in slots.windows(2) {
                if pair[1].start_time < pair[0].start_time {
                    return Err(ScheduleError::Validation(format!(
                        "slots on {} are not ordered by start time",
                        weekday
                    )));
                }
                if pair[0].overlaps(&pair[1]) {
                    return Err(ScheduleError::OverlappingSlots { weekday: *weekday });
                }
            }
        }
        Ok(())
    }

    /// Generate equal-length slots between `open` and `close` on the given
    /// weekdays. `slot_minutes` is the provider's chosen granularity.
    pub fn generate(
        open: NaiveTime,
        close: NaiveTime,
        slot_minutes: i64,
        weekdays: &[Weekday],
    ) -> Result<Self, ScheduleError> {
        if slot_minutes <= 0 {
            return Err(ScheduleError::Validation(
                "slot granularity must be positive".to_string(),
            ));
        }
        if open >= close {
            return Err(ScheduleError::Validation(
                "opening time must be before closing time".to_string(),
            ));
        }

        let step = Duration::minutes(slot_minutes);
        let mut day_slots = Vec::new();
        let mut current = open;
        while current + step <= close {
            day_slots.push(TimeSlot::new(current, current + step));
            current += step;
        }

        let mut days = BTreeMap::new();
        for weekday in weekdays {
            days.insert(*weekday, day_slots.clone());
        }
        Self::new(days)
    }

    /// Monday-through-Saturday template, the common registration default.
    pub fn standard_week(
        open: NaiveTime,
        close: NaiveTime,
        slot_minutes: i64,
    ) -> Result<Self, ScheduleError> {
        Self::generate(open, close, slot_minutes, &Weekday::ALL[..6])
    }

    pub fn day(&self, weekday: Weekday) -> Option<&[TimeSlot]> {
        self.days.get(&weekday).map(|slots| slots.as_slice())
    }

    pub fn slot_mut(&mut self, weekday: Weekday, start_time: NaiveTime) -> Option<&mut TimeSlot> {
        self.days
            .get_mut(&weekday)?
            .iter_mut()
            .find(|slot| slot.start_time == start_time)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeSlot])> {
        self.days
            .iter()
            .map(|(weekday, slots)| (*weekday, slots.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

// ==============================================================================
// PROVIDER
// ==============================================================================

/// A service-providing business. Owns its weekly template and a manual
/// open/closed override that is independent of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    /// Account id of the business owner; lifecycle authorization checks
    /// the acting party against this.
    pub owner_id: Uuid,
    pub name: String,
    pub is_open: bool,
    pub average_rating: f64,
    pub template: WeeklyTemplate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProviderRequest {
    pub owner_id: Uuid,
    pub name: String,
    pub template: WeeklyTemplate,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("provider not found")]
    ProviderNotFound,

    #[error("no slot starts at the requested time")]
    SlotNotFound,

    #[error("date is not a valid calendar date")]
    InvalidDate,

    #[error("provider has no schedule for {weekday}")]
    NoScheduleForDay { weekday: Weekday },

    #[error("slots on {weekday} overlap")]
    OverlappingSlots { weekday: Weekday },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
