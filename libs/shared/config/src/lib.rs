use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Default slot granularity, in minutes, for providers registering
    /// without an explicit weekly template.
    pub default_slot_minutes: i64,
    /// Half-width of the booking collision window, in minutes.
    pub collision_window_minutes: i64,
    /// How far into the future a booking may be placed, in days.
    pub max_advance_booking_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            default_slot_minutes: read_i64("DEFAULT_SLOT_MINUTES", 60),
            collision_window_minutes: read_i64("COLLISION_WINDOW_MINUTES", 30),
            max_advance_booking_days: read_i64("MAX_ADVANCE_BOOKING_DAYS", 90),
        };

        if !config.is_valid() {
            warn!("Scheduling configuration has out-of-range values");
        }

        config
    }

    pub fn is_valid(&self) -> bool {
        self.default_slot_minutes > 0
            && self.collision_window_minutes >= 0
            && self.max_advance_booking_days > 0
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_slot_minutes: 60,
            collision_window_minutes: 30,
            max_advance_booking_days: 90,
        }
    }
}

fn read_i64(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid integer, using default {}", key, default);
            default
        }),
        Err(_) => default,
    }
}
