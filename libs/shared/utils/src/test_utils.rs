//! In-process doubles and fixtures shared by the cell test suites.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use provider_cell::models::{RegisterProviderRequest, Weekday, WeeklyTemplate};
use shared_models::{
    Notification, NotificationDispatcher, ServiceCatalog, ServiceOffering,
};

// ==============================================================================
// CATALOG DOUBLE
// ==============================================================================

/// Fixed-content catalog standing in for the service/price collaborator.
#[derive(Default)]
pub struct StaticCatalog {
    offerings: HashMap<Uuid, ServiceOffering>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offering(mut self, offering: ServiceOffering) -> Self {
        self.offerings.insert(offering.id, offering);
        self
    }
}

#[async_trait]
impl ServiceCatalog for StaticCatalog {
    async fn offering(&self, service_id: Uuid) -> Option<ServiceOffering> {
        self.offerings.get(&service_id).cloned()
    }
}

pub fn offering_fixture(provider_id: Uuid, price: f64) -> ServiceOffering {
    ServiceOffering {
        id: Uuid::new_v4(),
        provider_id,
        name: "Exterior wash".to_string(),
        price,
        duration_minutes: 60,
    }
}

// ==============================================================================
// NOTIFICATION DOUBLE
// ==============================================================================

/// Dispatcher that forwards every event into a channel so tests can await
/// fire-and-forget deliveries deterministically.
pub struct RecordingDispatcher {
    tx: UnboundedSender<Notification>,
}

impl RecordingDispatcher {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: Notification) -> anyhow::Result<()> {
        self.tx.send(notification)?;
        Ok(())
    }
}

// ==============================================================================
// SCHEDULE FIXTURES
// ==============================================================================

/// Monday-to-Saturday hourly template, 09:00-17:00.
pub fn hourly_template() -> WeeklyTemplate {
    WeeklyTemplate::standard_week(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        60,
    )
    .unwrap()
}

/// Fifteen-minute granularity template, for collision-window cases.
pub fn quarter_hour_template() -> WeeklyTemplate {
    WeeklyTemplate::standard_week(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        15,
    )
    .unwrap()
}

pub fn provider_request(owner_id: Uuid, template: WeeklyTemplate) -> RegisterProviderRequest {
    RegisterProviderRequest {
        owner_id,
        name: "Test Garage".to_string(),
        template,
    }
}

/// The next strictly-future calendar date falling on `weekday` (never
/// today, so morning slots are always in the future).
pub fn next_date_on(weekday: Weekday) -> NaiveDate {
    let today = Utc::now().date_naive();
    (1..=7)
        .map(|offset| today + Duration::days(offset))
        .find(|date| Weekday::from(date.weekday()) == weekday)
        .unwrap()
}

pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
