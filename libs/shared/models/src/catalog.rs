use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable service as published by the catalog collaborator. The core
/// snapshots `price` into the appointment at booking time and never
/// re-queries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub price: f64,
    pub duration_minutes: i32,
}

/// Service/price catalog boundary (implemented outside this core).
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn offering(&self, service_id: Uuid) -> Option<ServiceOffering>;
}
