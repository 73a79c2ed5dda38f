pub mod availability;
pub mod provider;
pub mod resolver;

pub use availability::AvailabilityService;
pub use provider::ProviderService;
pub use resolver::SlotResolver;
