pub mod cache;
pub mod constants;
pub mod store;
pub mod telemetry;

pub use cache::{AnalysisCache, CacheStats};
pub use store::TokenStore;
pub use telemetry::{TelemetryCollector, TelemetryEvent, ThreatType};
