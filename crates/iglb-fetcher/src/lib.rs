pub mod analytics;
pub mod client;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod normalize;
pub mod sources;
pub mod status;
pub mod types;

pub use analytics::{GrowthStats, ProfileAnalytics};
pub use client::{AdminAction, LeaderboardClient, MutationAck};
pub use error::FetchError;
pub use executor::SourceFailure;
pub use sources::{Resource, SourceDescriptor, SourceRegistry, Transport};
pub use status::{ServiceProbe, ServiceState, ServiceStatusReport};
