pub mod health;
pub mod lookup;
pub mod params;
pub mod types;

pub use health::{AppStartTime, HealthService, health_routes};
pub use lookup::{LookupService, lookup_routes};
pub use types::{ErrorBody, IpOnlyBody, IpOnlyQuery, IpQuery};
