pub mod health;
pub mod metrics;
pub mod v1;

pub const API_VERSION: &str = "/v1";
