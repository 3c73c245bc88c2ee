pub mod hub;
pub mod routes;

pub use hub::{HubStats, RadarHub};
pub use routes::routes;
