pub mod api;
pub mod config;
pub mod domain;
pub mod metrics_server;
pub mod model;
pub mod observability;
pub mod store;

pub use domain::UsageRecord;
pub use model::BaselineModel;
pub use store::UsageStore;
