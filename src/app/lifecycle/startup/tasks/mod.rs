mod catalog_load;
mod config_load;
mod observability;
mod partners_load;
mod pipelines;
mod start_server;
mod telemetry;

pub use catalog_load::CatalogLoadTask;
pub use config_load::ConfigLoadTask;
pub use observability::ObservabilityInitTask;
pub use partners_load::PartnersLoadTask;
pub use pipelines::BuildPipelinesTask;
pub use start_server::StartServerTask;
pub use telemetry::TelemetryInitTask;
