use crate::app::config::SspConfig;
use crate::app::state::ServiceState;
use crate::core::catalog::manager::CatalogManager;
use crate::core::managers::PartnerManager;
use crate::core::telemetry::TelemetrySink;
use actix_web::dev::ServerHandle;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing_appender::non_blocking::WorkerGuard;

/// Shared context the startup and shutdown pipelines populate and
/// consume. Each slot is set exactly once by the task that owns it
#[derive(Default)]
pub struct StartupContext {
    pub config: OnceLock<Arc<SspConfig>>,
    /// Keeps the file log writer flushing until shutdown
    pub log_guard: Mutex<Option<WorkerGuard>>,
    pub catalog: OnceLock<Arc<CatalogManager>>,
    pub partners: OnceLock<Arc<PartnerManager>>,
    pub telemetry: OnceLock<Arc<TelemetrySink>>,
    pub state: OnceLock<Arc<ServiceState>>,
    pub server: OnceLock<ServerHandle>,
}
