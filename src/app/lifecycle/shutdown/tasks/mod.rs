mod flush_telemetry;
mod stop_server;

pub use flush_telemetry::FlushTelemetryTask;
pub use stop_server::StopServerTask;
