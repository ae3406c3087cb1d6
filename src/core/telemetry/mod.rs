pub mod records;
pub mod sink;

pub use records::TelemetryRecord;
pub use sink::TelemetrySink;
