pub mod logger;
pub mod metrics;
pub mod record;
pub mod request_log;

pub use logger::init_logger;
pub use metrics::MetricsCollector;
pub use record::{FieldValue, LogField, LogSink, TracingSink};
pub use request_log::{RequestLogState, request_log};
