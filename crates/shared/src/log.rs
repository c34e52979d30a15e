use std::sync::Once;

pub use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Relay,
    Test,
}

static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Safe to call more than once
/// (tests call it from every fixture), only the first call wins.
pub fn setup_logging(level: &str, log_type: LogType) {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match log_type {
            LogType::Test => builder.with_test_writer().try_init(),
            LogType::Relay => builder.try_init(),
        };
        if installed.is_ok() {
            // Route records from the `log` facade through tracing as well
            let _ = tracing_log::LogTracer::init();
        }
    });
}
