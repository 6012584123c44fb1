use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_NAME: &str = "tutor_draw.log";

/// Builds the level filter. `RUST_LOG` is only honoured when debug logging
/// is switched on in the settings file.
pub fn build_filter(debug: bool) -> EnvFilter {
    let level = if debug { "debug" } else { "info" };
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

/// Initialise logging to stderr and, when `log_dir` is given, to
/// `tutor_draw.log` inside it. Keep the returned guard alive until exit so
/// the file writer flushes.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(build_filter(debug))
        .with(fmt::layer())
        .with(file_layer)
        .try_init();
    guard
}
