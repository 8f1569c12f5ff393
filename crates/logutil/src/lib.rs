//! Utilities for logging.
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    HumanReadable,
    Json,
}

/// Map a `-v` count to a log level, starting from `base`.
pub fn verbosity_level(base: Level, verbose: u8) -> Level {
    let levels = [
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
    ];
    let start = levels.iter().position(|l| *l == base).unwrap_or(0);
    levels[(start + verbose as usize).min(levels.len() - 1)]
}

fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global logger.
///
/// `RUST_LOG` directives take precedence over `default_level`. Does nothing
/// if a global subscriber is already set.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer);

    let result = match format {
        LogFormat::HumanReadable => builder
            .with_file(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };

    if let Err(e) = result {
        // Already configured, e.g. by a test harness.
        eprintln!("Failed to set global logger: {e}");
    }
}

/// Configure a logger for tests, capturing output through the test writer.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(Level::DEBUG))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity() {
        assert_eq!(Level::ERROR, verbosity_level(Level::ERROR, 0));
        assert_eq!(Level::INFO, verbosity_level(Level::WARN, 1));
        assert_eq!(Level::TRACE, verbosity_level(Level::INFO, 9));
    }

    #[test]
    fn configure_twice_is_harmless() {
        init_test();
        configure_global_logger(Level::INFO, LogFormat::Json, std::io::stderr);
        tracing::info!("still logging");
    }
}
