use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Installs a stderr fmt subscriber. `RUST_LOG` wins over `default_level`.
/// Returns `false` when a global subscriber was already set.
pub fn init(default_level: LogLevel) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.as_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_filters() {
        assert_eq!(LogLevel::default().as_filter(), LevelFilter::WARN);
        assert_eq!(LogLevel::Debug.as_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn second_init_is_refused() {
        init(LogLevel::Error);
        assert!(!init(LogLevel::Error));
    }
}
