//! Log configuration for the `mjc` binary.
//!
//! Pipeline events go to stderr through `tracing`. The level comes from
//! `--log-level`, then `MJC_LOG_LEVEL`, then the default; `RUST_LOG` wins
//! over all of them when set.

use std::env;
use std::fmt;

pub const LOG_LEVEL_ENV: &str = "MJC_LOG_LEVEL";

/// Logging verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" | "verbose" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(text)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown log level '{}' (expected error, warn, info, debug or trace)",
                s
            )
        })
    }
}

/// Resolved log configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: LogLevel,
}

impl LogOptions {
    pub const DEFAULT: Self = Self {
        level: LogLevel::Warn,
    };

    /// Default options with `MJC_LOG_LEVEL` applied
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var_os(LOG_LEVEL_ENV).map(|value| value.to_string_lossy().to_string());
        apply_env_override(Self::DEFAULT, level.as_deref())
    }

    /// Environment settings overridden by an explicit CLI level
    #[must_use]
    pub fn resolve(cli_level: Option<LogLevel>) -> Self {
        let base = Self::from_env();
        Self {
            level: cli_level.unwrap_or(base.level),
        }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn apply_env_override(mut options: LogOptions, level: Option<&str>) -> LogOptions {
    if let Some(spec) = level.and_then(LogLevel::parse) {
        options.level = spec;
    }
    options
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(options: &LogOptions) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::EnvFilter;

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let use_ansi = env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let directive = options.level.to_string();
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .without_time()
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
