use oxreport_expr::ExprError;
use std::path::PathBuf;

/// Errors raised while loading or validating the alert configuration.
///
/// # Examples
///
/// ```rust
/// use oxreport_alert::ConfigError;
///
/// let err = ConfigError::InvalidLogLevel("trace".to_string());
/// assert!(err.to_string().contains("log.level"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Config: reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape
    /// (including unknown severities).
    #[error("Config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config: invalid value for `log.level`: {0:?} (expected debug, info, warn or error)")]
    InvalidLogLevel(String),

    #[error("Config: invalid value for `log.format`: {0:?} (expected text or json)")]
    InvalidLogFormat(String),

    /// An alert's `when` expression or message template does not compile.
    #[error("Config: `reporters.{reporter}.alerts[{index}]`: {source}")]
    InvalidRule {
        reporter: String,
        index: usize,
        #[source]
        source: ExprError,
    },
}

/// Convenience `Result` alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
