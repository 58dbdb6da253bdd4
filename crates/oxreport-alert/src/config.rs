use crate::error::{ConfigError, Result};
use crate::rule::AlertRule;
use oxreport_common::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Alert rules of each enabled reporter, in configuration order.
pub type CompiledAlerts = BTreeMap<String, Vec<AlertRule>>;

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub reporters: BTreeMap<String, ReporterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.level.clone()));
        }
        if !LOG_FORMATS.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(self.format.clone()));
        }
        Ok(())
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default)]
    pub alerts: Vec<AlertRuleConfig>,
}

/// An alert as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    /// Message template; backtick spans are expressions.
    pub message: String,
    pub severity: Severity,
    /// Boolean expression that fires the alert.
    pub when: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_enable() -> bool {
    true
}

impl AlertConfig {
    /// Reads, parses and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the log section and compiles every rule, enabled reporters or
    /// not, so a typo surfaces before the reporter is switched on.
    pub fn validate(&self) -> Result<()> {
        self.log.validate()?;
        for (reporter, config) in &self.reporters {
            compile_rules(reporter, config)?;
        }
        Ok(())
    }

    /// Compiled rules of every enabled reporter.
    pub fn compile(&self) -> Result<CompiledAlerts> {
        self.reporters
            .iter()
            .filter(|(_, config)| config.enable)
            .map(|(reporter, config)| Ok((reporter.clone(), compile_rules(reporter, config)?)))
            .collect()
    }
}

fn compile_rules(reporter: &str, config: &ReporterConfig) -> Result<Vec<AlertRule>> {
    config
        .alerts
        .iter()
        .enumerate()
        .map(|(index, alert)| {
            AlertRule::from_config(alert).map_err(|source| ConfigError::InvalidRule {
                reporter: reporter.to_string(),
                index,
                source,
            })
        })
        .collect()
}
