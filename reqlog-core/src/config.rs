use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

use crate::error::ReqlogError;

/// Environment prefix shared by every setting.
pub const ENV_PREFIX: &str = "REQUEST_LOGGING_";

/// Fully qualified setting name of the data log level, used in error messages.
pub const LOG_LEVEL_SETTING: &str = "REQUEST_LOGGING_DATA_LOG_LEVEL";

/// Standard logging severities, numbered the way conventional loggers do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::NotSet => "NOTSET",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn all() -> &'static [Severity] {
        &[
            Severity::NotSet,
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Critical,
        ]
    }
}

impl TryFrom<u8> for Severity {
    type Error = ReqlogError;

    fn try_from(value: u8) -> Result<Self, ReqlogError> {
        Severity::all()
            .iter()
            .copied()
            .find(|s| *s as u8 == value)
            .ok_or(ReqlogError::InvalidLogLevel {
                value,
                setting: LOG_LEVEL_SETTING,
            })
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request logging settings.
///
/// Every field is optional in the source; missing values take the defaults
/// below. `data_log_level` stays a raw number here so an out-of-range value
/// surfaces as [`ReqlogError::InvalidLogLevel`] at interceptor construction
/// rather than as a generic parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Severity used for emitted request records.
    #[serde(default = "default_log_level")]
    pub data_log_level: u8,

    /// Colorize lines written by the console sink.
    #[serde(default = "default_true", alias = "enable_colorize")]
    pub colorize: bool,

    /// Deprecated inverse of `colorize`. Wins over `colorize` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_colorize: Option<bool>,

    /// Upper bound, in bytes, for logged body content.
    #[serde(default = "default_max_body_length")]
    pub max_body_length: usize,

    /// Emit the request body after the record.
    #[serde(default)]
    pub log_body: bool,

    /// Mask credential-bearing headers in records.
    #[serde(default = "default_true")]
    pub scrub_headers: bool,

    /// Additional header names to mask, matched case-insensitively.
    #[serde(default)]
    pub extra_sensitive_headers: Vec<String>,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_log_level() -> u8 { Severity::Debug as u8 }
fn default_true() -> bool { true }
fn default_max_body_length() -> usize { 50_000 }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            data_log_level: default_log_level(),
            colorize: true,
            disable_colorize: None,
            max_body_length: default_max_body_length(),
            log_body: false,
            scrub_headers: true,
            extra_sensitive_headers: Vec::new(),
        }
    }
}

impl LoggingConfig {
    /// Load settings from a YAML file with `REQUEST_LOGGING_*` env overrides.
    pub fn load(path: &Path) -> Result<Self, ReqlogError> {
        Self::from_figment(
            Figment::new()
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                    if key.as_str().eq_ignore_ascii_case("enable_colorize") {
                        "colorize".into()
                    } else {
                        key.as_str().into()
                    }
                })),
        )
    }

    /// Extract settings from a host-supplied provider chain.
    pub fn from_figment(figment: Figment) -> Result<Self, ReqlogError> {
        let mut config: LoggingConfig = figment.extract()?;
        if let Some(disable) = config.disable_colorize {
            warn!(
                setting = "REQUEST_LOGGING_DISABLE_COLORIZE",
                "deprecated setting, use REQUEST_LOGGING_ENABLE_COLORIZE instead"
            );
            config.colorize = !disable;
        }
        Ok(config)
    }

    /// Validated severity for request records.
    pub fn severity(&self) -> Result<Severity, ReqlogError> {
        Severity::try_from(self.data_log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    // ── Severity ──────────────────────────────────────────────────

    #[test]
    fn standard_levels_convert() {
        assert_eq!(Severity::try_from(0).unwrap(), Severity::NotSet);
        assert_eq!(Severity::try_from(10).unwrap(), Severity::Debug);
        assert_eq!(Severity::try_from(20).unwrap(), Severity::Info);
        assert_eq!(Severity::try_from(30).unwrap(), Severity::Warning);
        assert_eq!(Severity::try_from(40).unwrap(), Severity::Error);
        assert_eq!(Severity::try_from(50).unwrap(), Severity::Critical);
    }

    #[test]
    fn nonstandard_level_is_rejected() {
        for value in [1u8, 15, 25, 51, 255] {
            let err = Severity::try_from(value).unwrap_err();
            assert!(matches!(err, ReqlogError::InvalidLogLevel { value: v, .. } if v == value));
        }
    }

    #[test]
    fn severity_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "30");
        let parsed: Severity = serde_json::from_str("40").unwrap();
        assert_eq!(parsed, Severity::Error);
        assert!(serde_json::from_str::<Severity>("41").is_err());
    }

    // ── Defaults ──────────────────────────────────────────────────

    #[test]
    fn default_config_has_expected_values() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.data_log_level, 10);
        assert!(cfg.colorize);
        assert!(cfg.disable_colorize.is_none());
        assert_eq!(cfg.max_body_length, 50_000);
        assert!(!cfg.log_body);
        assert!(cfg.scrub_headers);
        assert_eq!(cfg.severity().unwrap(), Severity::Debug);
    }

    #[test]
    fn empty_yaml_deserializes_to_defaults() {
        let cfg: LoggingConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.data_log_level, 10);
        assert_eq!(cfg.max_body_length, 50_000);
    }

    // ── load() ────────────────────────────────────────────────────

    #[test]
    fn load_from_yaml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("reqlog.yaml", "data_log_level: 20\nmax_body_length: 1024\n")?;
            let cfg = LoggingConfig::load(Path::new("reqlog.yaml")).unwrap();
            assert_eq!(cfg.severity().unwrap(), Severity::Info);
            assert_eq!(cfg.max_body_length, 1024);
            assert!(cfg.colorize);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("reqlog.yaml", "data_log_level: 20\n")?;
            jail.set_env("REQUEST_LOGGING_DATA_LOG_LEVEL", "40");
            jail.set_env("REQUEST_LOGGING_ENABLE_COLORIZE", "false");
            let cfg = LoggingConfig::load(Path::new("reqlog.yaml")).unwrap();
            assert_eq!(cfg.severity().unwrap(), Severity::Error);
            assert!(!cfg.colorize);
            Ok(())
        });
    }

    #[test]
    fn legacy_disable_colorize_wins() {
        Jail::expect_with(|jail| {
            jail.create_file("reqlog.yaml", "colorize: true\n")?;
            jail.set_env("REQUEST_LOGGING_DISABLE_COLORIZE", "true");
            let cfg = LoggingConfig::load(Path::new("reqlog.yaml")).unwrap();
            assert!(!cfg.colorize);
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = LoggingConfig::load(Path::new("absent.yaml")).unwrap();
            assert_eq!(cfg.data_log_level, 10);
            Ok(())
        });
    }

    #[test]
    fn out_of_range_level_loads_but_fails_validation() {
        Jail::expect_with(|jail| {
            jail.set_env("REQUEST_LOGGING_DATA_LOG_LEVEL", "15");
            let cfg = LoggingConfig::load(Path::new("absent.yaml")).unwrap();
            assert!(cfg.severity().is_err());
            Ok(())
        });
    }

    #[test]
    fn malformed_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("reqlog.yaml", "max_body_length: lots\n")?;
            let err = LoggingConfig::load(Path::new("reqlog.yaml")).unwrap_err();
            assert!(matches!(err, ReqlogError::Config(_)));
            Ok(())
        });
    }
}
