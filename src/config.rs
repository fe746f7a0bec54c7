// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CONTACT__`-prefixed environment variables (`__` separates nesting levels,
//! e.g. `CONTACT__RATE_LIMIT__MAX_ATTEMPTS=5`).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "CONTACT_CONFIG";

/// Config file used when `CONTACT_CONFIG` is unset. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "contact-intake.toml";

/// Environment variable the mail provider API key is read from as a fallback.
pub const API_KEY_ENV: &str = "RESEND_API_KEY";

/// Routes the metrics endpoint may not take over.
pub const RESERVED_PATHS: [&str; 3] = ["/health", "/healthz", "/send-email"];

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid spam pattern {pattern:?}: {source}")]
    InvalidSpamPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid length bounds for {field}: min {min} > max {max}")]
    InvalidBounds {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("No recipients configured")]
    NoRecipients,

    #[error("Invalid metrics path {0:?}: must start with '/' and not shadow another route")]
    InvalidMetricsPath(String),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Field validation bounds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Blocklists and spam heuristics
    #[serde(default)]
    pub security: SecurityConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Cross-origin configuration for the browser form
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Per-client submission cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted submissions per client within one window (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Window length in milliseconds, measured from the last attempt (default: 1 hour)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

/// Inclusive character-count range for one text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl FieldBounds {
    pub const fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }
}

/// Length bounds for each submission field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_name_bounds")]
    pub name: FieldBounds,

    #[serde(default = "default_subject_bounds")]
    pub subject: FieldBounds,

    #[serde(default = "default_message_bounds")]
    pub message: FieldBounds,

    /// Upper bound on the address length (default: 254)
    #[serde(default = "default_email_max_length")]
    pub email_max_length: usize,
}

/// Abuse filters applied after shape validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Disposable mail domains refused outright
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,

    /// Case-insensitive regular expressions over name, subject and message
    #[serde(default = "default_spam_patterns")]
    pub spam_patterns: Vec<String>,
}

/// Sender identity, recipients and provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_from_name")]
    pub from_name: String,

    #[serde(default = "default_from_email")]
    pub from_email: String,

    #[serde(default = "default_to")]
    pub to: Vec<String>,

    /// Prepended to the submitter's subject line
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,

    /// Provider API key. Without one, messages are only logged.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider API base URL
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// Upper bound on a single dispatch, in milliseconds (default: 10000)
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to post the form. Empty disables CORS headers.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_window_ms() -> u64 {
    60 * 60 * 1000
}

fn default_name_bounds() -> FieldBounds {
    FieldBounds::new(2, 100)
}

fn default_subject_bounds() -> FieldBounds {
    FieldBounds::new(3, 200)
}

fn default_message_bounds() -> FieldBounds {
    FieldBounds::new(10, 2000)
}

fn default_email_max_length() -> usize {
    254
}

fn default_blocked_domains() -> Vec<String> {
    [
        "10minutemail.com",
        "tempmail.org",
        "guerrillamail.com",
        "mailinator.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_spam_patterns() -> Vec<String> {
    [
        "viagra",
        "casino",
        "lottery",
        "winner",
        "congratulations.*million",
        "click.*here.*now",
        "free.*money",
        r"earn.*\$.*fast",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_from_name() -> String {
    "Portfolio".to_string()
}

fn default_from_email() -> String {
    "noreply@resend.dev".to_string()
}

fn default_to() -> Vec<String> {
    vec!["contact@example.com".to_string()]
}

fn default_subject_prefix() -> String {
    "[PORTFOLIO]".to_string()
}

fn default_api_base() -> Url {
    Url::parse("https://api.resend.com/").expect("static URL is valid")
}

fn default_dispatch_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_ms: default_window_ms(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name: default_name_bounds(),
            subject: default_subject_bounds(),
            message: default_message_bounds(),
            email_max_length: default_email_max_length(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            blocked_domains: default_blocked_domains(),
            spam_patterns: default_spam_patterns(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_name: default_from_name(),
            from_email: default_from_email(),
            to: default_to(),
            subject_prefix: default_subject_prefix(),
            api_key: None,
            api_base: default_api_base(),
            dispatch_timeout_ms: default_dispatch_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl MailConfig {
    /// Get the dispatch timeout
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    /// Sender rendered as a mailbox, e.g. `Portfolio <noreply@resend.dev>`.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

impl Config {
    /// Load configuration from the file named by `CONTACT_CONFIG` (optional)
    /// and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(&path)?;

        if config.mail.api_key.is_none() {
            config.mail.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }

        config.check()?;
        Ok(config)
    }

    /// Load from an explicit file path plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("CONTACT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("mail.to")
                    .with_list_parse_key("security.blocked_domains")
                    .with_list_parse_key("security.spam_patterns")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject configurations the service cannot run with.
    pub fn check(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("name", self.validation.name),
            ("subject", self.validation.subject),
            ("message", self.validation.message),
        ];
        for (field, b) in bounds {
            if b.min_length > b.max_length {
                return Err(ConfigError::InvalidBounds {
                    field,
                    min: b.min_length,
                    max: b.max_length,
                });
            }
        }

        if self.mail.to.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        if self.metrics.enabled {
            let path = self.metrics.path.as_str();
            if !path.starts_with('/') || RESERVED_PATHS.contains(&path) {
                return Err(ConfigError::InvalidMetricsPath(path.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rate_limit.max_attempts, 3);
        assert_eq!(config.rate_limit.window_duration(), Duration::from_secs(3600));
        assert_eq!(config.validation.message, FieldBounds::new(10, 2000));
        assert!(config
            .security
            .blocked_domains
            .contains(&"mailinator.com".to_string()));
        assert_eq!(config.mail.sender(), "Portfolio <noreply@resend.dev>");
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "rate_limit": { "max_attempts": 5 }, "mail": { "to": ["me@example.org"] } }"#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window_ms, 3_600_000);
        assert_eq!(config.mail.to, vec!["me@example.org".to_string()]);
        assert_eq!(config.mail.subject_prefix, "[PORTFOLIO]");
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = Config::default();
        config.validation.subject = FieldBounds::new(50, 10);
        assert!(matches!(
            config.check(),
            Err(ConfigError::InvalidBounds { field: "subject", .. })
        ));
    }

    #[test]
    fn test_bad_metrics_path_rejected() {
        for path in ["metrics", "/health", "/send-email", ""] {
            let mut config = Config::default();
            config.metrics.path = path.to_string();
            assert!(
                matches!(config.check(), Err(ConfigError::InvalidMetricsPath(_))),
                "{:?} should be rejected",
                path
            );
        }

        let mut config = Config::default();
        config.metrics.path = "/health".to_string();
        config.metrics.enabled = false;
        assert!(config.check().is_ok());

        config.metrics.path = "/internal/metrics".to_string();
        config.metrics.enabled = true;
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_empty_recipients_rejected() {
        let mut config = Config::default();
        config.mail.to.clear();
        assert!(matches!(config.check(), Err(ConfigError::NoRecipients)));
    }
}
