//! Runtime configuration from `ORDER_DESK_*` environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `ORDER_DESK_BACKEND` | `memory` (or `http`) |
//! | `ORDER_DESK_API_URL` | `https://localhost:7166/api` |
//! | `ORDER_DESK_API_TOKEN` | none |
//! | `ORDER_DESK_TIMEOUT_SECS` | `30` |
//! | `ORDER_DESK_POLL_SECS` | `10` |
//! | `ORDER_DESK_PAGE_SIZE` | `10` |
//! | `ORDER_DESK_PAYMENT_METHOD` | `1` |
//! | `ORDER_DESK_USER_ID` | `1` |
//! | `ORDER_DESK_USER_NAME` | `Cajero` |

use crate::model::{CurrentUser, PaymentMethodId};
use crate::workflow::WorkflowSettings;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Http,
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "http" => Ok(BackendKind::Http),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    pub api_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub page_size: u32,
    pub placeholder_payment_method: PaymentMethodId,
    pub user: CurrentUser,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            api_url: "https://localhost:7166/api".to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(10),
            page_size: 10,
            placeholder_payment_method: PaymentMethodId(1),
            user: CurrentUser::new(1, "Cajero"),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to include a
    /// `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset and blank keys take their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Config::default();

        let user_id: u32 = parse(&get, "ORDER_DESK_USER_ID")?.unwrap_or(defaults.user.id.0);
        let user_name = get("ORDER_DESK_USER_NAME").unwrap_or(defaults.user.name);

        Ok(Self {
            backend: parse(&get, "ORDER_DESK_BACKEND")?.unwrap_or(defaults.backend),
            api_url: get("ORDER_DESK_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            api_token: get("ORDER_DESK_API_TOKEN"),
            timeout: positive(&get, "ORDER_DESK_TIMEOUT_SECS")?
                .map(|secs| Duration::from_secs(u64::from(secs)))
                .unwrap_or(defaults.timeout),
            poll_interval: positive(&get, "ORDER_DESK_POLL_SECS")?
                .map(|secs| Duration::from_secs(u64::from(secs)))
                .unwrap_or(defaults.poll_interval),
            page_size: positive(&get, "ORDER_DESK_PAGE_SIZE")?.unwrap_or(defaults.page_size),
            placeholder_payment_method: parse(&get, "ORDER_DESK_PAYMENT_METHOD")?
                .map(PaymentMethodId)
                .unwrap_or(defaults.placeholder_payment_method),
            user: CurrentUser::new(user_id, user_name),
        })
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            poll_interval: self.poll_interval,
            page_size: self.page_size,
            placeholder_payment_method: self.placeholder_payment_method,
        }
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}

/// Like [`parse`], rejecting zero.
fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u32>, ConfigError> {
    match parse::<u32>(get, key)? {
        Some(0) => Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        }),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), Config::default());
        let settings = Config::default().workflow_settings();
        assert_eq!(settings.poll_interval, Duration::from_secs(10));
        assert_eq!(settings.page_size, 10);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("ORDER_DESK_BACKEND", "HTTP"),
            ("ORDER_DESK_API_URL", "http://pos.local/api/"),
            ("ORDER_DESK_API_TOKEN", "secret"),
            ("ORDER_DESK_TIMEOUT_SECS", "5"),
            ("ORDER_DESK_POLL_SECS", "3"),
            ("ORDER_DESK_PAGE_SIZE", "20"),
            ("ORDER_DESK_PAYMENT_METHOD", "2"),
            ("ORDER_DESK_USER_ID", "7"),
            ("ORDER_DESK_USER_NAME", "Rosa"),
        ])
        .unwrap();
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.api_url, "http://pos.local/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.placeholder_payment_method, PaymentMethodId(2));
        assert_eq!(config.user, CurrentUser::new(7, "Rosa"));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config(&[("ORDER_DESK_POLL_SECS", "soon")]),
            Err(ConfigError::Invalid {
                key: "ORDER_DESK_POLL_SECS",
                value: "soon".into()
            })
        );
        assert!(config(&[("ORDER_DESK_PAGE_SIZE", "0")]).is_err());
        assert_eq!(
            config(&[("ORDER_DESK_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid {
                key: "ORDER_DESK_TIMEOUT_SECS",
                value: "0".into()
            })
        );
        assert!(config(&[("ORDER_DESK_BACKEND", "sqlite")]).is_err());
    }

    #[test]
    fn blank_values_fall_back() {
        let config = config(&[("ORDER_DESK_API_TOKEN", "  "), ("ORDER_DESK_USER_NAME", "")]).unwrap();
        assert_eq!(config.api_token, None);
        assert_eq!(config.user.name, "Cajero");
    }
}
