//! Process configuration, read from `SATELLITE_*` environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use satellite_accounts::AccessPolicy;
use satellite_auth::DEFAULT_TOKEN_TTL_SECS;
use satellite_observability::LogFormat;

pub const DEV_SIGNING_SECRET: &str = "dev-secret";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SATELLITE_TOKEN_TTL_SECS must be a positive integer, got {0:?}")]
    InvalidTokenTtl(String),

    #[error("SATELLITE_BIND_ADDR is not a socket address: {0:?}")]
    InvalidBindAddr(String),

    #[error("SATELLITE_ACCESS_POLICY must be `any` or `owner`, got {0:?}")]
    InvalidAccessPolicy(String),

    #[error("SATELLITE_LOG_FORMAT: {0}")]
    InvalidLogFormat(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub signing_secret: String,
    pub token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub access_policy: AccessPolicy,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("signing_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bind_addr", &self.bind_addr)
            .field("access_policy", &self.access_policy)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset and empty values fall
    /// back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let signing_secret =
            var("SATELLITE_SIGNING_SECRET").unwrap_or_else(|| DEV_SIGNING_SECRET.to_string());

        let token_ttl = match var("SATELLITE_TOKEN_TTL_SECS") {
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => Duration::seconds(secs),
                _ => return Err(ConfigError::InvalidTokenTtl(raw)),
            },
        };

        let raw_addr = var("SATELLITE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let access_policy = match var("SATELLITE_ACCESS_POLICY") {
            None => AccessPolicy::default(),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "any" => AccessPolicy::AnyAuthenticated,
                "owner" => AccessPolicy::OwnerOnly,
                _ => return Err(ConfigError::InvalidAccessPolicy(raw)),
            },
        };

        let log_format = match var("SATELLITE_LOG_FORMAT") {
            None => LogFormat::default(),
            Some(raw) => raw.parse().map_err(ConfigError::InvalidLogFormat)?,
        };

        Ok(Self {
            signing_secret,
            token_ttl,
            bind_addr,
            access_policy,
            log_format,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.signing_secret == DEV_SIGNING_SECRET
    }

    /// Emit warnings for settings that are unsafe outside development.
    /// Call after the subscriber is installed.
    pub fn log_warnings(&self) {
        if self.uses_dev_secret() {
            tracing::warn!("SATELLITE_SIGNING_SECRET not set; using insecure dev default");
        }
        if self.access_policy == AccessPolicy::AnyAuthenticated {
            tracing::warn!(
                "access policy is `any`: every authenticated caller may read and modify any user, company or project"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::minutes(15));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.access_policy, AccessPolicy::AnyAuthenticated);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn explicit_values() {
        let cfg = config(&[
            ("SATELLITE_SIGNING_SECRET", "s3cret"),
            ("SATELLITE_TOKEN_TTL_SECS", "60"),
            ("SATELLITE_BIND_ADDR", "127.0.0.1:9000"),
            ("SATELLITE_ACCESS_POLICY", "Owner"),
            ("SATELLITE_LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert!(!cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::seconds(60));
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.access_policy, AccessPolicy::OwnerOnly);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config(&[("SATELLITE_SIGNING_SECRET", "  "), ("SATELLITE_TOKEN_TTL_SECS", "")])
            .unwrap();
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::minutes(15));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            config(&[("SATELLITE_TOKEN_TTL_SECS", "0")]).unwrap_err(),
            ConfigError::InvalidTokenTtl("0".to_string())
        );
        assert!(matches!(
            config(&[("SATELLITE_TOKEN_TTL_SECS", "soon")]),
            Err(ConfigError::InvalidTokenTtl(_))
        ));
        assert!(matches!(
            config(&[("SATELLITE_BIND_ADDR", "localhost")]),
            Err(ConfigError::InvalidBindAddr(_))
        ));
        assert!(matches!(
            config(&[("SATELLITE_ACCESS_POLICY", "self")]),
            Err(ConfigError::InvalidAccessPolicy(_))
        ));
        assert!(matches!(
            config(&[("SATELLITE_LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn debug_output_hides_secret() {
        let cfg = config(&[("SATELLITE_SIGNING_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
