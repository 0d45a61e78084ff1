//! Layered server configuration: defaults, then YAML, then `ADSPACE__*` env vars.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use adspace::AdspaceConfig;
use adspace::config::MAX_PERIOD_DAYS;
use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

pub const ENV_PREFIX: &str = "ADSPACE__";

fn redacted<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub object_store: ObjectStoreConfig,
    pub adspace: AdspaceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8087)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://adspace.db?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HS256 secret shared with the token issuer.
    #[serde(serialize_with = "redacted")]
    pub jwt_secret: SecretString,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: empty_secret(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreKind {
    /// Process-local; media does not survive a restart.
    #[default]
    Memory,
    Cloudinary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectStoreConfig {
    pub kind: ObjectStoreKind,
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    #[serde(serialize_with = "redacted")]
    pub api_secret: SecretString,
    pub timeout_secs: u64,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            kind: ObjectStoreKind::default(),
            base_url: "https://api.cloudinary.com".to_owned(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: empty_secret(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the optional YAML file, then `ADSPACE__*` variables
    /// (`__` separates nesting levels, e.g. `ADSPACE__DATABASE__DSN`).
    ///
    /// # Errors
    /// Fails if the file is missing or any layer does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Overrides the configured port, keeping the bind address.
    pub fn apply_port(&mut self, port: Option<u16>) {
        if let Some(port) = port {
            self.server.bind_addr.set_port(port);
        }
    }

    /// Checks cross-field requirements that serde cannot express.
    ///
    /// # Errors
    /// Names the first missing or inconsistent setting.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            bail!("auth.jwt_secret must be set");
        }
        if self.object_store.kind == ObjectStoreKind::Cloudinary {
            let store = &self.object_store;
            if store.cloud_name.is_empty()
                || store.api_key.is_empty()
                || store.api_secret.expose_secret().is_empty()
            {
                bail!(
                    "object_store.cloud_name, api_key and api_secret are required for cloudinary"
                );
            }
        }
        for (key, days) in [
            ("trial_days", self.adspace.trial_days),
            ("subscription_days", self.adspace.subscription_days),
        ] {
            if !(1..=MAX_PERIOD_DAYS).contains(&days) {
                bail!("adspace.{key} must be between 1 and {MAX_PERIOD_DAYS}, got {days}");
            }
        }
        Ok(())
    }

    /// Effective configuration as YAML with secrets redacted.
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::io::Write;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_load_without_file() {
        temp_env::with_vars_unset(["ADSPACE__SERVER__BIND_ADDR"], || {
            let cfg = AppConfig::load(None).unwrap();
            assert_eq!(cfg.server.bind_addr.port(), 8087);
            assert_eq!(cfg.object_store.kind, ObjectStoreKind::Memory);
            assert_eq!(cfg.adspace.trial_days, 30);
            assert!(cfg.validate().is_err(), "jwt secret is required");
        });
    }

    #[test]
    fn yaml_then_env_layering() {
        let file = yaml_file(
            "server:\n  bind_addr: \"0.0.0.0:9000\"\n\
             auth:\n  jwt_secret: from-file\n\
             adspace:\n  trial_days: 14\n  booking_transitions: unrestricted\n",
        );
        temp_env::with_var("ADSPACE__ADSPACE__TRIAL_DAYS", Some("7"), || {
            let cfg = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(cfg.server.bind_addr.port(), 9000);
            assert_eq!(cfg.auth.jwt_secret.expose_secret(), "from-file");
            assert_eq!(cfg.adspace.trial_days, 7);
            cfg.validate().unwrap();
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = yaml_file("adspace:\n  trial_dayz: 14\n");
        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/adspace.yaml"))).is_err());
    }

    #[test]
    fn cloudinary_requires_credentials() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = SecretString::from("s3cret");
        cfg.object_store.kind = ObjectStoreKind::Cloudinary;
        assert!(cfg.validate().is_err());

        cfg.object_store.cloud_name = "demo".to_owned();
        cfg.object_store.api_key = "key".to_owned();
        cfg.object_store.api_secret = SecretString::from("secret");
        cfg.validate().unwrap();
    }

    #[test]
    fn subscription_periods_are_bounded() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = SecretString::from("s3cret");
        cfg.adspace.trial_days = MAX_PERIOD_DAYS;
        cfg.validate().unwrap();

        cfg.adspace.subscription_days = i64::MAX;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("subscription_days"), "{err}");

        cfg.adspace.subscription_days = 30;
        cfg.adspace.trial_days = 0;
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("trial_days"), "{err}");
    }

    #[test]
    fn printed_config_redacts_secrets() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = SecretString::from("top-secret-value");
        cfg.apply_port(Some(9100));

        let yaml = cfg.to_yaml().unwrap();
        assert!(!yaml.contains("top-secret-value"));
        assert!(yaml.contains("[REDACTED]"));
        assert!(yaml.contains("9100"));
    }
}
