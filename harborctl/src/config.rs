//! Application configuration.
//!
//! Configuration is loaded from a YAML file and `HARBORCTL_`-prefixed
//! environment variables, with defaults suitable for local development.
//!
//! ```ignore
//! use clap::Parser;
//! use harborctl::config::{Args, Config};
//!
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "HARBORCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required to issue or verify tokens)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Harbor capacity and berth provisioning rules
    pub harbor: HarborConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Password hashing rules
    pub password: PasswordConfig,
    /// Security settings (JWT, CORS)
    pub security: SecurityConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: PasswordConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Password validation and hashing rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Security configuration for JWT and CORS.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// JWT token expiry duration
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(3600), // 1 hour
            cors: CorsConfig::default(),
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests ("*" allows any origin)
    pub allowed_origins: Vec<String>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: None,
        }
    }
}

/// Harbor capacity and berth auto-provisioning rules.
///
/// Reservations may target a berth that has never been created explicitly:
/// as long as the number is within capacity, the berth record is provisioned
/// lazily with a type derived from its number.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarborConfig {
    /// Highest valid catway number in the harbor
    pub capacity: i32,
    /// Catways numbered at or above this threshold are "long", below it "short"
    pub long_type_threshold: i32,
    /// State string assigned to lazily provisioned catways
    pub default_state: String,
}

impl Default for HarborConfig {
    fn default() -> Self {
        Self {
            capacity: 24,
            long_type_threshold: 15,
            default_state: "state to be set".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://postgres@localhost/harborctl".to_string(),
            admin_email: "admin@harbor.local".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            harbor: HarborConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the file named in `args`, then apply
    /// environment variable overrides.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Figment for this configuration: YAML file, then `HARBORCTL_` env vars
    /// (nested keys split on `__`, e.g. `HARBORCTL_AUTH__SECURITY__JWT_EXPIRY=2h`).
    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("HARBORCTL_").split("__"))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.harbor.capacity <= 0 {
            anyhow::bail!("harbor.capacity must be positive (got {})", self.harbor.capacity);
        }
        if self.harbor.long_type_threshold <= 0 || self.harbor.long_type_threshold > self.harbor.capacity {
            anyhow::bail!(
                "harbor.long_type_threshold must be within 1..={} (got {})",
                self.harbor.capacity,
                self.harbor.long_type_threshold
            );
        }
        if self.harbor.default_state.trim().is_empty() {
            anyhow::bail!("harbor.default_state must not be empty");
        }
        if self.auth.security.jwt_expiry.is_zero() {
            anyhow::bail!("auth.security.jwt_expiry must be non-zero");
        }
        if self.auth.password.min_length > self.auth.password.max_length {
            anyhow::bail!("auth.password.min_length exceeds max_length");
        }
        if self.secret_key.is_none() {
            tracing::warn!("secret_key is not set; logins will fail until one is configured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.harbor.capacity, 24);
        assert_eq!(config.harbor.long_type_threshold, 15);
        assert_eq!(config.harbor.default_state, "state to be set");
        assert_eq!(config.auth.security.jwt_expiry, Duration::from_secs(3600));
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_load_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 9090
                secret_key: file-secret
                harbor:
                  capacity: 30
                  long_type_threshold: 20
                auth:
                  security:
                    jwt_expiry: 2h
                "#,
            )?;

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            assert_eq!(config.port, 9090);
            assert_eq!(config.secret_key.as_deref(), Some("file-secret"));
            assert_eq!(config.harbor.capacity, 30);
            assert_eq!(config.harbor.long_type_threshold, 20);
            assert_eq!(config.auth.security.jwt_expiry, Duration::from_secs(7200));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 9090\nsecret_key: file-secret\n")?;
            jail.set_env("HARBORCTL_PORT", "7070");
            jail.set_env("HARBORCTL_SECRET_KEY", "env-secret");
            jail.set_env("HARBORCTL_HARBOR__CAPACITY", "12");
            jail.set_env("HARBORCTL_HARBOR__LONG_TYPE_THRESHOLD", "6");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            assert_eq!(config.port, 7070);
            assert_eq!(config.secret_key.as_deref(), Some("env-secret"));
            assert_eq!(config.harbor.capacity, 12);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "harbor:\n  capacity: 0\n")?;

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            assert!(Config::load(&args).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_threshold_above_capacity_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "harbor:\n  capacity: 10\n  long_type_threshold: 11\n")?;

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            assert!(Config::load(&args).is_err());
            Ok(())
        });
    }
}
