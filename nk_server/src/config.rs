//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use notekeeper::{db::DatabaseConfig, mail::SmtpConfig};
use std::net::SocketAddr;
use std::time::Duration;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default allowed CORS origin
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; `None` selects in-memory storage
    pub database: Option<DatabaseConfig>,
    /// Security configuration
    pub security: SecurityConfig,
    /// SMTP relay; `None` logs passcodes instead of mailing them
    pub mail: Option<SmtpConfig>,
    /// Optional passcode expiry
    pub otp_ttl: Option<Duration>,
    /// Allowed CORS origin
    pub client_url: String,
    /// Prometheus exporter address
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Expected audience of Google ID tokens (required)
    pub google_client_id: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            bind_override,
            database_url_override,
        )
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Bind address
        let bind = match bind_override {
            Some(addr) => addr,
            None => {
                let raw = var("SERVER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
                parse_addr("SERVER_BIND", &raw)?
            }
        };

        // Database configuration
        let database = match database_url_override.or_else(|| var("DATABASE_URL")) {
            Some(database_url) => Some(DatabaseConfig {
                database_url,
                max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or(&var, "DB_MIN_CONNECTIONS", 1)?,
                connection_timeout_secs: parse_or(&var, "DB_CONNECTION_TIMEOUT_SECS", 5)?,
                idle_timeout_secs: parse_or(&var, "DB_IDLE_TIMEOUT_SECS", 300)?,
                max_lifetime_secs: parse_or(&var, "DB_MAX_LIFETIME_SECS", 1800)?,
            }),
            None => None,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = var("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let google_client_id =
            var("GOOGLE_CLIENT_ID").ok_or_else(|| ConfigError::MissingRequired {
                var: "GOOGLE_CLIENT_ID".to_string(),
                hint: "OAuth client ID from the Google Cloud console".to_string(),
            })?;

        // Mail
        let mail = match (var("EMAIL_USER"), var("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(SmtpConfig {
                host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
                port: parse_or(&var, "SMTP_PORT", 465)?,
                username,
                password,
                from_name: var("EMAIL_FROM_NAME").unwrap_or_else(|| "NoteKeeper".to_string()),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired {
                    var: "EMAIL_PASS".to_string(),
                    hint: "Required when EMAIL_USER is set".to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingRequired {
                    var: "EMAIL_USER".to_string(),
                    hint: "Required when EMAIL_PASS is set".to_string(),
                });
            }
        };

        let otp_ttl = match parse_or(&var, "OTP_TTL_SECS", 0u64)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let client_url = var("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string());

        let metrics_bind = var("METRICS_BIND")
            .map(|v| parse_addr("METRICS_BIND", &v))
            .transpose()?;

        Ok(ServerConfig {
            bind,
            database,
            security: SecurityConfig {
                jwt_secret,
                google_client_id,
            },
            mail,
            otp_ttl,
            client_url,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if !(self.client_url.starts_with("http://") || self.client_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "CLIENT_URL".to_string(),
                reason: "Must be an http:// or https:// origin".to_string(),
            });
        }

        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        database.max_connections
                    ),
                });
            }
        }

        if let Some(mail) = &self.mail {
            if mail.port == 0 {
                return Err(ConfigError::Invalid {
                    var: "SMTP_PORT".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if !mail.username.contains('@') {
                return Err(ConfigError::Invalid {
                    var: "EMAIL_USER".to_string(),
                    reason: "Must be an email address".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_addr(key: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("'{value}' is not an IP:PORT address"),
    })
}

/// Parse a variable, using `default` only when it is unset
fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{value}' is not a valid number"),
        }),
    }
}
