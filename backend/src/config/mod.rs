use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

/// Longest accepted admin session, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub port: u16,
    pub admin_email: String,
    pub admin_password: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub storage_bucket: String,
    pub contact_phone: String,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Self::from_builder(Config::builder().add_source(Environment::default()))
    }

    /// Applies defaults on top of `builder` and deserializes the result.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("session_ttl_hours", 6)?
            .set_default("cookie_secure", false)?
            .set_default("storage_bucket", "property-images")?
            .set_default("contact_phone", "6281234567890")?
            .set_default("max_upload_bytes", 20 * 1024 * 1024)?
            .build()?
            .try_deserialize()?;

        if config.session_secret.is_empty() {
            return Err(ConfigError::Message("SESSION_SECRET must not be empty".into()));
        }
        if config.admin_email.is_empty() || config.admin_password.is_empty() {
            return Err(ConfigError::Message(
                "ADMIN_EMAIL and ADMIN_PASSWORD must not be empty".into(),
            ));
        }
        if config.session_ttl_hours <= 0 {
            return Err(ConfigError::Message("SESSION_TTL_HOURS must be positive".into()));
        }
        if config.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(ConfigError::Message(format!(
                "SESSION_TTL_HOURS must be at most {MAX_SESSION_TTL_HOURS}"
            )));
        }

        Ok(config)
    }

    pub fn supabase_url(&self) -> &str {
        self.supabase_url.trim_end_matches('/')
    }
}
