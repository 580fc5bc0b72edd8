//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    CAMPUS_API_TIMEOUT_SECS, DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_INSTITUTION, DEFAULT_UTC_OFFSET_HOURS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub campus: CampusSettings,
    pub uploads: UploadSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// Offset used to decide which calendar day a guest visit belongs to.
    pub utc_offset_hours: i32,
    pub default_institution: String,
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CampusSettings {
    /// Left unset, identity lookups fail with an "unconfigured" error instead of
    /// preventing startup.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    pub dir: String,
    pub public_path: String,
    pub max_body_mb: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitSettings {
    pub auth_per_minute: u32,
}

impl CampusSettings {
    pub fn configured_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 4000)?
            .set_default("app.name", "library-server")?
            .set_default("app.utc_offset_hours", DEFAULT_UTC_OFFSET_HOURS)?
            .set_default("app.default_institution", DEFAULT_INSTITUTION)?
            .set_default("app.cors_origin", "http://localhost:5173")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("jwt.access_token_expiry", DEFAULT_ACCESS_TOKEN_EXPIRY)?
            .set_default("campus.timeout_secs", CAMPUS_API_TIMEOUT_SECS as i64)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.public_path", "/uploads")?
            .set_default("uploads.max_body_mb", 10)?
            .set_default("rate_limit.auth_per_minute", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_base_url_ignores_blank() {
        let campus = CampusSettings { base_url: Some("   ".into()), timeout_secs: 5 };
        assert!(campus.configured_base_url().is_none());

        let campus = CampusSettings { base_url: Some(" https://api.campus.ac.id ".into()), timeout_secs: 5 };
        assert_eq!(campus.configured_base_url(), Some("https://api.campus.ac.id"));
    }
}
