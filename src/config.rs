use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const MIN_TTL_MINUTES: i64 = 1;
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

/// How the token is carried in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: <token>`
    Raw,
}

impl AuthScheme {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "raw" => Ok(Self::Raw),
            other => anyhow::bail!("unknown AUTH_SCHEME {other:?}, expected bearer or raw"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Retired secrets still accepted when verifying.
    pub previous_secrets: Vec<String>,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub scheme: AuthScheme,
}

impl JwtConfig {
    /// Token lifetime, held between one minute and one year.
    pub fn ttl(&self) -> Duration {
        let minutes = self.ttl_minutes.clamp(MIN_TTL_MINUTES, MAX_TTL_MINUTES);
        Duration::from_secs(minutes as u64 * 60)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub weather: WeatherConfig,
    pub request_timeout_secs: u64,
    pub keepalive_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            previous_secrets: std::env::var("JWT_PREVIOUS_SECRETS")
                .map(|v| split_secrets(&v))
                .unwrap_or_default(),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "weather-api".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60 * 24)
                .clamp(MIN_TTL_MINUTES, MAX_TTL_MINUTES),
            scheme: match std::env::var("AUTH_SCHEME") {
                Ok(v) => AuthScheme::parse(&v)?,
                Err(_) => AuthScheme::Bearer,
            },
        };

        let weather = WeatherConfig {
            api_key: std::env::var("WEATHER_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .context("WEATHER_API_KEY must be set")?,
            base_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".into()),
            timeout_secs: env_parse("WEATHER_TIMEOUT_SECS", 10),
        };

        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            jwt,
            weather,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            keepalive_secs: env_parse("KEEPALIVE_SECS", 15),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn split_secrets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
