use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::model::{Clouds, Condition, Coord, Metrics, SysInfo, WeatherData, Wind};
use crate::config::WeatherConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("city {0:?} not known to provider")]
    CityNotFound(String),
    #[error("provider answered {0}")]
    Status(StatusCode),
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider payload unreadable: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Current-weather payload as the provider sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderWeather {
    pub coord: Coord,
    pub weather: Vec<Condition>,
    pub base: String,
    pub main: Metrics,
    pub visibility: i32,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: SysInfo,
    pub timezone: i32,
    pub id: i64,
    pub name: String,
    pub cod: i32,
}

impl From<ProviderWeather> for WeatherData {
    /// Keeps the first reported condition; an empty list maps to an empty one.
    fn from(p: ProviderWeather) -> Self {
        Self {
            city_name: p.name,
            coord: p.coord,
            weather: p.weather.into_iter().next().unwrap_or_default(),
            base: p.base,
            main: p.main,
            visibility: p.visibility,
            wind: p.wind,
            clouds: p.clouds,
            dt: p.dt,
            sys: p.sys,
            timezone: p.timezone,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> Result<ProviderWeather, ProviderError>;
}

/// OpenWeatherMap `data/2.5/weather` client.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(cfg: &WeatherConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<ProviderWeather, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(ProviderError::CityNotFound(city.to_string())),
            other => return Err(ProviderError::Status(other)),
        }

        let body = resp.bytes().await?;
        let weather: ProviderWeather = serde_json::from_slice(&body)?;
        debug!(city = %weather.name, "provider answered");
        Ok(weather)
    }
}
