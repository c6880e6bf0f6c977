use serde::{Deserialize, Serialize};

use super::model::WeatherData;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherIdQuery {
    #[serde(rename = "weatherID", default)]
    pub weather_id: String,
}

impl WeatherIdQuery {
    /// Positive integer IDs only.
    pub fn parse(&self) -> Option<i64> {
        self.weather_id.trim().parse::<i64>().ok().filter(|id| *id > 0)
    }
}

/// A fetched weather report. Serialized with the history record's `id`,
/// which is `null` when saving it failed.
#[derive(Debug, Serialize)]
pub struct LookupOutcome {
    #[serde(rename = "id")]
    pub weather_id: Option<i64>,
    #[serde(flatten)]
    pub weather: WeatherData,
}

#[derive(Debug, Serialize)]
pub struct Affected {
    pub affected: u64,
}
