use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

/// Condition code, short label, description and icon key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Temperature family plus pressure and humidity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i32,
    pub humidity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clouds {
    pub all: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SysInfo {
    #[serde(rename = "type")]
    pub kind: i32,
    pub id: i32,
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// The weather payload of a history entry, without identity or ownership.
///
/// Also the request body of a full-replace update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub city_name: String,
    #[serde(default)]
    pub coord: Coord,
    #[serde(default)]
    pub weather: Condition,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub main: Metrics,
    #[serde(default)]
    pub visibility: i32,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    /// Provider observation time (unix seconds).
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub sys: SysInfo,
    /// Shift from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

/// One stored lookup, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    #[serde(flatten)]
    pub data: WeatherData,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn record_serializes_flat_without_owner() {
        let record = WeatherRecord {
            id: 11,
            user_id: 4,
            data: WeatherData {
                city_name: "London".into(),
                sys: SysInfo {
                    kind: 2,
                    country: "GB".into(),
                    ..Default::default()
                },
                ..Default::default()
            },
            created_at: datetime!(2024-03-01 12:00 UTC),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 11);
        assert_eq!(json["city_name"], "London");
        assert_eq!(json["sys"]["type"], 2);
        assert_eq!(json["sys"]["country"], "GB");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn update_body_needs_only_city() {
        let data: WeatherData = serde_json::from_str(r#"{"city_name":"Paris"}"#).unwrap();
        assert_eq!(data.city_name, "Paris");
        assert_eq!(data.main, Metrics::default());
        assert!(serde_json::from_str::<WeatherData>("{}").is_err());
    }
}
