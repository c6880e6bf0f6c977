use sqlx::FromRow;
use time::OffsetDateTime;

use super::model::{Clouds, Condition, Coord, Metrics, SysInfo, Wind, WeatherData, WeatherRecord};

/// Flattened `weather_history` row.
#[derive(Debug, FromRow)]
pub struct WeatherRow {
    pub id: i64,
    pub city_name: String,
    pub user_id: i64,
    pub coord_lon: f64,
    pub coord_lat: f64,
    pub weather_id: i32,
    pub weather_main: String,
    pub weather_description: String,
    pub weather_icon: String,
    pub base: String,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i32,
    pub humidity: i32,
    pub visibility: i32,
    pub wind_speed: f64,
    pub wind_deg: i32,
    pub clouds_all: i32,
    pub dt: i64,
    pub sys_type: i32,
    pub sys_id: i32,
    pub sys_country: String,
    pub sys_sunrise: i64,
    pub sys_sunset: i64,
    pub timezone: i32,
    pub created_at: OffsetDateTime,
}

impl From<WeatherRow> for WeatherRecord {
    fn from(r: WeatherRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            data: WeatherData {
                city_name: r.city_name,
                coord: Coord {
                    lon: r.coord_lon,
                    lat: r.coord_lat,
                },
                weather: Condition {
                    id: r.weather_id,
                    main: r.weather_main,
                    description: r.weather_description,
                    icon: r.weather_icon,
                },
                base: r.base,
                main: Metrics {
                    temp: r.temp,
                    feels_like: r.feels_like,
                    temp_min: r.temp_min,
                    temp_max: r.temp_max,
                    pressure: r.pressure,
                    humidity: r.humidity,
                },
                visibility: r.visibility,
                wind: Wind {
                    speed: r.wind_speed,
                    deg: r.wind_deg,
                },
                clouds: Clouds { all: r.clouds_all },
                dt: r.dt,
                sys: SysInfo {
                    kind: r.sys_type,
                    id: r.sys_id,
                    country: r.sys_country,
                    sunrise: r.sys_sunrise,
                    sunset: r.sys_sunset,
                },
                timezone: r.timezone,
            },
            created_at: r.created_at,
        }
    }
}
