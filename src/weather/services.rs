use time::OffsetDateTime;
use tracing::{error, info};

use super::{
    dto::LookupOutcome,
    model::{WeatherData, WeatherRecord},
};
use crate::{
    error::AppResult,
    state::AppState,
    store::{CredentialStore, StoreError},
};

/// Stores one lookup for `owner_id` and returns it with its assigned ID.
pub async fn record_lookup(
    store: &dyn CredentialStore,
    data: &WeatherData,
    owner_id: i64,
) -> Result<WeatherRecord, StoreError> {
    let id = store.insert_weather_record(data, owner_id).await?;
    Ok(WeatherRecord {
        id,
        user_id: owner_id,
        data: data.clone(),
        created_at: OffsetDateTime::now_utc(),
    })
}

/// Fetches current weather and records it in the caller's history.
///
/// A failed history write is logged and the report is still returned, with
/// `weather_id` left empty. Provider failures fail the request.
pub async fn lookup(state: &AppState, city: &str, owner_id: i64) -> AppResult<LookupOutcome> {
    let data = WeatherData::from(state.weather.current(city).await?);

    match record_lookup(state.store.as_ref(), &data, owner_id).await {
        Ok(record) => {
            info!(
                user_id = owner_id,
                weather_id = record.id,
                city = %record.data.city_name,
                "lookup recorded"
            );
            Ok(LookupOutcome {
                weather_id: Some(record.id),
                weather: record.data,
            })
        }
        Err(e) => {
            error!(error = %e, user_id = owner_id, %city, "failed to record lookup");
            Ok(LookupOutcome {
                weather_id: None,
                weather: data,
            })
        }
    }
}
