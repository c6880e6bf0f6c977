use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{Affected, CityQuery, LookupOutcome, WeatherIdQuery},
    model::{WeatherData, WeatherRecord},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
    store::StoreError,
};

const RECORD_NOT_FOUND: &str = "Weather not found with this ID.";

pub fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(get_weather))
        .route("/history", get(list_history))
        .route("/history/get", get(get_history))
        .route("/history/update", put(update_history))
        .route("/history/delete", delete(delete_history))
        .route("/history/bulkdelete", delete(bulk_delete_history))
}

fn weather_id(q: &WeatherIdQuery) -> AppResult<i64> {
    q.parse()
        .ok_or_else(|| AppError::validation("Invalid weatherID."))
}

/// Loads a record, treating other users' records as missing.
async fn owned_record(state: &AppState, id: i64, user_id: i64) -> AppResult<WeatherRecord> {
    match state.store.get_weather_record(id).await {
        Ok(record) if record.user_id == user_id => Ok(record),
        Ok(_) | Err(StoreError::NotFound) => Err(AppError::not_found(RECORD_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state))]
pub async fn get_weather(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    q: Result<Query<CityQuery>, QueryRejection>,
) -> AppResult<ApiResponse<LookupOutcome>> {
    let Query(q) = q?;
    let city = q.city.trim();
    if city.is_empty() {
        return Err(AppError::validation("City name is required."));
    }

    let outcome = services::lookup(&state, city, user_id).await?;
    Ok(ApiResponse::success("Weather fetched successfully", outcome))
}

#[instrument(skip(state))]
pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<ApiResponse<Vec<WeatherRecord>>> {
    let records = state.store.list_weather_records(user_id).await?;
    if records.is_empty() {
        return Ok(ApiResponse::info("No Search History Found.", records));
    }
    Ok(ApiResponse::success(
        "Search history fetched successfully.",
        records,
    ))
}

#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    q: Result<Query<WeatherIdQuery>, QueryRejection>,
) -> AppResult<ApiResponse<WeatherRecord>> {
    let Query(q) = q?;
    let id = weather_id(&q)?;
    let record = owned_record(&state, id, user_id).await?;
    Ok(ApiResponse::success("Weather fetched successfully", record))
}

#[instrument(skip(state, payload))]
pub async fn update_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    q: Result<Query<WeatherIdQuery>, QueryRejection>,
    payload: Result<Json<WeatherData>, JsonRejection>,
) -> AppResult<ApiResponse<WeatherRecord>> {
    let Query(q) = q?;
    let id = weather_id(&q)?;
    let Json(data) = payload?;
    if data.city_name.trim().is_empty() {
        return Err(AppError::validation("City name is required."));
    }

    let mut record = owned_record(&state, id, user_id).await?;
    record.data = data;

    match state.store.update_weather_record(&record).await {
        Ok(()) => {}
        Err(StoreError::NotFound) => return Err(AppError::not_found(RECORD_NOT_FOUND)),
        Err(e) => return Err(e.into()),
    }

    info!(user_id, weather_id = id, "weather record replaced");
    Ok(ApiResponse::success("Successfully updated weather.", record))
}

#[instrument(skip(state))]
pub async fn delete_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    q: Result<Query<WeatherIdQuery>, QueryRejection>,
) -> AppResult<ApiResponse<Affected>> {
    let Query(q) = q?;
    let id = weather_id(&q)?;
    let affected = state.store.delete_weather_record(id, user_id).await?;
    if affected == 0 {
        warn!(user_id, weather_id = id, "nothing to delete");
        return Err(AppError::not_found(RECORD_NOT_FOUND));
    }

    info!(user_id, weather_id = id, "weather record deleted");
    Ok(ApiResponse::success(
        "Successfully deleted weather",
        Affected { affected },
    ))
}

#[instrument(skip(state))]
pub async fn bulk_delete_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<ApiResponse<Affected>> {
    let affected = state.store.bulk_delete_weather_records(user_id).await?;
    if affected == 0 {
        return Ok(ApiResponse::info(
            "No history to delete.",
            Affected { affected },
        ));
    }

    info!(user_id, affected, "weather history purged");
    Ok(ApiResponse::success(
        "Successfully deleted weathers.",
        Affected { affected },
    ))
}
