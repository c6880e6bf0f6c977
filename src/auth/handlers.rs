use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, HeaderValue},
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenPayload},
        password::{hash_password, verify_password},
        validate::{is_valid_email, is_valid_password, parse_birth_date},
    },
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
    store::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Echo the token in an `Authorization` header alongside the body.
fn token_response(
    token: String,
    message: &str,
) -> AppResult<(HeaderMap, ApiResponse<TokenPayload>)> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| AppError::Internal(e.into()))?;
    headers.insert(AUTHORIZATION, value);
    Ok((headers, ApiResponse::success(message, TokenPayload { token })))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(HeaderMap, ApiResponse<TokenPayload>)> {
    let Json(payload) = payload?;
    let username = normalize_username(&payload.username);

    if username.is_empty() || payload.password.is_empty() || payload.birth_date.trim().is_empty()
    {
        return Err(AppError::validation(
            "Username, password and birth date are required.",
        ));
    }

    if !is_valid_email(&username) {
        warn!(%username, "invalid email");
        return Err(AppError::validation("Invalid email address."));
    }

    if !is_valid_password(&payload.password) {
        warn!(%username, "weak password");
        return Err(AppError::validation(
            "Password must be at least 8 characters long and contain at least one uppercase letter, one lowercase letter, and one digit.",
        ));
    }

    let Some(date_of_birth) = parse_birth_date(&payload.birth_date) else {
        warn!(%username, "invalid birth date");
        return Err(AppError::validation("Invalid birth date."));
    };

    let hash = hash_password(&payload.password)?;

    // uniqueness is enforced by the store
    let user_id = match state
        .store
        .create_user(&username, &hash, date_of_birth)
        .await
    {
        Ok(id) => id,
        Err(StoreError::Duplicate) => {
            warn!(%username, "username already registered");
            return Err(AppError::Conflict("Username already exists.".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    let token = state.keys.issue(user_id, &username)?;

    info!(user_id, %username, "user registered");
    token_response(token, "Registered successfully.")
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(HeaderMap, ApiResponse<TokenPayload>)> {
    let Json(payload) = payload?;
    let username = normalize_username(&payload.username);

    if username.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Username and password are required."));
    }

    if !is_valid_email(&username) {
        warn!(%username, "invalid email");
        return Err(AppError::validation(
            "Invalid username, please provide a valid email address.",
        ));
    }

    let user = match state.store.get_user_by_username(&username).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            warn!(%username, "login unknown username");
            return Err(AppError::unauthorized("Invalid credentials."));
        }
        Err(e) => {
            error!(error = %e, "get_user_by_username failed");
            return Err(e.into());
        }
    };

    if !verify_password(&payload.password, &user.password)? {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials."));
    }

    let token = state.keys.issue(user.id, &user.username)?;

    info!(user_id = user.id, %username, "user logged in");
    token_response(token, "Logged in successfully.")
}
