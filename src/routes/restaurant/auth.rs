use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{now_ts, Restaurant, RestaurantProfile};
use crate::routes::AppState;
use crate::services::{generate_otp, hash_password, verify_password, TokenKind};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub restaurant: RestaurantProfile,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub restaurant: RestaurantProfile,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::BadRequest("A valid email is required".to_string())),
    }
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = normalize_email(&payload.email)?;
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let conn = state.db.connect().map_err(AppError::from)?;
    if Restaurant::find_by_email(&conn, &email).await?.is_some() {
        return Err(AppError::Conflict("Restaurant already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let restaurant = Restaurant::create(&conn, &email, &password_hash).await?;

    let otp = generate_otp();
    let ttl_minutes = state.config.otp_ttl_minutes;
    Restaurant::set_otp(&conn, &restaurant.id, Some(&otp), Some(now_ts() + ttl_minutes * 60)).await?;

    match &state.email {
        Some(mailer) => {
            if let Err(e) = mailer.send_verification_code(&email, &otp, ttl_minutes).await {
                Restaurant::set_otp(&conn, &restaurant.id, None, None).await?;
                tracing::error!("Failed to send OTP to {}: {}", email, e);
                return Err(AppError::Internal("Failed to send verification email".to_string()));
            }
        }
        None => tracing::debug!("Email disabled, OTP for {} is {}", email, otp),
    }

    tracing::info!("Registered restaurant {}", restaurant.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Verification code sent to your email".to_string(),
            restaurant: restaurant.into(),
        }),
    ))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<VerifyOtpResponse>> {
    let email = normalize_email(&payload.email)?;
    let conn = state.db.connect().map_err(AppError::from)?;

    let restaurant = Restaurant::find_by_email(&conn, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    if !restaurant.otp_matches(payload.otp.trim(), now_ts()) {
        return Err(AppError::BadRequest("Invalid or expired OTP".to_string()));
    }

    Restaurant::mark_verified(&conn, &restaurant.id).await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "Email verified successfully".to_string(),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = payload.email.trim().to_lowercase();
    let conn = state.db.connect().map_err(AppError::from)?;

    let restaurant = Restaurant::find_by_email(&conn, &email)
        .await?
        .filter(|r| verify_password(&payload.password, &r.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let token = state.tokens.issue(&restaurant.id, TokenKind::Restaurant)?;

    Ok(Json(LoginResponse {
        token,
        restaurant: restaurant.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Chef@Example.COM ").unwrap(), "chef@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("chef@localhost").is_err());
    }
}
