// routes/login.rs
// POST /api/login { "email": "...", "password": "..." } -> session cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    errors::AppError,
    session::SESSION_COOKIE_NAME,
    state::{AppState, SESSION_TTL_SECONDS, create_session, find_user, verify_password},
};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::validation("email y contraseña son obligatorios"));
    }

    let Some(user) = find_user(&state, &email).await? else {
        // Same response as a bad password: no account enumeration.
        return Err(AppError::Unauthorized);
    };
    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = create_session(&state, &user.email).await?;

    let mut response = Json(serde_json::json!({
        "success": true,
        "data": {
            "userId": user.id.map(|id| id.to_hex()),
            "email": user.email,
            "nombre": user.nombre,
            "rol": user.role.as_str(),
        },
    }))
    .into_response();

    let cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECONDS}"
    );
    if let Ok(header_value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
    Ok(response)
}
