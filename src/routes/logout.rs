// routes/logout.rs
// POST /api/logout -> drops the server-side session and expires the cookie.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    response::{IntoResponse, Response},
};

use crate::{
    errors::AppError,
    session::{SESSION_COOKIE_NAME, SessionUser},
    state::{AppState, delete_session},
};

pub async fn logout(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    delete_session(&state, session_user.token()).await?;

    let mut response =
        Json(serde_json::json!({ "success": true, "data": null })).into_response();
    let expired = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if let Ok(header_value) = HeaderValue::from_str(&expired) {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
    Ok(response)
}
