// helpers.rs
// Shared parsing and response helpers for the admin JSON handlers.

use std::str::FromStr;

use axum::Json;
use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::Serialize;

use crate::{errors::AppError, session::SessionUser};

/// `{ success: true, data }` envelope.
pub fn ok<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

pub fn require_admin(session_user: &SessionUser) -> Result<(), AppError> {
    if session_user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn parse_object_id(value: &str) -> Result<ObjectId, AppError> {
    ObjectId::from_str(value).map_err(|_| AppError::validation("identificador inválido"))
}

/// "YYYY-MM-DD" -> bson DateTime at midnight UTC.
pub fn parse_date_field(value: &str, field: &str) -> Result<DateTime, AppError> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{field} inválida (AAAA-MM-DD)")))?;
    let dt = Utc
        .from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());
    Ok(DateTime::from_chrono(dt))
}

pub fn parse_positive_amount(value: f64, field: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!("{field} debe ser mayor a 0")));
    }
    Ok(value)
}

pub fn clean_opt(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

pub fn fmt_date(value: &DateTime) -> String {
    value.to_chrono().date_naive().to_string()
}

pub fn fmt_datetime(value: &DateTime) -> String {
    value
        .to_chrono()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
