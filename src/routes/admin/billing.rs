// billing.rs (routes)
// Facturación mensual: previa (sin escritura) y generación.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    errors::AppError,
    session::SessionUser,
    state::{AppState, billing_preview, generate_monthly_payments},
};

use super::helpers::ok;

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub mes: String,
}

pub async fn billing_preview_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let referencia = Utc::now().date_naive();
    let rows = billing_preview(&state, query.mes.trim(), referencia).await?;
    Ok(ok(serde_json::json!({
        "mes": query.mes.trim(),
        "candidatos": rows,
    })))
}

#[derive(Deserialize)]
pub struct GenerateForm {
    pub mes: String,
}

pub async fn billing_generate(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<GenerateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = generate_monthly_payments(&state, form.mes.trim()).await?;
    Ok(ok(outcome))
}
