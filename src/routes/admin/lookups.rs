// lookups.rs
// Consultas a padrones externos (DNI, RUC) y tipo de cambio. Un número
// malformado es 400; un padrón caído o sin credenciales devuelve data:null.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    errors::AppError,
    lookup::{is_valid_dni, is_valid_ruc},
    session::SessionUser,
    state::AppState,
};

use super::helpers::ok;

pub async fn lookup_dni(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(dni): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dni = dni.trim();
    if !is_valid_dni(dni) {
        return Err(AppError::validation("DNI inválido (8 dígitos)"));
    }
    let record = state.registry.consulta_dni(dni).await;
    Ok(ok(record))
}

pub async fn lookup_ruc(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(ruc): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ruc = ruc.trim();
    if !is_valid_ruc(ruc) {
        return Err(AppError::validation("RUC inválido (11 dígitos)"));
    }
    let record = state.registry.consulta_ruc(ruc).await;
    Ok(ok(record))
}

#[derive(Deserialize)]
pub struct ExchangeQuery {
    #[serde(default)]
    pub fecha: Option<String>,
}

pub async fn lookup_tipo_cambio(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExchangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let fecha = match &query.fecha {
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::validation("fecha inválida (AAAA-MM-DD)"))?,
        None => Utc::now().date_naive(),
    };
    let rate = state.registry.tipo_cambio(fecha).await;
    Ok(ok(rate))
}
