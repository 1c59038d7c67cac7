// receipts.rs
// Emisión de recibos: numeración secuencial, uno por pago.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    models::Receipt,
    session::SessionUser,
    state::{
        AppState, create_receipt, delete_receipt, get_receipt_by_id, list_receipts,
        mark_receipt_sent,
    },
};

use super::helpers::*;

#[derive(Serialize)]
pub struct ReceiptRow {
    pub id: String,
    pub pago_id: String,
    pub numero: i64,
    pub generado_en: String,
    pub enviado_en: Option<String>,
}

impl ReceiptRow {
    fn from_model(receipt: Receipt) -> ReceiptRow {
        ReceiptRow {
            id: receipt.id.map(|id| id.to_hex()).unwrap_or_default(),
            pago_id: receipt.pago_id.to_hex(),
            numero: receipt.numero,
            generado_en: fmt_datetime(&receipt.generado_en),
            enviado_en: receipt.enviado_en.as_ref().map(fmt_datetime),
        }
    }
}

pub async fn receipts_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let receipts = list_receipts(&state).await?;
    let rows: Vec<ReceiptRow> = receipts.into_iter().map(ReceiptRow::from_model).collect();
    Ok(ok(rows))
}

pub async fn receipts_show(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let receipt = get_receipt_by_id(&state, &object_id)
        .await?
        .ok_or_else(|| AppError::not_found("recibo no encontrado"))?;
    Ok(ok(ReceiptRow::from_model(receipt)))
}

#[derive(Deserialize)]
pub struct ReceiptForm {
    pub pago_id: String,
}

pub async fn receipts_create(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<ReceiptForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let pago_id = parse_object_id(&form.pago_id)?;
    let receipt = create_receipt(&state, &pago_id).await?;
    Ok(ok(ReceiptRow::from_model(receipt)))
}

pub async fn receipts_mark_sent(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    mark_receipt_sent(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn receipts_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&session_user)?;
    let object_id = parse_object_id(&id)?;
    delete_receipt(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}
