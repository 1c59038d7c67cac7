// commitments.rs
// CRUD de compromisos de pago.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    models::{CommitmentStatus, PaymentCommitment},
    session::SessionUser,
    state::{
        AppState, create_commitment, delete_commitment, get_client_by_id, get_commitment_by_id,
        list_commitments, set_commitment_status, update_commitment,
    },
};

use super::helpers::*;

#[derive(Serialize)]
pub struct CommitmentRow {
    pub id: String,
    pub cliente_id: String,
    pub fecha_promesa: String,
    pub monto_promesa: f64,
    pub estado: String,
    pub notas: Option<String>,
}

impl CommitmentRow {
    fn from_model(commitment: PaymentCommitment) -> CommitmentRow {
        CommitmentRow {
            id: commitment.id.map(|id| id.to_hex()).unwrap_or_default(),
            cliente_id: commitment.cliente_id.to_hex(),
            fecha_promesa: fmt_date(&commitment.fecha_promesa),
            monto_promesa: commitment.monto_promesa,
            estado: commitment.estado.as_str().to_string(),
            notas: commitment.notas,
        }
    }
}

#[derive(Deserialize)]
pub struct CommitmentsQuery {
    #[serde(default)]
    pub cliente: Option<String>,
}

pub async fn commitments_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommitmentsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cliente_id = match &query.cliente {
        Some(raw) => Some(parse_object_id(raw)?),
        None => None,
    };
    let commitments = list_commitments(&state, cliente_id.as_ref()).await?;
    let rows: Vec<CommitmentRow> = commitments
        .into_iter()
        .map(CommitmentRow::from_model)
        .collect();
    Ok(ok(rows))
}

pub async fn commitments_show(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let commitment = get_commitment_by_id(&state, &object_id)
        .await?
        .ok_or_else(|| AppError::not_found("compromiso no encontrado"))?;
    Ok(ok(CommitmentRow::from_model(commitment)))
}

#[derive(Deserialize)]
pub struct CommitmentForm {
    pub cliente_id: String,
    pub fecha_promesa: String,
    pub monto_promesa: f64,
    #[serde(default)]
    pub notas: Option<String>,
}

pub async fn commitments_create(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<CommitmentForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cliente_id = parse_object_id(&form.cliente_id)?;
    if get_client_by_id(&state, &cliente_id).await?.is_none() {
        return Err(AppError::not_found("cliente no encontrado"));
    }
    let fecha_promesa = parse_date_field(&form.fecha_promesa, "fecha de promesa")?;
    let monto_promesa = parse_positive_amount(form.monto_promesa, "monto prometido")?;

    let id = create_commitment(
        &state,
        &cliente_id,
        fecha_promesa,
        monto_promesa,
        clean_opt(form.notas),
    )
    .await?;
    Ok(ok(serde_json::json!({ "id": id.to_hex() })))
}

#[derive(Deserialize)]
pub struct CommitmentUpdateForm {
    pub fecha_promesa: String,
    pub monto_promesa: f64,
    #[serde(default)]
    pub notas: Option<String>,
}

pub async fn commitments_update(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<CommitmentUpdateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let fecha_promesa = parse_date_field(&form.fecha_promesa, "fecha de promesa")?;
    let monto_promesa = parse_positive_amount(form.monto_promesa, "monto prometido")?;

    update_commitment(
        &state,
        &object_id,
        fecha_promesa,
        monto_promesa,
        clean_opt(form.notas),
    )
    .await?;
    Ok(ok(serde_json::json!(null)))
}

#[derive(Deserialize)]
pub struct CommitmentStatusForm {
    pub estado: String,
}

pub async fn commitments_set_status(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<CommitmentStatusForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let estado = CommitmentStatus::parse(&form.estado)
        .ok_or_else(|| AppError::validation("estado de compromiso inválido"))?;
    set_commitment_status(&state, &object_id, estado).await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn commitments_delete(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    delete_commitment(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}
