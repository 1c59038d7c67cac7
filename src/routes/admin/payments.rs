// payments.rs
// CRUD de pagos, confirmación y carga de comprobante (multipart).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    billing,
    errors::AppError,
    models::{Payment, PaymentStatus},
    session::SessionUser,
    state::{
        AppState, confirm_payment, create_payment, delete_payment, get_client_by_id,
        get_payment_by_id, list_payments, set_payment_proof, update_payment,
    },
    storage::MAX_UPLOAD_BYTES,
};

use super::helpers::*;

#[derive(Serialize)]
pub struct PaymentRow {
    pub id: String,
    pub cliente_id: String,
    pub monto: f64,
    pub fecha: String,
    pub estado: String,
    pub mes_servicio: String,
    pub comprobante_url: Option<String>,
    pub notas: Option<String>,
}

impl PaymentRow {
    fn from_model(payment: Payment) -> PaymentRow {
        PaymentRow {
            id: payment.id.map(|id| id.to_hex()).unwrap_or_default(),
            cliente_id: payment.cliente_id.to_hex(),
            monto: payment.monto,
            fecha: fmt_date(&payment.fecha),
            estado: payment.estado.as_str().to_string(),
            mes_servicio: payment.mes_servicio,
            comprobante_url: payment.comprobante_url,
            notas: payment.notas,
        }
    }
}

#[derive(Deserialize)]
pub struct PaymentsQuery {
    #[serde(default)]
    pub cliente: Option<String>,
    #[serde(default)]
    pub mes: Option<String>,
}

pub async fn payments_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cliente_id = match &query.cliente {
        Some(raw) => Some(parse_object_id(raw)?),
        None => None,
    };
    let payments = list_payments(&state, cliente_id.as_ref(), query.mes.as_deref()).await?;
    let rows: Vec<PaymentRow> = payments.into_iter().map(PaymentRow::from_model).collect();
    Ok(ok(rows))
}

pub async fn payments_show(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let payment = get_payment_by_id(&state, &object_id)
        .await?
        .ok_or_else(|| AppError::not_found("pago no encontrado"))?;
    Ok(ok(PaymentRow::from_model(payment)))
}

#[derive(Deserialize)]
pub struct PaymentForm {
    pub cliente_id: String,
    pub monto: f64,
    pub fecha: String,
    #[serde(default)]
    pub estado: Option<String>,
    pub mes_servicio: String,
    #[serde(default)]
    pub notas: Option<String>,
}

pub async fn payments_create(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<PaymentForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cliente_id = parse_object_id(&form.cliente_id)?;
    if get_client_by_id(&state, &cliente_id).await?.is_none() {
        return Err(AppError::not_found("cliente no encontrado"));
    }

    let monto = parse_positive_amount(form.monto, "monto")?;
    let fecha = parse_date_field(&form.fecha, "fecha")?;
    if billing::parse_service_month(&form.mes_servicio).is_none() {
        return Err(AppError::validation("mes de servicio inválido (AAAA-MM)"));
    }
    let estado = match form.estado.as_deref() {
        Some(raw) => PaymentStatus::parse(raw)
            .ok_or_else(|| AppError::validation("estado de pago inválido"))?,
        None => PaymentStatus::Pendiente,
    };

    let id = create_payment(
        &state,
        &cliente_id,
        monto,
        fecha,
        estado,
        &form.mes_servicio,
        clean_opt(form.notas),
    )
    .await?;
    Ok(ok(serde_json::json!({ "id": id.to_hex() })))
}

#[derive(Deserialize)]
pub struct PaymentUpdateForm {
    pub monto: f64,
    pub fecha: String,
    pub estado: String,
    #[serde(default)]
    pub notas: Option<String>,
}

pub async fn payments_update(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<PaymentUpdateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let monto = parse_positive_amount(form.monto, "monto")?;
    let fecha = parse_date_field(&form.fecha, "fecha")?;
    let estado = PaymentStatus::parse(&form.estado)
        .ok_or_else(|| AppError::validation("estado de pago inválido"))?;

    update_payment(&state, &object_id, monto, fecha, estado, clean_opt(form.notas)).await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn payments_confirm(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    confirm_payment(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn payments_delete(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    delete_payment(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}

/// Carga multipart del comprobante (campo "archivo"): JPEG/PNG/PDF ≤ 5MB.
pub async fn payments_upload_proof(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    if get_payment_by_id(&state, &object_id).await?.is_none() {
        return Err(AppError::not_found("pago no encontrado"));
    }

    let mut uploaded: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::validation("formulario multipart inválido"))?
    {
        if field.name() != Some("archivo") {
            continue;
        }
        let content_type = field
            .content_type()
            .ok_or_else(|| AppError::validation("archivo sin tipo de contenido"))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::validation("no se pudo leer el archivo"))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::validation("el archivo supera los 5MB"));
        }
        uploaded = Some((content_type, bytes.to_vec()));
        break;
    }

    let Some((content_type, bytes)) = uploaded else {
        return Err(AppError::validation("falta el campo archivo"));
    };

    let url = state.storage.upload_proof(&content_type, bytes).await?;
    set_payment_proof(&state, &object_id, &url).await?;
    Ok(ok(serde_json::json!({ "comprobante_url": url })))
}
