// clients.rs
// CRUD de clientes y consulta de deuda (antigüedad de saldo).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    billing::{CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO},
    errors::AppError,
    lookup::{is_valid_dni, is_valid_ruc},
    models::{Client, DocumentKind},
    session::SessionUser,
    state::{
        AppState, client_debt, create_client, deactivate_client, get_client_by_id, list_clients,
        set_client_active, update_client,
    },
};

use super::helpers::*;

#[derive(Serialize)]
pub struct ClientRow {
    pub id: String,
    pub nombre: String,
    pub tipo_documento: String,
    pub documento: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    pub clasificacion: Option<String>,
    pub cuota_fija: bool,
    pub monto_cuota: f64,
    pub fecha_registro: String,
    pub activo: bool,
    pub notas: Option<String>,
}

impl ClientRow {
    pub fn from_model(client: Client) -> ClientRow {
        ClientRow {
            id: client.id.map(|id| id.to_hex()).unwrap_or_default(),
            nombre: client.nombre,
            tipo_documento: client.tipo_documento.as_str().to_string(),
            documento: client.documento,
            telefono: client.telefono,
            email: client.email,
            direccion: client.direccion,
            clasificacion: client.clasificacion,
            cuota_fija: client.cuota_fija,
            monto_cuota: client.monto_cuota,
            fecha_registro: fmt_date(&client.fecha_registro),
            activo: client.activo,
            notas: client.notas,
        }
    }
}

#[derive(Deserialize)]
pub struct ClientForm {
    pub nombre: String,
    pub tipo_documento: String,
    pub documento: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub clasificacion: Option<String>,
    #[serde(default)]
    pub cuota_fija: bool,
    #[serde(default)]
    pub monto_cuota: f64,
    #[serde(default)]
    pub fecha_registro: Option<String>,
    #[serde(default)]
    pub notas: Option<String>,
}

struct ValidClient {
    nombre: String,
    tipo_documento: DocumentKind,
    documento: String,
    clasificacion: Option<String>,
    monto_cuota: f64,
}

fn validate_form(form: &ClientForm) -> Result<ValidClient, AppError> {
    let nombre = form.nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("nombre es obligatorio"));
    }

    let documento = form.documento.trim().to_string();
    let tipo_documento = match form.tipo_documento.as_str() {
        "dni" => {
            if !is_valid_dni(&documento) {
                return Err(AppError::validation("DNI inválido (8 dígitos)"));
            }
            DocumentKind::Dni
        }
        "ruc" => {
            if !is_valid_ruc(&documento) {
                return Err(AppError::validation("RUC inválido (11 dígitos)"));
            }
            DocumentKind::Ruc
        }
        _ => return Err(AppError::validation("tipo de documento inválido")),
    };

    let clasificacion = clean_opt(form.clasificacion.clone());
    if let Some(clasificacion) = &clasificacion {
        let known = [CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO];
        if !known.contains(&clasificacion.as_str()) {
            return Err(AppError::validation("clasificación desconocida"));
        }
    }

    let monto_cuota = if form.cuota_fija {
        parse_positive_amount(form.monto_cuota, "monto de cuota")?
    } else {
        0.0
    };

    Ok(ValidClient {
        nombre: nombre.to_string(),
        tipo_documento,
        documento,
        clasificacion,
        monto_cuota,
    })
}

#[derive(Deserialize)]
pub struct ClientsQuery {
    #[serde(default)]
    pub activos: Option<bool>,
}

pub async fn clients_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClientsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let clients = list_clients(&state, query.activos.unwrap_or(false)).await?;
    let rows: Vec<ClientRow> = clients.into_iter().map(ClientRow::from_model).collect();
    Ok(ok(rows))
}

pub async fn clients_show(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let client = get_client_by_id(&state, &object_id)
        .await?
        .ok_or_else(|| AppError::not_found("cliente no encontrado"))?;
    Ok(ok(ClientRow::from_model(client)))
}

pub async fn clients_create(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<ClientForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let valid = validate_form(&form)?;
    let fecha_registro = match &form.fecha_registro {
        Some(value) => parse_date_field(value, "fecha de registro")?,
        None => mongodb::bson::DateTime::now(),
    };

    let id = create_client(
        &state,
        &valid.nombre,
        valid.tipo_documento,
        &valid.documento,
        clean_opt(form.telefono),
        clean_opt(form.email),
        clean_opt(form.direccion),
        valid.clasificacion,
        form.cuota_fija,
        valid.monto_cuota,
        fecha_registro,
        clean_opt(form.notas),
    )
    .await?;
    Ok(ok(serde_json::json!({ "id": id.to_hex() })))
}

pub async fn clients_update(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ClientForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let valid = validate_form(&form)?;

    update_client(
        &state,
        &object_id,
        &valid.nombre,
        valid.tipo_documento,
        &valid.documento,
        clean_opt(form.telefono),
        clean_opt(form.email),
        clean_opt(form.direccion),
        valid.clasificacion,
        form.cuota_fija,
        valid.monto_cuota,
        clean_opt(form.notas),
    )
    .await?;
    Ok(ok(serde_json::json!(null)))
}

/// DELETE desactiva; los clientes nunca se eliminan de verdad.
pub async fn clients_delete(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    deactivate_client(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}

#[derive(Deserialize)]
pub struct ToggleForm {
    pub activo: bool,
}

pub async fn clients_toggle_active(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<ToggleForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    set_client_active(&state, &object_id, form.activo).await?;
    Ok(ok(serde_json::json!(null)))
}

#[derive(Deserialize)]
pub struct DebtQuery {
    /// Fecha de referencia (AAAA-MM-DD); por defecto hoy.
    #[serde(default)]
    pub fecha: Option<String>,
}

pub async fn clients_debt(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DebtQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let referencia = match &query.fecha {
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::validation("fecha inválida (AAAA-MM-DD)"))?,
        None => Utc::now().date_naive(),
    };

    let (client, deuda) = client_debt(&state, &object_id, referencia).await?;
    let clasificacion_efectiva = client
        .clasificacion
        .clone()
        .unwrap_or_else(|| deuda.clasificacion.to_string());

    Ok(ok(serde_json::json!({
        "cliente": ClientRow::from_model(client),
        "deuda": deuda,
        "clasificacion_efectiva": clasificacion_efectiva,
    })))
}
