// templates.rs
// CRUD de plantillas de aviso (una por clasificación).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    billing::{CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO},
    errors::AppError,
    models::MessageTemplate,
    session::SessionUser,
    state::{
        AppState, create_template, delete_template, get_template_by_id, list_templates,
        update_template,
    },
};

use super::helpers::*;

#[derive(Serialize)]
pub struct TemplateRow {
    pub id: String,
    pub clasificacion: String,
    pub nombre: String,
    pub cuerpo: String,
}

impl TemplateRow {
    fn from_model(template: MessageTemplate) -> TemplateRow {
        TemplateRow {
            id: template.id.map(|id| id.to_hex()).unwrap_or_default(),
            clasificacion: template.clasificacion,
            nombre: template.nombre,
            cuerpo: template.cuerpo,
        }
    }
}

#[derive(Deserialize)]
pub struct TemplateForm {
    pub clasificacion: String,
    pub nombre: String,
    pub cuerpo: String,
}

fn validate_form(form: &TemplateForm) -> Result<(), AppError> {
    let known = [CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO];
    if !known.contains(&form.clasificacion.as_str()) {
        return Err(AppError::validation("clasificación desconocida"));
    }
    if form.nombre.trim().is_empty() {
        return Err(AppError::validation("nombre es obligatorio"));
    }
    if form.cuerpo.trim().is_empty() {
        return Err(AppError::validation("cuerpo es obligatorio"));
    }
    Ok(())
}

pub async fn templates_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let templates = list_templates(&state).await?;
    let rows: Vec<TemplateRow> = templates.into_iter().map(TemplateRow::from_model).collect();
    Ok(ok(rows))
}

pub async fn templates_show(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    let template = get_template_by_id(&state, &object_id)
        .await?
        .ok_or_else(|| AppError::not_found("plantilla no encontrada"))?;
    Ok(ok(TemplateRow::from_model(template)))
}

pub async fn templates_create(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<TemplateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_form(&form)?;
    let id = create_template(
        &state,
        &form.clasificacion,
        form.nombre.trim(),
        form.cuerpo.trim(),
    )
    .await?;
    Ok(ok(serde_json::json!({ "id": id.to_hex() })))
}

pub async fn templates_update(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<TemplateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    validate_form(&form)?;
    update_template(
        &state,
        &object_id,
        &form.clasificacion,
        form.nombre.trim(),
        form.cuerpo.trim(),
    )
    .await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn templates_delete(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let object_id = parse_object_id(&id)?;
    delete_template(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}
