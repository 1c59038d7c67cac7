// notifications.rs
// Historial de avisos y envío masivo por clasificación o por lista de
// clientes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    models::{Client, MessageTemplate, Notification, NotificationChannel},
    notify::dispatch_to_clients,
    session::SessionUser,
    state::{
        AppState, debt_for_client, get_client_by_id, get_template_by_classification,
        get_template_by_id, list_clients, list_notifications,
    },
};

use super::helpers::*;

#[derive(Serialize)]
pub struct NotificationRow {
    pub id: String,
    pub cliente_id: String,
    pub canal: String,
    pub enviado_en: String,
    pub estado: String,
    pub detalle: Option<String>,
}

impl NotificationRow {
    fn from_model(notification: Notification) -> NotificationRow {
        NotificationRow {
            id: notification.id.map(|id| id.to_hex()).unwrap_or_default(),
            cliente_id: notification.cliente_id.to_hex(),
            canal: notification.canal.as_str().to_string(),
            enviado_en: fmt_datetime(&notification.enviado_en),
            estado: notification.estado.as_str().to_string(),
            detalle: notification.detalle,
        }
    }
}

#[derive(Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub cliente: Option<String>,
}

pub async fn notifications_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cliente_id = match &query.cliente {
        Some(raw) => Some(parse_object_id(raw)?),
        None => None,
    };
    let notifications = list_notifications(&state, cliente_id.as_ref()).await?;
    let rows: Vec<NotificationRow> = notifications
        .into_iter()
        .map(NotificationRow::from_model)
        .collect();
    Ok(ok(rows))
}

/// Destinatarios: lista explícita de ids o todos los activos de una
/// clasificación. Plantilla: explícita o la de la clasificación.
#[derive(Deserialize)]
pub struct DispatchForm {
    pub canal: String,
    #[serde(default)]
    pub clasificacion: Option<String>,
    #[serde(default)]
    pub clientes: Option<Vec<String>>,
    #[serde(default)]
    pub plantilla_id: Option<String>,
}

pub async fn notifications_dispatch(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<DispatchForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let canal = NotificationChannel::parse(&form.canal)
        .ok_or_else(|| AppError::validation("canal desconocido"))?;
    if !state.notifier.channel_enabled(canal) {
        return Err(AppError::validation(format!(
            "canal {} no configurado",
            canal.as_str()
        )));
    }

    let clasificacion = clean_opt(form.clasificacion);
    let referencia = Utc::now().date_naive();

    let clients = resolve_recipients(
        &state,
        form.clientes.as_deref(),
        clasificacion.as_deref(),
        referencia,
    )
    .await?;
    if clients.is_empty() {
        return Err(AppError::validation("sin destinatarios"));
    }

    let template =
        resolve_template(&state, form.plantilla_id.as_deref(), clasificacion.as_deref()).await?;

    let summary = dispatch_to_clients(&state, &clients, &template, canal, referencia).await?;
    Ok(ok(summary))
}

async fn resolve_recipients(
    state: &AppState,
    ids: Option<&[String]>,
    clasificacion: Option<&str>,
    referencia: NaiveDate,
) -> Result<Vec<Client>, AppError> {
    if let Some(ids) = ids {
        if ids.is_empty() {
            return Err(AppError::validation("lista de clientes vacía"));
        }
        let mut clients = Vec::with_capacity(ids.len());
        for raw in ids {
            let id = parse_object_id(raw)?;
            let client = get_client_by_id(state, &id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("cliente {raw} no encontrado")))?;
            clients.push(client);
        }
        return Ok(clients);
    }

    let Some(clasificacion) = clasificacion else {
        return Err(AppError::validation(
            "se requiere clasificacion o lista de clientes",
        ));
    };

    // Effective classification: manual override when present, otherwise the
    // one derived from the client's debt aging.
    let mut matched = Vec::new();
    for client in list_clients(state, true).await? {
        let efectiva = match &client.clasificacion {
            Some(manual) => manual.clone(),
            None => {
                let deuda = debt_for_client(state, &client, referencia).await?;
                deuda.clasificacion.to_string()
            }
        };
        if efectiva == clasificacion {
            matched.push(client);
        }
    }
    Ok(matched)
}

async fn resolve_template(
    state: &AppState,
    plantilla_id: Option<&str>,
    clasificacion: Option<&str>,
) -> Result<MessageTemplate, AppError> {
    if let Some(raw) = plantilla_id {
        let id = parse_object_id(raw)?;
        return get_template_by_id(state, &id)
            .await?
            .ok_or_else(|| AppError::not_found("plantilla no encontrada"));
    }
    let Some(clasificacion) = clasificacion else {
        return Err(AppError::validation(
            "se requiere plantilla_id o clasificacion",
        ));
    };
    get_template_by_classification(state, clasificacion)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("no hay plantilla para {clasificacion}"))
        })
}
