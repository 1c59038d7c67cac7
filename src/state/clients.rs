// clients.rs
// Cliente repository. Clients are never hard-deleted; `activo` is the soft
// state, toggled by staff.

use std::time::SystemTime;

use anyhow::Context;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::{
    errors::AppError,
    models::{Client, DocumentKind},
};

use super::AppState;

pub async fn list_clients(state: &AppState, solo_activos: bool) -> Result<Vec<Client>, AppError> {
    let filter = if solo_activos {
        doc! { "activo": true }
    } else {
        doc! {}
    };
    let mut cursor = state.clients.find(filter).sort(doc! { "nombre": 1 }).await?;
    let mut items = Vec::new();
    while let Some(client) = cursor.try_next().await? {
        items.push(client);
    }
    Ok(items)
}

pub async fn get_client_by_id(state: &AppState, id: &ObjectId) -> Result<Option<Client>, AppError> {
    state
        .clients
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_client(
    state: &AppState,
    nombre: &str,
    tipo_documento: DocumentKind,
    documento: &str,
    telefono: Option<String>,
    email: Option<String>,
    direccion: Option<String>,
    clasificacion: Option<String>,
    cuota_fija: bool,
    monto_cuota: f64,
    fecha_registro: DateTime,
    notas: Option<String>,
) -> Result<ObjectId, AppError> {
    // La cuota sólo tiene sentido para clientes de cuota fija.
    let monto_cuota = if cuota_fija { monto_cuota } else { 0.0 };

    let res = state
        .clients
        .insert_one(Client {
            id: None,
            nombre: nombre.to_string(),
            tipo_documento,
            documento: documento.to_string(),
            telefono,
            email,
            direccion,
            clasificacion,
            cuota_fija,
            monto_cuota,
            fecha_registro,
            activo: true,
            notas,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("client insert missing _id")
        .map_err(Into::into)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_client(
    state: &AppState,
    id: &ObjectId,
    nombre: &str,
    tipo_documento: DocumentKind,
    documento: &str,
    telefono: Option<String>,
    email: Option<String>,
    direccion: Option<String>,
    clasificacion: Option<String>,
    cuota_fija: bool,
    monto_cuota: f64,
    notas: Option<String>,
) -> Result<(), AppError> {
    let monto_cuota = if cuota_fija { monto_cuota } else { 0.0 };

    let res = state
        .clients
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "nombre": nombre,
                "tipo_documento": tipo_documento.as_str(),
                "documento": documento,
                "telefono": telefono,
                "email": email,
                "direccion": direccion,
                "clasificacion": clasificacion,
                "cuota_fija": cuota_fija,
                "monto_cuota": monto_cuota,
                "notas": notas,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("cliente no encontrado"));
    }
    Ok(())
}

/// Soft delete: flips `activo` off. An inactive client keeps its history but
/// drops out of automatic generation.
pub async fn deactivate_client(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    set_client_active(state, id, false).await
}

pub async fn set_client_active(
    state: &AppState,
    id: &ObjectId,
    activo: bool,
) -> Result<(), AppError> {
    let res = state
        .clients
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "activo": activo,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("cliente no encontrado"));
    }
    Ok(())
}
