// templates.rs
// Plantillas de aviso, una por clasificación. The pre-insert existence check
// surfaces the domain error; the unique index on `clasificacion` covers the
// window between check and insert.

use std::time::SystemTime;

use anyhow::Context;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::{
    errors::{AppError, is_duplicate_key},
    models::MessageTemplate,
};

use super::AppState;

pub async fn list_templates(state: &AppState) -> Result<Vec<MessageTemplate>, AppError> {
    let mut cursor = state
        .templates
        .find(doc! {})
        .sort(doc! { "clasificacion": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(template) = cursor.try_next().await? {
        items.push(template);
    }
    Ok(items)
}

pub async fn get_template_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<MessageTemplate>, AppError> {
    state
        .templates
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn get_template_by_classification(
    state: &AppState,
    clasificacion: &str,
) -> Result<Option<MessageTemplate>, AppError> {
    state
        .templates
        .find_one(doc! { "clasificacion": clasificacion })
        .await
        .map_err(Into::into)
}

pub async fn create_template(
    state: &AppState,
    clasificacion: &str,
    nombre: &str,
    cuerpo: &str,
) -> Result<ObjectId, AppError> {
    if get_template_by_classification(state, clasificacion)
        .await?
        .is_some()
    {
        return Err(AppError::duplicate(format!(
            "ya existe una plantilla para la clasificación {clasificacion}"
        )));
    }

    let res = state
        .templates
        .insert_one(MessageTemplate {
            id: None,
            clasificacion: clasificacion.to_string(),
            nombre: nombre.to_string(),
            cuerpo: cuerpo.to_string(),
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await
        .map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::duplicate(format!(
                    "ya existe una plantilla para la clasificación {clasificacion}"
                ))
            } else {
                err.into()
            }
        })?;
    res.inserted_id
        .as_object_id()
        .context("template insert missing _id")
        .map_err(Into::into)
}

pub async fn update_template(
    state: &AppState,
    id: &ObjectId,
    clasificacion: &str,
    nombre: &str,
    cuerpo: &str,
) -> Result<(), AppError> {
    // Moving a template onto a classification that already has one would
    // break the one-per-classification invariant.
    if let Some(existing) = get_template_by_classification(state, clasificacion).await? {
        if existing.id.as_ref() != Some(id) {
            return Err(AppError::duplicate(format!(
                "ya existe una plantilla para la clasificación {clasificacion}"
            )));
        }
    }

    let res = state
        .templates
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "clasificacion": clasificacion,
                "nombre": nombre,
                "cuerpo": cuerpo,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("plantilla no encontrada"));
    }
    Ok(())
}

pub async fn delete_template(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let res = state.templates.delete_one(doc! { "_id": id }).await?;
    if res.deleted_count == 0 {
        return Err(AppError::not_found("plantilla no encontrada"));
    }
    Ok(())
}
