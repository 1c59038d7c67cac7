// commitments.rs
// Compromisos de pago: promesas, no transacciones. CRUD plano.

use std::time::SystemTime;

use anyhow::Context;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::{
    errors::AppError,
    models::{CommitmentStatus, PaymentCommitment},
};

use super::AppState;

pub async fn list_commitments(
    state: &AppState,
    cliente_id: Option<&ObjectId>,
) -> Result<Vec<PaymentCommitment>, AppError> {
    let filter = match cliente_id {
        Some(id) => doc! { "cliente_id": id },
        None => doc! {},
    };
    let mut cursor = state
        .commitments
        .find(filter)
        .sort(doc! { "fecha_promesa": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(commitment) = cursor.try_next().await? {
        items.push(commitment);
    }
    Ok(items)
}

pub async fn get_commitment_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<PaymentCommitment>, AppError> {
    state
        .commitments
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn create_commitment(
    state: &AppState,
    cliente_id: &ObjectId,
    fecha_promesa: DateTime,
    monto_promesa: f64,
    notas: Option<String>,
) -> Result<ObjectId, AppError> {
    let res = state
        .commitments
        .insert_one(PaymentCommitment {
            id: None,
            cliente_id: *cliente_id,
            fecha_promesa,
            monto_promesa,
            estado: CommitmentStatus::Pendiente,
            notas,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await?;
    res.inserted_id
        .as_object_id()
        .context("commitment insert missing _id")
        .map_err(Into::into)
}

pub async fn update_commitment(
    state: &AppState,
    id: &ObjectId,
    fecha_promesa: DateTime,
    monto_promesa: f64,
    notas: Option<String>,
) -> Result<(), AppError> {
    let res = state
        .commitments
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "fecha_promesa": fecha_promesa,
                "monto_promesa": monto_promesa,
                "notas": notas,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("compromiso no encontrado"));
    }
    Ok(())
}

pub async fn set_commitment_status(
    state: &AppState,
    id: &ObjectId,
    estado: CommitmentStatus,
) -> Result<(), AppError> {
    let res = state
        .commitments
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "estado": estado.as_str(),
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("compromiso no encontrado"));
    }
    Ok(())
}

pub async fn delete_commitment(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let res = state.commitments.delete_one(doc! { "_id": id }).await?;
    if res.deleted_count == 0 {
        return Err(AppError::not_found("compromiso no encontrado"));
    }
    Ok(())
}
