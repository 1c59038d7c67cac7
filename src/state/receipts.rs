// receipts.rs
// Recibos with a strictly sequential number taken from an atomic counter
// ($inc upsert), one receipt per payment.

use std::time::SystemTime;

use anyhow::Context;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{DateTime, doc, oid::ObjectId},
    options::ReturnDocument,
};

use crate::{
    errors::{AppError, is_duplicate_key},
    models::Receipt,
};

use super::AppState;

const RECEIPT_COUNTER: &str = "recibos";

pub async fn list_receipts(state: &AppState) -> Result<Vec<Receipt>, AppError> {
    let mut cursor = state
        .receipts
        .find(doc! {})
        .sort(doc! { "numero": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(receipt) = cursor.try_next().await? {
        items.push(receipt);
    }
    Ok(items)
}

pub async fn get_receipt_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<Receipt>, AppError> {
    state
        .receipts
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

async fn next_receipt_number(state: &AppState) -> Result<i64, AppError> {
    let counter = state
        .counters
        .find_one_and_update(
            doc! { "_id": RECEIPT_COUNTER },
            doc! { "$inc": { "seq": 1 } },
        )
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?
        .context("counter upsert returned nothing")?;
    Ok(counter.seq)
}

pub async fn create_receipt(state: &AppState, pago_id: &ObjectId) -> Result<Receipt, AppError> {
    if state
        .payments
        .find_one(doc! { "_id": pago_id })
        .await?
        .is_none()
    {
        return Err(AppError::not_found("pago no encontrado"));
    }

    if state
        .receipts
        .find_one(doc! { "pago_id": pago_id })
        .await?
        .is_some()
    {
        return Err(AppError::duplicate("el pago ya tiene un recibo emitido"));
    }

    // El número se consume aunque el insert falle; la numeración puede tener
    // huecos pero nunca repetidos.
    let numero = next_receipt_number(state).await?;
    let mut receipt = Receipt {
        id: None,
        pago_id: *pago_id,
        numero,
        generado_en: DateTime::from_system_time(SystemTime::now()),
        enviado_en: None,
    };

    let res = state
        .receipts
        .insert_one(receipt.clone())
        .await
        .map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::duplicate("el pago ya tiene un recibo emitido")
            } else {
                err.into()
            }
        })?;
    receipt.id = res.inserted_id.as_object_id();
    Ok(receipt)
}

pub async fn mark_receipt_sent(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let res = state
        .receipts
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "enviado_en": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("recibo no encontrado"));
    }
    Ok(())
}

pub async fn delete_receipt(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let res = state.receipts.delete_one(doc! { "_id": id }).await?;
    if res.deleted_count == 0 {
        return Err(AppError::not_found("recibo no encontrado"));
    }
    Ok(())
}
