// payments.rs
// Pago repository. The unique (cliente_id, mes_servicio) index backs both
// manual registration and automatic generation, so a duplicate month shows
// up as a domain error instead of a second row.

use std::time::SystemTime;

use anyhow::Context;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::{
    errors::{AppError, is_duplicate_key},
    models::{Payment, PaymentStatus},
};

use super::AppState;

pub async fn list_payments(
    state: &AppState,
    cliente_id: Option<&ObjectId>,
    mes_servicio: Option<&str>,
) -> Result<Vec<Payment>, AppError> {
    let mut filter = doc! {};
    if let Some(id) = cliente_id {
        filter.insert("cliente_id", id);
    }
    if let Some(mes) = mes_servicio {
        filter.insert("mes_servicio", mes);
    }
    let mut cursor = state
        .payments
        .find(filter)
        .sort(doc! { "fecha": -1 })
        .await?;
    let mut items = Vec::new();
    while let Some(payment) = cursor.try_next().await? {
        items.push(payment);
    }
    Ok(items)
}

pub async fn get_payment_by_id(
    state: &AppState,
    id: &ObjectId,
) -> Result<Option<Payment>, AppError> {
    state
        .payments
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn create_payment(
    state: &AppState,
    cliente_id: &ObjectId,
    monto: f64,
    fecha: DateTime,
    estado: PaymentStatus,
    mes_servicio: &str,
    notas: Option<String>,
) -> Result<ObjectId, AppError> {
    let res = state
        .payments
        .insert_one(Payment {
            id: None,
            cliente_id: *cliente_id,
            monto,
            fecha,
            estado,
            mes_servicio: mes_servicio.to_string(),
            comprobante_url: None,
            notas,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await
        .map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::duplicate(format!(
                    "el cliente ya tiene un pago para el mes {mes_servicio}"
                ))
            } else {
                err.into()
            }
        })?;
    res.inserted_id
        .as_object_id()
        .context("payment insert missing _id")
        .map_err(Into::into)
}

pub async fn update_payment(
    state: &AppState,
    id: &ObjectId,
    monto: f64,
    fecha: DateTime,
    estado: PaymentStatus,
    notas: Option<String>,
) -> Result<(), AppError> {
    let res = state
        .payments
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "monto": monto,
                "fecha": fecha,
                "estado": estado.as_str(),
                "notas": notas,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("pago no encontrado"));
    }
    Ok(())
}

pub async fn confirm_payment(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let res = state
        .payments
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "estado": PaymentStatus::Confirmado.as_str(),
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("pago no encontrado"));
    }
    Ok(())
}

pub async fn set_payment_proof(
    state: &AppState,
    id: &ObjectId,
    comprobante_url: &str,
) -> Result<(), AppError> {
    let res = state
        .payments
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "comprobante_url": comprobante_url,
                "updated_at": DateTime::from_system_time(SystemTime::now()),
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("pago no encontrado"));
    }
    Ok(())
}

pub async fn delete_payment(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    // Los recibos emitidos referencian al pago.
    let has_receipt = state
        .receipts
        .find_one(doc! { "pago_id": id })
        .await?
        .is_some();
    if has_receipt {
        return Err(AppError::validation(
            "el pago tiene un recibo emitido; anule el recibo primero",
        ));
    }
    let res = state.payments.delete_one(doc! { "_id": id }).await?;
    if res.deleted_count == 0 {
        return Err(AppError::not_found("pago no encontrado"));
    }
    Ok(())
}

/// Confirmed payments of one client, oldest first. Input to the debt aging
/// calculator.
pub async fn confirmed_payments_for_client(
    state: &AppState,
    cliente_id: &ObjectId,
) -> Result<Vec<Payment>, AppError> {
    let mut cursor = state
        .payments
        .find(doc! {
            "cliente_id": cliente_id,
            "estado": PaymentStatus::Confirmado.as_str(),
        })
        .sort(doc! { "fecha": 1 })
        .await?;
    let mut items = Vec::new();
    while let Some(payment) = cursor.try_next().await? {
        items.push(payment);
    }
    Ok(items)
}
