// notifications.rs
// Registro de avisos enviados. The dispatcher writes one row per attempt.

use std::time::SystemTime;

use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::{
    errors::AppError,
    models::{DeliveryStatus, Notification, NotificationChannel},
};

use super::AppState;

pub async fn list_notifications(
    state: &AppState,
    cliente_id: Option<&ObjectId>,
) -> Result<Vec<Notification>, AppError> {
    let filter = match cliente_id {
        Some(id) => doc! { "cliente_id": id },
        None => doc! {},
    };
    let mut cursor = state
        .notifications
        .find(filter)
        .sort(doc! { "enviado_en": -1 })
        .await?;
    let mut items = Vec::new();
    while let Some(notification) = cursor.try_next().await? {
        items.push(notification);
    }
    Ok(items)
}

pub async fn record_notification(
    state: &AppState,
    cliente_id: &ObjectId,
    canal: NotificationChannel,
    estado: DeliveryStatus,
    detalle: Option<String>,
) -> Result<(), AppError> {
    state
        .notifications
        .insert_one(Notification {
            id: None,
            cliente_id: *cliente_id,
            canal,
            enviado_en: DateTime::from_system_time(SystemTime::now()),
            estado,
            detalle,
        })
        .await?;
    Ok(())
}
