// seed.rs
// Collection/index bootstrap and first-run seeding: the admin account from
// config plus one stock aviso template per classification.

use std::time::SystemTime;

use anyhow::Result;
use mongodb::{
    Database, IndexModel,
    bson::{DateTime, doc},
    options::IndexOptions,
};

use crate::{
    billing::{CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO},
    config::Config,
    models::{MessageTemplate, User, UserRole},
    state::users::hash_password,
};

const COLLECTIONS: [&str; 9] = [
    "users",
    "sessions",
    "clientes",
    "pagos",
    "compromisos",
    "plantillas",
    "notificaciones",
    "recibos",
    "counters",
];

pub(super) async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in COLLECTIONS {
        if !existing.iter().any(|c| c == name) {
            db.create_collection(name).await?;
        }
    }
    Ok(())
}

pub(super) async fn ensure_indexes(db: &Database) -> Result<()> {
    let unique = |keys| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    };

    db.collection::<crate::models::User>("users")
        .create_index(unique(doc! { "email": 1 }))
        .await?;
    db.collection::<crate::models::Session>("sessions")
        .create_index(unique(doc! { "token": 1 }))
        .await?;
    // Idempotency guard for automatic generation: at most one payment per
    // (cliente, mes_servicio), enforced by the store, not by a read.
    db.collection::<crate::models::Payment>("pagos")
        .create_index(unique(doc! { "cliente_id": 1, "mes_servicio": 1 }))
        .await?;
    db.collection::<MessageTemplate>("plantillas")
        .create_index(unique(doc! { "clasificacion": 1 }))
        .await?;
    db.collection::<crate::models::Receipt>("recibos")
        .create_index(unique(doc! { "pago_id": 1 }))
        .await?;
    Ok(())
}

pub(super) async fn is_database_empty(db: &Database) -> Result<bool> {
    let users = db.collection::<User>("users");
    let count = users.estimated_document_count().await?;
    Ok(count == 0)
}

pub(super) async fn seed_admin_user(db: &Database, config: &Config) -> Result<()> {
    let now = DateTime::from_system_time(SystemTime::now());
    db.collection::<User>("users")
        .insert_one(User {
            id: None,
            email: config.admin_email.clone(),
            nombre: "Administrador".to_string(),
            password_hash: hash_password(&config.admin_password)?,
            role: UserRole::Admin,
            created_at: Some(now),
            updated_at: None,
        })
        .await?;
    Ok(())
}

pub(super) async fn seed_default_templates(db: &Database) -> Result<()> {
    let now = DateTime::from_system_time(SystemTime::now());
    let stock = [
        (
            CLASS_AL_DIA,
            "Recordatorio de cuota",
            "Hola {nombre}, le recordamos que su cuota de {monto} del mes {mes} ya está disponible para pago.",
        ),
        (
            CLASS_ATRASADO,
            "Aviso de atraso",
            "Hola {nombre}, registra un saldo pendiente de {monto} al {fecha}. Por favor regularice su pago del mes {mes}.",
        ),
        (
            CLASS_MOROSO_CRONICO,
            "Aviso de deuda acumulada",
            "Estimado {nombre}, su deuda acumulada asciende a {monto} al {fecha}. Comuníquese con nosotros para acordar un compromiso de pago.",
        ),
    ];

    let templates = db.collection::<MessageTemplate>("plantillas");
    for (clasificacion, nombre, cuerpo) in stock {
        templates
            .insert_one(MessageTemplate {
                id: None,
                clasificacion: clasificacion.to_string(),
                nombre: nombre.to_string(),
                cuerpo: cuerpo.to_string(),
                created_at: Some(now),
                updated_at: None,
            })
            .await?;
    }
    Ok(())
}
