// models.rs
// Document models for the MongoDB collections.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// User roles for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Staff
    }
}

/// Staff account. Passwords are stored as `pbkdf2$<iters>$<salt>$<hash>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub nombre: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Session document linking an opaque token to a user and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub user_email: String,
    pub expires_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Dni,
    Ruc,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Dni => "dni",
            DocumentKind::Ruc => "ruc",
        }
    }
}

/// Billed customer. Never hard-deleted: `activo` carries the soft state.
/// `monto_cuota` is meaningful only when `cuota_fija` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nombre: String,
    pub tipo_documento: DocumentKind,
    pub documento: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub direccion: Option<String>,
    /// Manual override; when absent the classification is derived from the
    /// client's debt aging.
    pub clasificacion: Option<String>,
    pub cuota_fija: bool,
    pub monto_cuota: f64,
    pub fecha_registro: DateTime,
    pub activo: bool,
    pub notas: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pendiente,
    Confirmado,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pendiente => "pendiente",
            PaymentStatus::Confirmado => "confirmado",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pendiente" => Some(PaymentStatus::Pendiente),
            "confirmado" => Some(PaymentStatus::Confirmado),
            _ => None,
        }
    }
}

/// A recorded payment attributed to a service month ("YYYY-MM"). The unique
/// index on (cliente_id, mes_servicio) keeps automatic generation idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub cliente_id: ObjectId,
    pub monto: f64,
    pub fecha: DateTime,
    pub estado: PaymentStatus,
    pub mes_servicio: String,
    pub comprobante_url: Option<String>,
    pub notas: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentStatus {
    Pendiente,
    Cumplido,
    Incumplido,
}

impl CommitmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentStatus::Pendiente => "pendiente",
            CommitmentStatus::Cumplido => "cumplido",
            CommitmentStatus::Incumplido => "incumplido",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pendiente" => Some(CommitmentStatus::Pendiente),
            "cumplido" => Some(CommitmentStatus::Cumplido),
            "incumplido" => Some(CommitmentStatus::Incumplido),
            _ => None,
        }
    }
}

/// Promise to pay by a given date. Independent of Payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCommitment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub cliente_id: ObjectId,
    pub fecha_promesa: DateTime,
    pub monto_promesa: f64,
    pub estado: CommitmentStatus,
    pub notas: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

/// Aviso template, one per classification. Body carries the placeholder
/// tokens {nombre}, {monto}, {mes} and {fecha}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub clasificacion: String,
    pub nombre: String,
    pub cuerpo: String,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Whatsapp,
    Email,
    Sms,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Whatsapp => "whatsapp",
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "whatsapp" => Some(NotificationChannel::Whatsapp),
            "email" => Some(NotificationChannel::Email),
            "sms" => Some(NotificationChannel::Sms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Enviado,
    Fallido,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Enviado => "enviado",
            DeliveryStatus::Fallido => "fallido",
        }
    }
}

/// Delivery outcome of one dispatched aviso.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub cliente_id: ObjectId,
    pub canal: NotificationChannel,
    pub enviado_en: DateTime,
    pub estado: DeliveryStatus,
    pub detalle: Option<String>,
}

/// Receipt for a payment; `numero` comes from the atomic counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub pago_id: ObjectId,
    pub numero: i64,
    pub generado_en: DateTime,
    pub enviado_en: Option<DateTime>,
}

/// Named sequence backing receipt numbering ($inc with upsert).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub seq: i64,
}
