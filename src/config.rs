// config.rs
// Explicit configuration built once at process start and passed by reference
// to the dispatcher, lookup and storage clients. Optional credential blocks:
// a channel is enabled exactly when its credentials are present.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub listen_port: u16,
    /// Seeded as the first admin account when the database is empty.
    pub admin_email: String,
    pub admin_password: String,
    pub registry: Option<RegistryConfig>,
    pub whatsapp: Option<WhatsappConfig>,
    pub email: Option<EmailConfig>,
    pub sms: Option<SmsConfig>,
    pub storage: Option<StorageConfig>,
}

/// Registro nacional (consultas DNI/RUC) y tipo de cambio.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct WhatsappConfig {
    pub api_url: String,
    pub token: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub token: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub key: String,
    pub bucket: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "cobranzas".to_string()),
            listen_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@cobranzas.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "cambiame".to_string()),
            registry: match (env::var("REGISTRY_API_URL"), env::var("REGISTRY_API_TOKEN")) {
                (Ok(base_url), Ok(token)) => Some(RegistryConfig { base_url, token }),
                _ => None,
            },
            whatsapp: match (
                env::var("WHATSAPP_API_URL"),
                env::var("WHATSAPP_API_TOKEN"),
                env::var("WHATSAPP_SENDER"),
            ) {
                (Ok(api_url), Ok(token), Ok(sender)) => Some(WhatsappConfig {
                    api_url,
                    token,
                    sender,
                }),
                _ => None,
            },
            email: match (
                env::var("EMAIL_API_URL"),
                env::var("EMAIL_API_TOKEN"),
                env::var("EMAIL_FROM"),
            ) {
                (Ok(api_url), Ok(token), Ok(from)) => Some(EmailConfig {
                    api_url,
                    token,
                    from,
                }),
                _ => None,
            },
            sms: match (env::var("SMS_API_URL"), env::var("SMS_API_TOKEN")) {
                (Ok(api_url), Ok(token)) => Some(SmsConfig { api_url, token }),
                _ => None,
            },
            storage: match (
                env::var("STORAGE_URL"),
                env::var("STORAGE_KEY"),
                env::var("STORAGE_BUCKET"),
            ) {
                (Ok(base_url), Ok(key), Ok(bucket)) => Some(StorageConfig {
                    base_url,
                    key,
                    bucket,
                }),
                _ => None,
            },
        }
    }

    /// Minimal config pointing at a local MongoDB, with every external
    /// channel disabled. Integration tests build on this.
    pub fn for_database(uri: impl Into<String>, db: impl Into<String>) -> Config {
        Config {
            mongodb_uri: uri.into(),
            mongodb_db: db.into(),
            listen_port: 0,
            admin_email: "admin@cobranzas.local".to_string(),
            admin_password: "cambiame".to_string(),
            registry: None,
            whatsapp: None,
            email: None,
            sms: None,
            storage: None,
        }
    }
}
