// storage.rs
// Proof-of-payment uploads to the object-storage bucket. Accepts JPEG, PNG
// or PDF up to 5 MB and returns the public URL of the stored object.

use std::time::Duration;

use anyhow::anyhow;
use uuid::Uuid;

use crate::{config::StorageConfig, errors::AppError};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("application/pdf", "pdf"),
];

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    config: Option<StorageConfig>,
}

impl StorageClient {
    pub fn new(config: Option<StorageConfig>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        StorageClient { http, config }
    }

    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    pub async fn upload_proof(
        &self,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        // Input errors first; the caller gets the real reason even when the
        // bucket credentials are absent.
        let Some((_, ext)) = ALLOWED_TYPES.iter().find(|(ct, _)| *ct == content_type) else {
            return Err(AppError::validation(
                "tipo de archivo no permitido (JPEG, PNG o PDF)",
            ));
        };
        if bytes.is_empty() {
            return Err(AppError::validation("archivo vacío"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::validation("el archivo supera los 5MB"));
        }

        let Some(config) = &self.config else {
            return Err(AppError::validation("almacenamiento no configurado"));
        };

        let key = format!("comprobantes/{}.{ext}", Uuid::new_v4());
        let base = config.base_url.trim_end_matches('/');
        let upload_url = format!("{base}/storage/v1/object/{}/{key}", config.bucket);

        let response = self
            .http
            .post(&upload_url)
            .bearer_auth(&config.key)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| AppError::Other(anyhow!("storage unreachable: {err}")))?;

        if !response.status().is_success() {
            return Err(AppError::Other(anyhow!(
                "storage upload failed with {}",
                response.status()
            )));
        }

        Ok(format!(
            "{base}/storage/v1/object/public/{}/{key}",
            config.bucket
        ))
    }
}
