// lookup.rs
// External registry client: DNI and RUC lookups plus the daily exchange
// rate, all bearer-token GETs against a fixed base URL. Every failure mode
// (missing credentials, malformed input, non-2xx, network error) degrades to
// None; callers treat the enrichment as best-effort.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::RegistryConfig;

#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    config: Option<RegistryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub numero: String,
    pub nombres: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub numero: String,
    pub razon_social: String,
    pub estado: Option<String>,
    pub direccion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub fecha: String,
    pub compra: f64,
    pub venta: f64,
}

pub fn is_valid_dni(dni: &str) -> bool {
    dni.len() == 8 && dni.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_ruc(ruc: &str) -> bool {
    ruc.len() == 11 && ruc.bytes().all(|b| b.is_ascii_digit())
}

impl RegistryClient {
    pub fn new(config: Option<RegistryConfig>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        RegistryClient { http, config }
    }

    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Malformed numbers fail fast, before any network call.
    pub async fn consulta_dni(&self, dni: &str) -> Option<PersonRecord> {
        if !is_valid_dni(dni) {
            tracing::debug!(dni, "dni malformado, sin consulta");
            return None;
        }
        self.get_json(&format!("/v2/dni?numero={dni}")).await
    }

    pub async fn consulta_ruc(&self, ruc: &str) -> Option<CompanyRecord> {
        if !is_valid_ruc(ruc) {
            tracing::debug!(ruc, "ruc malformado, sin consulta");
            return None;
        }
        self.get_json(&format!("/v2/ruc?numero={ruc}")).await
    }

    pub async fn tipo_cambio(&self, fecha: NaiveDate) -> Option<ExchangeRate> {
        self.get_json(&format!("/v2/tipo-cambio?fecha={fecha}")).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Option<T> {
        let config = self.config.as_ref()?;
        let url = format!("{}{}", config.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&config.token)
            .send()
            .await
            .map_err(|err| tracing::warn!(error = %err, url, "registry request failed"))
            .ok()?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), url, "registry returned non-2xx");
            return None;
        }
        response
            .json::<T>()
            .await
            .map_err(|err| tracing::warn!(error = %err, url, "registry response unreadable"))
            .ok()
    }
}
