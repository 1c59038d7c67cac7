// notify.rs
// Notification dispatcher. The Notifier owns the outbound transports
// (WhatsApp gateway, email relay, SMS gateway); a channel is available only
// when its credentials were present at startup. Dispatch is best-effort per
// client: one failed send is recorded and logged, never aborts the batch,
// and the caller gets only an aggregate summary.

use std::time::Duration;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    billing,
    config::{Config, EmailConfig, SmsConfig, WhatsappConfig},
    errors::AppError,
    models::{Client, DeliveryStatus, MessageTemplate, NotificationChannel},
    state::{AppState, debt_for_client, record_notification},
};

#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    whatsapp: Option<WhatsappConfig>,
    email: Option<EmailConfig>,
    sms: Option<SmsConfig>,
}

#[derive(Debug, Default, Serialize)]
pub struct DispatchSummary {
    pub enviados: u32,
    pub fallidos: u32,
}

impl Notifier {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Notifier {
            http,
            whatsapp: config.whatsapp.clone(),
            email: config.email.clone(),
            sms: config.sms.clone(),
        }
    }

    pub fn channel_enabled(&self, canal: NotificationChannel) -> bool {
        match canal {
            NotificationChannel::Whatsapp => self.whatsapp.is_some(),
            NotificationChannel::Email => self.email.is_some(),
            NotificationChannel::Sms => self.sms.is_some(),
        }
    }

    pub fn enabled_channels(&self) -> Vec<&'static str> {
        [
            (NotificationChannel::Whatsapp, self.whatsapp.is_some()),
            (NotificationChannel::Email, self.email.is_some()),
            (NotificationChannel::Sms, self.sms.is_some()),
        ]
        .into_iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(canal, _)| canal.as_str())
        .collect()
    }

    async fn send_whatsapp(&self, destino: &str, cuerpo: &str) -> Result<()> {
        let Some(config) = &self.whatsapp else {
            bail!("canal whatsapp no configurado");
        };
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "from": config.sender,
            "to": destino,
            "type": "text",
            "text": { "body": cuerpo },
        });
        self.post_gateway(&config.api_url, &config.token, payload).await
    }

    async fn send_email(&self, destino: &str, asunto: &str, cuerpo: &str) -> Result<()> {
        let Some(config) = &self.email else {
            bail!("canal email no configurado");
        };
        let payload = serde_json::json!({
            "from": config.from,
            "to": destino,
            "subject": asunto,
            "text": cuerpo,
        });
        self.post_gateway(&config.api_url, &config.token, payload).await
    }

    async fn send_sms(&self, destino: &str, cuerpo: &str) -> Result<()> {
        let Some(config) = &self.sms else {
            bail!("canal sms no configurado");
        };
        let payload = serde_json::json!({ "to": destino, "message": cuerpo });
        self.post_gateway(&config.api_url, &config.token, payload).await
    }

    async fn post_gateway(
        &self,
        url: &str,
        token: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("gateway respondió {}", response.status());
        }
        Ok(())
    }
}

/// Sends the rendered template to every client over the given channel and
/// records one Notification row per attempt. Returns the aggregate only.
pub async fn dispatch_to_clients(
    state: &AppState,
    clients: &[Client],
    template: &MessageTemplate,
    canal: NotificationChannel,
    referencia: NaiveDate,
) -> Result<DispatchSummary, AppError> {
    let mut summary = DispatchSummary::default();

    for client in clients {
        let Some(cliente_id) = client.id else { continue };

        let outcome = notify_client(state, client, template, canal, referencia).await;
        let (estado, detalle) = match outcome {
            Ok(()) => (DeliveryStatus::Enviado, None),
            Err(err) => {
                tracing::warn!(
                    cliente = %client.nombre,
                    canal = canal.as_str(),
                    error = %err,
                    "aviso no entregado"
                );
                (DeliveryStatus::Fallido, Some(err.to_string()))
            }
        };

        record_notification(state, &cliente_id, canal, estado, detalle).await?;
        match estado {
            DeliveryStatus::Enviado => summary.enviados += 1,
            DeliveryStatus::Fallido => summary.fallidos += 1,
        }
    }

    Ok(summary)
}

// Everything client-specific happens here so one client's failure (debt read
// included) records its fallido row and the batch moves on.
async fn notify_client(
    state: &AppState,
    client: &Client,
    template: &MessageTemplate,
    canal: NotificationChannel,
    referencia: NaiveDate,
) -> Result<()> {
    let deuda = debt_for_client(state, client, referencia).await?;
    let cuerpo = billing::render_template(
        &template.cuerpo,
        &[
            ("nombre", client.nombre.clone()),
            ("monto", billing::format_amount(deuda.saldo)),
            ("mes", billing::service_month_of(referencia)),
            ("fecha", referencia.format("%d/%m/%Y").to_string()),
        ],
    );
    send_one(state, client, canal, &cuerpo).await
}

async fn send_one(
    state: &AppState,
    client: &Client,
    canal: NotificationChannel,
    cuerpo: &str,
) -> Result<()> {
    match canal {
        NotificationChannel::Whatsapp => {
            let Some(telefono) = client.telefono.as_deref() else {
                bail!("cliente sin teléfono");
            };
            state.notifier.send_whatsapp(telefono, cuerpo).await
        }
        NotificationChannel::Email => {
            let Some(email) = client.email.as_deref() else {
                bail!("cliente sin email");
            };
            state
                .notifier
                .send_email(email, "Aviso de cobranza", cuerpo)
                .await
        }
        NotificationChannel::Sms => {
            let Some(telefono) = client.telefono.as_deref() else {
                bail!("cliente sin teléfono");
            };
            state.notifier.send_sms(telefono, cuerpo).await
        }
    }
}
