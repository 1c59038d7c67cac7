// billing.rs (state)
// Database side of the billing core: ledger reads, generation candidates,
// preview and the monthly payment generator. All month/debt arithmetic is
// delegated to the pure rules in crate::billing so the ledger and the
// preview cannot drift apart.

use std::collections::HashSet;
use std::time::SystemTime;

use chrono::NaiveDate;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use serde::Serialize;

use crate::{
    billing::{self, DebtSummary},
    errors::AppError,
    models::{Client, PaymentStatus},
};

use super::{AppState, confirmed_payments_for_client, create_payment, get_client_by_id};

#[derive(Debug, Serialize)]
pub struct GenerationOutcome {
    pub mes: String,
    pub generados: u32,
    /// Candidates that turned out to be billed already (lost the race to a
    /// concurrent trigger); the unique index makes this a skip, not a bug.
    pub omitidos: u32,
    pub fallidos: u32,
}

#[derive(Debug, Serialize)]
pub struct PreviewRow {
    pub cliente_id: String,
    pub nombre: String,
    pub cuota: f64,
    pub deuda: DebtSummary,
}

/// Debt aging of one client against a reference date.
pub async fn debt_for_client(
    state: &AppState,
    client: &Client,
    referencia: NaiveDate,
) -> Result<DebtSummary, AppError> {
    let Some(cliente_id) = client.id.as_ref() else {
        return Err(AppError::validation("cliente sin identificador"));
    };
    let confirmados: Vec<(NaiveDate, f64)> = confirmed_payments_for_client(state, cliente_id)
        .await?
        .into_iter()
        .map(|p| (p.fecha.to_chrono().date_naive(), p.monto))
        .collect();

    Ok(billing::debt_summary(
        client.monto_cuota,
        client.fecha_registro.to_chrono().date_naive(),
        &confirmados,
        referencia,
    ))
}

pub async fn client_debt(
    state: &AppState,
    id: &ObjectId,
    referencia: NaiveDate,
) -> Result<(Client, DebtSummary), AppError> {
    let client = get_client_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::not_found("cliente no encontrado"))?;
    let deuda = debt_for_client(state, &client, referencia).await?;
    Ok((client, deuda))
}

/// Clients eligible for automatic generation of the target month: active
/// fixed-fee clients without any payment row for that mes_servicio, sorted
/// by name.
pub async fn billing_candidates(state: &AppState, mes: &str) -> Result<Vec<Client>, AppError> {
    if billing::parse_service_month(mes).is_none() {
        return Err(AppError::validation("mes de servicio inválido (AAAA-MM)"));
    }

    let mut cursor = state
        .clients
        .find(doc! {
            "activo": true,
            "cuota_fija": true,
            "monto_cuota": { "$gt": 0.0 },
        })
        .sort(doc! { "nombre": 1 })
        .await?;
    let mut clients = Vec::new();
    while let Some(client) = cursor.try_next().await? {
        clients.push(client);
    }

    // Any payment for the month counts, pendiente or confirmado.
    let mut billed: HashSet<ObjectId> = HashSet::new();
    let mut payments = state.payments.find(doc! { "mes_servicio": mes }).await?;
    while let Some(payment) = payments.try_next().await? {
        billed.insert(payment.cliente_id);
    }

    Ok(billing::filter_eligible(clients, &billed))
}

/// Candidate list enriched with each client's debt aging, computed through
/// the same path as the per-client ledger.
pub async fn billing_preview(
    state: &AppState,
    mes: &str,
    referencia: NaiveDate,
) -> Result<Vec<PreviewRow>, AppError> {
    let candidates = billing_candidates(state, mes).await?;
    let mut rows = Vec::with_capacity(candidates.len());
    for client in &candidates {
        let deuda = debt_for_client(state, client, referencia).await?;
        rows.push(PreviewRow {
            cliente_id: client.id.map(|id| id.to_hex()).unwrap_or_default(),
            nombre: client.nombre.clone(),
            cuota: client.monto_cuota,
            deuda,
        });
    }
    Ok(rows)
}

/// Inserts one pendiente payment per eligible client, dated at generation
/// time, amount = cuota fija. Best-effort across candidates: a failed insert
/// is logged and counted, never aborts the batch, and earlier inserts stay.
pub async fn generate_monthly_payments(
    state: &AppState,
    mes: &str,
) -> Result<GenerationOutcome, AppError> {
    let candidates = billing_candidates(state, mes).await?;
    let now = DateTime::from_system_time(SystemTime::now());

    let mut outcome = GenerationOutcome {
        mes: mes.to_string(),
        generados: 0,
        omitidos: 0,
        fallidos: 0,
    };

    for client in candidates {
        let Some(cliente_id) = client.id else { continue };
        match create_payment(
            state,
            &cliente_id,
            client.monto_cuota,
            now,
            PaymentStatus::Pendiente,
            mes,
            Some("generado automáticamente".to_string()),
        )
        .await
        {
            Ok(_) => outcome.generados += 1,
            Err(AppError::Duplicate(_)) => outcome.omitidos += 1,
            Err(err) => {
                tracing::error!(cliente = %client.nombre, error = %err, "pago no generado");
                outcome.fallidos += 1;
            }
        }
    }

    tracing::info!(
        mes,
        generados = outcome.generados,
        omitidos = outcome.omitidos,
        fallidos = outcome.fallidos,
        "generación mensual completada"
    );
    Ok(outcome)
}
