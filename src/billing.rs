// billing.rs
// Pure billing rules: debt aging, eligibility for automatic generation,
// classification and aviso rendering. No I/O here; the state layer feeds
// these from the collections so the ledger and the generation preview share
// one code path.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::models::Client;

pub const CLASS_AL_DIA: &str = "al-dia";
pub const CLASS_ATRASADO: &str = "atrasado";
pub const CLASS_MOROSO_CRONICO: &str = "moroso-cronico";

/// Calendar-month delta (year*12 + month), clamped at zero. Day-of-month is
/// ignored on purpose: a client registered on the 31st owes the same months
/// as one registered on the 1st.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let delta = (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    delta.max(0)
}

/// "YYYY-MM" service month.
pub fn parse_service_month(value: &str) -> Option<(i32, u32)> {
    let (year, month) = value.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

pub fn service_month_of(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtSummary {
    pub ancla: NaiveDate,
    pub meses_vencidos: i32,
    pub cuota: f64,
    pub devengado: f64,
    pub pagado: f64,
    pub saldo: f64,
    pub clasificacion: &'static str,
}

/// Debt aging for one client.
///
/// The anchor is the date of the most recent confirmed payment, or the
/// registration date when none exists. Months elapsed are counted from the
/// anchor at calendar-month granularity, and every confirmed payment dated at
/// or after the anchor is applied against the accrued amount. A client with
/// zero elapsed months owes nothing even without a payment this period.
pub fn debt_summary(
    cuota: f64,
    fecha_registro: NaiveDate,
    confirmados: &[(NaiveDate, f64)],
    referencia: NaiveDate,
) -> DebtSummary {
    let ancla = confirmados
        .iter()
        .map(|(fecha, _)| *fecha)
        .max()
        .unwrap_or(fecha_registro);

    let meses = months_between(ancla, referencia);
    let devengado = cuota * meses as f64;
    let pagado: f64 = confirmados
        .iter()
        .filter(|(fecha, _)| *fecha >= ancla)
        .map(|(_, monto)| monto)
        .sum();
    let saldo = (devengado - pagado).max(0.0);

    DebtSummary {
        ancla,
        meses_vencidos: meses,
        cuota,
        devengado,
        pagado,
        saldo,
        clasificacion: classification_for(meses),
    }
}

/// Aging bucket used to pick an aviso template: current, 1-2 months behind,
/// or chronic delinquent.
pub fn classification_for(meses_vencidos: i32) -> &'static str {
    match meses_vencidos {
        0 => CLASS_AL_DIA,
        1..=2 => CLASS_ATRASADO,
        _ => CLASS_MOROSO_CRONICO,
    }
}

/// Candidates for automatic generation: active fixed-fee clients with a
/// positive fee and no payment row (any estado) for the target month, sorted
/// by name.
pub fn filter_eligible(clients: Vec<Client>, ya_facturados: &HashSet<ObjectId>) -> Vec<Client> {
    let mut eligible: Vec<Client> = clients
        .into_iter()
        .filter(|c| c.activo && c.cuota_fija && c.monto_cuota > 0.0)
        .filter(|c| match &c.id {
            Some(id) => !ya_facturados.contains(id),
            None => false,
        })
        .collect();
    eligible.sort_by(|a, b| a.nombre.cmp(&b.nombre));
    eligible
}

pub fn format_amount(monto: f64) -> String {
    format!("S/ {monto:.2}")
}

/// Replaces the {nombre}, {monto}, {mes} and {fecha} tokens of a template
/// body. Unknown tokens are left untouched.
pub fn render_template(cuerpo: &str, vars: &[(&str, String)]) -> String {
    let mut out = cuerpo.to_string();
    for (token, value) in vars {
        out = out.replace(&format!("{{{token}}}"), value);
    }
    out
}
