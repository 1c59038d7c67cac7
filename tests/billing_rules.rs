use std::collections::HashSet;

use chrono::NaiveDate;
use mongodb::bson::{DateTime, oid::ObjectId};

use cobranzas::{
    billing::{
        CLASS_AL_DIA, CLASS_ATRASADO, CLASS_MOROSO_CRONICO, classification_for, debt_summary,
        filter_eligible, format_amount, months_between, parse_service_month, render_template,
        service_month_of,
    },
    models::{Client, DocumentKind},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client(nombre: &str, activo: bool, cuota_fija: bool, monto_cuota: f64) -> Client {
    Client {
        id: Some(ObjectId::new()),
        nombre: nombre.to_string(),
        tipo_documento: DocumentKind::Dni,
        documento: "12345678".to_string(),
        telefono: None,
        email: None,
        direccion: None,
        clasificacion: None,
        cuota_fija,
        monto_cuota,
        fecha_registro: DateTime::now(),
        activo,
        notas: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn months_between_counts_calendar_months() {
    assert_eq!(months_between(date(2024, 1, 15), date(2024, 4, 10)), 3);
    assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 1)), 1);
    assert_eq!(months_between(date(2023, 11, 1), date(2024, 2, 1)), 3);
    assert_eq!(months_between(date(2024, 4, 1), date(2024, 4, 30)), 0);
}

#[test]
fn months_between_never_negative() {
    assert_eq!(months_between(date(2024, 6, 1), date(2024, 4, 1)), 0);
}

#[test]
fn service_month_parsing() {
    assert_eq!(parse_service_month("2024-04"), Some((2024, 4)));
    assert_eq!(parse_service_month("2024-12"), Some((2024, 12)));
    assert_eq!(parse_service_month("2024-13"), None);
    assert_eq!(parse_service_month("2024-00"), None);
    assert_eq!(parse_service_month("2024-4"), None);
    assert_eq!(parse_service_month("abril"), None);
    assert_eq!(parse_service_month(""), None);
}

#[test]
fn service_month_of_formats_with_padding() {
    assert_eq!(service_month_of(date(2024, 4, 10)), "2024-04");
    assert_eq!(service_month_of(date(2024, 11, 1)), "2024-11");
}

#[test]
fn debt_without_payments_accrues_from_registration() {
    let resumen = debt_summary(500.0, date(2024, 1, 15), &[], date(2024, 4, 10));
    assert_eq!(resumen.ancla, date(2024, 1, 15));
    assert_eq!(resumen.meses_vencidos, 3);
    assert_eq!(resumen.devengado, 1500.0);
    assert_eq!(resumen.pagado, 0.0);
    assert_eq!(resumen.saldo, 1500.0);
    assert_eq!(resumen.clasificacion, CLASS_MOROSO_CRONICO);
}

#[test]
fn confirmed_payment_moves_the_anchor() {
    let confirmados = vec![(date(2024, 3, 5), 500.0)];
    let resumen = debt_summary(500.0, date(2024, 1, 15), &confirmados, date(2024, 4, 10));
    assert_eq!(resumen.ancla, date(2024, 3, 5));
    assert_eq!(resumen.meses_vencidos, 1);
    assert_eq!(resumen.devengado, 500.0);
    assert_eq!(resumen.pagado, 500.0);
    assert_eq!(resumen.saldo, 0.0);
}

#[test]
fn zero_elapsed_months_owes_nothing() {
    let resumen = debt_summary(500.0, date(2024, 4, 2), &[], date(2024, 4, 28));
    assert_eq!(resumen.meses_vencidos, 0);
    assert_eq!(resumen.saldo, 0.0);
    assert_eq!(resumen.clasificacion, CLASS_AL_DIA);
}

#[test]
fn saldo_never_goes_negative() {
    // Payment larger than the accrued amount.
    let confirmados = vec![(date(2024, 2, 1), 2000.0)];
    let resumen = debt_summary(500.0, date(2024, 1, 1), &confirmados, date(2024, 3, 1));
    assert_eq!(resumen.saldo, 0.0);
}

#[test]
fn classification_buckets() {
    assert_eq!(classification_for(0), CLASS_AL_DIA);
    assert_eq!(classification_for(1), CLASS_ATRASADO);
    assert_eq!(classification_for(2), CLASS_ATRASADO);
    assert_eq!(classification_for(3), CLASS_MOROSO_CRONICO);
    assert_eq!(classification_for(12), CLASS_MOROSO_CRONICO);
}

#[test]
fn eligibility_filters_and_sorts() {
    let activa = client("Zoila", true, true, 100.0);
    let tambien_activa = client("Ana", true, true, 80.0);
    let inactiva = client("Inactiva", false, true, 100.0);
    let variable = client("Variable", true, false, 0.0);
    let cuota_cero = client("Gratis", true, true, 0.0);
    let ya_facturada = client("Facturada", true, true, 100.0);

    let mut billed = HashSet::new();
    billed.insert(ya_facturada.id.unwrap());

    let eligible = filter_eligible(
        vec![
            activa,
            tambien_activa,
            inactiva,
            variable,
            cuota_cero,
            ya_facturada,
        ],
        &billed,
    );

    let nombres: Vec<&str> = eligible.iter().map(|c| c.nombre.as_str()).collect();
    assert_eq!(nombres, vec!["Ana", "Zoila"]);
}

#[test]
fn template_rendering_replaces_known_tokens() {
    let cuerpo = "Hola {nombre}, debes {monto} por {mes}. Corte: {desconocido}";
    let out = render_template(
        cuerpo,
        &[
            ("nombre", "María".to_string()),
            ("monto", format_amount(350.0)),
            ("mes", "2024-04".to_string()),
        ],
    );
    assert_eq!(out, "Hola María, debes S/ 350.00 por 2024-04. Corte: {desconocido}");
}

#[test]
fn amounts_use_two_decimals() {
    assert_eq!(format_amount(1500.0), "S/ 1500.00");
    assert_eq!(format_amount(99.5), "S/ 99.50");
}
