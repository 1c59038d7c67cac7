#[path = "common/mod.rs"]
mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::DateTime;

use cobranzas::{
    errors::AppError,
    models::{DocumentKind, PaymentStatus},
    state::{
        billing_candidates, billing_preview, client_debt, confirm_payment, create_client,
        create_payment, generate_monthly_payments, list_payments,
    },
};

fn bson_date(y: i32, m: u32, d: u32) -> DateTime {
    let naive = NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    DateTime::from_chrono(Utc.from_utc_datetime(&naive))
}

#[tokio::test]
async fn monthly_generation_is_idempotent() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let cliente_id = create_client(
        &state,
        "Bodega San Juan",
        DocumentKind::Ruc,
        "12345678901",
        Some("999111222".to_string()),
        None,
        None,
        None,
        true,
        500.0,
        bson_date(2024, 1, 15),
        None,
    )
    .await
    .unwrap();

    // A variable-fee client must never be billed automatically.
    create_client(
        &state,
        "Cliente Variable",
        DocumentKind::Dni,
        "11223344",
        None,
        None,
        None,
        None,
        false,
        0.0,
        bson_date(2024, 1, 15),
        None,
    )
    .await
    .unwrap();

    let candidates = billing_candidates(&state, "2024-04").await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].nombre, "Bodega San Juan");

    let outcome = generate_monthly_payments(&state, "2024-04").await.unwrap();
    assert_eq!(outcome.generados, 1);
    assert_eq!(outcome.fallidos, 0);

    let payments = list_payments(&state, Some(&cliente_id), Some("2024-04"))
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].monto, 500.0);
    assert_eq!(payments[0].estado, PaymentStatus::Pendiente);
    assert_eq!(
        payments[0].notas.as_deref(),
        Some("generado automáticamente")
    );

    // Second run: the month is already billed.
    let outcome = generate_monthly_payments(&state, "2024-04").await.unwrap();
    assert_eq!(outcome.generados, 0);
    let payments = list_payments(&state, Some(&cliente_id), Some("2024-04"))
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn concurrent_generation_never_duplicates() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    for n in 0..5 {
        create_client(
            &state,
            &format!("Cliente {n}"),
            DocumentKind::Dni,
            &format!("1000000{n}"),
            None,
            None,
            None,
            None,
            true,
            120.0,
            bson_date(2024, 1, 1),
            None,
        )
        .await
        .unwrap();
    }

    let (a, b) = tokio::join!(
        generate_monthly_payments(&state, "2024-05"),
        generate_monthly_payments(&state, "2024-05"),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Between the two triggers every client is billed exactly once; the
    // loser of each race lands in omitidos, never in a second row.
    assert_eq!(a.generados + b.generados, 5);
    assert_eq!(a.fallidos + b.fallidos, 0);

    let payments = list_payments(&state, None, Some("2024-05")).await.unwrap();
    assert_eq!(payments.len(), 5);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn preview_reports_debt_without_writing() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let cliente_id = create_client(
        &state,
        "María Quispe",
        DocumentKind::Dni,
        "45678912",
        None,
        None,
        None,
        None,
        true,
        500.0,
        bson_date(2024, 1, 15),
        None,
    )
    .await
    .unwrap();

    let referencia = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    let rows = billing_preview(&state, "2024-04", referencia).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].deuda.meses_vencidos, 3);
    assert_eq!(rows[0].deuda.saldo, 1500.0);

    let payments = list_payments(&state, Some(&cliente_id), None).await.unwrap();
    assert!(payments.is_empty(), "preview must not create payments");

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn confirmed_payment_resets_the_debt_anchor() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let cliente_id = create_client(
        &state,
        "Carlos Huamán",
        DocumentKind::Dni,
        "87654321",
        None,
        None,
        None,
        None,
        true,
        500.0,
        bson_date(2024, 1, 15),
        None,
    )
    .await
    .unwrap();

    let pago_id = create_payment(
        &state,
        &cliente_id,
        500.0,
        bson_date(2024, 3, 5),
        PaymentStatus::Pendiente,
        "2024-03",
        None,
    )
    .await
    .unwrap();

    let referencia = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();

    // Pendiente payments do not count against the debt.
    let (_, deuda) = client_debt(&state, &cliente_id, referencia).await.unwrap();
    assert_eq!(deuda.meses_vencidos, 3);
    assert_eq!(deuda.saldo, 1500.0);

    confirm_payment(&state, &pago_id).await.unwrap();
    let (_, deuda) = client_debt(&state, &cliente_id, referencia).await.unwrap();
    assert_eq!(deuda.ancla, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert_eq!(deuda.meses_vencidos, 1);
    assert_eq!(deuda.saldo, 0.0);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn malformed_month_is_a_validation_error() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let err = generate_monthly_payments(&state, "abril-2024")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    common::teardown(Some(ctx)).await;
}
