#[path = "common/mod.rs"]
mod common;

use chrono::NaiveDate;
use mongodb::bson::DateTime;

use cobranzas::{
    billing::CLASS_ATRASADO,
    models::{DeliveryStatus, DocumentKind, NotificationChannel},
    notify::dispatch_to_clients,
    state::{create_client, get_client_by_id, get_template_by_classification, list_notifications},
};

// Without gateway credentials every send fails, but the batch must still
// visit every client, write one row per attempt and report the aggregate.
#[tokio::test]
async fn failed_sends_are_recorded_and_never_abort_the_batch() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let con_telefono = create_client(
        &state,
        "María Quispe",
        DocumentKind::Dni,
        "45678912",
        Some("999111222".to_string()),
        None,
        None,
        None,
        true,
        200.0,
        DateTime::now(),
        None,
    )
    .await
    .unwrap();
    let sin_telefono = create_client(
        &state,
        "Carlos Huamán",
        DocumentKind::Dni,
        "87654321",
        None,
        None,
        None,
        None,
        true,
        200.0,
        DateTime::now(),
        None,
    )
    .await
    .unwrap();

    let clients = vec![
        get_client_by_id(&state, &con_telefono).await.unwrap().unwrap(),
        get_client_by_id(&state, &sin_telefono).await.unwrap().unwrap(),
    ];
    let template = get_template_by_classification(&state, CLASS_ATRASADO)
        .await
        .unwrap()
        .unwrap();

    let referencia = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
    let summary = dispatch_to_clients(
        &state,
        &clients,
        &template,
        NotificationChannel::Whatsapp,
        referencia,
    )
    .await
    .unwrap();

    assert_eq!(summary.enviados, 0);
    assert_eq!(summary.fallidos, 2);

    let rows = list_notifications(&state, None).await.unwrap();
    assert_eq!(rows.len(), 2, "one row per attempt");
    assert!(rows.iter().all(|n| n.estado == DeliveryStatus::Fallido));
    assert!(rows.iter().all(|n| n.detalle.is_some()));

    // The client without a phone has its own row too.
    let propios = list_notifications(&state, Some(&sin_telefono)).await.unwrap();
    assert_eq!(propios.len(), 1);
    assert_eq!(
        propios[0].detalle.as_deref(),
        Some("cliente sin teléfono")
    );

    common::teardown(Some(ctx)).await;
}
