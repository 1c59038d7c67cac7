#[path = "common/mod.rs"]
mod common;

use mongodb::bson::DateTime;

use cobranzas::{
    billing::CLASS_ATRASADO,
    errors::AppError,
    models::{DocumentKind, PaymentStatus, UserRole},
    state::{
        create_client, create_payment, create_receipt, create_template, create_user,
        deactivate_client, delete_user, find_user, get_client_by_id, list_clients, list_payments,
        list_templates, verify_password,
    },
};

#[tokio::test]
async fn seed_creates_admin_and_stock_templates() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let admin = find_user(&state, &state.config.admin_email)
        .await
        .unwrap()
        .expect("admin seeded");
    assert!(admin.role.is_admin());
    assert!(verify_password(&state.config.admin_password, &admin.password_hash).unwrap());

    let templates = list_templates(&state).await.unwrap();
    assert_eq!(templates.len(), 3, "one template per classification");

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn one_template_per_classification() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let err = create_template(&state, CLASS_ATRASADO, "Otra", "cuerpo")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn clients_are_soft_deleted() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let id = create_client(
        &state,
        "Bodega San Juan",
        DocumentKind::Ruc,
        "20123456789",
        Some("999111222".to_string()),
        None,
        None,
        None,
        true,
        350.0,
        DateTime::now(),
        None,
    )
    .await
    .unwrap();

    deactivate_client(&state, &id).await.unwrap();

    let client = get_client_by_id(&state, &id).await.unwrap().unwrap();
    assert!(!client.activo, "deactivated, not deleted");

    let todos = list_clients(&state, false).await.unwrap();
    assert_eq!(todos.len(), 1);
    let activos = list_clients(&state, true).await.unwrap();
    assert!(activos.is_empty());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn duplicate_service_month_is_rejected() {
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
        100.0,
        DateTime::now(),
        None,
    )
    .await
    .unwrap();

    create_payment(
        &state,
        &cliente_id,
        100.0,
        DateTime::now(),
        PaymentStatus::Pendiente,
        "2024-04",
        None,
    )
    .await
    .unwrap();

    let err = create_payment(
        &state,
        &cliente_id,
        100.0,
        DateTime::now(),
        PaymentStatus::Confirmado,
        "2024-04",
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    // A different month is fine.
    create_payment(
        &state,
        &cliente_id,
        100.0,
        DateTime::now(),
        PaymentStatus::Pendiente,
        "2024-05",
        None,
    )
    .await
    .unwrap();

    let payments = list_payments(&state, Some(&cliente_id), None).await.unwrap();
    assert_eq!(payments.len(), 2);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn receipt_numbers_are_sequential_and_unique_per_payment() {
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
        200.0,
        DateTime::now(),
        None,
    )
    .await
    .unwrap();

    let pago1 = create_payment(
        &state,
        &cliente_id,
        200.0,
        DateTime::now(),
        PaymentStatus::Confirmado,
        "2024-03",
        None,
    )
    .await
    .unwrap();
    let pago2 = create_payment(
        &state,
        &cliente_id,
        200.0,
        DateTime::now(),
        PaymentStatus::Confirmado,
        "2024-04",
        None,
    )
    .await
    .unwrap();

    let recibo1 = create_receipt(&state, &pago1).await.unwrap();
    let recibo2 = create_receipt(&state, &pago2).await.unwrap();
    assert_eq!(recibo1.numero, 1);
    assert_eq!(recibo2.numero, 2);

    let err = create_receipt(&state, &pago1).await.unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn user_emails_are_unique() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();

    let id = create_user(
        &state,
        "cobrador@cobranzas.local",
        "Cobrador",
        "secreto123",
        UserRole::Staff,
    )
    .await
    .unwrap();

    let err = create_user(
        &state,
        "cobrador@cobranzas.local",
        "Otro",
        "secreto456",
        UserRole::Staff,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    delete_user(&state, &id).await.unwrap();
    assert!(
        find_user(&state, "cobrador@cobranzas.local")
            .await
            .unwrap()
            .is_none()
    );

    common::teardown(Some(ctx)).await;
}
