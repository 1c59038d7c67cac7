#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tower::ServiceExt; // for oneshot

use cobranzas::{
    models::UserRole,
    routes,
    session::SESSION_COOKIE_NAME,
    state::{AppState, create_session, create_user},
};

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn admin_token(state: &AppState) -> String {
    create_session(state, &state.config.admin_email)
        .await
        .unwrap()
}

#[tokio::test]
async fn api_requires_a_session() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let app = routes::router(Arc::new(ctx.state.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/clientes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn login_sets_a_session_cookie() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();
    let app = routes::router(Arc::new(state.clone()));

    let creds = serde_json::json!({
        "email": state.config.admin_email,
        "password": state.config.admin_password,
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/login", None, &creds.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["rol"], "admin");

    // The cookie works against a protected route.
    let token = cookie
        .split(';')
        .next()
        .unwrap()
        .trim_start_matches(&format!("{SESSION_COOKIE_NAME}="))
        .to_string();
    let response = app
        .oneshot(json_request("GET", "/api/me", Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();
    let app = routes::router(Arc::new(state.clone()));

    let creds = serde_json::json!({
        "email": state.config.admin_email,
        "password": "incorrecta",
    });
    let response = app
        .oneshot(json_request("POST", "/api/login", None, &creds.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn user_admin_is_admin_only() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();
    let app = routes::router(Arc::new(state.clone()));

    create_user(
        &state,
        "cobrador@cobranzas.local",
        "Cobrador",
        "secreto123",
        UserRole::Staff,
    )
    .await
    .unwrap();
    let staff_token = create_session(&state, "cobrador@cobranzas.local")
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request("GET", "/api/usuarios", Some(&staff_token), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let token = admin_token(&state).await;
    let response = app
        .oneshot(json_request("GET", "/api/usuarios", Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn status_reports_disabled_integrations() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();
    let app = routes::router(Arc::new(state.clone()));
    let token = admin_token(&state).await;

    // The test config carries no external credentials.
    let response = app
        .oneshot(json_request("GET", "/api/estado", Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["canales"], serde_json::json!([]));
    assert_eq!(body["data"]["almacenamiento"], false);
    assert_eq!(body["data"]["padron"], false);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn client_creation_validates_the_document() {
    let ctx = common::setup_state().await;
    if ctx.is_none() {
        return;
    }
    let ctx = ctx.unwrap();
    let state = ctx.state.clone();
    let app = routes::router(Arc::new(state.clone()));
    let token = admin_token(&state).await;

    let invalido = serde_json::json!({
        "nombre": "Bodega San Juan",
        "tipo_documento": "dni",
        "documento": "123",
        "cuota_fija": true,
        "monto_cuota": 350.0,
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clientes",
            Some(&token),
            &invalido.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    let valido = serde_json::json!({
        "nombre": "Bodega San Juan",
        "tipo_documento": "ruc",
        "documento": "20123456789",
        "cuota_fija": true,
        "monto_cuota": 350.0,
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clientes",
            Some(&token),
            &valido.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/clientes/{id}"),
            Some(&token),
            "",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["nombre"], "Bodega San Juan");
    assert_eq!(body["data"]["activo"], true);

    common::teardown(Some(ctx)).await;
}
