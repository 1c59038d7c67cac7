// routes/mod.rs
// Router assembly and public re-exports of all route handlers. Every /api
// route except login sits behind the session middleware.

use std::sync::Arc;

use axum::{
    Router, middleware,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

use crate::{session::require_session, state::AppState};

pub mod admin;
pub mod login;
pub mod logout;
pub mod me;

pub use admin::*;
pub use login::login;
pub use logout::logout;
pub use me::me;

pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .route("/api/estado", get(system_status))
        .route(
            "/api/clientes",
            get(clients_index).post(clients_create),
        )
        .route(
            "/api/clientes/{id}",
            get(clients_show).put(clients_update).delete(clients_delete),
        )
        .route("/api/clientes/{id}/estado", patch(clients_toggle_active))
        .route("/api/clientes/{id}/deuda", get(clients_debt))
        .route("/api/pagos", get(payments_index).post(payments_create))
        .route(
            "/api/pagos/{id}",
            get(payments_show).put(payments_update).delete(payments_delete),
        )
        .route("/api/pagos/{id}/confirmar", patch(payments_confirm))
        .route("/api/pagos/{id}/comprobante", post(payments_upload_proof))
        .route(
            "/api/compromisos",
            get(commitments_index).post(commitments_create),
        )
        .route(
            "/api/compromisos/{id}",
            get(commitments_show)
                .put(commitments_update)
                .delete(commitments_delete),
        )
        .route("/api/compromisos/{id}/estado", patch(commitments_set_status))
        .route(
            "/api/plantillas",
            get(templates_index).post(templates_create),
        )
        .route(
            "/api/plantillas/{id}",
            get(templates_show)
                .put(templates_update)
                .delete(templates_delete),
        )
        .route("/api/recibos", get(receipts_index).post(receipts_create))
        .route(
            "/api/recibos/{id}",
            get(receipts_show).delete(receipts_delete),
        )
        .route("/api/recibos/{id}/enviar", patch(receipts_mark_sent))
        .route("/api/notificaciones", get(notifications_index))
        .route("/api/notificaciones/enviar", post(notifications_dispatch))
        .route("/api/facturacion/previa", get(billing_preview_index))
        .route("/api/facturacion/generar", post(billing_generate))
        .route("/api/usuarios", get(users_index).post(users_create))
        .route(
            "/api/usuarios/{id}",
            axum::routing::put(users_update).delete(users_delete),
        )
        .route("/api/consultas/dni/{dni}", get(lookup_dni))
        .route("/api/consultas/ruc/{ruc}", get(lookup_ruc))
        .route("/api/consultas/tipo-cambio", get(lookup_tipo_cambio))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/api/login", post(login))
        .merge(protected)
        .layer(DefaultBodyLimit::max(6 * 1024 * 1024))
        .with_state(state)
}
