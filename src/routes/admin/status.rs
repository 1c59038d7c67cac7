// status.rs
// GET /api/estado -> qué integraciones externas están habilitadas, para que
// el frontend oculte lo que no se puede usar.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{session::SessionUser, state::AppState};

use super::helpers::ok;

pub async fn system_status(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    ok(serde_json::json!({
        "canales": state.notifier.enabled_channels(),
        "almacenamiento": state.storage.enabled(),
        "padron": state.registry.enabled(),
    }))
}
