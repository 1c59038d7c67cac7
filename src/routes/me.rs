// routes/me.rs
// GET /api/me -> authenticated user info.

use axum::Json;

use crate::session::SessionUser;

pub async fn me(session_user: SessionUser) -> Json<serde_json::Value> {
    let user = session_user.user();
    Json(serde_json::json!({
        "success": true,
        "data": {
            "userId": user.id.map(|id| id.to_hex()),
            "email": user.email,
            "nombre": user.nombre,
            "rol": session_user.role().as_str(),
        },
    }))
}
