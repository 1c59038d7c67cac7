// users.rs (routes)
// Administración de cuentas: solo para rol admin.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::AppError,
    models::{User, UserRole},
    session::SessionUser,
    state::{AppState, create_user, delete_user, list_users, update_user},
};

use super::helpers::*;

#[derive(Serialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub nombre: String,
    pub rol: String,
}

impl UserRow {
    fn from_model(user: User) -> UserRow {
        UserRow {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            nombre: user.nombre,
            rol: user.role.as_str().to_string(),
        }
    }
}

pub async fn users_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&session_user)?;
    let users = list_users(&state).await?;
    let rows: Vec<UserRow> = users.into_iter().map(UserRow::from_model).collect();
    Ok(ok(rows))
}

#[derive(Deserialize)]
pub struct UserForm {
    pub email: String,
    pub nombre: String,
    pub password: String,
    pub rol: String,
}

pub async fn users_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<UserForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&session_user)?;

    let email = form.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("email inválido"));
    }
    let nombre = form.nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("nombre es obligatorio"));
    }
    if form.password.len() < 8 {
        return Err(AppError::validation(
            "la contraseña debe tener al menos 8 caracteres",
        ));
    }
    let role =
        UserRole::parse(&form.rol).ok_or_else(|| AppError::validation("rol desconocido"))?;

    let id = create_user(&state, &email, nombre, &form.password, role).await?;
    Ok(ok(serde_json::json!({ "id": id.to_hex() })))
}

#[derive(Deserialize)]
pub struct UserUpdateForm {
    pub nombre: String,
    pub rol: String,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn users_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<UserUpdateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&session_user)?;

    let object_id = parse_object_id(&id)?;
    let nombre = form.nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("nombre es obligatorio"));
    }
    let role =
        UserRole::parse(&form.rol).ok_or_else(|| AppError::validation("rol desconocido"))?;
    let password = clean_opt(form.password);
    if let Some(password) = &password {
        if password.len() < 8 {
            return Err(AppError::validation(
                "la contraseña debe tener al menos 8 caracteres",
            ));
        }
    }

    update_user(&state, &object_id, nombre, role, password.as_deref()).await?;
    Ok(ok(serde_json::json!(null)))
}

pub async fn users_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&session_user)?;

    let object_id = parse_object_id(&id)?;
    if session_user.user_id() == Some(&object_id) {
        return Err(AppError::validation("no puedes eliminar tu propia cuenta"));
    }
    delete_user(&state, &object_id).await?;
    Ok(ok(serde_json::json!(null)))
}
