// users.rs
// Staff accounts and server-side sessions. Passwords are PBKDF2-HMAC-SHA256
// with a per-user random salt; session tokens are opaque 32-byte randoms.

use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use data_encoding::BASE32_NOPAD;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};
use openssl::{hash::MessageDigest, memcmp, pkcs5::pbkdf2_hmac};
use rand::RngCore;

use crate::{
    errors::{AppError, is_duplicate_key},
    models::{Session, User, UserRole},
};

use super::{AppState, SESSION_TTL_SECONDS};

const PBKDF2_ITERS: usize = 100_000;
const HASH_LEN: usize = 32;

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);

    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac(
        password.as_bytes(),
        &salt,
        PBKDF2_ITERS,
        MessageDigest::sha256(),
        &mut out,
    )?;
    Ok(format!(
        "pbkdf2${PBKDF2_ITERS}${}${}",
        B64.encode(salt),
        B64.encode(out)
    ))
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let mut parts = stored.split('$');
    let scheme = parts.next().context("hash vacío")?;
    if scheme != "pbkdf2" {
        return Err(anyhow!("esquema de hash desconocido: {scheme}"));
    }
    let iters: usize = parts.next().context("faltan iteraciones")?.parse()?;
    let salt = B64.decode(parts.next().context("falta salt")?)?;
    let expected = B64.decode(parts.next().context("falta hash")?)?;

    let mut out = vec![0u8; expected.len()];
    pbkdf2_hmac(
        password.as_bytes(),
        &salt,
        iters,
        MessageDigest::sha256(),
        &mut out,
    )?;
    Ok(memcmp::eq(&out, &expected))
}

pub async fn find_user(state: &AppState, email: &str) -> Result<Option<User>, AppError> {
    state
        .users
        .find_one(doc! { "email": email })
        .await
        .map_err(Into::into)
}

pub async fn get_user_by_id(state: &AppState, id: &ObjectId) -> Result<Option<User>, AppError> {
    state
        .users
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>, AppError> {
    let mut cursor = state.users.find(doc! {}).sort(doc! { "email": 1 }).await?;
    let mut users = Vec::new();
    while let Some(user) = cursor.try_next().await? {
        users.push(user);
    }
    Ok(users)
}

pub async fn create_user(
    state: &AppState,
    email: &str,
    nombre: &str,
    password: &str,
    role: UserRole,
) -> Result<ObjectId, AppError> {
    let res = state
        .users
        .insert_one(User {
            id: None,
            email: email.to_string(),
            nombre: nombre.to_string(),
            password_hash: hash_password(password)?,
            role,
            created_at: Some(DateTime::from_system_time(SystemTime::now())),
            updated_at: None,
        })
        .await
        .map_err(|err| {
            if is_duplicate_key(&err) {
                AppError::duplicate(format!("ya existe un usuario con email {email}"))
            } else {
                err.into()
            }
        })?;
    res.inserted_id
        .as_object_id()
        .context("user insert missing _id")
        .map_err(Into::into)
}

pub async fn update_user(
    state: &AppState,
    id: &ObjectId,
    nombre: &str,
    role: UserRole,
    password: Option<&str>,
) -> Result<(), AppError> {
    let mut set = doc! {
        "nombre": nombre,
        "role": role.as_str(),
        "updated_at": DateTime::from_system_time(SystemTime::now()),
    };
    if let Some(password) = password {
        set.insert("password_hash", hash_password(password)?);
    }
    let res = state
        .users
        .update_one(doc! { "_id": id }, doc! { "$set": set })
        .await?;
    if res.matched_count == 0 {
        return Err(AppError::not_found("usuario no encontrado"));
    }
    Ok(())
}

pub async fn delete_user(state: &AppState, id: &ObjectId) -> Result<(), AppError> {
    let user = get_user_by_id(state, id)
        .await?
        .ok_or_else(|| AppError::not_found("usuario no encontrado"))?;
    state.users.delete_one(doc! { "_id": id }).await?;
    // Drop any live sessions of the removed account.
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": &user.email })
        .await;
    Ok(())
}

pub async fn create_session(state: &AppState, email: &str) -> Result<String, AppError> {
    let _ = state
        .sessions
        .delete_many(doc! { "user_email": email })
        .await;

    let mut token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut token_bytes);
    let token = BASE32_NOPAD.encode(&token_bytes);

    let expires_at =
        DateTime::from_system_time(SystemTime::now() + Duration::from_secs(SESSION_TTL_SECONDS));

    state
        .sessions
        .insert_one(Session {
            id: None,
            token: token.clone(),
            user_email: email.to_string(),
            expires_at,
        })
        .await?;

    Ok(token)
}

pub async fn find_user_by_session(
    state: &AppState,
    token: &str,
) -> Result<Option<User>, AppError> {
    if let Some(session) = state.sessions.find_one(doc! { "token": token }).await? {
        let expires_at = session.expires_at.to_system_time();
        if expires_at <= SystemTime::now() {
            // Remove expired session, ignore result
            let _ = state.sessions.delete_one(doc! { "token": token }).await;
            return Ok(None);
        }
        find_user(state, &session.user_email).await
    } else {
        Ok(None)
    }
}

pub async fn delete_session(state: &AppState, token: &str) -> Result<(), AppError> {
    state.sessions.delete_one(doc! { "token": token }).await?;
    Ok(())
}
