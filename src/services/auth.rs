//! Auth services - Gestione autenticazione e registrazione utenti
//!
//! Superficie sottile: il core consuma solo "chi è l'utente corrente".

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// DTO per il login (solo username e password)
#[derive(serde::Deserialize)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente nel database tramite username
    // 2. Se l'utente non esiste, ritornare errore UNAUTHORIZED (stesso messaggio
    //    del caso password errata: non rivelare quale dei due è sbagliato)
    // 3. Verificare la password contro l'hash memorizzato
    // 4. Generare un token JWT firmato col segreto dell'applicazione
    // 5. Costruire cookie HttpOnly + header Authorization (Bearer token)
    // 6. Ritornare StatusCode::OK con gli headers

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown username");
            return Err(AppError::unauthorized("Username or password are not correct."));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Login attempt with wrong password");
        return Err(AppError::unauthorized("Username or password are not correct."));
    }

    let token = encode_jwt(user.username, user.user_id, &state.jwt_secret)?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        24 * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        "Set-Cookie",
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Failed to build cookie header"))?,
    );
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to build auth header"))?,
    );

    info!("User logged in");
    Ok((StatusCode::OK, headers))
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>, // JSON body
) -> Result<Json<UserDTO>, AppError> {
    // 1. Validare il DTO con validator (username/password format, anno di corso)
    // 2. Controllare se esiste già un utente con lo stesso username
    // 3. Se esiste, ritornare errore CONFLICT
    // 4. Generare l'hash della password fornita
    // 5. Salvare il nuovo utente (password già hashata nel DTO passato al repo)
    // 6. Ritornare il profilo pubblico del nuovo utente come risposta JSON

    body.validate()?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        warn!("Registration attempt with taken username");
        return Err(AppError::conflict("Username already exists"));
    }

    let password_hash = User::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

    let new_user = CreateUserDTO {
        password: password_hash,
        ..body
    };

    let created_user = state.user.create(&new_user).await?;

    info!("User registered");
    Ok(Json(UserDTO::from(created_user)))
}
