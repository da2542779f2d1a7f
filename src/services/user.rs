//! User services - Presenza e profili degli utenti

use crate::core::{AppError, AppState};
use crate::dtos::{
    LocationDTO, ProfileDTO, UpdateProfileDTO, UserDTO, UserSearchQuery, WsEventDTO,
};
use crate::entities::User;
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state), fields(search = %params.search))]
pub async fn search_user_with_name(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserSearchQuery>, // query params /users?search=name
) -> Result<Json<Vec<UserDTO>>, AppError> {
    debug!("Searching users with partial name");
    let users = state.user.search_by_name_partial(&params.search).await?;
    info!("Found {} users matching search criteria", users.len());
    let users_dto = users.into_iter().map(UserDTO::from).collect::<Vec<_>>();
    Ok(Json::from(users_dto))
}

/// Snapshot di tutti gli utenti online: il re-fetch completo che un client
/// esegue alla (ri)connessione, prima di riprendere gli eventi incrementali.
#[instrument(skip(state))]
pub async fn list_online_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    debug!("Listing online users");
    let users = state.user.find_all_online().await?;
    info!("Found {} online users", users.len());
    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>, // parametro dalla URL /users/:user_id
) -> Result<Json<Option<UserDTO>>, AppError> {
    debug!("Fetching user by ID");
    let user_option = state.user.read(&user_id).await?;
    if user_option.is_some() {
        info!("User found");
    } else {
        warn!("User not found");
    }
    Ok(Json(user_option.map(UserDTO::from)))
}

#[instrument(skip(state, current_user), fields(viewer = %current_user.user_id, target = %user_id))]
pub async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ProfileDTO>, AppError> {
    debug!("Revealing full user profile");
    // 1. Rileggere il record persistito dell'utente che guarda: il check di
    //    entitlement è autoritativo, una volta per ogni reveal, mai dedotto
    //    da stato di navigazione
    // 2. Se non è premium, ritornare FORBIDDEN
    // 3. Caricare il profilo richiesto e ritornarlo completo

    let viewer = state
        .user
        .read(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("You are not an authorized user"))?;

    if !viewer.is_premium {
        warn!("Non-premium user attempted profile reveal");
        return Err(AppError::forbidden(
            "Premium access is required to view full profiles",
        ));
    }

    let target = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    info!("Profile revealed");
    Ok(Json(ProfileDTO::from(target)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateProfileDTO>,
) -> Result<Json<UserDTO>, AppError> {
    debug!("Updating own profile");
    body.validate()?;

    let updated = state
        .user
        .update_profile(&current_user.user_id, &body)
        .await?;

    // i marker degli altri client mostrano nome/corso: profilo cambiato -> fan-out
    let dto = UserDTO::from(updated);
    state.feeds.publish_user(WsEventDTO::UserUpsert(dto.clone()));

    info!("Profile updated");
    Ok(Json(dto))
}

/// Scrittura REST della posizione: stessa semantica del LocationUpdate via
/// WebSocket. Scrive sempre e solo la riga dell'utente autenticato.
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_my_location(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<LocationDTO>,
) -> Result<(), AppError> {
    debug!("Updating own location");
    body.validate()?;

    state
        .user
        .update_location(&current_user.user_id, body.lat, body.lng)
        .await?;

    if let Some(user) = state.user.read(&current_user.user_id).await? {
        state
            .feeds
            .publish_user(WsEventDTO::UserUpsert(UserDTO::from(user)));
    }

    Ok(())
}
