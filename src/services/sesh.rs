//! Sesh services - Ciclo di vita dei raduni effimeri
//!
//! La capacità è garantita solo dal join atomico nel repository: qui si fa
//! la diagnosi degli esiti e il fan-out, mai check-then-write sul contatore.

use crate::core::{AppError, AppState};
use crate::dtos::{CreateSeshDTO, SeshDTO, SeshParticipantsDTO, UserDTO, WsEventDTO};
use crate::entities::{Sesh, User};
use crate::repositories::{JoinAttempt, Read, ReadMany};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(creator = %current_user.user_id, activity = ?body.activity_type))]
pub async fn create_sesh(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Json(body): Json<CreateSeshDTO>,
) -> Result<Json<SeshDTO>, AppError> {
    debug!("Creating sesh");
    // 1. Validare il DTO (titolo non vuoto, capacità nei limiti del tipo)
    // 2. Verificare la capacità anche contro i limiti configurati a runtime
    // 3. Ancorare la posizione alla riga di presenza del creatore ADESSO:
    //    il raduno non segue i movimenti successivi del creatore
    // 4. Inserire il raduno con current_count = 1 (il creatore conta)
    // 5. Pubblicare l'insert sul feed dei raduni per tutti i client
    // 6. Ritornare il SeshDTO creato

    body.validate()?;

    if body.max_participants < state.sesh_min_participants
        || body.max_participants > state.sesh_max_participants
    {
        warn!("max_participants outside configured bounds");
        return Err(AppError::bad_request(
            "max_participants is outside the allowed range",
        ));
    }

    let created = state
        .sesh
        .create(&current_user.user_id, &body, current_user.lat, current_user.lng)
        .await?;

    debug!("Sesh created with id {}", created.sesh_id);

    let dto = SeshDTO::from(created);
    state.feeds.publish_sesh(WsEventDTO::SeshUpsert(dto.clone()));

    info!("Sesh created and announced");
    Ok(Json(dto))
}

/// Snapshot dei raduni attivi: il re-fetch completo dei client alla
/// (ri)connessione.
#[instrument(skip(state))]
pub async fn list_active_seshes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SeshDTO>>, AppError> {
    debug!("Listing active seshes");
    let seshes = state.sesh.find_active().await?;
    info!("Found {} active seshes", seshes.len());
    Ok(Json(seshes.into_iter().map(SeshDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(sesh_id = %sesh_id, user_id = %current_user.user_id))]
pub async fn join_sesh(
    State(state): State<Arc<AppState>>,
    Path(sesh_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<SeshDTO>, AppError> {
    debug!("Joining sesh");
    // 1. Recuperare il raduno; il creatore non può fare join (è già dentro)
    // 2. Tentare il join atomico: incremento condizionale + insert riga,
    //    in transazione. N client in gara sull'ultimo slot: ne passa uno
    // 3. Diagnosticare gli esiti negativi con messaggi distinguibili
    // 4. Rileggere la riga aggiornata e pubblicarla sul feed
    // 5. Ritornare il SeshDTO aggiornato

    let sesh = read_sesh(&state, &sesh_id).await?;

    if sesh.creator_id == current_user.user_id {
        warn!("Creator attempted to join own sesh");
        return Err(AppError::invalid_target("You cannot join your own sesh"));
    }

    match state.sesh.try_join(&sesh_id, &current_user.user_id).await? {
        JoinAttempt::Joined => {}
        JoinAttempt::Duplicate => {
            warn!("User already joined sesh {}", sesh_id);
            return Err(AppError::already_joined());
        }
        JoinAttempt::NoSlot => {
            // zero righe toccate: o il raduno non è più attivo, o è pieno
            return match state.sesh.read(&sesh_id).await? {
                None => Err(AppError::not_found("Sesh not found")),
                Some(s) if !s.is_active() => {
                    warn!("Join attempt on ended sesh {}", sesh_id);
                    Err(AppError::not_found("Sesh is no longer active"))
                }
                Some(_) => {
                    warn!("Join attempt on full sesh {}", sesh_id);
                    Err(AppError::capacity_exceeded())
                }
            };
        }
    }

    let updated = read_sesh(&state, &sesh_id).await?;
    let dto = SeshDTO::from(updated);
    state.feeds.publish_sesh(WsEventDTO::SeshUpsert(dto.clone()));

    info!("User joined sesh");
    Ok(Json(dto))
}

#[instrument(skip(state, current_user), fields(sesh_id = %sesh_id, user_id = %current_user.user_id))]
pub async fn leave_sesh(
    State(state): State<Arc<AppState>>,
    Path(sesh_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<Json<SeshDTO>, AppError> {
    debug!("Leaving sesh");
    // 1. Recuperare il raduno
    // 2. Il creatore non "lascia": per lui uscire significa terminare per
    //    tutti, quindi qui si fallisce chiuso indirizzando all'endpoint end
    // 3. Cancellare la riga di partecipazione + decremento, in transazione
    // 4. Pubblicare la riga aggiornata sul feed

    let sesh = read_sesh(&state, &sesh_id).await?;

    if sesh.creator_id == current_user.user_id {
        warn!("Creator attempted to leave own sesh");
        return Err(AppError::invalid_state(
            "Leaving your own sesh ends it for everyone: use the end endpoint",
        ));
    }

    let left = state.sesh.leave(&sesh_id, &current_user.user_id).await?;
    if !left {
        warn!("User was not a participant of sesh {}", sesh_id);
        return Err(AppError::not_found("You are not a participant of this sesh"));
    }

    let updated = read_sesh(&state, &sesh_id).await?;
    let dto = SeshDTO::from(updated);
    state.feeds.publish_sesh(WsEventDTO::SeshUpsert(dto.clone()));

    info!("User left sesh");
    Ok(Json(dto))
}

#[instrument(skip(state, current_user), fields(sesh_id = %sesh_id, user_id = %current_user.user_id))]
pub async fn end_sesh(
    State(state): State<Arc<AppState>>,
    Path(sesh_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<(), AppError> {
    debug!("Ending sesh");
    // 1. Recuperare il raduno; solo il creatore può terminarlo
    // 2. Transizione guardata ACTIVE -> ENDED (la riga resta per lo storico)
    // 3. Pubblicare la rimozione: ogni client la toglie dalla vista active
    //
    // La conferma "sicuro di voler terminare per tutti?" è un gate del
    // client, non di questa macchina a stati.

    let sesh = read_sesh(&state, &sesh_id).await?;

    if sesh.creator_id != current_user.user_id {
        warn!("Non-creator attempted to end sesh");
        return Err(AppError::forbidden("Only the creator can end a sesh"));
    }

    let ended = state
        .sesh
        .end_guarded(&sesh_id, &current_user.user_id)
        .await?;
    if !ended {
        warn!("Sesh {} was already ended", sesh_id);
        return Err(AppError::invalid_state("Sesh is already ended"));
    }

    state.feeds.publish_sesh(WsEventDTO::SeshRemoved { sesh_id });

    info!("Sesh ended");
    Ok(())
}

#[instrument(skip(state), fields(sesh_id = %sesh_id))]
pub async fn list_sesh_participants(
    State(state): State<Arc<AppState>>,
    Path(sesh_id): Path<i32>,
) -> Result<Json<SeshParticipantsDTO>, AppError> {
    debug!("Listing sesh participants");
    // 1. Recuperare il raduno
    // 2. Lista = {creatore} ∪ righe di partecipazione, ricalcolata adesso
    // 3. Caricare i profili pubblici in una sola query e ricomporre l'ordine:
    //    creatore per primo, poi ordine di arrivo

    let sesh = read_sesh(&state, &sesh_id).await?;

    let rows = state.participant.find_many_by_sesh_id(&sesh_id).await?;

    let mut ordered_ids = Vec::with_capacity(rows.len() + 1);
    ordered_ids.push(sesh.creator_id);
    ordered_ids.extend(rows.iter().map(|r| r.user_id));

    let users = state.user.read_many(&ordered_ids).await?;

    let mut participants = Vec::with_capacity(ordered_ids.len());
    for id in &ordered_ids {
        if let Some(user) = users.iter().find(|u| u.user_id == *id) {
            participants.push(UserDTO::from(user.clone()));
        }
    }

    info!("Found {} participants", participants.len());
    Ok(Json(SeshParticipantsDTO {
        sesh_id,
        participants,
    }))
}

async fn read_sesh(state: &AppState, sesh_id: &i32) -> Result<Sesh, AppError> {
    state.sesh.read(sesh_id).await?.ok_or_else(|| {
        warn!("Sesh not found: {}", sesh_id);
        AppError::not_found("Sesh not found")
    })
}
