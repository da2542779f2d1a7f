//! Meetup services - La macchina a stati degli inviti di meetup
//!
//! Tutte le transizioni sono idempotenti lato store (update condizionali):
//! due client in gara sulla stessa riga non possono mai vincere entrambi.

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateMeetupDTO, EnrichedMeetupDTO, HistoryQuery, MeetupDTO, UserDTO,
};
use crate::entities::{Meetup, MeetupStatus, User};
use crate::repositories::{NewMeetup, Read};
use crate::ws::usermap::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use axum_macros::debug_handler;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(sender = %current_user.user_id, receiver = %body.receiver_id))]
pub async fn create_meetup(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Json(body): Json<CreateMeetupDTO>,
) -> Result<Json<MeetupDTO>, AppError> {
    debug!("Creating meetup invitation");
    // 1. Validare il DTO (formato orario HH:MM, lunghezze massime)
    // 2. Verificare che il destinatario non sia il mittente stesso (fail-fast in memoria)
    // 3. Verificare che il destinatario esista nel database
    // 4. Inserire l'invito con la guardia di dedup nella stessa statement:
    //    se per la coppia esiste già un invito attivo, zero righe inserite
    // 5. Se zero righe: ritornare CONFLICT con messaggio specifico
    // 6. Arricchire l'invito col profilo pubblico del mittente
    // 7. Inviare l'invito via WebSocket al destinatario (se online)
    // 8. Ritornare il MeetupDTO creato

    body.validate()?;

    if body.receiver_id == current_user.user_id {
        warn!("Attempted self-invitation");
        return Err(AppError::invalid_target("You cannot invite yourself"));
    }

    if state.user.read(&body.receiver_id).await?.is_none() {
        warn!("Receiver not found: {}", body.receiver_id);
        return Err(AppError::not_found("Receiver not found"));
    }

    let created = state
        .meetup
        .create_if_no_active(
            &NewMeetup {
                sender_id: current_user.user_id,
                receiver_id: body.receiver_id,
                activity: body.activity,
                meetup_time: body.meetup_time.as_deref(),
                location_name: body.location_name.as_deref(),
                message: body.message.as_deref(),
            },
            state.invitation_ttl,
        )
        .await?
        .ok_or_else(|| {
            warn!("Active invitation already exists for this pair");
            AppError::conflicting_invitation()
        })?;

    debug!("Meetup created with id {}", created.meetup_id);

    let enriched = EnrichedMeetupDTO::from_meetup(
        created.clone(),
        Some(UserDTO::from(current_user)),
    );

    state
        .users_online
        .send_server_message_if_online(&created.receiver_id, InternalSignal::Meetup(enriched));

    info!("Meetup invitation sent");
    Ok(Json(MeetupDTO::from(created)))
}

#[instrument(skip(state, current_user), fields(meetup_id = %meetup_id, action = %action, user_id = %current_user.user_id))]
pub async fn respond_to_meetup(
    State(state): State<Arc<AppState>>,
    Path((meetup_id, action)): Path<(i32, String)>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MeetupDTO>, AppError> {
    debug!("Responding to meetup invitation");
    // 1. Validare che action sia "accept" o "reject"
    // 2. Recuperare l'invito dal database
    // 3. Verificare che current_user sia il destinatario, altrimenti FORBIDDEN
    // 4. Verificare che l'invito sia ancora pending e non scaduto (il TTL è
    //    derivato da created_at: mai accettare un invito morto)
    // 5. Applicare la transizione guardata PENDING -> ACCEPTED/REJECTED:
    //    se qualcun altro ha già agito, la transizione non tocca righe
    // 6. Notificare il mittente via WebSocket (il destinatario sa già)
    // 7. Ritornare lo stato aggiornato

    let new_status = match action.as_str() {
        "accept" => MeetupStatus::Accepted,
        "reject" => MeetupStatus::Rejected,
        _ => {
            warn!("Invalid meetup action: {}", action);
            return Err(AppError::bad_request("Action must be 'accept' or 'reject'"));
        }
    };

    let meetup = read_meetup(&state, &meetup_id).await?;

    if meetup.receiver_id != current_user.user_id {
        warn!(
            "User {} attempted to respond to invitation for user {}",
            current_user.user_id, meetup.receiver_id
        );
        return Err(AppError::forbidden(
            "You are not the recipient of this invitation",
        ));
    }

    if !meetup.status.can_respond() {
        warn!("Invitation {} is already processed: {:?}", meetup_id, meetup.status);
        return Err(AppError::invalid_state("Invitation is already processed")
            .with_details(format!("Invitation is already {:?}", meetup.status)));
    }

    if meetup.is_expired_at(state.invitation_ttl, Utc::now()) {
        warn!("Invitation {} is past its TTL", meetup_id);
        return Err(AppError::invalid_state("Invitation has expired"));
    }

    let won = state
        .meetup
        .transition(&meetup_id, MeetupStatus::Pending, new_status)
        .await?;
    if !won {
        // la riga non era più PENDING: qualcuno ha agito un attimo prima
        warn!("Lost the response race on invitation {}", meetup_id);
        return Err(AppError::invalid_state("Someone already acted on this invitation"));
    }

    let updated = Meetup {
        status: new_status,
        ..meetup
    };
    let dto = MeetupDTO::from(updated);

    state.users_online.send_server_message_if_online(
        &dto.sender_id,
        InternalSignal::MeetupUpdate(dto.clone()),
    );

    info!("Invitation response processed successfully");
    Ok(Json(dto))
}

#[instrument(skip(state, current_user), fields(meetup_id = %meetup_id, outcome = %outcome, user_id = %current_user.user_id))]
pub async fn resolve_meetup(
    State(state): State<Arc<AppState>>,
    Path((meetup_id, outcome)): Path<(i32, String)>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MeetupDTO>, AppError> {
    debug!("Resolving accepted meetup");
    // 1. Validare che outcome sia "completed" o "no_show"
    // 2. Recuperare l'invito e verificare che current_user sia un partecipante
    // 3. Verificare che lo stato sia ACCEPTED (entrambi gli esiti sono terminali)
    // 4. Applicare la transizione guardata ACCEPTED -> COMPLETED/NO_SHOW
    // 5. Notificare entrambi i partecipanti: l'indicatore di meetup attivo
    //    si spegne su tutti e due i client
    // 6. Ritornare lo stato aggiornato

    let new_status = match outcome.as_str() {
        "completed" => MeetupStatus::Completed,
        "no_show" => MeetupStatus::NoShow,
        _ => {
            warn!("Invalid meetup outcome: {}", outcome);
            return Err(AppError::bad_request(
                "Outcome must be 'completed' or 'no_show'",
            ));
        }
    };

    let meetup = read_meetup(&state, &meetup_id).await?;

    if !meetup.is_participant(current_user.user_id) {
        warn!("Non-participant attempted to resolve meetup");
        return Err(AppError::forbidden(
            "Only a participant can resolve this meetup",
        ));
    }

    if !meetup.status.can_resolve() {
        warn!("Meetup {} cannot be resolved from {:?}", meetup_id, meetup.status);
        return Err(AppError::invalid_state(
            "Only an accepted meetup can be resolved",
        ));
    }

    let won = state
        .meetup
        .transition(&meetup_id, MeetupStatus::Accepted, new_status)
        .await?;
    if !won {
        warn!("Lost the resolve race on meetup {}", meetup_id);
        return Err(AppError::invalid_state("Someone already acted on this meetup"));
    }

    let updated = Meetup {
        status: new_status,
        ..meetup
    };
    let dto = MeetupDTO::from(updated);

    for participant in [dto.sender_id, dto.receiver_id] {
        state
            .users_online
            .send_server_message_if_online(&participant, InternalSignal::MeetupUpdate(dto.clone()));
    }

    info!("Meetup resolved");
    Ok(Json(dto))
}

#[instrument(skip(state, current_user), fields(meetup_id = %meetup_id, user_id = %current_user.user_id))]
pub async fn cancel_meetup(
    State(state): State<Arc<AppState>>,
    Path(meetup_id): Path<i32>,
    Extension(current_user): Extension<User>,
) -> Result<(), AppError> {
    debug!("Cancelling pending meetup");
    // 1. Recuperare l'invito; solo il mittente può cancellare
    // 2. Delete guardato su status PENDING: se la riga non è più pending
    //    (già accettata/rifiutata), la cancellazione non tocca nulla
    // 3. Notificare il destinatario che l'invito non esiste più

    let meetup = read_meetup(&state, &meetup_id).await?;

    if meetup.sender_id != current_user.user_id {
        warn!("Non-sender attempted to cancel meetup");
        return Err(AppError::forbidden("Only the sender can cancel a request"));
    }

    let deleted = state
        .meetup
        .delete_pending(&meetup_id, &current_user.user_id)
        .await?;
    if !deleted {
        warn!("Meetup {} was no longer pending", meetup_id);
        return Err(AppError::invalid_state(
            "Only a pending request can be cancelled",
        ));
    }

    state.users_online.send_server_message_if_online(
        &meetup.receiver_id,
        InternalSignal::MeetupRemoved(meetup_id),
    );

    info!("Meetup cancelled");
    Ok(())
}

/// Inviti pending in arrivo per l'utente corrente, già filtrati dal TTL
/// (valutazione lazy: un pending scaduto non compare e non è più azionabile).
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_incoming_meetups(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<EnrichedMeetupDTO>>, AppError> {
    debug!("Listing incoming meetup invitations");
    let cutoff = Utc::now() - state.invitation_ttl;
    let meetups = state
        .meetup
        .find_incoming_pending(&current_user.user_id, cutoff)
        .await?;

    info!("Found {} incoming invitations", meetups.len());

    // Arricchire ogni invito con il profilo pubblico del mittente
    // (letture per primary key in parallelo)
    let senders = futures::future::join_all(
        meetups.iter().map(|m| state.user.read(&m.sender_id)),
    )
    .await;

    let enriched = meetups
        .into_iter()
        .zip(senders)
        .map(|(meetup, sender)| {
            EnrichedMeetupDTO::from_meetup(meetup, sender.ok().flatten().map(UserDTO::from))
        })
        .collect::<Vec<_>>();

    Ok(Json(enriched))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_meetup_history(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    axum::extract::Query(params): axum::extract::Query<HistoryQuery>,
) -> Result<Json<Vec<MeetupDTO>>, AppError> {
    debug!("Listing meetup history");
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let meetups = state
        .meetup
        .find_history_for_user(&current_user.user_id, limit)
        .await?;

    info!("Found {} meetups in history", meetups.len());
    Ok(Json(meetups.into_iter().map(MeetupDTO::from).collect()))
}

async fn read_meetup(state: &AppState, meetup_id: &i32) -> Result<Meetup, AppError> {
    state.meetup.read(meetup_id).await?.ok_or_else(|| {
        warn!("Meetup not found: {}", meetup_id);
        AppError::not_found("Meetup not found")
    })
}
