//! WebSocket Event Handlers - Handler per gli eventi in ingresso dal client

use crate::AppState;
use crate::dtos::{ClientEventDTO, UserDTO, WsEventDTO};
use crate::repositories::Read;
use tracing::{debug, instrument, warn};

/// Smista un evento ricevuto sulla connessione WebSocket del client.
/// Operazioni:
/// 1. Heartbeat: tocca last_seen/is_online, non tocca la posizione
/// 2. LocationUpdate: scrive lat/lng della propria riga e fa fan-out
///
/// Un errore di scrittura qui non è mai bloccante: la presenza degrada a
/// "stale" e il prossimo tick dell'heartbeat riprova.
#[instrument(skip(state, event), fields(user_id))]
pub async fn process_client_event(state: &AppState, user_id: i32, event: ClientEventDTO) {
    match event {
        ClientEventDTO::Heartbeat => {
            debug!("Heartbeat received");
            if let Err(e) = state.user.touch_last_seen(&user_id).await {
                warn!("Heartbeat write failed, will retry on next tick: {:?}", e);
            }
        }
        ClientEventDTO::LocationUpdate { lat, lng } => {
            debug!("Location update received");
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                warn!("Discarding out-of-range coordinates");
                return;
            }
            if let Err(e) = state.user.update_location(&user_id, lat, lng).await {
                warn!("Location write failed, will retry on next tick: {:?}", e);
                return;
            }
            publish_user_row(state, &user_id).await;
        }
    }
}

/// Presenza online all'apertura della connessione.
pub async fn mark_online(state: &AppState, user_id: &i32) {
    if let Err(e) = state.user.set_online(user_id, true).await {
        warn!("Failed to mark user online: {:?}", e);
        return;
    }
    publish_user_row(state, user_id).await;
}

/// Presenza offline alla chiusura (qualunque ne sia la causa).
pub async fn mark_offline(state: &AppState, user_id: &i32) {
    if let Err(e) = state.user.set_online(user_id, false).await {
        warn!("Failed to mark user offline: {:?}", e);
        return;
    }
    publish_user_row(state, user_id).await;
}

/// Rilegge la riga e la pubblica sul feed utenti come upsert idempotente.
async fn publish_user_row(state: &AppState, user_id: &i32) {
    match state.user.read(user_id).await {
        Ok(Some(user)) => {
            state
                .feeds
                .publish_user(WsEventDTO::UserUpsert(UserDTO::from(user)));
        }
        Ok(None) => warn!("User row disappeared before fan-out"),
        Err(e) => warn!("Failed to re-read user row for fan-out: {:?}", e),
    }
}
