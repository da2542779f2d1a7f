//! WebSocket Module - Gestione WebSocket per comunicazione real-time
//!
//! Questo modulo è il layer di fan-out: fa da ponte tra le notifiche di
//! cambiamento dello store e gli stream di eventi filtrati per ogni client.
//! Include:
//! - Gestione upgrade HTTP -> WebSocket
//! - Gestione connessioni (split sender/receiver, task di lettura/scrittura)
//! - Feed broadcast condivisi (utenti, raduni) e segnali indirizzati (inviti)
//! - Handler per gli eventi in ingresso dal client (heartbeat, posizione)
//!
//! Nessun replay: alla riconnessione il client rifà il fetch completo dello
//! stato corrente via REST prima di riprendere gli aggiornamenti.

pub mod connection;
pub mod event_handlers;
pub mod feeds;
pub mod usermap;

// Re-exports pubblici
pub use connection::handle_socket;

/// Capacità dei canali broadcast dei feed
pub const BROADCAST_CHANNEL_CAPACITY: usize = 256;
/// Intervallo di flush del batch di eventi feed (ms)
pub const BATCH_INTERVAL: u64 = 50;
/// Dimensione massima del batch prima del flush immediato
pub const BATCH_MAX_SIZE: usize = 10;
/// Intervallo minimo tra messaggi in ingresso dallo stesso client (ms)
pub const RATE_LIMITER_MILLIS: u64 = 100;
/// Timeout di inattività oltre il quale la connessione viene chiusa (s)
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

use crate::{AppState, entities::User};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Entry point per gestire richieste di upgrade WebSocket
/// Operazioni:
/// 1. Ottenere l'utente corrente dall'autenticazione JWT
/// 2. Eseguire upgrade HTTP -> WebSocket
/// 3. Passare la connessione ad handle_socket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, current_user))
}
