//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::ws::{BATCH_INTERVAL, BATCH_MAX_SIZE, RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use crate::{
    AppState,
    dtos::{ClientEventDTO, WsEventDTO},
    entities::User,
    ws::{event_handlers, usermap::InternalSignal},
};
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Duration;
use tokio::time::{interval, timeout};
use tokio_stream::StreamMap;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, instrument, warn};

#[instrument(skip(ws, state, user), fields(user_id = %user.user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user: User) {
    info!("WebSocket connection established");
    let user_id = user.user_id;

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale unbounded per i segnali indirizzati a questo utente
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(user_id, int_tx.clone());
    info!("User registered as online");

    // La presenza diventa visibile a tutti: flag online a DB + evento sul feed
    event_handlers::mark_online(&state, &user_id).await;

    // task che sta in ascolto del websocket (eventi dal client)
    tokio::spawn(listen_ws(user_id, ws_rx, int_tx.clone(), state.clone()));

    // task che scrive verso il client (feed condivisi + segnali indirizzati)
    tokio::spawn(write_ws(user_id, ws_tx, int_rx, state));
}

#[instrument(skip(websocket_tx, internal_rx, state), fields(user_id))]
pub async fn write_ws(
    user_id: i32,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Write task started");

    // I due feed condivisi in un'unica StreamMap: l'ordine per riga è
    // quello di pubblicazione, tra feed diversi nessuna garanzia.
    let mut stream_map: StreamMap<&'static str, BroadcastStream<Arc<WsEventDTO>>> =
        StreamMap::new();
    stream_map.insert("users", BroadcastStream::new(state.feeds.subscribe_users()));
    stream_map.insert(
        "seshes",
        BroadcastStream::new(state.feeds.subscribe_seshes()),
    );

    let mut batch: Vec<Arc<WsEventDTO>> = Vec::new();
    let mut interval = tokio::time::interval(Duration::from_millis(BATCH_INTERVAL));
    interval.tick().await; // Consuma primo tick immediato

    'external: loop {
        tokio::select! {
            Some((_, result)) = tokio_stream::StreamExt::next(&mut stream_map) => {
                match result {
                    Ok(event) => {
                        batch.push(event);
                        if batch.len() >= BATCH_MAX_SIZE {
                            if send_batch(&mut websocket_tx, &batch).await.is_err() {
                                warn!("Failed to send batch, closing connection");
                                break 'external;
                            }
                            batch.clear();
                        }
                    }
                    Err(_) => {
                        // feed in ritardo: eventi persi, il client deve rifare
                        // il fetch completo (nessun replay garantito)
                        warn!("Feed lagged behind, asking client to re-fetch");
                        let lag = WsEventDTO::Error {
                            code: 1011,
                            message: "event stream lagged, re-fetch current state".to_string(),
                        };
                        if send_event(&mut websocket_tx, &lag).await.is_err() {
                            break 'external;
                        }
                    }
                }
            }

            // flush periodico: i batch parziali non devono aspettare troppo
            _ = interval.tick() => {
                if !batch.is_empty() {
                    if send_batch(&mut websocket_tx, &batch).await.is_err() {
                        warn!("Failed to send batch on interval, closing connection");
                        break 'external;
                    }
                    batch.clear();
                }
            }

            signal = internal_rx.recv() => {
                match signal {
                    Some(InternalSignal::Shutdown) => {
                        info!("Shutdown signal received");
                        break 'external;
                    }
                    Some(InternalSignal::Meetup(meetup)) => {
                        // gli inviti non passano dal batch: consegna immediata
                        info!(meetup_id = meetup.meetup_id, "Sending incoming meetup to client");
                        if send_event(&mut websocket_tx, &WsEventDTO::MeetupIncoming(meetup)).await.is_err() {
                            break 'external;
                        }
                    }
                    Some(InternalSignal::MeetupUpdate(meetup)) => {
                        info!(meetup_id = meetup.meetup_id, "Sending meetup update to client");
                        if send_event(&mut websocket_tx, &WsEventDTO::MeetupUpdate(meetup)).await.is_err() {
                            break 'external;
                        }
                    }
                    Some(InternalSignal::MeetupRemoved(meetup_id)) => {
                        info!(meetup_id, "Sending meetup removal to client");
                        if send_event(&mut websocket_tx, &WsEventDTO::MeetupRemoved { meetup_id }).await.is_err() {
                            break 'external;
                        }
                    }
                    Some(InternalSignal::Error(err_msg)) => {
                        warn!(error_message = err_msg, "Sending error message to client");
                        let event = WsEventDTO::Error { code: 1008, message: err_msg.to_string() };
                        if send_event(&mut websocket_tx, &event).await.is_err() {
                            break 'external;
                        }
                    }
                    None => {
                        info!("Internal channel closed");
                        break 'external;
                    }
                }
            }
        }
    }

    // Invia batch finale prima di terminare
    if !batch.is_empty() {
        info!(
            batch_size = batch.len(),
            "Sending final batch before shutdown"
        );
        let _ = send_batch(&mut websocket_tx, &batch).await;
    }

    info!("Write task terminated");
}

#[instrument(skip(websocket_tx, batch))]
async fn send_batch(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    batch: &[Arc<WsEventDTO>],
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&batch).map_err(|e| {
        error!("Failed to serialize batch: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            error!("Failed to send batch through WebSocket: {:?}", e);
            e
        })
}

async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &WsEventDTO,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize event: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            error!("Failed to send event through WebSocket: {:?}", e);
            e
        })
}

#[instrument(skip(websocket_rx, internal_tx, state), fields(user_id))]
pub async fn listen_ws(
    user_id: i32,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => {
                        if let Ok(event) = serde_json::from_str::<ClientEventDTO>(&text) {
                            event_handlers::process_client_event(&state, user_id, event).await;
                        } else {
                            warn!("Failed to deserialize client event");
                            let _ = internal_tx.send(InternalSignal::Error(
                                "unrecognized client event",
                            ));
                        }
                    }
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = TIMEOUT_DURATION_SECONDS,
                    "Connection timeout"
                );
                break;
            }
        }
    }

    // Cleanup: la presenza torna offline e tutti i client lo vedono
    info!("Cleaning up connection");
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id);
    event_handlers::mark_offline(&state, &user_id).await;
    info!("Listen task terminated");
}
