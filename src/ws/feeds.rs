use crate::dtos::WsEventDTO;
use crate::ws::BROADCAST_CHANNEL_CAPACITY;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{info, instrument, warn};

/// I due feed condivisi del fan-out: ogni client connesso riceve tutti gli
/// eventi utente (marker della mappa) e tutti gli eventi raduno. Il filtro
/// per stato `active` è responsabilità del client; gli inviti invece NON
/// passano di qui, viaggiano indirizzati per utente nella UserMap.
///
/// Un canale broadcast conserva l'ordine di pubblicazione, quindi gli eventi
/// sulla stessa riga arrivano in write order. Tra feed diversi nessuna
/// garanzia: i client applicano ogni evento come upsert idempotente.
pub struct FeedHub {
    /// Cambi di riga degli utenti (posizione, online, profilo)
    users: Sender<Arc<WsEventDTO>>,
    /// Cambi di riga dei raduni (insert, contatori, terminazione)
    seshes: Sender<Arc<WsEventDTO>>,
}

impl FeedHub {
    pub fn new() -> Self {
        let (users, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        let (seshes, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        FeedHub { users, seshes }
    }

    pub fn subscribe_users(&self) -> Receiver<Arc<WsEventDTO>> {
        self.users.subscribe()
    }

    pub fn subscribe_seshes(&self) -> Receiver<Arc<WsEventDTO>> {
        self.seshes.subscribe()
    }

    #[instrument(skip(self, event))]
    pub fn publish_user(&self, event: WsEventDTO) {
        match self.users.send(Arc::new(event)) {
            Ok(n) => info!(receivers = n, "User event broadcast to receivers"),
            // nessun client connesso: l'evento cade, i client ricostruiscono
            // lo stato con un re-fetch alla connessione
            Err(_) => warn!("No active receivers on the users feed"),
        }
    }

    #[instrument(skip(self, event))]
    pub fn publish_sesh(&self, event: WsEventDTO) {
        match self.seshes.send(Arc::new(event)) {
            Ok(n) => info!(receivers = n, "Sesh event broadcast to receivers"),
            Err(_) => warn!("No active receivers on the seshes feed"),
        }
    }

    pub fn users_receiver_count(&self) -> usize {
        self.users.receiver_count()
    }

    pub fn seshes_receiver_count(&self) -> usize {
        self.seshes.receiver_count()
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events_in_order() {
        let hub = FeedHub::new();
        let mut rx = hub.subscribe_seshes();

        hub.publish_sesh(WsEventDTO::SeshRemoved { sesh_id: 1 });
        hub.publish_sesh(WsEventDTO::SeshRemoved { sesh_id: 2 });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(*first, WsEventDTO::SeshRemoved { sesh_id: 1 }));
        assert!(matches!(*second, WsEventDTO::SeshRemoved { sesh_id: 2 }));
    }

    #[tokio::test]
    async fn feeds_are_independent() {
        let hub = FeedHub::new();
        let mut users_rx = hub.subscribe_users();
        let _seshes_rx = hub.subscribe_seshes();

        hub.publish_sesh(WsEventDTO::SeshRemoved { sesh_id: 3 });
        assert!(users_rx.try_recv().is_err());
    }
}
