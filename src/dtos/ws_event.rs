//! WebSocket Event DTOs - Data Transfer Objects per eventi WebSocket

use serde::{Deserialize, Serialize};

use crate::dtos::{EnrichedMeetupDTO, MeetupDTO, SeshDTO, UserDTO};

/// Eventi server -> client.
///
/// Tagged union, serializzata come:
/// { "type": "UserUpsert", "data": { ... } }
///
/// Ogni evento è un upsert idempotente con chiave l'id dell'entità, mai un
/// diff: applicarlo due volte deve produrre lo stesso stato locale.
/// L'ordine è garantito solo per eventi sulla stessa riga, mai tra entità
/// diverse.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsEventDTO {
    /// Marker di presenza aggiornato (posizione, online/offline, profilo)
    UserUpsert(UserDTO),
    /// Raduno creato o aggiornato (join/leave cambiano current_count)
    SeshUpsert(SeshDTO),
    /// Raduno terminato dal creatore: va rimosso da ogni vista "active"
    SeshRemoved { sesh_id: i32 },
    /// Invito in arrivo, indirizzato al solo receiver
    MeetupIncoming(EnrichedMeetupDTO),
    /// Transizione di stato di un invito, indirizzata ai partecipanti
    MeetupUpdate(MeetupDTO),
    /// Invito cancellato dal mittente mentre era ancora pending
    MeetupRemoved { meetup_id: i32 },
    Error { code: u16, message: String },
}

/// Eventi client -> server sulla stessa connessione WebSocket.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum ClientEventDTO {
    /// Segnale di liveness: tocca last_seen/is_online, non la posizione
    Heartbeat,
    /// Scrittura della posizione (solo la propria riga: single writer)
    LocationUpdate { lat: f64, lng: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_event_uses_type_data_envelope() {
        let event = WsEventDTO::SeshRemoved { sesh_id: 42 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"SeshRemoved\""));
        assert!(json.contains("\"sesh_id\":42"));

        let back: WsEventDTO = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, WsEventDTO::SeshRemoved { sesh_id: 42 }));
    }

    #[test]
    fn client_heartbeat_round_trips() {
        let json = serde_json::to_string(&ClientEventDTO::Heartbeat).unwrap();
        let back: ClientEventDTO = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ClientEventDTO::Heartbeat));
    }
}
