//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::core::Config;
use crate::repositories::{
    MeetupRepository, SeshParticipantRepository, SeshRepository, UserRepository,
};
use crate::ws::feeds::FeedHub;
use crate::ws::usermap::UserMap;
use chrono::Duration;
use sqlx::MySqlPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per i record di presenza degli utenti
    pub user: UserRepository,

    /// Repository per gli inviti di meetup
    pub meetup: MeetupRepository,

    /// Repository per i raduni (seshes)
    pub sesh: SeshRepository,

    /// Repository per le righe di partecipazione ai raduni
    pub participant: SeshParticipantRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// TTL degli inviti pending (scadenza derivata, mai persistita)
    pub invitation_ttl: Duration,

    /// Limiti configurati per max_participants di un raduno
    pub sesh_min_participants: i32,
    pub sesh_max_participants: i32,

    /// Mappa concorrente degli utenti online con i loro canali WebSocket
    /// Key: user_id, Value: Sender per i segnali indirizzati al singolo utente
    pub users_online: UserMap,

    /// Feed broadcast condivisi (utenti e raduni) per il fan-out a tutti i client
    pub feeds: FeedHub,
}

impl AppState {
    /// Crea una nuova istanza di AppState con i default di sviluppo
    /// (TTL 30 minuti, capacità raduni [2, 20]).
    pub fn new(pool: MySqlPool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            meetup: MeetupRepository::new(pool.clone()),
            sesh: SeshRepository::new(pool.clone()),
            participant: SeshParticipantRepository::new(pool),
            jwt_secret,
            invitation_ttl: Duration::minutes(30),
            sesh_min_participants: 2,
            sesh_max_participants: 20,
            users_online: UserMap::new(),
            feeds: FeedHub::new(),
        }
    }

    /// Come `new`, ma con TTL e limiti presi dalla configurazione.
    pub fn from_config(pool: MySqlPool, config: &Config) -> Self {
        let mut state = Self::new(pool, config.jwt_secret.clone());
        state.invitation_ttl = Duration::minutes(config.invitation_ttl_mins);
        state.sesh_min_participants = config.sesh_min_participants;
        state.sesh_max_participants = config.sesh_max_participants;
        state
    }
}
