use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

use crate::dtos::{EnrichedMeetupDTO, MeetupDTO};

/// Segnali indirizzati a un singolo utente: è qui che avviene il filtraggio
/// lato server degli eventi di invito ("solo righe dove il receiver sono io").
pub enum InternalSignal {
    Shutdown,
    /// Nuovo invito in arrivo, consegnato al solo receiver
    Meetup(EnrichedMeetupDTO),
    /// Transizione di stato di un invito, consegnata a un partecipante
    MeetupUpdate(MeetupDTO),
    /// Invito cancellato dal mittente mentre era pending
    MeetupRemoved(i32),
    Error(&'static str),
}

pub struct UserMap {
    users_online: DashMap<i32, UnboundedSender<InternalSignal>>,
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    #[instrument(skip(self, tx), fields(user_id))]
    pub fn register_online(&self, user_id: i32, tx: UnboundedSender<InternalSignal>) {
        info!("Registering user {} as online", user_id);
        self.users_online.insert(user_id, tx);
        info!("Total online users: {}", self.users_online.len());
    }

    #[instrument(skip(self), fields(user_id))]
    pub fn remove_from_online(&self, user_id: &i32) {
        info!("Removing user from online");
        self.users_online.remove(user_id);
    }

    #[instrument(skip(self, message), fields(user_id))]
    pub fn send_server_message_if_online(&self, user_id: &i32, message: InternalSignal) {
        let message_type = match &message {
            InternalSignal::Shutdown => "Shutdown",
            InternalSignal::Meetup(m) => {
                info!("Sending Meetup signal for meetup_id {}", m.meetup_id);
                "Meetup"
            }
            InternalSignal::MeetupUpdate(m) => {
                info!("Sending MeetupUpdate signal for meetup_id {}", m.meetup_id);
                "MeetupUpdate"
            }
            InternalSignal::MeetupRemoved(meetup_id) => {
                info!("Sending MeetupRemoved signal for meetup_id {}", meetup_id);
                "MeetupRemoved"
            }
            InternalSignal::Error(_) => "Error",
        };

        if let Some(entry) = self.users_online.get(user_id) {
            let tx = entry.value();
            if let Err(e) = tx.send(message) {
                warn!("Failed to send {} message to user: {:?}", message_type, e);
            } else {
                info!("{} message sent to online user", message_type);
            }
        } else {
            info!("User {} not online, {} message not sent", user_id, message_type);
        }
    }

    /// Get the count of online users
    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    /// Check if a specific user is online
    pub fn is_user_online(&self, user_id: &i32) -> bool {
        self.users_online.contains_key(user_id)
    }
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}
