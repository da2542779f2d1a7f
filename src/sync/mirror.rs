//! LocalMirror - Collezioni locali specchiate dagli eventi di fan-out

use crate::dtos::{EnrichedMeetupDTO, MeetupDTO, SeshDTO, UserDTO, WsEventDTO};
use crate::entities::{MeetupStatus, SeshStatus};
use std::collections::HashMap;

/// Specchio client dello stato condiviso: marker utente, raduni attivi,
/// l'eventuale invito in arrivo e l'eventuale meetup attivo.
///
/// Ogni evento è un upsert con chiave l'id dell'entità: applicare due volte
/// lo stesso evento produce lo stesso specchio. Nessuna garanzia d'ordine
/// tra entità diverse, quindi ogni ramo guarda solo la propria collezione.
#[derive(Default)]
pub struct LocalMirror {
    users: HashMap<i32, UserDTO>,
    seshes: HashMap<i32, SeshDTO>,
    incoming_request: Option<EnrichedMeetupDTO>,
    active_meetup: Option<MeetupDTO>,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-fetch completo dopo una (ri)connessione: gli snapshot REST
    /// sostituiscono in blocco le collezioni, poi si riparte incrementale.
    pub fn reset(&mut self, users: Vec<UserDTO>, seshes: Vec<SeshDTO>) {
        self.users = users.into_iter().map(|u| (u.user_id, u)).collect();
        self.seshes = seshes
            .into_iter()
            .filter(|s| s.status == SeshStatus::Active)
            .map(|s| (s.sesh_id, s))
            .collect();
    }

    /// Applica un evento di fan-out. Idempotente per costruzione.
    pub fn apply(&mut self, event: &WsEventDTO) {
        match event {
            WsEventDTO::UserUpsert(user) => {
                self.users.insert(user.user_id, user.clone());
            }
            WsEventDTO::SeshUpsert(sesh) => {
                // un upsert con stato ended equivale a una rimozione dalla
                // vista active
                if sesh.status == SeshStatus::Active {
                    self.seshes.insert(sesh.sesh_id, sesh.clone());
                } else {
                    self.seshes.remove(&sesh.sesh_id);
                }
            }
            WsEventDTO::SeshRemoved { sesh_id } => {
                self.seshes.remove(sesh_id);
            }
            WsEventDTO::MeetupIncoming(meetup) => {
                self.incoming_request = Some(meetup.clone());
            }
            WsEventDTO::MeetupUpdate(meetup) => {
                match meetup.status {
                    MeetupStatus::Accepted => {
                        self.active_meetup = Some(meetup.clone());
                    }
                    MeetupStatus::Pending => {}
                    // terminale: spegne l'indicatore di meetup attivo
                    _ => {
                        if self
                            .active_meetup
                            .as_ref()
                            .is_some_and(|m| m.meetup_id == meetup.meetup_id)
                        {
                            self.active_meetup = None;
                        }
                    }
                }
                if self
                    .incoming_request
                    .as_ref()
                    .is_some_and(|m| m.meetup_id == meetup.meetup_id)
                {
                    self.incoming_request = None;
                }
            }
            WsEventDTO::MeetupRemoved { meetup_id } => {
                if self
                    .incoming_request
                    .as_ref()
                    .is_some_and(|m| m.meetup_id == *meetup_id)
                {
                    self.incoming_request = None;
                }
                if self
                    .active_meetup
                    .as_ref()
                    .is_some_and(|m| m.meetup_id == *meetup_id)
                {
                    self.active_meetup = None;
                }
            }
            WsEventDTO::Error { .. } => {}
        }
    }

    pub fn user(&self, user_id: i32) -> Option<&UserDTO> {
        self.users.get(&user_id)
    }

    /// I marker da disegnare sulla mappa.
    pub fn users(&self) -> impl Iterator<Item = &UserDTO> {
        self.users.values()
    }

    /// I raduni ancora attivi, per i marker e la lista join.
    pub fn active_seshes(&self) -> impl Iterator<Item = &SeshDTO> {
        self.seshes.values()
    }

    pub fn sesh(&self, sesh_id: i32) -> Option<&SeshDTO> {
        self.seshes.get(&sesh_id)
    }

    pub fn incoming_request(&self) -> Option<&EnrichedMeetupDTO> {
        self.incoming_request.as_ref()
    }

    pub fn active_meetup(&self) -> Option<&MeetupDTO> {
        self.active_meetup.as_ref()
    }
}
