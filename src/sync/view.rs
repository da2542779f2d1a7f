//! ViewState - Stato di vista del client a overlay singolo
//!
//! Un solo overlay "primario" alla volta, come tagged union: cosa può essere
//! visibile insieme è un invariante verificabile, non un effetto emergente
//! di una manciata di flag booleani. Le due superfici non bloccanti (banner
//! dell'invito in arrivo, barra del meetup attivo) convivono con la mappa e
//! con l'overlay primario.

/// L'overlay primario correntemente aperto sopra la mappa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    /// Nessun overlay: si vede solo la mappa
    None,
    /// Scheda profilo di un altro utente
    UserDetail(i32),
    /// Editor del proprio profilo
    ProfileEditor,
    /// Composizione di un invito verso l'utente indicato
    MeetupOffer { target: i32 },
    /// Attesa della risposta, col countdown del TTL
    WaitingForReply { meetup_id: i32 },
    /// Conferma di accettazione appena ricevuta
    MeetupConfirmed { meetup_id: i32 },
    CreateSesh,
    JoinSesh { sesh_id: i32 },
    ActiveSesh { sesh_id: i32 },
    Notifications,
}

/// Stato di vista complessivo del client.
pub struct ViewState {
    primary: Overlay,
    /// Banner non bloccante dell'invito in arrivo
    incoming_request: Option<i32>,
    /// Barra non bloccante del meetup accettato in corso
    active_meetup_bar: Option<i32>,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            primary: Overlay::None,
            incoming_request: None,
            active_meetup_bar: None,
        }
    }

    pub fn primary(&self) -> Overlay {
        self.primary
    }

    pub fn incoming_request(&self) -> Option<i32> {
        self.incoming_request
    }

    pub fn active_meetup_bar(&self) -> Option<i32> {
        self.active_meetup_bar
    }

    /// Tap su un marker: apre la scheda, ma solo dalla mappa o da un'altra
    /// scheda. In mezzo a un flusso di invito il tap viene ignorato.
    pub fn open_user_detail(&mut self, user_id: i32) -> bool {
        match self.primary {
            Overlay::None | Overlay::UserDetail(_) => {
                self.primary = Overlay::UserDetail(user_id);
                true
            }
            _ => false,
        }
    }

    /// Apertura dell'editor profilo: chiude prima un'eventuale scheda utente
    /// (close-before-open esplicito, non uno stack globale).
    pub fn open_profile_editor(&mut self) -> bool {
        match self.primary {
            Overlay::None | Overlay::UserDetail(_) => {
                self.primary = Overlay::ProfileEditor;
                true
            }
            _ => false,
        }
    }

    /// "Send Meetup Offer" dalla scheda di un utente.
    pub fn begin_meetup_offer(&mut self) -> bool {
        match self.primary {
            Overlay::UserDetail(target) => {
                self.primary = Overlay::MeetupOffer { target };
                true
            }
            _ => false,
        }
    }

    /// L'invito è partito: si aspetta la risposta col countdown.
    pub fn offer_sent(&mut self, meetup_id: i32) -> bool {
        match self.primary {
            Overlay::MeetupOffer { .. } => {
                self.primary = Overlay::WaitingForReply { meetup_id };
                true
            }
            _ => false,
        }
    }

    /// Evento di accettazione arrivato via fan-out mentre si aspettava.
    pub fn offer_accepted(&mut self, meetup_id: i32) -> bool {
        match self.primary {
            Overlay::WaitingForReply { meetup_id: waiting } if waiting == meetup_id => {
                self.primary = Overlay::MeetupConfirmed { meetup_id };
                self.active_meetup_bar = Some(meetup_id);
                true
            }
            _ => false,
        }
    }

    /// Rifiuto, scadenza del countdown o Cancel Request: si torna alla mappa.
    pub fn offer_closed(&mut self) {
        if matches!(
            self.primary,
            Overlay::MeetupOffer { .. }
                | Overlay::WaitingForReply { .. }
                | Overlay::MeetupConfirmed { .. }
        ) {
            self.primary = Overlay::None;
        }
    }

    pub fn open_create_sesh(&mut self) -> bool {
        if self.primary == Overlay::None {
            self.primary = Overlay::CreateSesh;
            true
        } else {
            false
        }
    }

    pub fn open_join_sesh(&mut self, sesh_id: i32) -> bool {
        if self.primary == Overlay::None {
            self.primary = Overlay::JoinSesh { sesh_id };
            true
        } else {
            false
        }
    }

    pub fn open_active_sesh(&mut self, sesh_id: i32) -> bool {
        if self.primary == Overlay::None {
            self.primary = Overlay::ActiveSesh { sesh_id };
            true
        } else {
            false
        }
    }

    pub fn open_notifications(&mut self) -> bool {
        if self.primary == Overlay::None {
            self.primary = Overlay::Notifications;
            true
        } else {
            false
        }
    }

    /// Chiusura esplicita dell'overlay primario, qualunque esso sia. I task
    /// legati al flusso chiuso (countdown, subscription) vanno smontati dal
    /// chiamante insieme a questa transizione.
    pub fn close_primary(&mut self) {
        self.primary = Overlay::None;
    }

    /// Invito in arrivo: banner non bloccante, la mappa resta interattiva.
    pub fn show_incoming_request(&mut self, meetup_id: i32) {
        self.incoming_request = Some(meetup_id);
    }

    pub fn dismiss_incoming_request(&mut self) {
        self.incoming_request = None;
    }

    /// Meetup risolto (completed/no_show) o cancellato: barra spenta.
    pub fn clear_active_meetup(&mut self) {
        self.active_meetup_bar = None;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_editor_closes_user_detail_first() {
        let mut view = ViewState::new();
        assert!(view.open_user_detail(5));
        assert_eq!(view.primary(), Overlay::UserDetail(5));

        assert!(view.open_profile_editor());
        // mutua esclusione: la scheda utente non è più aperta
        assert_eq!(view.primary(), Overlay::ProfileEditor);
    }

    #[test]
    fn marker_taps_are_ignored_mid_offer_flow() {
        let mut view = ViewState::new();
        assert!(view.open_user_detail(5));
        assert!(view.begin_meetup_offer());
        assert!(view.offer_sent(42));

        assert!(!view.open_user_detail(6));
        assert_eq!(view.primary(), Overlay::WaitingForReply { meetup_id: 42 });
    }

    #[test]
    fn incoming_banner_coexists_with_primary_overlay() {
        let mut view = ViewState::new();
        assert!(view.open_user_detail(5));

        view.show_incoming_request(9);
        assert_eq!(view.incoming_request(), Some(9));
        assert_eq!(view.primary(), Overlay::UserDetail(5));
    }

    #[test]
    fn full_offer_round_trip() {
        let mut view = ViewState::new();
        assert!(view.open_user_detail(2));
        assert!(view.begin_meetup_offer());
        assert!(view.offer_sent(7));
        assert!(view.offer_accepted(7));
        assert_eq!(view.primary(), Overlay::MeetupConfirmed { meetup_id: 7 });
        assert_eq!(view.active_meetup_bar(), Some(7));

        // la conferma si chiude, la barra del meetup attivo resta
        view.offer_closed();
        assert_eq!(view.primary(), Overlay::None);
        assert_eq!(view.active_meetup_bar(), Some(7));

        view.clear_active_meetup();
        assert_eq!(view.active_meetup_bar(), None);
    }

    #[test]
    fn acceptance_of_a_different_meetup_is_ignored() {
        let mut view = ViewState::new();
        assert!(view.open_user_detail(2));
        assert!(view.begin_meetup_offer());
        assert!(view.offer_sent(7));

        assert!(!view.offer_accepted(99));
        assert_eq!(view.primary(), Overlay::WaitingForReply { meetup_id: 7 });
    }
}
