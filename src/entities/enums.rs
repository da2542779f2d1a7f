//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "university", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum University {
    Uq,
    Qut,
    Griffith,
}

/// Attività proposta in un invito di meetup (insieme chiuso).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "meetup_activity", rename_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum MeetupActivity {
    Study,
    Hoops,
    Coffee,
    Walk,
    Food,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "meetup_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum MeetupStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    NoShow,
}

impl MeetupStatus {
    /// Stati da cui nessuna transizione è più possibile.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MeetupStatus::Rejected | MeetupStatus::Completed | MeetupStatus::NoShow
        )
    }

    /// accept/reject sono legali solo da Pending.
    pub fn can_respond(&self) -> bool {
        matches!(self, MeetupStatus::Pending)
    }

    /// completed/no_show sono legali solo da Accepted.
    pub fn can_resolve(&self) -> bool {
        matches!(self, MeetupStatus::Accepted)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "sesh_activity", rename_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum SeshActivity {
    Sports,
    Study,
    Coffee,
    Food,
    Party,
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "sesh_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum SeshStatus {
    Active,
    Ended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_meetup_states_refuse_every_transition() {
        for status in [
            MeetupStatus::Rejected,
            MeetupStatus::Completed,
            MeetupStatus::NoShow,
        ] {
            assert!(status.is_terminal());
            assert!(!status.can_respond());
            assert!(!status.can_resolve());
        }
    }

    #[test]
    fn pending_can_only_be_responded() {
        assert!(MeetupStatus::Pending.can_respond());
        assert!(!MeetupStatus::Pending.can_resolve());
        assert!(!MeetupStatus::Pending.is_terminal());
    }

    #[test]
    fn accepted_can_only_be_resolved() {
        assert!(!MeetupStatus::Accepted.can_respond());
        assert!(MeetupStatus::Accepted.can_resolve());
        assert!(!MeetupStatus::Accepted.is_terminal());
    }

    #[test]
    fn meetup_status_serializes_like_the_wire_format() {
        let json = serde_json::to_string(&MeetupStatus::NoShow).unwrap();
        assert_eq!(json, "\"no_show\"");
        let back: MeetupStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(back, MeetupStatus::Accepted);
    }
}
