//! Meetup entity - Entità invito di meetup tra due utenti

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{MeetupActivity, MeetupStatus};

/// Invito diretto, time-boxed, da sender a receiver.
///
/// La scadenza non è uno stato persistito: si deriva sempre da `created_at`
/// più il TTL configurato. Un invito Pending oltre il TTL è morto a tutti
/// gli effetti anche se la riga nel database resta `PENDING`.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Meetup {
    pub meetup_id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub activity: MeetupActivity,
    pub status: MeetupStatus,
    pub meetup_time: Option<String>,
    pub location_name: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Meetup {
    pub fn is_participant(&self, user_id: i32) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }

    /// Scadenza derivata: vale solo per gli inviti ancora Pending.
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.status == MeetupStatus::Pending && now - self.created_at > ttl
    }

    /// Tempo rimanente del countdown lato client (zero se già scaduto).
    pub fn remaining_at(&self, ttl: Duration, now: DateTime<Utc>) -> Duration {
        let left = self.created_at + ttl - now;
        left.max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meetup_created_at(created_at: DateTime<Utc>, status: MeetupStatus) -> Meetup {
        Meetup {
            meetup_id: 1,
            sender_id: 10,
            receiver_id: 20,
            activity: MeetupActivity::Coffee,
            status,
            meetup_time: None,
            location_name: None,
            message: None,
            created_at,
        }
    }

    #[test]
    fn pending_meetup_expires_after_ttl() {
        let created = Utc::now();
        let m = meetup_created_at(created, MeetupStatus::Pending);
        let ttl = Duration::minutes(30);

        assert!(!m.is_expired_at(ttl, created + Duration::minutes(29)));
        assert!(m.is_expired_at(ttl, created + Duration::minutes(31)));
    }

    #[test]
    fn accepted_meetup_never_expires() {
        let created = Utc::now();
        let m = meetup_created_at(created, MeetupStatus::Accepted);
        assert!(!m.is_expired_at(Duration::minutes(30), created + Duration::hours(5)));
    }

    #[test]
    fn remaining_is_clamped_to_zero() {
        let created = Utc::now();
        let m = meetup_created_at(created, MeetupStatus::Pending);
        let ttl = Duration::minutes(30);

        assert_eq!(
            m.remaining_at(ttl, created + Duration::minutes(10)),
            Duration::minutes(20)
        );
        assert_eq!(
            m.remaining_at(ttl, created + Duration::minutes(45)),
            Duration::zero()
        );
    }

    #[test]
    fn participants_are_sender_and_receiver_only() {
        let m = meetup_created_at(Utc::now(), MeetupStatus::Pending);
        assert!(m.is_participant(10));
        assert!(m.is_participant(20));
        assert!(!m.is_participant(30));
    }
}
