//! Sesh entity - Entità raduno effimero con capacità limitata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{SeshActivity, SeshStatus};

/// Raduno di gruppo ancorato alla posizione del creatore al momento della
/// creazione. Il creatore conta come primo partecipante ma non ha mai una
/// riga in `sesh_participants`.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Sesh {
    pub sesh_id: i32,
    pub creator_id: i32,
    pub activity_type: SeshActivity,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub max_participants: i32,
    pub current_count: i32,
    pub status: SeshStatus,
    pub created_at: DateTime<Utc>,
}

impl Sesh {
    pub fn is_active(&self) -> bool {
        self.status == SeshStatus::Active
    }

    /// Vero se un join può ancora riuscire. La garanzia autoritativa resta
    /// l'update condizionale nel repository; questo è il check in memoria
    /// che il client usa per le affordance.
    pub fn has_capacity(&self) -> bool {
        self.is_active() && self.current_count < self.max_participants
    }

    /// Durata trascorsa mostrata nella vista del raduno attivo.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.created_at).max(chrono::Duration::zero())
    }
}

/// Riga di partecipazione, distinta dal creatore.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct SeshParticipant {
    pub sesh_id: i32,
    pub user_id: i32,
    pub joined_at: DateTime<Utc>,
}
