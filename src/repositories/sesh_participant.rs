//! SeshParticipantRepository - Letture sulle righe di partecipazione
//!
//! Le scritture (join/leave) vivono in SeshRepository perché devono essere
//! transazionali col contatore; qui restano le letture.

use crate::entities::SeshParticipant;
use sqlx::{Error, MySqlPool};

pub struct SeshParticipantRepository {
    connection_pool: MySqlPool,
}

impl SeshParticipantRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Righe di partecipazione di un raduno, in ordine di arrivo.
    /// Il creatore non compare mai qui.
    pub async fn find_many_by_sesh_id(&self, sesh_id: &i32) -> Result<Vec<SeshParticipant>, Error> {
        let participants = sqlx::query_as::<_, SeshParticipant>(
            "SELECT sesh_id, user_id, joined_at FROM sesh_participants \
             WHERE sesh_id = ? ORDER BY joined_at",
        )
        .bind(sesh_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(participants)
    }
}
