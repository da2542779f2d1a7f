//! SeshRepository - Repository per i raduni e l'enforcement della capacità
//!
//! Il join è l'unico punto del sistema dove un read-then-write ingenuo
//! potrebbe sforare la capacità: qui il check-then-increment è una singola
//! UPDATE condizionale dentro una transazione con l'insert della riga di
//! partecipazione. O riesce tutto, o non cambia niente.

use super::Read;
use crate::dtos::CreateSeshDTO;
use crate::entities::{Sesh, SeshStatus};
use chrono::Utc;
use sqlx::{Error, MySqlPool};

const SESH_COLUMNS: &str = "sesh_id, creator_id, activity_type, title, lat, lng, \
     max_participants, current_count, status, created_at";

/// Esito di un tentativo di join, prima della diagnosi del service.
#[derive(Debug, PartialEq, Eq)]
pub enum JoinAttempt {
    /// Slot riservato e riga di partecipazione inserita
    Joined,
    /// L'update condizionale non ha toccato righe: inesistente, terminato o pieno
    NoSlot,
    /// Vincolo di unicità violato: l'utente era già partecipante
    Duplicate,
}

pub struct SeshRepository {
    connection_pool: MySqlPool,
}

impl SeshRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Crea un raduno ancorato alla posizione del creatore al momento della
    /// chiamata. current_count parte da 1: il creatore conta come primo
    /// partecipante senza riga di partecipazione.
    pub async fn create(
        &self,
        creator_id: &i32,
        data: &CreateSeshDTO,
        lat: f64,
        lng: f64,
    ) -> Result<Sesh, Error> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO seshes \
             (creator_id, activity_type, title, lat, lng, max_participants, current_count, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, 'ACTIVE', ?)",
        )
        .bind(creator_id)
        .bind(data.activity_type)
        .bind(&data.title)
        .bind(lat)
        .bind(lng)
        .bind(data.max_participants)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Sesh {
            sesh_id: result.last_insert_id() as i32,
            creator_id: *creator_id,
            activity_type: data.activity_type,
            title: data.title.clone(),
            lat,
            lng,
            max_participants: data.max_participants,
            current_count: 1,
            status: SeshStatus::Active,
            created_at: now,
        })
    }

    /// Tutti i raduni ancora attivi: snapshot per il re-fetch dei client.
    pub async fn find_active(&self) -> Result<Vec<Sesh>, Error> {
        let seshes = sqlx::query_as::<_, Sesh>(&format!(
            "SELECT {SESH_COLUMNS} FROM seshes WHERE status = 'ACTIVE' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(seshes)
    }

    /// Tentativo atomico di join: incremento condizionale del contatore e
    /// insert della riga di partecipazione nella stessa transazione.
    /// N tentativi concorrenti a capacità-1 slot liberi: ne riesce
    /// esattamente uno per slot, gli altri tornano NoSlot.
    pub async fn try_join(&self, sesh_id: &i32, user_id: &i32) -> Result<JoinAttempt, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let reserved = sqlx::query(
            "UPDATE seshes SET current_count = current_count + 1 \
             WHERE sesh_id = ? AND status = 'ACTIVE' AND current_count < max_participants",
        )
        .bind(sesh_id)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(JoinAttempt::NoSlot);
        }

        let inserted = sqlx::query(
            "INSERT INTO sesh_participants (sesh_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(sesh_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(JoinAttempt::Joined)
            }
            Err(Error::Database(db_err)) if db_err.is_unique_violation() => {
                // lo slot riservato viene restituito dal rollback
                tx.rollback().await?;
                Ok(JoinAttempt::Duplicate)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    /// Uscita di un non-creatore: delete della riga + decremento, in
    /// transazione. Ritorna false se l'utente non era partecipante.
    pub async fn leave(&self, sesh_id: &i32, user_id: &i32) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM sesh_participants WHERE sesh_id = ? AND user_id = ?")
            .bind(sesh_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // il creatore conta sempre 1: mai sotto
        sqlx::query(
            "UPDATE seshes SET current_count = GREATEST(current_count - 1, 1) WHERE sesh_id = ?",
        )
        .bind(sesh_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Terminazione guardata: solo il creatore, solo da ACTIVE. La riga
    /// resta per lo storico, sparisce dalle viste active via fan-out.
    pub async fn end_guarded(&self, sesh_id: &i32, creator_id: &i32) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE seshes SET status = 'ENDED' \
             WHERE sesh_id = ? AND creator_id = ? AND status = 'ACTIVE'",
        )
        .bind(sesh_id)
        .bind(creator_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl Read<Sesh, i32> for SeshRepository {
    async fn read(&self, id: &i32) -> Result<Option<Sesh>, Error> {
        let sesh = sqlx::query_as::<_, Sesh>(&format!(
            "SELECT {SESH_COLUMNS} FROM seshes WHERE sesh_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(sesh)
    }
}
