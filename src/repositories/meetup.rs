//! MeetupRepository - Repository per gli inviti di meetup
//!
//! Tutte le transizioni di stato passano da update condizionali: il WHERE
//! porta sia la chiave sia lo stato di partenza, così due client in gara
//! sulla stessa riga non possono mai applicare la transizione due volte.

use super::Read;
use crate::entities::{Meetup, MeetupActivity, MeetupStatus};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Error, MySqlPool};

const MEETUP_COLUMNS: &str = "meetup_id, sender_id, receiver_id, activity, status, meetup_time, \
     location_name, message, created_at";

pub struct MeetupRepository {
    connection_pool: MySqlPool,
}

/// Dati di creazione già validati dal service (sender = utente autenticato).
pub struct NewMeetup<'a> {
    pub sender_id: i32,
    pub receiver_id: i32,
    pub activity: MeetupActivity,
    pub meetup_time: Option<&'a str>,
    pub location_name: Option<&'a str>,
    pub message: Option<&'a str>,
}

impl MeetupRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Crea l'invito solo se per la coppia (non ordinata) non ne esiste già
    /// uno attivo: ACCEPTED, oppure PENDING più giovane del TTL. Un PENDING
    /// scaduto è morto e non blocca un nuovo invito.
    ///
    /// INSERT e check di dedup sono un'unica statement, quindi atomici lato
    /// store. Ritorna None se l'invito è stato rifiutato per conflitto.
    pub async fn create_if_no_active(
        &self,
        data: &NewMeetup<'_>,
        ttl: Duration,
    ) -> Result<Option<Meetup>, Error> {
        let now = Utc::now();
        let pending_cutoff = now - ttl;

        let result = sqlx::query(
            "INSERT INTO meetups \
             (sender_id, receiver_id, activity, status, meetup_time, location_name, message, created_at) \
             SELECT ?, ?, ?, 'PENDING', ?, ?, ?, ? FROM DUAL \
             WHERE NOT EXISTS (\
                 SELECT 1 FROM meetups \
                 WHERE ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)) \
                 AND (status = 'ACCEPTED' OR (status = 'PENDING' AND created_at > ?))\
             )",
        )
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(data.activity)
        .bind(data.meetup_time)
        .bind(data.location_name)
        .bind(data.message)
        .bind(now)
        .bind(data.sender_id)
        .bind(data.receiver_id)
        .bind(data.receiver_id)
        .bind(data.sender_id)
        .bind(pending_cutoff)
        .execute(&self.connection_pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Meetup {
            meetup_id: result.last_insert_id() as i32,
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            activity: data.activity,
            status: MeetupStatus::Pending,
            meetup_time: data.meetup_time.map(str::to_string),
            location_name: data.location_name.map(str::to_string),
            message: data.message.map(str::to_string),
            created_at: now,
        }))
    }

    /// Inviti pending in arrivo per il receiver, esclusi quelli scaduti
    /// (valutazione lazy del TTL: mai uno sweep lato server).
    pub async fn find_incoming_pending(
        &self,
        receiver_id: &i32,
        pending_cutoff: DateTime<Utc>,
    ) -> Result<Vec<Meetup>, Error> {
        let meetups = sqlx::query_as::<_, Meetup>(&format!(
            "SELECT {MEETUP_COLUMNS} FROM meetups \
             WHERE receiver_id = ? AND status = 'PENDING' AND created_at > ? \
             ORDER BY created_at DESC"
        ))
        .bind(receiver_id)
        .bind(pending_cutoff)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(meetups)
    }

    /// Storico per le viste di notifica: tutte le righe in cui l'utente è
    /// mittente o destinatario, dalle più recenti.
    pub async fn find_history_for_user(
        &self,
        user_id: &i32,
        limit: i64,
    ) -> Result<Vec<Meetup>, Error> {
        let meetups = sqlx::query_as::<_, Meetup>(&format!(
            "SELECT {MEETUP_COLUMNS} FROM meetups \
             WHERE sender_id = ? OR receiver_id = ? \
             ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(meetups)
    }

    /// Transizione guardata `from -> to`. Ritorna false se la riga non era
    /// più nello stato di partenza: qualcun altro ha già agito.
    pub async fn transition(
        &self,
        meetup_id: &i32,
        from: MeetupStatus,
        to: MeetupStatus,
    ) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE meetups SET status = ? WHERE meetup_id = ? AND status = ?")
            .bind(to)
            .bind(meetup_id)
            .bind(from)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Cancellazione del mittente, legale solo finché l'invito è pending.
    pub async fn delete_pending(&self, meetup_id: &i32, sender_id: &i32) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM meetups WHERE meetup_id = ? AND sender_id = ? AND status = 'PENDING'",
        )
        .bind(meetup_id)
        .bind(sender_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl Read<Meetup, i32> for MeetupRepository {
    async fn read(&self, id: &i32) -> Result<Option<Meetup>, Error> {
        let meetup = sqlx::query_as::<_, Meetup>(&format!(
            "SELECT {MEETUP_COLUMNS} FROM meetups WHERE meetup_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(meetup)
    }
}
