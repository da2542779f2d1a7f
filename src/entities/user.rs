//! User entity - Entità utente (record di presenza) con metodi per gestione password

use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::enums::University;

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub password: String,
    pub name: String,
    pub avatar_url: String,
    pub university: University,
    pub degree: String,
    pub year: i32,
    pub bio: String,
    pub subjects: Json<Vec<String>>,
    pub interests: Json<Vec<String>>,
    // lat/lng sono scritti solo dal client dell'utente stesso (single writer per riga)
    pub lat: f64,
    pub lng: f64,
    pub is_online: bool,
    pub is_premium: bool,
    // liveness, separata dalla posizione: aggiornata dagli heartbeat, non dai movimenti
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }
}
