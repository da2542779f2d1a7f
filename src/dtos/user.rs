//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{University, User};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]{3,32}$").unwrap();
}

/// Vista pubblica di un utente: quello che serve per disegnare il marker
/// sulla mappa. Mai la password, mai i campi riservati al profilo premium.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserDTO {
    pub user_id: i32,
    pub name: String,
    pub avatar_url: String,
    pub university: University,
    pub degree: String,
    pub year: i32,
    pub lat: f64,
    pub lng: f64,
    pub is_online: bool,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            name: value.name,
            avatar_url: value.avatar_url,
            university: value.university,
            degree: value.degree,
            year: value.year,
            lat: value.lat,
            lng: value.lng,
            is_online: value.is_online,
        }
    }
}

/// Profilo completo, rivelato solo dopo il check di entitlement premium.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProfileDTO {
    pub user_id: i32,
    pub name: String,
    pub avatar_url: String,
    pub university: University,
    pub degree: String,
    pub year: i32,
    pub bio: String,
    pub subjects: Vec<String>,
    pub interests: Vec<String>,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
}

impl From<User> for ProfileDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            name: value.name,
            avatar_url: value.avatar_url,
            university: value.university,
            degree: value.degree,
            year: value.year,
            bio: value.bio,
            subjects: value.subjects.0,
            interests: value.interests.0,
            is_online: value.is_online,
            last_seen: value.last_seen,
        }
    }
}

/// DTO per la registrazione di un nuovo utente
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(regex(
        path = *USERNAME_RE,
        message = "username must be 3-32 chars, letters/digits/underscore"
    ))]
    pub username: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub university: University,
    #[validate(length(max = 64))]
    pub degree: String,
    #[validate(range(min = 1, max = 10))]
    pub year: i32,
    #[validate(length(max = 500))]
    pub bio: String,
}

/// DTO per la modifica del proprio profilo (solo i campi Some vengono scritti)
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateProfileDTO {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 64))]
    pub degree: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub year: Option<i32>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

/// DTO per la scrittura della posizione (heartbeat REST o WS)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Validate)]
pub struct LocationDTO {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateUserDTO {
        CreateUserDTO {
            username: "atticus_f".to_string(),
            password: "reading-law-3".to_string(),
            name: "Atticus Finch".to_string(),
            university: University::Uq,
            degree: "Law".to_string(),
            year: 3,
            bio: String::new(),
        }
    }

    #[test]
    fn register_dto_accepts_valid_input() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn register_dto_rejects_bad_username_and_short_password() {
        let mut dto = valid_create();
        dto.username = "x".to_string();
        assert!(dto.validate().is_err());

        let mut dto = valid_create();
        dto.password = "short".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn location_dto_rejects_out_of_range_coordinates() {
        assert!(LocationDTO { lat: -27.5, lng: 153.0 }.validate().is_ok());
        assert!(LocationDTO { lat: 91.0, lng: 153.0 }.validate().is_err());
        assert!(LocationDTO { lat: 0.0, lng: 181.0 }.validate().is_err());
    }
}
