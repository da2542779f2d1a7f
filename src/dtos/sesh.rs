//! Sesh DTOs - Data Transfer Objects per i raduni

use crate::dtos::UserDTO;
use crate::entities::{Sesh, SeshActivity, SeshStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeshDTO {
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

impl From<Sesh> for SeshDTO {
    fn from(value: Sesh) -> Self {
        Self {
            sesh_id: value.sesh_id,
            creator_id: value.creator_id,
            activity_type: value.activity_type,
            title: value.title,
            lat: value.lat,
            lng: value.lng,
            max_participants: value.max_participants,
            current_count: value.current_count,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un raduno. La posizione NON è nel payload: viene ancorata
/// alla presenza corrente del creatore al momento della chiamata.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateSeshDTO {
    pub activity_type: SeshActivity,
    #[validate(length(min = 1, max = 80, message = "title must be non-empty"))]
    pub title: String,
    #[validate(range(min = 2, max = 20))]
    pub max_participants: i32,
}

/// Lista partecipanti: {creatore} ∪ righe di partecipazione, ricalcolata
/// ad ogni richiesta, mai cachata.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SeshParticipantsDTO {
    pub sesh_id: i32,
    pub participants: Vec<UserDTO>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sesh_requires_title_and_bounded_capacity() {
        let dto = CreateSeshDTO {
            activity_type: SeshActivity::Study,
            title: "Exam cram".to_string(),
            max_participants: 5,
        };
        assert!(dto.validate().is_ok());

        let empty_title = CreateSeshDTO {
            title: String::new(),
            ..dto.clone()
        };
        assert!(empty_title.validate().is_err());

        let too_small = CreateSeshDTO {
            max_participants: 1,
            ..dto.clone()
        };
        assert!(too_small.validate().is_err());

        let too_big = CreateSeshDTO {
            max_participants: 21,
            ..dto
        };
        assert!(too_big.validate().is_err());
    }
}
