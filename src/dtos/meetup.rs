//! Meetup DTOs - Data Transfer Objects per gli inviti di meetup

use crate::dtos::UserDTO;
use crate::entities::{Meetup, MeetupActivity, MeetupStatus};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // orario proposto in formato HH:MM, es. "14:30"
    static ref MEETUP_TIME_RE: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MeetupDTO {
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

impl From<Meetup> for MeetupDTO {
    fn from(value: Meetup) -> Self {
        Self {
            meetup_id: value.meetup_id,
            sender_id: value.sender_id,
            receiver_id: value.receiver_id,
            activity: value.activity,
            status: value.status,
            meetup_time: value.meetup_time,
            location_name: value.location_name,
            message: value.message,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un nuovo invito (sender implicito: l'utente autenticato)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateMeetupDTO {
    pub receiver_id: i32,
    pub activity: MeetupActivity,
    #[validate(regex(path = *MEETUP_TIME_RE, message = "time must be HH:MM"))]
    pub meetup_time: Option<String>,
    #[validate(length(max = 120))]
    pub location_name: Option<String>,
    #[validate(length(max = 280))]
    pub message: Option<String>,
}

/// DTO arricchito con il profilo pubblico del mittente: è quello che il
/// receiver vede arrivare via fan-out.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnrichedMeetupDTO {
    pub meetup_id: i32,
    pub activity: MeetupActivity,
    pub status: MeetupStatus,
    pub meetup_time: Option<String>,
    pub location_name: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sender: Option<UserDTO>,
}

impl EnrichedMeetupDTO {
    pub fn from_meetup(meetup: Meetup, sender: Option<UserDTO>) -> Self {
        Self {
            meetup_id: meetup.meetup_id,
            activity: meetup.activity,
            status: meetup.status,
            meetup_time: meetup.meetup_time,
            location_name: meetup.location_name,
            message: meetup.message,
            created_at: meetup.created_at,
            sender,
        }
    }
}
