//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod meetup;
pub mod query;
pub mod sesh;
pub mod user;
pub mod ws_event;

// Re-exports per mantenere la compatibilità con il codice esistente
pub use meetup::{CreateMeetupDTO, EnrichedMeetupDTO, MeetupDTO};
pub use query::{HistoryQuery, UserSearchQuery};
pub use sesh::{CreateSeshDTO, SeshDTO, SeshParticipantsDTO};
pub use user::{CreateUserDTO, LocationDTO, ProfileDTO, UpdateProfileDTO, UserDTO};
pub use ws_event::{ClientEventDTO, WsEventDTO};
