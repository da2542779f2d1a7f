//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod enums;
pub mod meetup;
pub mod sesh;
pub mod user;

// Re-exports per facilitare l'import
pub use enums::{MeetupActivity, MeetupStatus, SeshActivity, SeshStatus, University};
pub use meetup::Meetup;
pub use sesh::{Sesh, SeshParticipant};
pub use user::User;
