//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//!
//! Nota su sqlx: qui si usano query runtime-bound (`sqlx::query` /
//! `query_as` + FromRow) e non le macro `query!` con check a compile time,
//! che richiederebbero un database vivo ad ogni build. Il contratto con lo
//! schema sta in `migrations/` ed è esercitato dai test d'integrazione.

// ************************* MODULI REPOSITORY ************************* //

// Dichiarazione dei sotto-moduli
pub mod meetup;
pub mod sesh;
pub mod sesh_participant;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Read, ReadMany};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use meetup::{MeetupRepository, NewMeetup};
pub use sesh::{JoinAttempt, SeshRepository};
pub use sesh_participant::SeshParticipantRepository;
pub use user::UserRepository;
