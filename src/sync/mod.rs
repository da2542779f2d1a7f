//! Sync Module - Controller di sincronizzazione lato client
//!
//! La metà client del motore realtime, consumata dai client nativi e dai
//! test di integrazione. Possiede:
//! - le collezioni locali specchiate (utenti, raduni) alimentate dagli
//!   eventi di fan-out, applicati come upsert idempotenti
//! - il loop di heartbeat della propria presenza (task periodico,
//!   cancellabile, legato al ciclo di vita della vista che lo possiede)
//! - lo stato di vista a overlay singolo, con transizioni esplicite
//!
//! Il thread UI è single-threaded ed event-driven: niente lock lato client,
//! la correttezza sotto concorrenza sta tutta nelle guardie dello store.

pub mod heartbeat;
pub mod mirror;
pub mod view;

// Re-exports per facilitare l'import
pub use heartbeat::{HeartbeatHandle, LocationSource, spawn_heartbeat};
pub use mirror::LocalMirror;
pub use view::{Overlay, ViewState};
