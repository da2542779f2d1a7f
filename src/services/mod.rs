//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod meetup;
pub mod sesh;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{login_user, register_user};
pub use meetup::{
    cancel_meetup, create_meetup, list_incoming_meetups, list_meetup_history, resolve_meetup,
    respond_to_meetup,
};
pub use sesh::{
    create_sesh, end_sesh, join_sesh, leave_sesh, list_active_seshes, list_sesh_participants,
};
pub use user::{
    get_user_by_id, get_user_profile, list_online_users, search_user_with_name,
    update_my_location, update_my_profile,
};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
