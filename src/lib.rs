//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod monitoring;
pub mod repositories;
pub mod services;
pub mod sync;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/meetups", configure_meetup_routes(state.clone()))
        .nest("/seshes", configure_sesh_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes per la presenza e i profili utente
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(search_user_with_name))
        .route("/online", get(list_online_users))
        .route("/{user_id}", get(get_user_by_id))
        .route("/{user_id}/profile", get(get_user_profile))
        .route("/me", patch(update_my_profile))
        .route("/me/location", put(update_my_location))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes della macchina a stati degli inviti
fn configure_meetup_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_meetup_history).post(create_meetup))
        .route("/incoming", get(list_incoming_meetups))
        .route("/{meetup_id}/resolve/{outcome}", post(resolve_meetup))
        .route("/{meetup_id}/{action}", post(respond_to_meetup))
        .route("/{meetup_id}", delete(cancel_meetup))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes del ciclo di vita dei raduni
fn configure_sesh_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_active_seshes).post(create_sesh))
        .route("/{sesh_id}/join", post(join_sesh))
        .route("/{sesh_id}/leave", post(leave_sesh))
        .route("/{sesh_id}/end", post(end_sesh))
        .route("/{sesh_id}/participants", get(list_sesh_participants))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
