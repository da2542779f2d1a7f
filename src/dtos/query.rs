//! Query DTOs - Data Transfer Objects per query di ricerca

use serde::{Deserialize, Serialize};

/// DTO per query parameters di ricerca utenti
#[derive(Serialize, Deserialize, Debug)]
pub struct UserSearchQuery {
    pub search: String,
}

/// DTO per query parameters dello storico meetup
#[derive(Serialize, Deserialize, Debug)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}
