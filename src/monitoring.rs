//! Modulo per il monitoraggio del runtime del server
//!
//! Logga a intervalli configurabili l'utilizzo del processo corrente
//! (CPU/memoria via `sysinfo`) insieme ai gauge di dominio: utenti online e
//! sottoscrittori dei feed di fan-out. Serve a osservare questo sistema, non
//! la macchina nel suo complesso.

use crate::AppState;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time;
use tracing::info;

/// Configurazione del monitor di runtime
pub struct MonitorConfig {
    /// Intervallo di logging in secondi
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: 120 } // 2 minuti
    }
}

/// Statistiche raccolte a ogni tick
#[derive(Debug, Clone)]
pub struct RuntimeStats {
    /// Percentuale di utilizzo CPU del processo
    pub cpu_percentage: f32,
    /// Memoria usata dal processo in MB
    pub memory_usage_mb: f64,
    /// Utenti con una connessione WebSocket registrata
    pub online_users: usize,
    /// Sottoscrittori del feed utenti
    pub map_subscribers: usize,
    /// Sottoscrittori del feed raduni
    pub sesh_subscribers: usize,
}

impl RuntimeStats {
    /// Formatta le statistiche come stringa per il logging
    pub fn format_for_log(&self) -> String {
        format!(
            "CPU: {:.2}% | Memory: {:.2} MB | Online users: {} | Feed subscribers: {}/{}",
            self.cpu_percentage,
            self.memory_usage_mb,
            self.online_users,
            self.map_subscribers,
            self.sesh_subscribers
        )
    }
}

/// Task di monitoraggio che gira in background per tutta la vita del server.
/// Ogni `interval_secs` secondi raccoglie un campione e lo logga via tracing.
pub async fn start_runtime_monitoring(state: Arc<AppState>, config: MonitorConfig) {
    info!(
        "Starting runtime monitoring with interval: {} seconds",
        config.interval_secs
    );

    let mut sys = System::new();
    let current_pid = Pid::from_u32(std::process::id());

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));

    // Salta il primo tick che avviene immediatamente
    interval.tick().await;

    loop {
        interval.tick().await;

        sys.refresh_processes(ProcessesToUpdate::Some(&[current_pid]), true);

        let (cpu_percentage, memory_usage_mb) = match sys.process(current_pid) {
            Some(process) => (
                process.cpu_usage(),
                process.memory() as f64 / (1024.0 * 1024.0),
            ),
            None => (0.0, 0.0),
        };

        let stats = RuntimeStats {
            cpu_percentage,
            memory_usage_mb,
            online_users: state.users_online.online_count(),
            map_subscribers: state.feeds.users_receiver_count(),
            sesh_subscribers: state.feeds.seshes_receiver_count(),
        };

        info!("{}", stats.format_for_log());
    }
}
