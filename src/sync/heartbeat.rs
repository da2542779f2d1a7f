//! Heartbeat - Loop periodico di liveness della propria presenza
//!
//! Ogni tick manda un Heartbeat (liveness pura: tocca last_seen, non la
//! posizione) e, solo se la sorgente di posizione riporta un movimento, un
//! LocationUpdate. Liveness e posizione restano due segnali distinti.

use crate::dtos::ClientEventDTO;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

/// Sorgente della posizione del dispositivo. `sample` ritorna Some solo
/// quando c'è un movimento da riportare, None quando si è fermi.
pub trait LocationSource: Send + 'static {
    fn sample(&mut self) -> Option<(f64, f64)>;
}

impl<F> LocationSource for F
where
    F: FnMut() -> Option<(f64, f64)> + Send + 'static,
{
    fn sample(&mut self) -> Option<(f64, f64)> {
        self()
    }
}

/// Handle del task di heartbeat, legato al ciclo di vita della vista che lo
/// possiede: al Drop il task viene abortito, così una vista smontata non
/// continua a scrivere presenza stantia.
pub struct HeartbeatHandle {
    handle: JoinHandle<()>,
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Avvia il loop di heartbeat. Un send fallito su un canale ancora aperto è
/// un degrado temporaneo: warn e si riprova al tick successivo, mai un
/// errore bloccante. Canale chiuso = connessione smontata, il task termina.
pub fn spawn_heartbeat(
    period: Duration,
    tx: UnboundedSender<ClientEventDTO>,
    mut source: impl LocationSource,
) -> HeartbeatHandle {
    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.tick().await; // primo tick immediato consumato

        loop {
            ticker.tick().await;

            if tx.send(ClientEventDTO::Heartbeat).is_err() {
                info!("Heartbeat channel closed, stopping");
                break;
            }
            debug!("Heartbeat sent");

            if let Some((lat, lng)) = source.sample() {
                if tx.send(ClientEventDTO::LocationUpdate { lat, lng }).is_err() {
                    warn!("Location update dropped, channel closed");
                    break;
                }
                debug!("Location update sent");
            }
        }
    });

    HeartbeatHandle { handle }
}
