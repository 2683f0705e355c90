use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::api::CaseBackend;

use super::state::AnalysisState;

/// Fixed-interval `GET /api/cases/{id}` backstop for the live stream.
///
/// Each tick awaits the previous fetch, so polls never overlap. Failures are
/// logged and ignored; the loop ends once the state is terminal or the
/// shutdown signal fires.
pub struct ReconciliationPoller {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReconciliationPoller {
    pub fn spawn(
        backend: Arc<dyn CaseBackend>,
        case_id: String,
        period: Duration,
        state_tx: Arc<watch::Sender<AnalysisState>>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(poll_loop(backend, case_id, period, state_tx, shutdown_rx));
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ReconciliationPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    backend: Arc<dyn CaseBackend>,
    case_id: String,
    period: Duration,
    state_tx: Arc<watch::Sender<AnalysisState>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if state_tx.borrow().is_terminal() {
                    break;
                }
                match backend.get_case(&case_id).await {
                    Ok(details) => {
                        let changed = state_tx.send_if_modified(|state| state.merge_details(&details));
                        if changed {
                            debug!(case_id = %case_id, "Poll merged new case data");
                        }
                    }
                    Err(e) => {
                        debug!(case_id = %case_id, error = %e, "Poll failed, will retry next tick");
                    }
                }
                if state_tx.borrow().is_terminal() {
                    info!(case_id = %case_id, "Poller observed terminal state");
                    break;
                }
            }
            _ = &mut shutdown_rx => {
                debug!(case_id = %case_id, "Poller shutting down");
                break;
            }
        }
    }
}
