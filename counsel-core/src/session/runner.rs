use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::api::CaseBackend;
use crate::config::CounselConfig;
use crate::stream::{EventStreamClient, StreamCallbacks, Subscription};

use super::poller::ReconciliationPoller;
use super::state::AnalysisState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub banner_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            banner_interval: Duration::from_secs(3),
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &CounselConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            banner_interval: config.banner_interval(),
        }
    }
}

/// A live analysis of one case.
///
/// Owns the stream subscription, the reconciliation poller and the banner
/// ticker. All of them write through the same watch channel, whose lock is
/// the single write point for [`AnalysisState`]. Dropping the session tears
/// everything down.
pub struct AnalysisSession {
    case_id: String,
    state_tx: Arc<watch::Sender<AnalysisState>>,
    subscription: Mutex<Option<Subscription>>,
    poller: Mutex<Option<ReconciliationPoller>>,
    banner: Mutex<Option<JoinHandle<()>>>,
}

impl AnalysisSession {
    /// Starts watching `case_id`. If the case already has a strategy the
    /// session is complete immediately and no stream is opened.
    pub async fn start(
        backend: Arc<dyn CaseBackend>,
        case_id: impl Into<String>,
        options: SessionOptions,
    ) -> Self {
        let case_id = case_id.into();
        let (state_tx, _) = watch::channel(AnalysisState::new(case_id.clone()));
        let state_tx = Arc::new(state_tx);

        let session = Self {
            case_id: case_id.clone(),
            state_tx: state_tx.clone(),
            subscription: Mutex::new(None),
            poller: Mutex::new(None),
            banner: Mutex::new(None),
        };

        match backend.get_case(&case_id).await {
            Ok(details) => {
                let finished = details.has_strategy();
                state_tx.send_if_modified(|state| state.merge_details(&details));
                if finished {
                    info!(case_id = %case_id, "Analysis already complete");
                    return session;
                }
            }
            Err(e) => {
                debug!(case_id = %case_id, error = %e, "Pre-check fetch failed, starting stream anyway");
            }
        }

        let stream_client = EventStreamClient::new(backend.clone());
        let event_tx = state_tx.clone();
        let error_tx = state_tx.clone();
        let log_id = case_id.clone();
        let callbacks = StreamCallbacks::new(move |event| {
            event_tx.send_if_modified(|state| state.apply(&event));
        })
        .on_error(move |err| {
            warn!(error = %err, "Live updates unavailable, relying on polling");
            error_tx.send_if_modified(|state| state.mark_stream_interrupted());
        })
        .on_complete(move || {
            info!(case_id = %log_id, "Analysis stream completed");
        });
        let subscription = stream_client.subscribe(&case_id, callbacks);

        let poller = ReconciliationPoller::spawn(
            backend,
            case_id.clone(),
            options.poll_interval,
            state_tx.clone(),
        );

        let banner = tokio::spawn(banner_loop(state_tx.clone(), options.banner_interval));

        if let Ok(mut slot) = session.subscription.lock() {
            *slot = Some(subscription);
        }
        if let Ok(mut slot) = session.poller.lock() {
            *slot = Some(poller);
        }
        if let Ok(mut slot) = session.banner.lock() {
            *slot = Some(banner);
        }

        session
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Current snapshot of the state.
    pub fn state(&self) -> AnalysisState {
        self.state_tx.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<AnalysisState> {
        self.state_tx.subscribe()
    }

    /// Resolves once the analysis completes or fails.
    pub async fn wait_until_terminal(&self) -> AnalysisState {
        let mut rx = self.watch();
        let state = match rx.wait_for(AnalysisState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// Stops the stream, the poller and the banner. Safe to call repeatedly.
    pub fn cancel(&self) {
        let subscription = self.subscription.lock().ok().and_then(|mut s| s.take());
        let poller = self.poller.lock().ok().and_then(|mut p| p.take());
        let banner = self.banner.lock().ok().and_then(|mut b| b.take());

        if subscription.is_none() && poller.is_none() && banner.is_none() {
            return;
        }

        if let Some(subscription) = subscription {
            subscription.cancel();
        }
        if let Some(mut poller) = poller {
            poller.stop();
        }
        if let Some(banner) = banner {
            banner.abort();
        }
        info!(case_id = %self.case_id, "Analysis session cancelled");
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn banner_loop(state_tx: Arc<watch::Sender<AnalysisState>>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        state_tx.send_if_modified(AnalysisState::tick_banner);
        if state_tx.borrow().is_terminal() {
            break;
        }
    }
}
