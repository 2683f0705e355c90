use eventsource_stream::{EventStreamError, Eventsource};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{CaseBackend, EventByteStream};
use crate::error::CounselError;

use super::events::StreamEvent;

pub type StreamEventCallback = Box<dyn Fn(StreamEvent) + Send + Sync>;
pub type StreamErrorCallback = Box<dyn Fn(CounselError) + Send + Sync>;
pub type StreamCompleteCallback = Box<dyn Fn() + Send + Sync>;

/// Handlers invoked from the subscription's reader task, in emission order.
pub struct StreamCallbacks {
    pub on_event: StreamEventCallback,
    pub on_error: StreamErrorCallback,
    pub on_complete: StreamCompleteCallback,
}

impl StreamCallbacks {
    pub fn new(on_event: impl Fn(StreamEvent) + Send + Sync + 'static) -> Self {
        Self {
            on_event: Box::new(on_event),
            on_error: Box::new(|_| {}),
            on_complete: Box::new(|| {}),
        }
    }

    pub fn on_error(mut self, on_error: impl Fn(CounselError) + Send + Sync + 'static) -> Self {
        self.on_error = Box::new(on_error);
        self
    }

    pub fn on_complete(mut self, on_complete: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Box::new(on_complete);
        self
    }
}

/// How a single read of the stream ended.
enum StreamEnd {
    /// A terminal success event was delivered.
    Terminal,
    /// The backend reported an error event.
    Failed,
    /// Transport broke or the body closed before a terminal event.
    Interrupted(CounselError),
}

/// Subscribes to a case's live analysis stream.
#[derive(Clone)]
pub struct EventStreamClient {
    backend: Arc<dyn CaseBackend>,
}

impl EventStreamClient {
    pub fn new(backend: Arc<dyn CaseBackend>) -> Self {
        Self { backend }
    }

    /// Starts a reader task for `case_id`. Opening the connection fires no
    /// callback; the returned handle cancels the reader.
    pub fn subscribe(&self, case_id: &str, callbacks: StreamCallbacks) -> Subscription {
        let id = Uuid::new_v4();
        let backend = self.backend.clone();
        let case_id = case_id.to_string();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        info!(subscription = %id, case_id = %case_id, "Subscribing to analysis stream");

        let task_case_id = case_id.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = run_subscription(backend, &task_case_id, &callbacks) => {}
                _ = shutdown_rx => {
                    debug!(case_id = %task_case_id, "Stream subscription cancelled");
                }
            }
        });

        Subscription {
            id,
            case_id,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            handle: Mutex::new(Some(handle)),
        }
    }
}

async fn run_subscription(
    backend: Arc<dyn CaseBackend>,
    case_id: &str,
    callbacks: &StreamCallbacks,
) {
    let failure = match backend.open_event_stream(case_id).await {
        Ok(body) => match read_events(body, case_id, callbacks).await {
            StreamEnd::Terminal => {
                info!(case_id = %case_id, "Analysis stream reached terminal event");
                (callbacks.on_complete)();
                return;
            }
            StreamEnd::Failed => return,
            StreamEnd::Interrupted(err) => err,
        },
        Err(err) => err,
    };

    warn!(case_id = %case_id, error = %failure, "Event stream interrupted, reconciling");
    reconcile(backend.as_ref(), case_id, failure, callbacks).await;
}

/// Reads until a terminal or error event, or until the body breaks. The body
/// is dropped before this returns.
async fn read_events(body: EventByteStream, case_id: &str, callbacks: &StreamCallbacks) -> StreamEnd {
    let mut events = body.eventsource();

    while let Some(item) = events.next().await {
        let sse = match item {
            Ok(sse) => sse,
            Err(EventStreamError::Transport(err)) => return StreamEnd::Interrupted(err),
            Err(err) => {
                return StreamEnd::Interrupted(CounselError::StreamTransport {
                    case_id: case_id.to_string(),
                    message: err.to_string(),
                })
            }
        };

        match StreamEvent::parse(&sse.event, &sse.data) {
            Ok(Some(event)) => {
                debug!(case_id = %case_id, event = event.name(), "Stream event");
                let terminal = event.is_terminal();
                let failed = event.is_error();
                (callbacks.on_event)(event);
                if terminal {
                    return StreamEnd::Terminal;
                }
                if failed {
                    warn!(case_id = %case_id, "Backend reported analysis error");
                    return StreamEnd::Failed;
                }
            }
            Ok(None) => {
                debug!(case_id = %case_id, event = %sse.event, "Ignoring unknown stream event");
            }
            Err(err) => {
                warn!(case_id = %case_id, error = %err, "Skipping malformed stream event");
            }
        }
    }

    StreamEnd::Interrupted(CounselError::StreamTransport {
        case_id: case_id.to_string(),
        message: "stream closed before a terminal event".to_string(),
    })
}

/// One `GET /api/cases/{id}` after the stream dropped. The snapshot goes to
/// the event handler; only a failed fetch reaches the error handler.
async fn reconcile(
    backend: &dyn CaseBackend,
    case_id: &str,
    failure: CounselError,
    callbacks: &StreamCallbacks,
) {
    match backend.get_case(case_id).await {
        Ok(details) => {
            let finished = details.has_strategy();
            (callbacks.on_event)(StreamEvent::Snapshot(Box::new(details)));
            if finished {
                info!(case_id = %case_id, "Reconciliation found a final strategy");
                (callbacks.on_complete)();
            } else {
                debug!(case_id = %case_id, "Reconciliation snapshot delivered, analysis still running");
            }
        }
        Err(err) => {
            debug!(case_id = %case_id, error = %err, "Reconciliation fetch failed");
            (callbacks.on_error)(failure);
        }
    }
}

/// Handle to a running stream reader. Dropping it cancels the reader.
pub struct Subscription {
    id: Uuid,
    case_id: String,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// True while the reader task has not finished or been cancelled.
    pub fn is_active(&self) -> bool {
        self.handle
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Stops the reader. Safe to call more than once.
    pub fn cancel(&self) {
        let sender = self.shutdown_tx.lock().ok().and_then(|mut guard| guard.take());
        let handle = self.handle.lock().ok().and_then(|mut guard| guard.take());

        if sender.is_none() && handle.is_none() {
            return;
        }
        if let Some(tx) = sender {
            let _ = tx.send(());
        }
        if let Some(handle) = handle {
            handle.abort();
        }
        debug!(subscription = %self.id, case_id = %self.case_id, "Stream subscription released");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("case_id", &self.case_id)
            .finish()
    }
}
