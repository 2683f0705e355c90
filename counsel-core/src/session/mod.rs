pub mod banner;
mod handoff;
mod poller;
mod runner;
mod state;

pub use banner::{dialogue_line, headline, DIALOGUE_LINES};
pub use handoff::SessionHandoff;
pub use poller::ReconciliationPoller;
pub use runner::{AnalysisSession, SessionOptions};
pub use state::{
    merge_conflicts, merge_messages, AnalysisPhase, AnalysisState, COMPLETE_ACTIVITY,
    DEFAULT_ERROR_MESSAGE,
};
