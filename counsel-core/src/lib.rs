#![allow(
    clippy::needless_borrows_for_generic_args,
    clippy::derivable_impls,
    clippy::type_complexity,
    clippy::len_zero,
    dead_code,
    unused_imports,
    unused_variables
)]

pub mod api;
pub mod config;
pub mod error;
pub mod intake;
pub mod models;
pub mod render;
pub mod results;
pub mod session;
pub mod stream;

pub use api::{CaseApiClient, CaseBackend, EventByteStream, UploadDocument};
pub use config::{
    ensure_cache_dir, get_cache_dir, get_config_dir, AnalysisConfig, ApiConfig, ConfigLoadError,
    CounselConfig, DisplayConfig, LoggingConfig,
};
pub use error::{CliErrorDisplay, CounselError, CounselResult};
pub use intake::{
    parse_amount, CaseForm, FormField, IntakeFlow, IntakeStep, StakesRange, CASE_STATUSES,
    CASE_TYPES, JURISDICTIONS,
};
pub use models::{
    AgentMessage, AgentName, AgentOutput, AgentRun, AgentStatus, Argument, CaseCreated,
    CaseDetails, CaseRecord, Conflict, Counterargument, ExtractedFields, KeyDate, NewCase,
    Strategy,
};
pub use render::{
    inline_spans, render_output, render_rationale, render_text, render_value, Block,
    RationaleNode, RationaleSection, Span,
};
pub use results::{
    ArgumentCard, CounterargumentCard, ResultsHeader, ResultsView, StrategyPanel,
};
pub use session::{
    AnalysisPhase, AnalysisSession, AnalysisState, ReconciliationPoller, SessionHandoff,
    SessionOptions,
};
pub use stream::{EventStreamClient, StreamCallbacks, StreamEvent, Subscription};

