use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::CounselResult;
use crate::models::{CaseCreated, CaseDetails, ExtractedFields, NewCase};

use super::UploadDocument;

/// Raw body chunks of an open event stream.
pub type EventByteStream = Pin<Box<dyn Stream<Item = CounselResult<Vec<u8>>> + Send>>;

/// The backend contract. Everything the client knows about a case comes
/// through this seam.
#[async_trait]
pub trait CaseBackend: Send + Sync {
    fn base_url(&self) -> &str;

    async fn create_case(&self, case: &NewCase) -> CounselResult<CaseCreated>;

    async fn process_documents(&self, documents: &[UploadDocument])
        -> CounselResult<ExtractedFields>;

    async fn get_case(&self, case_id: &str) -> CounselResult<CaseDetails>;

    /// Opens the live event stream. A non-success status is an error.
    async fn open_event_stream(&self, case_id: &str) -> CounselResult<EventByteStream>;
}
