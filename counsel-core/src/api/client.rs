use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::CounselConfig;
use crate::error::{CounselError, CounselResult};
use crate::models::{CaseCreated, CaseDetails, ExtractedFields, NewCase};

use super::traits::{CaseBackend, EventByteStream};
use super::UploadDocument;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP implementation of [`CaseBackend`].
#[derive(Debug, Clone)]
pub struct CaseApiClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl CaseApiClient {
    pub fn new(base_url: impl Into<String>) -> CounselResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn from_config(config: &CounselConfig) -> CounselResult<Self> {
        Self::with_timeout(config.base_url(), config.request_timeout())
    }

    pub fn with_timeout(base_url: impl Into<String>, request_timeout: Duration) -> CounselResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| CounselError::InvalidConfigValue {
            key: "api.base_url".to_string(),
            message: e.to_string(),
        })?;

        // No overall timeout on the client: the event stream stays open for
        // the whole analysis. JSON requests set one per request.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("counsel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CounselError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            request_timeout,
        })
    }

    /// Builds `{base}/api/cases[/segments...]` with each segment path-escaped.
    pub fn cases_url(&self, segments: &[&str]) -> CounselResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| CounselError::InvalidConfigValue {
            key: "api.base_url".to_string(),
            message: e.to_string(),
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| CounselError::InvalidConfigValue {
                key: "api.base_url".to_string(),
                message: "URL cannot be a base".to_string(),
            })?;
            path.pop_if_empty().extend(["api", "cases"]).extend(segments);
        }
        Ok(url)
    }

    pub fn stream_url(&self, case_id: &str) -> CounselResult<Url> {
        self.cases_url(&[case_id, "stream"])
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> CounselResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CounselError::ApiParseError(e.to_string()))
    }
}

/// Pulls FastAPI's `detail` out of an error body, falling back to the raw text.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
    match detail {
        Some(detail) => format!("{}: {}", status, detail),
        None if body.trim().is_empty() => status.to_string(),
        None => format!("{}: {}", status, body.trim()),
    }
}

#[async_trait]
impl CaseBackend for CaseApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn create_case(&self, case: &NewCase) -> CounselResult<CaseCreated> {
        let url = self.cases_url(&[])?;
        debug!(title = %case.title, "Creating case");

        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .json(case)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CounselError::ApiRequestFailed(error_message(response).await));
        }

        let created: CaseCreated = Self::read_json(response).await?;
        info!(case_id = %created.case_id, "Case created");
        Ok(created)
    }

    async fn process_documents(
        &self,
        documents: &[UploadDocument],
    ) -> CounselResult<ExtractedFields> {
        let url = self.cases_url(&["process-documents"])?;

        let mut form = Form::new();
        for doc in documents {
            let part = Part::bytes(doc.bytes.clone())
                .file_name(doc.file_name.clone())
                .mime_str(doc.content_type())?;
            form = form.part("files", part);
        }

        debug!(count = documents.len(), "Uploading documents for extraction");

        // Extraction runs an LLM over the documents; allow extra time.
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout * 4)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CounselError::ApiRequestFailed(error_message(response).await));
        }

        Self::read_json(response).await
    }

    async fn get_case(&self, case_id: &str) -> CounselResult<CaseDetails> {
        let url = self.cases_url(&[case_id])?;

        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CounselError::CaseNotFound(case_id.to_string())),
            status if status.is_success() => Self::read_json(response).await,
            _ => Err(CounselError::ApiRequestFailed(error_message(response).await)),
        }
    }

    async fn open_event_stream(&self, case_id: &str) -> CounselResult<EventByteStream> {
        let url = self.stream_url(case_id)?;
        debug!(case_id = %case_id, %url, "Opening event stream");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| CounselError::StreamTransport {
                case_id: case_id.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CounselError::StreamTransport {
                case_id: case_id.to_string(),
                message: error_message(response).await,
            });
        }

        let owned_id = case_id.to_string();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| CounselError::StreamTransport {
                    case_id: owned_id.clone(),
                    message: e.to_string(),
                })
        });

        Ok(Box::pin(stream))
    }
}
