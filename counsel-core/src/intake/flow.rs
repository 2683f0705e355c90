use tracing::{info, warn};

use crate::api::{CaseBackend, UploadDocument};
use crate::error::{CounselError, CounselResult};
use crate::session::SessionHandoff;

use super::form::CaseForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeStep {
    Upload,
    Extracting,
    Summary,
    Analysis { case_id: String },
}

impl std::fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeStep::Upload => write!(f, "upload"),
            IntakeStep::Extracting => write!(f, "extracting"),
            IntakeStep::Summary => write!(f, "summary"),
            IntakeStep::Analysis { .. } => write!(f, "analysis"),
        }
    }
}

/// The case input state machine: `Upload -> Extracting -> Summary -> Analysis`.
#[derive(Debug, Clone)]
pub struct IntakeFlow {
    step: IntakeStep,
    form: CaseForm,
    extraction_error: Option<String>,
    submit_error: Option<String>,
}

impl Default for IntakeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeFlow {
    pub fn new() -> Self {
        Self::with_form(CaseForm::default())
    }

    /// Starts from a pre-filled form, still at the upload step.
    pub fn with_form(form: CaseForm) -> Self {
        Self {
            step: IntakeStep::Upload,
            form,
            extraction_error: None,
            submit_error: None,
        }
    }

    pub fn step(&self) -> &IntakeStep {
        &self.step
    }

    pub fn form(&self) -> &CaseForm {
        &self.form
    }

    /// Edits are only meaningful while reviewing the summary.
    pub fn form_mut(&mut self) -> &mut CaseForm {
        &mut self.form
    }

    /// User-visible note when extraction failed and the form was kept as-is.
    pub fn extraction_error(&self) -> Option<&str> {
        self.extraction_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    fn require(&self, expected: IntakeStep, to: &str) -> CounselResult<()> {
        if std::mem::discriminant(&self.step) != std::mem::discriminant(&expected) {
            return Err(CounselError::InvalidIntakeTransition {
                from: self.step.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Sends documents for extraction and moves to the summary. Extraction
    /// failure is advisory: the flow still reaches the summary with the
    /// form unchanged and the error recorded.
    pub async fn upload(
        &mut self,
        backend: &dyn CaseBackend,
        documents: Vec<UploadDocument>,
    ) -> CounselResult<()> {
        self.require(IntakeStep::Upload, "extracting")?;
        if documents.is_empty() {
            return Err(CounselError::ValidationError(
                "Please upload at least one document".to_string(),
            ));
        }

        self.step = IntakeStep::Extracting;
        self.extraction_error = None;
        self.form.uploaded_files = documents.iter().map(|d| d.file_name.clone()).collect();

        match backend.process_documents(&documents).await {
            Ok(fields) => {
                info!(found = fields.found_count(), "Extracted case fields from documents");
                self.form.apply_extraction(&fields);
            }
            Err(e) => {
                let err = CounselError::ExtractionFailed(e.to_string());
                warn!(error = %err, "Document extraction failed, continuing with manual entry");
                self.extraction_error = Some(err.to_string());
            }
        }

        self.step = IntakeStep::Summary;
        Ok(())
    }

    /// Manual entry without documents.
    pub fn skip_upload(&mut self) -> CounselResult<()> {
        self.require(IntakeStep::Upload, "summary")?;
        self.step = IntakeStep::Summary;
        Ok(())
    }

    /// Back to upload; the form is kept.
    pub fn back(&mut self) -> CounselResult<()> {
        self.require(IntakeStep::Summary, "upload")?;
        self.step = IntakeStep::Upload;
        Ok(())
    }

    /// Creates the case. On failure the flow stays at the summary so the
    /// user can retry.
    pub async fn submit(&mut self, backend: &dyn CaseBackend) -> CounselResult<SessionHandoff> {
        self.require(IntakeStep::Summary, "analysis")?;
        self.form.validate()?;

        let payload = self.form.to_new_case();
        match backend.create_case(&payload).await {
            Ok(created) => {
                self.submit_error = None;
                self.step = IntakeStep::Analysis {
                    case_id: created.case_id.clone(),
                };
                Ok(SessionHandoff::new(created.case_id, self.form.clone()))
            }
            Err(e) => {
                let err = CounselError::CaseCreationFailed(e.to_string());
                warn!(error = %err, "Case creation failed");
                self.submit_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
