//! Upload form: file validation, single in-flight submit, result hand-off.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, Upload};
use crate::error::{ClientError, ValidationError, MISSING_RESULT_MESSAGE};
use crate::models::{AnalysisResult, DocumentType};
use crate::navigation::{Route, TransientState};

const PDF_MIME: &str = "application/pdf";

/// Accept only PDFs: the name must map to `application/pdf`, and content
/// that can be sniffed must be a PDF too.
pub fn check_pdf(file_name: &str, bytes: &[u8]) -> Result<(), ValidationError> {
    let declared = mime_guess::from_path(file_name).first_raw();
    if declared != Some(PDF_MIME) {
        return Err(ValidationError::NotPdf);
    }
    match infer::get(bytes) {
        Some(kind) if kind.mime_type() != PDF_MIME => Err(ValidationError::NotPdf),
        _ => Ok(()),
    }
}

/// A file picked in the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Successful analysis, ready to navigate with.
#[derive(Debug, Clone)]
pub struct Submission {
    pub route: Route,
    pub state: TransientState,
}

/// Observable state of the submit control.
#[derive(Debug, Clone, Default)]
pub struct SubmitControl {
    in_flight: Arc<AtomicBool>,
}

impl SubmitControl {
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Option<InFlight> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                flag: Arc::clone(&self.in_flight),
            })
    }
}

/// Held while a request is pending; releases the control on drop.
struct InFlight {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// State behind `/`.
#[derive(Debug, Default)]
pub struct UploadForm {
    file: Option<SelectedFile>,
    document_type: DocumentType,
    error: Option<ClientError>,
    control: SubmitControl,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and select a file from disk. `~` is expanded.
    pub async fn select_path(&mut self, path: &Path) -> Result<(), ValidationError> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
        let file_name = expanded
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match tokio::fs::read(&expanded).await {
            Ok(bytes) => self.select_file(file_name, bytes),
            Err(e) => {
                let err = ValidationError::Unreadable(e.to_string());
                self.reject(err.clone());
                Err(err)
            }
        }
    }

    /// Select in-memory file content. Non-PDFs clear the selection.
    pub fn select_file(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<(), ValidationError> {
        let file_name = file_name.into();
        if let Err(err) = check_pdf(&file_name, &bytes) {
            warn!("Rejected {}: {}", file_name, err);
            self.reject(err.clone());
            return Err(err);
        }
        self.file = Some(SelectedFile { file_name, bytes });
        self.error = None;
        Ok(())
    }

    fn reject(&mut self, err: ValidationError) {
        self.file = None;
        self.error = Some(err.into());
    }

    pub fn set_document_type(&mut self, document_type: DocumentType) {
        self.document_type = document_type;
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Inline error currently shown under the form.
    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn control(&self) -> SubmitControl {
        self.control.clone()
    }

    /// Submit is enabled with a file selected and no request pending.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.control.is_pending()
    }

    /// Run the full analysis and return the navigation to the results view.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Submission, ClientError> {
        let (upload, _guard) = self.begin()?;
        let document_type = self.document_type;

        let outcome = api
            .analyze_document(upload, document_type)
            .await
            .map_err(ClientError::from)
            .and_then(|response| {
                let result = response.data;
                if !result.has_id() {
                    return Err(ClientError::Network {
                        status: Some(response.status),
                        message: MISSING_RESULT_MESSAGE.to_string(),
                    });
                }
                info!("Analysis {} complete", result.analysis_id);
                Ok(Submission {
                    route: Route::results(result.analysis_id.clone()),
                    state: TransientState::with_result(Arc::new(result)),
                })
            });

        self.error = outcome.as_ref().err().cloned();
        outcome
    }

    /// Run the quick analysis. The reduced result has no id, so it is rendered
    /// in place rather than navigated to.
    pub async fn submit_quick(
        &mut self,
        api: &ApiClient,
    ) -> Result<Arc<AnalysisResult>, ClientError> {
        let (upload, _guard) = self.begin()?;
        let outcome = api
            .quick_analyze(upload)
            .await
            .map(|response| Arc::new(response.data))
            .map_err(ClientError::from);
        self.error = outcome.as_ref().err().cloned();
        outcome
    }

    /// Validate the selection and take the in-flight slot.
    fn begin(&mut self) -> Result<(Upload, InFlight), ClientError> {
        let validated = match &self.file {
            None => Err(ValidationError::NoFile),
            Some(file) if file.bytes.is_empty() => Err(ValidationError::EmptyFile),
            Some(file) => Ok(Upload::new(file.file_name.clone(), file.bytes.clone())),
        };
        let upload = match validated {
            Ok(upload) => upload,
            Err(err) => {
                self.error = Some(err.clone().into());
                return Err(err.into());
            }
        };

        let guard = self
            .control
            .acquire()
            .ok_or(ClientError::Validation(ValidationError::Busy))?;
        self.error = None;
        Ok((upload, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n";
    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_check_pdf() {
        assert!(check_pdf("paper.pdf", PDF_BYTES).is_ok());
        assert!(check_pdf("PAPER.PDF", PDF_BYTES).is_ok());
        assert_eq!(check_pdf("notes.txt", b"hello"), Err(ValidationError::NotPdf));
        assert_eq!(check_pdf("image.pdf", PNG_BYTES), Err(ValidationError::NotPdf));
        assert_eq!(check_pdf("noext", PDF_BYTES), Err(ValidationError::NotPdf));
    }

    #[test]
    fn test_rejected_file_clears_selection() {
        let mut form = UploadForm::new();
        form.select_file("paper.pdf", PDF_BYTES.to_vec()).unwrap();
        assert!(form.can_submit());

        assert!(form.select_file("photo.png", PNG_BYTES.to_vec()).is_err());
        assert!(form.file().is_none());
        assert!(!form.can_submit());
        assert!(form.error().is_some_and(ClientError::is_validation));
    }

    #[test]
    fn test_in_flight_guard_releases() {
        let control = SubmitControl::default();
        let guard = control.acquire().unwrap();
        assert!(control.is_pending());
        assert!(control.acquire().is_none());
        drop(guard);
        assert!(!control.is_pending());
    }

    #[test]
    fn test_default_document_type() {
        assert_eq!(UploadForm::new().document_type(), DocumentType::General);
    }
}
