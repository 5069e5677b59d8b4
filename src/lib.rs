//! pdfscope: client for the PDF analysis service.
//!
//! Submits documents for analysis, presents the structured result with a
//! keyword-to-location cross-reference, and browses prior analyses. The
//! analysis itself happens on the service; this crate owns the result model,
//! the view state machines and the API boundary.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod history;
pub mod models;
pub mod navigation;
pub mod render;
pub mod results;
pub mod upload;

pub use api::{ApiClient, ApiError, ApiResponse};
pub use app::{App, Screen};
pub use config::Settings;
pub use error::{ClientError, ValidationError};
pub use models::{AnalysisResult, DocumentType, HistoryEntry};
pub use navigation::{Navigator, Route, TransientState};
