//! One method per analysis-service operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::transport::{ApiRequest, HttpTransport, RawResponse, Transport, Upload};
use super::ApiError;
use crate::config::Settings;
use crate::models::{AnalysisResult, DocumentType, HistoryEntry, RawAnalysis};

/// Decoded success response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            status: self.status,
        }
    }
}

/// Liveness payload from the analysis service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}

/// Document types the service accepts, with its own descriptions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentTypeCatalog {
    #[serde(default)]
    pub types: Vec<DocumentType>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
}

/// Client for the analysis and storage endpoints.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client over any transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a client that talks HTTP using the given settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(settings)?;
        info!("Using analysis service at {}", transport.base_url());
        Ok(Self::new(Arc::new(transport)))
    }

    /// Full analysis (including summary and keyword extraction).
    pub async fn analyze_document(
        &self,
        upload: Upload,
        document_type: DocumentType,
    ) -> Result<ApiResponse<AnalysisResult>, ApiError> {
        info!(
            "Analyzing {} ({} bytes) as {}",
            upload.file_name,
            upload.bytes.len(),
            document_type
        );
        let request = ApiRequest::post_file("/api/v1/analyze", upload)
            .with_query("documentType", document_type.as_str());
        let response = self.execute::<RawAnalysis>(request).await?;
        Ok(response.map(|raw| AnalysisResult::from_raw(raw, Some(document_type))))
    }

    /// Quick analysis without the language-model stage. The response is reduced
    /// (no id, keywords or statistics).
    pub async fn quick_analyze(
        &self,
        upload: Upload,
    ) -> Result<ApiResponse<AnalysisResult>, ApiError> {
        info!("Quick analysis of {}", upload.file_name);
        let file_name = upload.file_name.clone();
        let request = ApiRequest::post_file("/api/v1/analyze/quick", upload);
        let response = self.execute::<RawAnalysis>(request).await?;
        Ok(response.map(|mut raw| {
            raw.file_name.get_or_insert(file_name);
            AnalysisResult::from_raw(raw, None)
        }))
    }

    /// Fetch one stored result.
    pub async fn get_analysis_result(
        &self,
        id: &str,
    ) -> Result<ApiResponse<AnalysisResult>, ApiError> {
        let path = format!("/api/v1/storage/results/{}", urlencoding::encode(id));
        let response = self.execute::<RawAnalysis>(ApiRequest::get(path)).await?;
        Ok(response.map(|raw| AnalysisResult::from_raw(raw, None)))
    }

    pub async fn get_all_results(&self) -> Result<ApiResponse<Vec<HistoryEntry>>, ApiError> {
        self.execute(ApiRequest::get("/api/v1/storage/results")).await
    }

    pub async fn get_recent_results(&self) -> Result<ApiResponse<Vec<HistoryEntry>>, ApiError> {
        self.execute(ApiRequest::get("/api/v1/storage/results/recent"))
            .await
    }

    /// Server-side file name search. The query is sent as given.
    pub async fn search_results(
        &self,
        file_name: &str,
    ) -> Result<ApiResponse<Vec<HistoryEntry>>, ApiError> {
        let request =
            ApiRequest::get("/api/v1/storage/results/search").with_query("fileName", file_name);
        self.execute(request).await
    }

    pub async fn get_results_by_type(
        &self,
        document_type: DocumentType,
    ) -> Result<ApiResponse<Vec<HistoryEntry>>, ApiError> {
        let path = format!("/api/v1/storage/results/type/{}", document_type.as_str());
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn health_check(&self) -> Result<ApiResponse<HealthStatus>, ApiError> {
        self.execute(ApiRequest::get("/api/v1/analyze/health")).await
    }

    pub async fn document_types(&self) -> Result<ApiResponse<DocumentTypeCatalog>, ApiError> {
        self.execute(ApiRequest::get("/api/v1/analyze/document-types"))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse<T>, ApiError> {
        let path = request.path.clone();
        let raw = self.transport.send(request).await?;
        decode(&path, raw)
    }
}

fn decode<T: DeserializeOwned>(path: &str, raw: RawResponse) -> Result<ApiResponse<T>, ApiError> {
    if !raw.is_success() {
        debug!("{} failed with HTTP {}", path, raw.status);
        return Err(ApiError::from_error_body(raw.status, &raw.body));
    }

    let data = serde_json::from_str(&raw.body).map_err(|e| ApiError::Decode {
        status: raw.status,
        detail: e.to_string(),
    })?;

    Ok(ApiResponse {
        data,
        status: raw.status,
    })
}
