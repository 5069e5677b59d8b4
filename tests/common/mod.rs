//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use pdfscope::api::{ApiRequest, RawResponse, Transport};
use pdfscope::{ApiClient, ApiError};

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n";

type Reply = Result<RawResponse, ApiError>;

/// Answers requests by path from a script and records everything it was sent.
///
/// The last scripted reply for a path repeats; unscripted paths get a 404.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.push(path, Ok(RawResponse::new(status, body)))
    }

    pub fn fail(self, path: &str, err: ApiError) -> Self {
        self.push(path, Err(err))
    }

    /// Hold every response until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn push(self, path: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`.
    pub fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn into_client(self) -> (ApiClient, Arc<MockTransport>) {
        let mock = Arc::new(self);
        let client = ApiClient::new(mock.clone());
        (client, mock)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(RawResponse::new(404, "")),
        }
    }
}

/// Full analysis payload for scenario 1.
pub fn analysis_json(id: &str) -> String {
    serde_json::json!({
        "analysisId": id,
        "fileName": "annual-report.pdf",
        "documentType": "REPORT",
        "totalPages": 12,
        "totalCells": 340,
        "summary": "Revenue grew on AI adoption.",
        "keywords": ["AI ", "Data"],
        "keywordLocations": {
            "AI": [{"pageNumber": 1, "relevanceScore": 0.8, "content": "AI drives growth"}]
        },
        "statistics": {
            "avgStructuralScore": 0.42,
            "maxStructuralScore": 0.91,
            "typeDistribution": {"HEADER": 10, "BODY": 300}
        },
        "validation": {"isValid": true, "warnings": []},
        "keySections": []
    })
    .to_string()
}

pub fn history_json(entries: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, file_name)| {
            serde_json::json!({
                "id": id,
                "fileName": file_name,
                "documentType": "GENERAL",
                "totalPages": 3,
                "totalCells": 40,
                "avgStructuralScore": 0.5,
                "createdAt": "2024-03-01T09:30:00"
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
