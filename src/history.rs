//! History browser: recent analyses with live filtering and server search.

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ApiResponse};
use crate::error::ClientError;
use crate::models::{DocumentType, HistoryEntry};
use crate::navigation::{Route, ScopeHandle};

/// Case-insensitive substring filter on file names. Pure; order preserved.
pub fn filter_entries<'a>(entries: &'a [HistoryEntry], query: &str) -> Vec<&'a HistoryEntry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|e| e.file_name.to_lowercase().contains(&needle))
        .collect()
}

/// Which listing the loaded entries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Recent,
    All,
    Search(String),
    ByType(DocumentType),
}

/// State behind `/history`.
#[derive(Debug)]
pub struct HistoryBrowser {
    entries: Vec<HistoryEntry>,
    listing: Option<Listing>,
    query: String,
    loading: bool,
    error: Option<ClientError>,
    scope: ScopeHandle,
}

impl HistoryBrowser {
    /// New browser in its initial loading state. Call [`HistoryBrowser::refresh`].
    pub fn new(scope: ScopeHandle) -> Self {
        Self {
            entries: Vec::new(),
            listing: None,
            query: String::new(),
            loading: true,
            error: None,
            scope,
        }
    }

    /// Enter the view and load the recent listing.
    pub async fn open(scope: ScopeHandle, api: &ApiClient) -> Self {
        let mut browser = Self::new(scope);
        browser.refresh(api).await;
        browser
    }

    /// Reload the recent listing.
    pub async fn refresh(&mut self, api: &ApiClient) {
        self.run(Listing::Recent, api.get_recent_results()).await;
    }

    /// Reload the full listing.
    pub async fn load_all(&mut self, api: &ApiClient) {
        self.run(Listing::All, api.get_all_results()).await;
    }

    /// Load entries of one document type.
    pub async fn load_by_type(&mut self, api: &ApiClient, document_type: DocumentType) {
        self.run(
            Listing::ByType(document_type),
            api.get_results_by_type(document_type),
        )
        .await;
    }

    /// Explicit search. A blank query falls back to the recent listing.
    pub async fn submit_search(&mut self, api: &ApiClient) {
        if self.query.trim().is_empty() {
            debug!("Empty search query, reloading recent results");
            self.refresh(api).await;
            return;
        }
        let query = self.query.clone();
        info!("Searching history for {:?}", query);
        self.run(Listing::Search(query.clone()), api.search_results(&query))
            .await;
    }

    async fn run<F>(&mut self, listing: Listing, request: F)
    where
        F: std::future::Future<Output = Result<ApiResponse<Vec<HistoryEntry>>, ApiError>>,
    {
        let Some(outcome) = self.scope.guard(request).await else {
            return;
        };
        self.loading = false;
        match outcome {
            Ok(response) => {
                debug!("Loaded {} history entries", response.data.len());
                self.entries = response.data;
                self.listing = Some(listing);
                self.error = None;
            }
            Err(err) => {
                // Keep whatever was shown before.
                warn!("History request failed: {}", err);
                self.error = Some(err.into());
            }
        }
    }

    /// Update the live filter text. No network.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Entries matching the current query.
    pub fn visible(&self) -> Vec<&HistoryEntry> {
        filter_entries(&self.entries, &self.query)
    }

    /// Everything loaded, unfiltered.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// Route for the visible entry at `position` (fetch-by-id path).
    pub fn select(&self, position: usize) -> Option<Route> {
        self.visible()
            .get(position)
            .map(|entry| Route::results(entry.id.clone()))
    }
}
