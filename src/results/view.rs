//! Results view state: hand-off or fetch, then keyword browsing.

use std::cell::OnceCell;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::keywords::{keyword_tags, KeywordIndex, KeywordLookup, KeywordModal, KeywordTag};
use super::metrics::MetricSummary;
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::AnalysisResult;
use crate::navigation::{ScopeHandle, TransientState};

/// Where the view gets its result from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    /// Rendered straight from the navigation hand-off.
    HandOff,
    /// Fetched by id from the storage service.
    Fetch,
}

/// Load state of the results view. `Unavailable` and `Loading` render differently.
#[derive(Debug, Clone)]
pub enum ResultsState {
    Loading,
    Ready(Arc<AnalysisResult>),
    Unavailable(ClientError),
}

/// Keyword modal contents, resolved against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView<'a> {
    pub keyword: &'a str,
    pub lookup: KeywordLookup<'a>,
}

/// State behind `/results/{id}`.
#[derive(Debug)]
pub struct ResultsView {
    id: String,
    source: ResultSource,
    state: ResultsState,
    fetch_attempted: bool,
    modal: KeywordModal,
    index: OnceCell<KeywordIndex>,
    scope: ScopeHandle,
}

impl ResultsView {
    /// Enter the view for `id`.
    ///
    /// A transient result is used only if its id matches the route; otherwise
    /// the view starts in `Loading` and must fetch.
    pub fn enter(id: &str, transient: Option<TransientState>, scope: ScopeHandle) -> Self {
        let handed_off = transient
            .map(TransientState::into_result)
            .filter(|result| {
                let matches = result.analysis_id == id;
                if !matches {
                    warn!(
                        "Ignoring hand-off for {} on route {}",
                        result.analysis_id, id
                    );
                }
                matches
            });

        let (source, state) = match handed_off {
            Some(result) => {
                debug!("Rendering result {} from hand-off", id);
                (ResultSource::HandOff, ResultsState::Ready(result))
            }
            None => (ResultSource::Fetch, ResultsState::Loading),
        };

        Self {
            id: id.to_string(),
            source,
            state,
            fetch_attempted: false,
            modal: KeywordModal::Closed,
            index: OnceCell::new(),
            scope,
        }
    }

    /// Enter and, when needed, fetch.
    pub async fn open(
        id: &str,
        transient: Option<TransientState>,
        scope: ScopeHandle,
        api: &ApiClient,
    ) -> Self {
        let mut view = Self::enter(id, transient, scope);
        view.load(api).await;
        view
    }

    /// Issue the fetch-by-id if the view is waiting for one. Runs at most once
    /// per entry; use [`ResultsView::retry`] for a user-initiated reload.
    pub async fn load(&mut self, api: &ApiClient) {
        if !self.needs_fetch() {
            return;
        }
        self.fetch_attempted = true;
        self.fetch(api).await;
    }

    /// User-initiated reload after a failure.
    pub async fn retry(&mut self, api: &ApiClient) {
        if matches!(self.state, ResultsState::Ready(_)) {
            return;
        }
        self.state = ResultsState::Loading;
        self.fetch(api).await;
    }

    async fn fetch(&mut self, api: &ApiClient) {
        info!("Fetching result {}", self.id);
        let outcome = self.scope.guard(api.get_analysis_result(&self.id)).await;
        let Some(outcome) = outcome else {
            return;
        };

        self.state = match outcome {
            Ok(response) => ResultsState::Ready(Arc::new(response.data)),
            Err(err) => {
                let cause: ClientError = err.into();
                ResultsState::Unavailable(ClientError::unavailable(&self.id, &cause))
            }
        };
        self.index = OnceCell::new();
        self.modal.close();
    }

    pub fn needs_fetch(&self) -> bool {
        matches!(self.state, ResultsState::Loading) && !self.fetch_attempted
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &ResultSource {
        &self.source
    }

    pub fn state(&self) -> &ResultsState {
        &self.state
    }

    pub fn result(&self) -> Option<&Arc<AnalysisResult>> {
        match &self.state {
            ResultsState::Ready(result) => Some(result),
            _ => None,
        }
    }

    pub fn metrics(&self) -> Option<MetricSummary> {
        self.result().map(|r| MetricSummary::of(r))
    }

    pub fn tags(&self) -> Vec<KeywordTag> {
        self.result().map(|r| keyword_tags(r)).unwrap_or_default()
    }

    /// Select a keyword by text. Ignored until a result is ready.
    pub fn select_keyword(&mut self, keyword: &str) {
        if self.result().is_some() {
            self.modal.select(keyword);
        }
    }

    /// Select the keyword tag at `position`. Returns false when there is none.
    pub fn select_tag(&mut self, position: usize) -> bool {
        let keyword = self
            .result()
            .and_then(|r| r.keywords.get(position))
            .cloned();
        match keyword {
            Some(keyword) => {
                self.modal.select(&keyword);
                true
            }
            None => false,
        }
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn modal(&self) -> &KeywordModal {
        &self.modal
    }

    /// Contents of the open modal; builds the keyword index on first use.
    pub fn modal_view(&self) -> Option<ModalView<'_>> {
        let keyword = self.modal.keyword()?;
        let result = self.result()?;
        let index = self.index.get_or_init(|| KeywordIndex::build(result));
        Some(ModalView {
            keyword,
            lookup: index.resolve(keyword),
        })
    }

    /// Whether the keyword index has been built yet.
    pub fn index_built(&self) -> bool {
        self.index.get().is_some()
    }
}
