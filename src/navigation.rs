//! Routes, navigation transitions and the single-use result hand-off.
//!
//! A freshly produced result rides along with exactly one navigation as
//! `TransientState`; every other way of reaching the results view (deep
//! link, history selection, reload) arrives without it and fetches by id.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::models::AnalysisResult;

/// Application routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Upload,
    /// `/results/{id}`
    Results { id: String },
    /// `/history`
    History,
}

impl Route {
    pub fn results(id: impl Into<String>) -> Self {
        Route::Results { id: id.into() }
    }

    /// Parse a path such as `/results/42`. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Upload),
            "/history" => Some(Route::History),
            _ => {
                let id = trimmed.strip_prefix("/results/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                let id = urlencoding::decode(id).ok()?;
                Some(Route::results(id.into_owned()))
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Upload => f.write_str("/"),
            Route::History => f.write_str("/history"),
            Route::Results { id } => write!(f, "/results/{}", urlencoding::encode(id)),
        }
    }
}

/// Data attached to a single navigation. Never persisted.
#[derive(Debug, Clone)]
pub struct TransientState {
    result: Arc<AnalysisResult>,
}

impl TransientState {
    pub fn with_result(result: Arc<AnalysisResult>) -> Self {
        Self { result }
    }

    pub fn into_result(self) -> Arc<AnalysisResult> {
        self.result
    }
}

/// Mount lifetime of a view. Dropping or unmounting it invalidates every
/// `ScopeHandle` taken from it.
#[derive(Debug)]
pub struct ViewScope {
    mounted: Arc<AtomicBool>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            mounted: Arc::clone(&self.mounted),
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Cheap handle a view keeps to check whether it is still mounted.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    mounted: Arc<AtomicBool>,
}

impl ScopeHandle {
    /// A handle that is always mounted, for views driven outside a `Navigator`.
    pub fn detached() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Await `fut`, yielding its output only if the view is still mounted
    /// when it resolves.
    pub async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        let output = fut.await;
        if self.is_mounted() {
            Some(output)
        } else {
            debug!("Discarding response for unmounted view");
            None
        }
    }
}

/// Tracks the current route, its transient state and the mounted view.
#[derive(Debug)]
pub struct Navigator {
    current: Route,
    transient: Option<TransientState>,
    scope: ViewScope,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: initial,
            transient: None,
            scope: ViewScope::new(),
        }
    }

    /// Move to `route`. The previous view is unmounted and any transient
    /// state not yet consumed is dropped. Returns the new view's handle.
    pub fn navigate(&mut self, route: Route, state: Option<TransientState>) -> ScopeHandle {
        debug!(
            "Navigate {} -> {}{}",
            self.current,
            route,
            if state.is_some() { " (with result)" } else { "" }
        );
        self.scope.unmount();
        self.scope = ViewScope::new();
        self.current = route;
        self.transient = state;
        self.scope.handle()
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Consume the transient state of the current navigation, if any.
    pub fn take_transient(&mut self) -> Option<TransientState> {
        self.transient.take()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Upload)
    }
}
