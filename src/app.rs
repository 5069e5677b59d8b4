//! Application shell: owns the API client, the navigator and the mounted view.

use tracing::debug;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::history::HistoryBrowser;
use crate::navigation::{Navigator, Route, TransientState};
use crate::render;
use crate::results::ResultsView;
use crate::upload::UploadForm;

/// The currently mounted view.
#[derive(Debug)]
pub enum Screen {
    Upload(UploadForm),
    Results(ResultsView),
    History(HistoryBrowser),
}

pub struct App {
    api: ApiClient,
    navigator: Navigator,
    screen: Screen,
}

impl App {
    /// Start on the upload page.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            navigator: Navigator::new(Route::Upload),
            screen: Screen::Upload(UploadForm::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn route(&self) -> &Route {
        self.navigator.current()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Navigate and mount the target view, loading it as needed.
    pub async fn navigate(&mut self, route: Route, state: Option<TransientState>) {
        let handle = self.navigator.navigate(route.clone(), state);
        self.screen = match route {
            Route::Upload => Screen::Upload(UploadForm::new()),
            Route::Results { id } => {
                let transient = self.navigator.take_transient();
                Screen::Results(ResultsView::open(&id, transient, handle, &self.api).await)
            }
            Route::History => Screen::History(HistoryBrowser::open(handle, &self.api).await),
        };
        debug!("Mounted {}", self.navigator.current());
    }

    /// Submit the upload form; on success moves to the results view with the
    /// fresh result attached.
    pub async fn submit_upload(&mut self) -> Result<(), ClientError> {
        let Screen::Upload(form) = &mut self.screen else {
            return Ok(());
        };
        let submission = form.submit(&self.api).await?;
        self.navigate(submission.route, Some(submission.state)).await;
        Ok(())
    }

    /// Open the visible history entry at `position`. Returns false if there is none.
    pub async fn open_history_entry(&mut self, position: usize) -> bool {
        let route = match &self.screen {
            Screen::History(browser) => browser.select(position),
            _ => None,
        };
        match route {
            Some(route) => {
                self.navigate(route, None).await;
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        match &self.screen {
            Screen::Upload(form) => render::render_upload(form),
            Screen::Results(view) => render::render_results(view),
            Screen::History(browser) => render::render_history(browser),
        }
    }
}
