//! Page-level data loading for the directory view.
//!
//! The controller owns the [`ViewState`]. Each identity-changing navigation
//! bumps a generation counter, cancels the previous generation's tasks, and
//! opens a fresh result channel, so only the most recently issued fetch for
//! a field can ever write to the state.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::async_task::{spawn_fetches, Fetchers, TaskResult};
use crate::model::{FetchState, ViewState};
use crate::navigation::NavigationParameters;
use crate::query::{full_query, query_scope_prefix, SearchScope};
use crate::search::SearchSubmitter;

/// What [`DirectoryViewController::on_search_submit`] handed to the
/// submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub scope: SearchScope,
}

pub struct DirectoryViewController {
    fetchers: Fetchers,
    submitter: Arc<dyn SearchSubmitter>,
    params: NavigationParameters,
    state: ViewState,
    generation: u64,
    cancellation_token: Option<CancellationToken>,
    results: Option<mpsc::UnboundedReceiver<TaskResult>>,
    snapshots: watch::Sender<ViewState>,
    mounted: bool,
}

impl DirectoryViewController {
    /// Create the controller and start loading `initial`. Must be called
    /// from within a tokio runtime.
    pub fn mount(
        fetchers: Fetchers,
        submitter: Arc<dyn SearchSubmitter>,
        initial: NavigationParameters,
    ) -> Self {
        let state = ViewState::default();
        let (snapshots, _) = watch::channel(state.clone());
        let mut controller = Self {
            fetchers,
            submitter,
            params: initial.clone(),
            state,
            generation: 0,
            cancellation_token: None,
            results: None,
            snapshots,
            mounted: true,
        };
        controller.start_fetches(initial);
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.snapshots.subscribe()
    }

    pub fn parameters(&self) -> &NavigationParameters {
        &self.params
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Navigate to `new`. Returns true if fetches were issued.
    pub fn on_parameters_changed(&mut self, new: NavigationParameters) -> bool {
        if !self.mounted {
            log::warn!("controller: navigation to {} after unmount ignored", new.fetch_key());
            return false;
        }
        if new.same_location(&self.params) {
            if new.rev != self.params.rev {
                log::debug!("controller: revision label changed to {:?}", new.rev);
                self.params = new;
            }
            return false;
        }
        self.start_fetches(new);
        true
    }

    fn start_fetches(&mut self, params: NavigationParameters) {
        self.cancel_in_flight();

        self.generation += 1;
        let key = params.fetch_key();
        log::info!("📤 controller: loading {} (generation {})", key, self.generation);

        self.params = params;
        self.state.listing = FetchState::Loading;
        self.state.commits = FetchState::Loading;
        self.publish();

        let token = CancellationToken::new();
        let (sender, receiver) = mpsc::unbounded_channel();
        spawn_fetches(&self.fetchers, key, self.generation, token.clone(), sender);
        self.cancellation_token = Some(token);
        self.results = Some(receiver);
    }

    fn cancel_in_flight(&mut self) {
        if let Some(token) = self.cancellation_token.take() {
            token.cancel();
        }
        self.results = None;
    }

    pub fn on_search_query_text_changed(&mut self, text: impl Into<String>) {
        self.state.search_query = text.into();
        self.publish();
    }

    pub fn query_scope_prefix(&self) -> String {
        query_scope_prefix(&self.params)
    }

    /// Hand the scoped query to the submitter. Does not touch the state.
    pub fn on_search_submit(&self) -> SearchRequest {
        let request = SearchRequest {
            query: full_query(&self.params, &self.state.search_query),
            scope: SearchScope::for_parameters(&self.params),
        };
        log::info!("controller: submitting search {:?} ({})", request.query, request.scope.as_str());
        self.submitter.submit(&self.params, &request.query, request.scope);
        request
    }

    /// Apply one fetch result. Results from a superseded generation, or any
    /// result after unmount, are discarded. Returns true if the state changed.
    pub fn apply(&mut self, result: TaskResult) -> bool {
        if !self.mounted {
            return false;
        }
        if result.generation() != self.generation {
            log::debug!(
                "controller: discarding stale {:?} result (generation {}, current {})",
                result.field(),
                result.generation(),
                self.generation
            );
            return false;
        }

        match result {
            TaskResult::TreeLoaded { result, .. } => {
                if let Err(e) = &result {
                    log::warn!("controller: listing failed: {}", e);
                }
                self.state.listing = result.into();
            }
            TaskResult::CommitsLoaded { result, .. } => {
                if let Err(e) = &result {
                    log::warn!("controller: commit history failed: {}", e);
                }
                self.state.commits = result.into();
            }
        }
        self.publish();
        true
    }

    /// Apply every result that has already arrived, without waiting.
    /// Returns how many changed the state.
    pub fn try_apply_ready(&mut self) -> usize {
        let mut ready = Vec::new();
        if let Some(receiver) = self.results.as_mut() {
            while let Ok(result) = receiver.try_recv() {
                ready.push(result);
            }
        }
        let mut changed = 0;
        for result in ready {
            if self.apply(result) {
                changed += 1;
            }
        }
        changed
    }

    /// Wait for the next result of the current generation and apply it.
    /// Returns false once no more results can arrive.
    pub async fn next_update(&mut self) -> bool {
        let Some(receiver) = self.results.as_mut() else {
            return false;
        };
        match receiver.recv().await {
            Some(result) => {
                self.apply(result);
                true
            }
            None => false,
        }
    }

    /// Wait until neither field is loading.
    pub async fn settle(&mut self) {
        while !self.state.is_settled() {
            if !self.next_update().await {
                break;
            }
        }
    }

    /// Tear down: cancel outstanding fetches and freeze the state.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        log::info!("controller: unmounting at generation {}", self.generation);
        self.cancel_in_flight();
        self.mounted = false;
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }
}

impl Drop for DirectoryViewController {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}
