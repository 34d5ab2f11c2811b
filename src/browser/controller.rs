use super::state::{export_notice, BrowserState, Notice, SearchOutcome, StalePolicy};
use crate::api::ListingApi;
use crate::download::{export_filename, FileDownloader};
use crate::errors::{AppError, AppResult};
use crate::maps::LinkOpener;
use crate::models::ListingId;
use crate::ui::Notifier;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// How an export request ended.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The spreadsheet was saved at this path.
    Saved(PathBuf),
    /// The trigger was disabled (export already running, or nothing displayed).
    Disabled,
    Failed(AppError),
}

/// Drives a [`BrowserState`] against the outside world.
///
/// The state sits behind a mutex that is never held across an `.await`, so a search and
/// an export can run at the same time on one browser (`tokio::join!`).
pub struct ListingBrowser {
    state: Mutex<BrowserState>,
    api: Arc<dyn ListingApi>,
    downloader: Arc<dyn FileDownloader>,
    notifier: Arc<dyn Notifier>,
    links: Arc<dyn LinkOpener>,
    policy: StalePolicy,
    today: Clock,
}

impl ListingBrowser {
    pub fn new(
        api: Arc<dyn ListingApi>,
        downloader: Arc<dyn FileDownloader>,
        notifier: Arc<dyn Notifier>,
        links: Arc<dyn LinkOpener>,
    ) -> Self {
        Self {
            state: Mutex::new(BrowserState::new()),
            api,
            downloader,
            notifier,
            links,
            policy: StalePolicy::default(),
            today: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    pub fn with_policy(mut self, policy: StalePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the clock used to date export filenames. It is read when the export is
    /// triggered, not when the response arrives.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    /// Runs `f` on the state under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut BrowserState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Shows `notice` through the browser's notifier.
    pub fn notify(&self, notice: &Notice) {
        self.notifier.notify(notice);
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> BrowserState {
        self.lock().clone()
    }

    /// Searches with the current term and filters.
    ///
    /// Failures are reported through the notifier and leave the displayed listings as
    /// they were.
    pub async fn search(&self) -> SearchOutcome {
        let request = self.update(BrowserState::begin_search);
        let mut in_flight = InFlightSearch {
            state: &self.state,
            settled: false,
        };
        debug!(seq = request.seq, term = %request.term, "Search started");

        let result = self.api.search(&request).await;
        let outcome = self.update(|s| s.complete_search(request.seq, result, self.policy));
        in_flight.settled = true;

        match &outcome {
            SearchOutcome::Applied { listings } => {
                info!(seq = request.seq, listings = listings, "Listings updated");
            }
            SearchOutcome::Discarded => {
                debug!(seq = request.seq, "Stale search response discarded");
            }
            SearchOutcome::Failed(notice) => {
                warn!(seq = request.seq, message = %notice.message, "Search failed");
                self.notifier.notify(notice);
            }
        }
        outcome
    }

    pub fn toggle_selection(&self, id: &ListingId) -> bool {
        self.update(|s| s.toggle_selection(id))
    }

    pub fn toggle_all(&self) {
        self.update(BrowserState::toggle_all)
    }

    /// Exports the selected listings (all of them when nothing is selected).
    ///
    /// While an export is running further calls return [`ExportOutcome::Disabled`]. The
    /// guard is released once the request settles, whatever the outcome.
    pub async fn export(&self) -> ExportOutcome {
        let Some(request) = self.update(BrowserState::begin_export) else {
            debug!("Export trigger is disabled");
            return ExportOutcome::Disabled;
        };
        let guard = ExportGuard { state: &self.state };
        let filename = export_filename((self.today)());
        info!(ids = request.ids.len(), file = %filename, "Export started");

        let result = match self.api.export(&request).await {
            Ok(bytes) => self.save(bytes, filename).await,
            Err(e) => Err(e),
        };
        drop(guard);

        let notice = export_notice(&result);
        self.notifier.notify(&notice);
        match result {
            Ok(path) => ExportOutcome::Saved(path),
            Err(e) => {
                warn!(error = %e, "Export failed");
                ExportOutcome::Failed(e)
            }
        }
    }

    /// Opens the map link of a visible listing and returns it.
    pub fn open_map(&self, id: &ListingId) -> AppResult<String> {
        let url = self
            .update(|s| s.map_link(id))
            .ok_or_else(|| AppError::InvalidInput(format!("No visible listing with id '{id}'")))?;
        self.links.open(&url)?;
        Ok(url)
    }

    async fn save(&self, bytes: Vec<u8>, filename: String) -> AppResult<PathBuf> {
        let downloader = Arc::clone(&self.downloader);
        tokio::task::spawn_blocking(move || downloader.save(&bytes, &filename))
            .await
            .map_err(|e| AppError::Io(format!("Save task failed: {e}")))?
    }

    fn lock(&self) -> MutexGuard<'_, BrowserState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<BrowserState>) -> MutexGuard<'_, BrowserState> {
    // A panic while holding the lock cannot leave the state half-written
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases the export guard when dropped.
struct ExportGuard<'a> {
    state: &'a Mutex<BrowserState>,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        lock_state(self.state).release_export();
        debug!("Export guard released");
    }
}

/// Keeps the loading counter honest if a search future is dropped before it settles.
struct InFlightSearch<'a> {
    state: &'a Mutex<BrowserState>,
    settled: bool,
}

impl Drop for InFlightSearch<'_> {
    fn drop(&mut self) {
        if !self.settled {
            lock_state(self.state).abandon_search();
        }
    }
}
