use crate::errors::{AppError, AppResult};
use crate::maps::map_search_url;
use crate::models::{ExportRequest, Listing, ListingId, SearchFilters, SearchRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What to do with a search response that resolves after a newer one was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalePolicy {
    /// Whatever resolves last overwrites the visible listings.
    #[default]
    LastResolvedWins,
    /// Responses older than the last applied one are dropped.
    DiscardStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Result of feeding a search response back into the state.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The visible listings were replaced.
    Applied { listings: usize },
    /// The response was older than what is displayed and was ignored.
    Discarded,
    /// The search failed; the visible listings were kept.
    Failed(Notice),
}

/// State of the listing browser.
///
/// Every mutation goes through one of the methods below. None of them perform I/O:
/// the ones that need the outside world return a description of the request to make
/// ([`SearchRequest`], [`ExportRequest`], a map URL) and get the answer back through a
/// matching `complete_*`/`release_*` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserState {
    search_term: String,
    filters: SearchFilters,
    listings: Vec<Listing>,
    selection: BTreeSet<ListingId>,
    searches_in_flight: usize,
    last_issued_seq: u64,
    last_applied_seq: u64,
    exporting: bool,
}

impl BrowserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut SearchFilters {
        &mut self.filters
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn selection(&self) -> &BTreeSet<ListingId> {
        &self.selection
    }

    pub fn is_selected(&self, id: &ListingId) -> bool {
        self.selection.contains(id)
    }

    /// Loading indicator: on while at least one search is unresolved.
    pub fn is_loading(&self) -> bool {
        self.searches_in_flight > 0
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Whether the export trigger is enabled.
    pub fn can_export(&self) -> bool {
        !self.exporting && !self.listings.is_empty()
    }

    /// Whether the select-all control currently reads "deselect all".
    pub fn all_selected(&self) -> bool {
        self.selection.len() == self.listings.len()
    }

    /// Starts a search with the current term and filters.
    pub fn begin_search(&mut self) -> SearchRequest {
        self.last_issued_seq += 1;
        self.searches_in_flight += 1;
        SearchRequest {
            seq: self.last_issued_seq,
            term: self.search_term.clone(),
            filters: self.filters.clone(),
        }
    }

    /// Feeds the response of search `seq` back.
    ///
    /// Success replaces the visible listings wholesale (the selection is left alone, so
    /// identifiers from earlier searches stay selected). Failure keeps the current
    /// listings and yields an error notice.
    pub fn complete_search(
        &mut self,
        seq: u64,
        result: AppResult<Vec<Listing>>,
        policy: StalePolicy,
    ) -> SearchOutcome {
        self.searches_in_flight = self.searches_in_flight.saturating_sub(1);

        match result {
            Ok(listings) => {
                if policy == StalePolicy::DiscardStale && seq < self.last_applied_seq {
                    return SearchOutcome::Discarded;
                }
                self.last_applied_seq = seq;
                self.listings = listings;
                SearchOutcome::Applied {
                    listings: self.listings.len(),
                }
            }
            Err(e) => SearchOutcome::Failed(search_failure_notice(&e)),
        }
    }

    /// Forgets a search that will never complete (its future was dropped).
    pub fn abandon_search(&mut self) {
        self.searches_in_flight = self.searches_in_flight.saturating_sub(1);
    }

    /// Flips membership of `id` in the selection; returns whether it is now selected.
    pub fn toggle_selection(&mut self, id: &ListingId) -> bool {
        if self.selection.remove(id) {
            false
        } else {
            self.selection.insert(id.clone());
            true
        }
    }

    /// Select all / deselect all.
    ///
    /// Clears the selection when its size equals the number of visible listings,
    /// otherwise selects exactly the visible listings. Unlike a new search, this drops
    /// selected identifiers that are no longer visible.
    pub fn toggle_all(&mut self) {
        if self.all_selected() {
            self.selection.clear();
        } else {
            self.selection = self.listings.iter().map(|l| l.id.clone()).collect();
        }
    }

    /// Takes the export guard and describes the export to run.
    ///
    /// Returns `None` while the trigger is disabled: an export is already in flight or
    /// nothing is displayed. An empty `ids` list means "export everything".
    pub fn begin_export(&mut self) -> Option<ExportRequest> {
        if !self.can_export() {
            return None;
        }
        self.exporting = true;
        Some(ExportRequest {
            ids: self.selection.iter().cloned().collect(),
        })
    }

    /// Releases the export guard; returns whether it was held.
    pub fn release_export(&mut self) -> bool {
        std::mem::replace(&mut self.exporting, false)
    }

    /// Map link for a visible listing.
    pub fn map_link(&self, id: &ListingId) -> Option<String> {
        self.listings
            .iter()
            .find(|l| &l.id == id)
            .map(|l| map_search_url(&l.address, l.map_coordinates()))
    }
}

/// Notice shown after a failed search.
pub fn search_failure_notice(error: &AppError) -> Notice {
    match error {
        AppError::SearchApplication(reason) => {
            Notice::error(format!("Could not fetch auctions: {reason}"))
        }
        other => Notice::error(format!("Could not reach the server: {other}")),
    }
}

/// Notice shown once an export settles.
pub fn export_notice(result: &AppResult<PathBuf>) -> Notice {
    match result {
        Ok(path) => Notice::info(format!(
            "Spreadsheet downloaded to {}. It includes computed columns and Google Maps links.",
            path.display()
        )),
        Err(e) => Notice::error(format!(
            "Could not generate the spreadsheet, please try again. ({e})"
        )),
    }
}
