use crate::browser::{BrowserState, Notice, NoticeLevel};
use crate::errors::{AppError, AppResult};
use crate::maps::map_search_url;
use crate::models::Listing;
use crate::utils::format_eur;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::time::Duration;

/// Shows notifications to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to stderr so they do not mix with rendered listings on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info => eprintln!("✔ {}", notice.message),
            NoticeLevel::Error => eprintln!("✘ {}", notice.message),
        }
    }
}

/// Loading indicator. The spinner is cleared when the value is dropped.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Starts a spinner with the standard application styling.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use subastas_cli::ui;
    ///
    /// # fn main() -> Result<(), subastas_cli::errors::AppError> {
    /// let spinner = ui::Spinner::start("Searching auctions...")?;
    /// // ... await the request ...
    /// drop(spinner);
    /// # Ok(())
    /// # }
    /// ```
    pub fn start(message: &str) -> AppResult<Self> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .map_err(|e| AppError::Io(format!("Failed to create spinner template: {e}")))?,
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { pb })
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}

/// Header line above the results: count and selection.
pub fn render_summary(state: &BrowserState) -> String {
    let mut out = format!("{} auctions found", state.listings().len());
    if !state.selection().is_empty() {
        let _ = write!(out, ", {} selected", state.selection().len());
    }
    if !state.listings().is_empty() {
        let toggle = if state.all_selected() {
            "deselect all"
        } else {
            "select all"
        };
        let _ = write!(out, " ('all' to {toggle})");
    }
    out
}

/// Renders every visible listing, or a placeholder when there are none.
pub fn render_listings(state: &BrowserState) -> String {
    if state.listings().is_empty() {
        return "No auctions found".to_string();
    }
    state
        .listings()
        .iter()
        .map(|l| render_listing(l, state.is_selected(&l.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text card for one listing.
pub fn render_listing(listing: &Listing, selected: bool) -> String {
    let mut out = String::new();
    let mark = if selected { "[x]" } else { "[ ]" };

    let _ = writeln!(out, "{mark} {}  ({})", listing.title, listing.status);
    let _ = writeln!(out, "    ID: {}", listing.id);
    if !listing.description.is_empty() {
        let _ = writeln!(out, "    {}", listing.description);
    }
    let _ = writeln!(out, "    Location: {}", listing.address);
    let _ = writeln!(
        out,
        "    Map: {}",
        map_search_url(&listing.address, listing.map_coordinates())
    );
    let _ = writeln!(
        out,
        "    Type: {} | Appraisal: {} | Minimum bid: {} | {}, {}",
        listing.asset_type,
        format_eur(listing.appraisal_value),
        format_eur(listing.minimum_bid),
        listing.locality,
        listing.province
    );
    if let Some(authority) = &listing.authority {
        let _ = writeln!(out, "    Authority: {authority}");
    }
    if let Some(lot) = &listing.lot {
        let _ = writeln!(out, "    Lot: {lot}");
    }

    if !listing.images.is_empty() {
        let _ = writeln!(out, "    Images ({}):", listing.images.len());
        for image in &listing.images {
            let _ = writeln!(out, "      - {} <{}>", image.name, image.url);
        }
    }
    if !listing.documents.is_empty() {
        let _ = writeln!(out, "    Documents ({}):", listing.documents.len());
        for doc in &listing.documents {
            let _ = writeln!(out, "      - {} ({})", doc.name, doc.size);
        }
    }

    let _ = writeln!(
        out,
        "    Start: {} | End: {}",
        listing.start_date.as_deref().unwrap_or("-"),
        listing.end_date.as_deref().unwrap_or("-")
    );
    if let Some(url) = &listing.detail_url {
        let _ = writeln!(out, "    Details: {url}");
    }
    out
}
