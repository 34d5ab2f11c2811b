//! The listing browser: search, selection and export.
//!
//! [`BrowserState`] holds the session and only changes through pure transitions.
//! [`ListingBrowser`] runs those transitions against the remote API, the file downloader,
//! the notifier and the link opener. [`run_session`] puts a line-based command loop on
//! top of it.

mod command;
mod controller;
mod session;
mod state;

// Re-export public API
pub use command::{optional_number, SessionCommand, SESSION_HELP};
pub use controller::{ExportOutcome, ListingBrowser};
pub use session::run_session;
pub use state::{
    export_notice, search_failure_notice, BrowserState, Notice, NoticeLevel, SearchOutcome,
    StalePolicy,
};
