//! Remote listing API.
//!
//! The browser only talks to the server through the [`ListingApi`] trait. [`HttpListingApi`]
//! is the reqwest-backed implementation; tests provide their own.

mod http_client;
mod query;

use crate::errors::AppResult;
use crate::models::{ExportRequest, Listing, SearchRequest};
use async_trait::async_trait;

// Re-export public API
pub use http_client::{parse_search_envelope, HttpListingApi};
pub use query::{build_search_query, format_number};

/// The two outbound calls the browser makes.
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Fetches the listings matching `request`.
    ///
    /// Fails with `SearchTransport` on network errors or a malformed body, and with
    /// `SearchApplication` when the envelope reports `success = false`.
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<Listing>>;

    /// Requests the spreadsheet for `request.ids` and returns its raw bytes.
    ///
    /// Fails with `ExportTransport` on network errors or any non-2xx status.
    async fn export(&self, request: &ExportRequest) -> AppResult<Vec<u8>>;
}
