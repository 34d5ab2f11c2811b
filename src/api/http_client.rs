use super::{build_search_query, ListingApi};
use crate::constants::{EXPORT_PATH, SEARCH_PATH};
use crate::errors::{AppError, AppResult};
use crate::models::{ExportRequest, Listing, SearchEnvelope, SearchRequest};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

/// reqwest-backed [`ListingApi`] talking to `{base}/api/subastas` and `{base}/api/exportar`.
#[derive(Debug, Clone)]
pub struct HttpListingApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpListingApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `UrlError` if `base_url` is not an absolute URL.
    pub fn new(client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Full search URL for `request`, with only the non-empty query params.
    pub fn search_url(&self, request: &SearchRequest) -> AppResult<Url> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        let params = build_search_query(request);
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub fn export_url(&self) -> AppResult<Url> {
        Ok(self.base_url.join(EXPORT_PATH)?)
    }
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn search(&self, request: &SearchRequest) -> AppResult<Vec<Listing>> {
        let url = self.search_url(request)?;
        debug!(seq = request.seq, url = %url, "Sending search request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::SearchTransport(format!("Failed to reach server: {e}")))?;

        // The body decides the outcome: a non-2xx answer carrying an envelope is still
        // reported through its `success` flag.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::SearchTransport(format!("Failed to read response: {e}")))?;

        let listings = parse_search_envelope(status.as_u16(), &body)?;
        info!(
            seq = request.seq,
            listings = listings.len(),
            "Search completed"
        );
        Ok(listings)
    }

    async fn export(&self, request: &ExportRequest) -> AppResult<Vec<u8>> {
        let url = self.export_url()?;
        debug!(ids = request.ids.len(), url = %url, "Sending export request");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ExportTransport(format!("Failed to reach server: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            warn!(status = status_code, "Export request rejected");
            return Err(AppError::ExportTransport(format!(
                "HTTP {status_code}: server could not generate the spreadsheet"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ExportTransport(format!("Failed to read spreadsheet: {e}")))?;

        info!(
            ids = request.ids.len(),
            bytes = bytes.len(),
            "Export completed"
        );
        Ok(bytes.to_vec())
    }
}

/// Interprets a search response body.
///
/// A body that is not a valid envelope is a transport failure (reported with the HTTP
/// status); `success = false` is an application failure. `success = true` without `data`
/// is an empty result.
pub fn parse_search_envelope(status: u16, body: &str) -> AppResult<Vec<Listing>> {
    let envelope: SearchEnvelope = serde_json::from_str(body).map_err(|e| {
        AppError::SearchTransport(format!("HTTP {status}: malformed search response: {e}"))
    })?;

    if !envelope.success {
        let reason = envelope
            .error
            .unwrap_or_else(|| "server reported success = false".to_string());
        return Err(AppError::SearchApplication(reason));
    }

    let listings = envelope.data.unwrap_or_default();
    if let Some(total) = envelope.total {
        if total != listings.len() {
            debug!(
                total = total,
                received = listings.len(),
                "Envelope total differs from received listings"
            );
        }
    }
    Ok(listings)
}
