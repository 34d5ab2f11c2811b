use crate::constants::MAPS_SEARCH_URL;
use crate::errors::{AppError, AppResult};
use crate::models::Coordinates;
use std::process::Command;
use tracing::info;

/// Builds a Google Maps search link for a location.
///
/// Coordinates win when present (`query=<lat>,<lng>`); otherwise the free-text address
/// is percent-encoded into the query.
///
/// ```
/// use subastas_cli::maps::map_search_url;
/// use subastas_cli::models::Coordinates;
///
/// let coords = Coordinates { lat: 40.42, lng: -3.7025 };
/// assert_eq!(
///     map_search_url("ignored", Some(coords)),
///     "https://www.google.com/maps/search/?api=1&query=40.42,-3.7025"
/// );
/// assert_eq!(
///     map_search_url("Calle Gran Vía 45", None),
///     "https://www.google.com/maps/search/?api=1&query=Calle%20Gran%20V%C3%ADa%2045"
/// );
/// ```
pub fn map_search_url(address: &str, coordinates: Option<Coordinates>) -> String {
    match coordinates {
        Some(Coordinates { lat, lng }) => format!("{MAPS_SEARCH_URL}{lat},{lng}"),
        None => format!("{MAPS_SEARCH_URL}{}", urlencoding::encode(address)),
    }
}

/// Opens a link in a new browsing context.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> AppResult<()>;
}

/// Hands links to the system's default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> AppResult<()> {
        info!(url = url, "Opening map link");
        let mut command = browser_command(url);
        // The child is not waited on
        command
            .spawn()
            .map(|_| ())
            .map_err(|e| AppError::Io(format!("Failed to open browser for {url}: {e}")))
    }
}

fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        command
    }
    #[cfg(target_os = "windows")]
    {
        // `cmd /C start` splits the query string on `&`
        let mut command = Command::new("rundll32");
        command.args(["url.dll,FileProtocolHandler", url]);
        command
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

/// Prints links instead of launching a browser (headless sessions, `--print`).
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintLinkOpener;

impl LinkOpener for PrintLinkOpener {
    fn open(&self, url: &str) -> AppResult<()> {
        println!("{url}");
        Ok(())
    }
}
