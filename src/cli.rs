use crate::api::{HttpListingApi, ListingApi};
use crate::browser::{optional_number, run_session, BrowserState, ListingBrowser};
use crate::config::ResolvedConfig;
use crate::download::{export_filename, DirectoryDownloader, FileDownloader};
use crate::errors::{AppError, AppResult};
use crate::maps::{map_search_url, LinkOpener, PrintLinkOpener, SystemLinkOpener};
use crate::models::{Coordinates, ExportRequest, ListingId, SearchFilters, SearchRequest};
use crate::ui::{self, Spinner, TerminalNotifier};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Builds the command-line definition.
///
/// - `search`: one search, rendered as text or JSON
/// - `export`: download the spreadsheet for some or all listings
/// - `map`: open (or print) the map link for an address or coordinates
/// - `browse`: interactive session with selection and export
pub fn build_command() -> Command<'static> {
    Command::new("subastas")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Path to a TOML config file")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("api_base_url")
                .long("api-base-url")
                .global(true)
                .help("Origin of the auction API (overrides API_BASE_URL)")
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("search")
                .about("Search auctions and print them")
                .after_help("Example:\n  subastas search -q piso -t Inmueble -p Madrid --min 100000")
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .help("Free-text search term")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("tipo")
                        .short('t')
                        .long("tipo")
                        .help("Asset category, e.g. 'Inmueble' or 'Vehículo'")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("provincia")
                        .short('p')
                        .long("provincia")
                        .help("Province, e.g. 'Madrid'")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("min")
                        .long("min")
                        .help("Minimum value in euros")
                        .value_parser(parse_amount)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("max")
                        .long("max")
                        .help("Maximum value in euros")
                        .value_parser(parse_amount)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the listings as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Download the spreadsheet for the given listing ids (all when none given)")
                .arg(
                    Arg::new("ids")
                        .help("Listing ids to export")
                        .multiple_values(true)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory to save the spreadsheet in")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("map")
                .about("Open the Google Maps link for a location")
                .arg(
                    Arg::new("address")
                        .short('a')
                        .long("address")
                        .help("Free-text address, used when no coordinates are given")
                        .default_value("")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .requires("lng")
                        .allow_hyphen_values(true)
                        .value_parser(parse_amount)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("lng")
                        .long("lng")
                        .requires("lat")
                        .allow_hyphen_values(true)
                        .value_parser(parse_amount)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("print")
                        .long("print")
                        .help("Only print the link")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("browse").about(
            "Interactive session: search, select listings and export them",
        ))
}

/// Parses command-line arguments and runs the requested command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, or if a one-shot `search`, `export`
/// or `map` fails. The interactive `browse` session reports failures and keeps going.
pub async fn cli() -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    let config = ResolvedConfig::resolve(
        matches.get_one::<PathBuf>("config").map(PathBuf::as_path),
        ResolvedConfig::env_base_url(),
        matches.get_one::<String>("api_base_url").map(String::as_str),
    )?;
    info!(api_base_url = %config.api_base_url, "Configuration resolved");

    match matches.subcommand() {
        Some(("search", sub)) => run_search(&config, sub).await,
        Some(("export", sub)) => run_export(&config, sub).await,
        Some(("map", sub)) => run_map(&config, sub),
        Some(("browse", _)) => run_browse(&config).await,
        _ => cmd_for_help
            .print_help()
            .map_err(|e| AppError::Io(format!("Failed to print help: {e}"))),
    }
}

/// Reads the search flags into a request.
pub fn search_request_from(sub: &ArgMatches) -> SearchRequest {
    SearchRequest {
        seq: 1,
        term: sub.get_one::<String>("query").cloned().unwrap_or_default(),
        filters: SearchFilters {
            tipo: sub.get_one::<String>("tipo").cloned(),
            provincia: sub.get_one::<String>("provincia").cloned(),
            valor_min: sub.get_one::<f64>("min").copied(),
            valor_max: sub.get_one::<f64>("max").copied(),
        },
    }
}

async fn run_search(config: &ResolvedConfig, sub: &ArgMatches) -> AppResult<()> {
    let api = HttpListingApi::new(reqwest::Client::new(), &config.api_base_url)?;
    let request = search_request_from(sub);

    let spinner = Spinner::start("Searching auctions...")?;
    let listings = api.search(&request).await;
    drop(spinner);
    let listings = listings?;

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    let mut state = BrowserState::new();
    let seq = state.begin_search().seq;
    state.complete_search(seq, Ok(listings), config.stale_policy());
    println!("{}", ui::render_summary(&state));
    println!("{}", ui::render_listings(&state));
    Ok(())
}

async fn run_export(config: &ResolvedConfig, sub: &ArgMatches) -> AppResult<()> {
    let api = HttpListingApi::new(reqwest::Client::new(), &config.api_base_url)?;
    let ids: Vec<ListingId> = sub
        .get_many::<String>("ids")
        .map(|values| values.map(|v| ListingId::from(v.as_str())).collect())
        .unwrap_or_default();
    let dir = sub
        .get_one::<PathBuf>("output_dir")
        .cloned()
        .unwrap_or_else(|| config.download_dir.clone());

    info!(ids = ids.len(), dir = %dir.display(), "Exporting listings");
    let spinner = Spinner::start("Generating spreadsheet...")?;
    let bytes = api.export(&ExportRequest { ids }).await;
    drop(spinner);

    let filename = export_filename(chrono::Local::now().date_naive());
    let path = DirectoryDownloader::new(dir).save(&bytes?, &filename)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn run_map(config: &ResolvedConfig, sub: &ArgMatches) -> AppResult<()> {
    let address = sub
        .get_one::<String>("address")
        .map(String::as_str)
        .unwrap_or_default();
    let coordinates = match (sub.get_one::<f64>("lat"), sub.get_one::<f64>("lng")) {
        (Some(&lat), Some(&lng)) => Some(Coordinates { lat, lng }),
        _ => None,
    };
    if address.is_empty() && coordinates.is_none() {
        return Err(AppError::InvalidInput(
            "Give an --address or both --lat and --lng".to_string(),
        ));
    }

    let url = map_search_url(address, coordinates);
    link_opener(config, sub.get_flag("print")).open(&url)
}

async fn run_browse(config: &ResolvedConfig) -> AppResult<()> {
    let api = HttpListingApi::new(reqwest::Client::new(), &config.api_base_url)?;
    let browser = ListingBrowser::new(
        Arc::new(api),
        Arc::new(DirectoryDownloader::new(config.download_dir.clone())),
        Arc::new(TerminalNotifier),
        link_opener(config, false),
    )
    .with_policy(config.stale_policy());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(&browser, stdin, &mut stdout).await
}

fn link_opener(config: &ResolvedConfig, print: bool) -> Arc<dyn LinkOpener> {
    if print || config.print_map_links {
        Arc::new(PrintLinkOpener)
    } else {
        Arc::new(SystemLinkOpener)
    }
}

fn parse_amount(value: &str) -> Result<f64, String> {
    match optional_number(value.trim()) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err("value is empty".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
