//! subastas-cli library
//!
//! This crate provides the core functionality for the `subastas` binary: a terminal
//! browser for BOE auction listings served by a remote API.
//!
//! ## Overview
//!
//! - [`browser`] - Listing browser state, its transitions, and the interactive session
//! - [`api`] - Remote search and export endpoints behind the [`api::ListingApi`] trait
//! - [`download`] - Saving exported spreadsheets
//! - [`maps`] - Google Maps deep links
//! - [`ui`] - Notifications, loading spinner and listing rendering
//! - [`cli`] - Command-line interface
//! - [`config`] - Layered configuration
//! - [`models`] - Listings, filters and request/response shapes
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use subastas_cli::api::HttpListingApi;
//! use subastas_cli::browser::ListingBrowser;
//! use subastas_cli::download::DirectoryDownloader;
//! use subastas_cli::maps::PrintLinkOpener;
//! use subastas_cli::ui::TerminalNotifier;
//! use subastas_cli::errors::AppResult;
//!
//! # async fn example() -> AppResult<()> {
//! let api = HttpListingApi::new(reqwest::Client::new(), "http://localhost:5000")?;
//! let browser = ListingBrowser::new(
//!     Arc::new(api),
//!     Arc::new(DirectoryDownloader::new(".")),
//!     Arc::new(TerminalNotifier),
//!     Arc::new(PrintLinkOpener),
//! );
//!
//! browser.update(|s| s.set_search_term("piso"));
//! browser.search().await;
//! browser.toggle_all();
//! browser.export().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod browser;
pub mod cli;
pub mod config;
pub mod constants;
pub mod download;
pub mod errors;
pub mod maps;
pub mod models;
pub mod ui;
pub mod utils;
