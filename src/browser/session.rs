use super::command::{SessionCommand, SESSION_HELP};
use super::controller::{ExportOutcome, ListingBrowser};
use super::state::{Notice, SearchOutcome};
use crate::errors::{AppError, AppResult};
use crate::ui::{self, Spinner};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Runs an interactive session: one automatic search, then one command per input line
/// until `quit` or end of input.
///
/// No command error ends the session; failures are reported through the browser's
/// notifier and the loop goes on.
pub async fn run_session<R, W>(browser: &ListingBrowser, input: R, out: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("Interactive session started");
    writeln!(out, "Type 'help' for the list of commands.")?;
    if let Err(e) = search_and_render(browser, out).await {
        browser.notify(&Notice::error(e.to_string()));
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                browser.notify(&Notice::error(e.to_string()));
                continue;
            }
        };
        debug!(command = ?command, "Session command");
        if let Err(e) = execute(browser, command, out).await {
            browser.notify(&Notice::error(e.to_string()));
        }
    }

    info!("Interactive session finished");
    Ok(())
}

async fn execute<W: Write>(
    browser: &ListingBrowser,
    command: SessionCommand,
    out: &mut W,
) -> AppResult<()> {
    match command {
        SessionCommand::Search(term) => {
            browser.update(|s| s.set_search_term(term));
            search_and_render(browser, out).await?;
        }
        SessionCommand::Tipo(value) => {
            browser.update(|s| s.filters_mut().tipo = value);
            writeln!(out, "Filter updated, run 'search' to apply it.")?;
        }
        SessionCommand::Provincia(value) => {
            browser.update(|s| s.filters_mut().provincia = value);
            writeln!(out, "Filter updated, run 'search' to apply it.")?;
        }
        SessionCommand::ValueMin(value) => {
            browser.update(|s| s.filters_mut().valor_min = value);
            writeln!(out, "Filter updated, run 'search' to apply it.")?;
        }
        SessionCommand::ValueMax(value) => {
            browser.update(|s| s.filters_mut().valor_max = value);
            writeln!(out, "Filter updated, run 'search' to apply it.")?;
        }
        SessionCommand::Toggle(id) => {
            // Only what is on screen can be ticked
            let visible = browser.update(|s| s.listings().iter().any(|l| l.id == id));
            if !visible {
                return Err(AppError::InvalidInput(format!(
                    "No visible listing with id '{id}'"
                )));
            }
            let selected = browser.toggle_selection(&id);
            let verb = if selected { "Selected" } else { "Unselected" };
            writeln!(out, "{verb} {id}")?;
            writeln!(out, "{}", ui::render_summary(&browser.snapshot()))?;
        }
        SessionCommand::ToggleAll => {
            browser.toggle_all();
            writeln!(out, "{}", ui::render_summary(&browser.snapshot()))?;
        }
        SessionCommand::Export => {
            let spinner = Spinner::start("Generating spreadsheet...")?;
            let outcome = browser.export().await;
            drop(spinner);
            match outcome {
                ExportOutcome::Saved(path) => writeln!(out, "Saved {}", path.display())?,
                ExportOutcome::Disabled => {
                    return Err(AppError::InvalidInput(
                        "Export is not available right now (nothing displayed or already running)"
                            .to_string(),
                    ))
                }
                // Already reported by the browser
                ExportOutcome::Failed(_) => {}
            }
        }
        SessionCommand::Map(id) => {
            let url = browser.open_map(&id)?;
            writeln!(out, "Opened {url}")?;
        }
        SessionCommand::List => render(browser, out)?,
        SessionCommand::State => {
            let json = serde_json::to_string_pretty(&browser.snapshot())?;
            writeln!(out, "{json}")?;
        }
        SessionCommand::Help => writeln!(out, "{SESSION_HELP}")?,
        SessionCommand::Quit | SessionCommand::Empty => {}
    }
    Ok(())
}

async fn search_and_render<W: Write>(browser: &ListingBrowser, out: &mut W) -> AppResult<()> {
    let spinner = Spinner::start("Searching auctions...")?;
    let outcome = browser.search().await;
    drop(spinner);

    if let SearchOutcome::Applied { .. } = outcome {
        render(browser, out)?;
    }
    Ok(())
}

fn render<W: Write>(browser: &ListingBrowser, out: &mut W) -> AppResult<()> {
    let state = browser.snapshot();
    writeln!(out, "{}", ui::render_summary(&state))?;
    writeln!(out, "{}", ui::render_listings(&state))?;
    Ok(())
}
