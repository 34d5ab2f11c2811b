use crate::errors::{AppError, AppResult};
use crate::models::ListingId;

pub const SESSION_HELP: &str = "\
Commands:
  search [term]      set the search term (empty clears it) and search   (s)
  tipo [value]       set or clear the category filter
  provincia [value]  set or clear the region filter
  min [number]       set or clear the minimum value
  max [number]       set or clear the maximum value
  toggle <id>        select or unselect a listing                        (t)
  all                select all / deselect all                           (a)
  export             download the spreadsheet (all listings if none selected) (e)
  map <id>           open the listing location in Google Maps            (m)
  list               show the current listings                           (l)
  state              dump the session state as JSON
  help               show this help                                      (h)
  quit               leave                                               (q)";

/// One line of input in an interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Search(String),
    Tipo(Option<String>),
    Provincia(Option<String>),
    ValueMin(Option<f64>),
    ValueMax(Option<f64>),
    Toggle(ListingId),
    ToggleAll,
    Export,
    Map(ListingId),
    List,
    State,
    Help,
    Quit,
    Empty,
}

impl SessionCommand {
    /// Parses a session line. Keywords are case-insensitive, arguments are kept verbatim
    /// (trimmed).
    pub fn parse(line: &str) -> AppResult<Self> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        let command = match keyword.to_lowercase().as_str() {
            "search" | "s" => Self::Search(rest.to_string()),
            "tipo" => Self::Tipo(optional_text(rest)),
            "provincia" => Self::Provincia(optional_text(rest)),
            "min" => Self::ValueMin(optional_number(rest)?),
            "max" => Self::ValueMax(optional_number(rest)?),
            "toggle" | "t" => Self::Toggle(required_id(keyword, rest)?),
            "all" | "a" => Self::ToggleAll,
            "export" | "e" => Self::Export,
            "map" | "m" => Self::Map(required_id(keyword, rest)?),
            "list" | "l" => Self::List,
            "state" => Self::State,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown command '{other}', type 'help' for the list"
                )))
            }
        };
        Ok(command)
    }
}

fn optional_text(rest: &str) -> Option<String> {
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Parses a value filter. Only basic numeric validation: finite numbers, `,` accepted as
/// the decimal separator.
pub fn optional_number(rest: &str) -> AppResult<Option<f64>> {
    if rest.is_empty() {
        return Ok(None);
    }
    let value: f64 = rest.replace(',', ".").parse().map_err(|_| {
        AppError::InvalidInput(format!("'{rest}' is not a number"))
    })?;
    if !value.is_finite() {
        return Err(AppError::InvalidInput(format!("'{rest}' is not a finite number")));
    }
    Ok(Some(value))
}

fn required_id(keyword: &str, rest: &str) -> AppResult<ListingId> {
    if rest.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "'{keyword}' needs a listing id"
        )));
    }
    Ok(ListingId::from(rest))
}
