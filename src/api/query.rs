use crate::constants::{PARAM_PROVINCIA, PARAM_SEARCH, PARAM_TIPO, PARAM_VALOR_MAX, PARAM_VALOR_MIN};
use crate::models::SearchRequest;

/// Builds the query pairs for a search request.
///
/// Only non-empty fields are emitted, in a fixed order: `search`, `tipo`, `provincia`,
/// `valorMin`, `valorMax`. Empty strings and unset values never appear, not even as
/// `key=`. The bounds are passed through as given; `valorMin > valorMax` is the
/// server's business.
///
/// # Example
///
/// ```
/// use subastas_cli::api::build_search_query;
/// use subastas_cli::models::{SearchFilters, SearchRequest};
///
/// let request = SearchRequest {
///     seq: 1,
///     term: "piso".to_string(),
///     filters: SearchFilters {
///         provincia: Some("Madrid".to_string()),
///         ..SearchFilters::default()
///     },
/// };
/// let query = build_search_query(&request);
/// assert_eq!(
///     query,
///     vec![
///         ("search", "piso".to_string()),
///         ("provincia", "Madrid".to_string())
///     ]
/// );
/// ```
pub fn build_search_query(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(5);

    if !request.term.is_empty() {
        params.push((PARAM_SEARCH, request.term.clone()));
    }
    if let Some(tipo) = non_empty(&request.filters.tipo) {
        params.push((PARAM_TIPO, tipo.to_string()));
    }
    if let Some(provincia) = non_empty(&request.filters.provincia) {
        params.push((PARAM_PROVINCIA, provincia.to_string()));
    }
    if let Some(min) = request.filters.valor_min {
        params.push((PARAM_VALOR_MIN, format_number(min)));
    }
    if let Some(max) = request.filters.valor_max {
        params.push((PARAM_VALOR_MAX, format_number(max)));
    }

    params
}

/// Shortest decimal form of a number: `100000`, `1500.5`, `-3.7025`.
pub fn format_number(value: f64) -> String {
    // f64's Display already drops a trailing `.0`
    value.to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
