// Remote API
pub const DEFAULT_API_BASE_URL: &str = "https://auctionbrokers-proyecto.onrender.com";
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";
pub const SEARCH_PATH: &str = "api/subastas";
pub const EXPORT_PATH: &str = "api/exportar";

// Search query parameter names
pub const PARAM_SEARCH: &str = "search";
pub const PARAM_TIPO: &str = "tipo";
pub const PARAM_PROVINCIA: &str = "provincia";
pub const PARAM_VALOR_MIN: &str = "valorMin";
pub const PARAM_VALOR_MAX: &str = "valorMax";

// Map deep links
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

// Export file naming
pub const EXPORT_FILE_PREFIX: &str = "subastas_boe_";
pub const EXPORT_FILE_EXTENSION: &str = "xlsx";
