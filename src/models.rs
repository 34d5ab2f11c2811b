use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque listing identifier, used both as selection key and export key.
///
/// The server may send identifiers as JSON strings or numbers; both are
/// normalized to their string form so `1` and `"1"` select the same listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    /// Surrounding whitespace is not part of an identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ListingId::new(TextOrNumber::deserialize(deserializer)?.into_string()))
    }
}

/// A JSON value the server sends either as a string or as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl TextOrNumber {
    fn into_string(self) -> String {
        match self {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Integer(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingImage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDocument {
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub size: String,
}

/// One auction item as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(rename = "titulo", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "descripcion", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "estado", default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(rename = "direccion", default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(rename = "coordenadas", default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "latitud", default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(rename = "longitud", default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(
        rename = "tipo_bien",
        alias = "tipo",
        default,
        deserialize_with = "null_as_default"
    )]
    pub asset_type: String,
    #[serde(rename = "localidad", default, deserialize_with = "null_as_default")]
    pub locality: String,
    #[serde(rename = "provincia", default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(rename = "valor_tasacion", alias = "valor", default)]
    pub appraisal_value: Option<f64>,
    #[serde(rename = "puja_minima", alias = "pujaMinima", default)]
    pub minimum_bid: Option<f64>,
    #[serde(rename = "fecha_inicio", alias = "fechaInicio", default)]
    pub start_date: Option<String>,
    #[serde(rename = "fecha_conclusion", alias = "fechaFin", default)]
    pub end_date: Option<String>,
    #[serde(rename = "imagenes", default, deserialize_with = "null_as_default")]
    pub images: Vec<ListingImage>,
    #[serde(rename = "documentos", default, deserialize_with = "null_as_default")]
    pub documents: Vec<ListingDocument>,
    #[serde(
        rename = "autoridad",
        alias = "nombre_acreedor",
        default,
        deserialize_with = "optional_text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub authority: Option<String>,
    #[serde(
        rename = "lote",
        alias = "lotes",
        default,
        deserialize_with = "optional_text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub lot: Option<String>,
    #[serde(
        rename = "url_detalle",
        default,
        deserialize_with = "optional_text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_url: Option<String>,
}

impl Listing {
    /// Coordinates to use for the map link.
    ///
    /// Prefers the `coordenadas` object and falls back to the flat
    /// `latitud`/`longitud` pair when both halves are present.
    pub fn map_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.or(match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        })
    }
}

/// Structured search filters. Every field is optional and empty values are
/// never sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub tipo: Option<String>,
    pub provincia: Option<String>,
    pub valor_min: Option<f64>,
    pub valor_max: Option<f64>,
}

/// Snapshot of the term and filters sent for one search, tagged with the
/// sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub seq: u64,
    pub term: String,
    pub filters: SearchFilters,
}

/// `{success, data}` wrapper returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<Listing>>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the export request. An empty `ids` list asks the server to
/// export every listing, not none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub ids: Vec<ListingId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text_or_number(deserializer)?.unwrap_or_default())
}

fn optional_text_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(TextOrNumber::into_string))
}
