use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tag stored in the `type` field of every marker record
pub const MARKER_TYPE: &str = "marker";

/// Glyph appended to a label once the marker has been moved or renamed
pub const MODIFIED_MARK: char = '*';

/// Geographic position of a marker
///
/// Serialized as a two-element `[lat, lng]` array. Deserialization also accepts
/// numeric strings and `{ "lat": .., "lng": .. }` objects (see `serde_impl.rs`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Layer type carried in the `type` field of a record
///
/// Only `marker` is placed on the map. Any other tag is kept verbatim so that
/// the import can report and skip it without failing the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerType {
    Marker,
    Other(String),
}

impl LayerType {
    pub fn as_str(&self) -> &str {
        match self {
            LayerType::Marker => MARKER_TYPE,
            LayerType::Other(tag) => tag,
        }
    }
}

impl FromStr for LayerType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MARKER_TYPE {
            Ok(LayerType::Marker)
        } else {
            Ok(LayerType::Other(s.to_string()))
        }
    }
}

/// A marker as it is stored and exchanged
///
/// This is the canonical shape of one entry in the stored JSON blob.
/// `name` never carries the modified glyph here; the glyph lives only on the
/// label of a placed marker and is folded into `modified` on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRecord {
    /// Layer type tag (only `marker` is recognized)
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    /// Area the marker belongs to; markers are grouped by this key
    pub area: String,
    /// Optional running number from the first CSV column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Marker position
    pub lat_lng: LatLng,
    /// Optional explicit display color; resolved from `modified` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// True once the marker has been moved or renamed since it was placed
    #[serde(default)]
    pub modified: bool,
}

impl MarkerRecord {
    /// Create an unmodified marker record without number or color
    pub fn marker(area: impl Into<String>, name: Option<&str>, lat_lng: LatLng) -> Self {
        Self {
            layer_type: LayerType::Marker,
            area: area.into(),
            number: None,
            name: name.map(str::to_string),
            lat_lng,
            color: None,
            modified: false,
        }
    }

    pub fn is_marker(&self) -> bool {
        self.layer_type == LayerType::Marker
    }

    /// Label shown next to the placed marker
    ///
    /// A modified marker gets the glyph appended; an unmodified marker shows
    /// its name as is (possibly nothing).
    pub fn label(&self) -> Option<String> {
        if self.modified {
            Some(add_modified_mark(self.name.as_deref()))
        } else {
            self.name.clone()
        }
    }
}

/// Check whether a label ends with the modified glyph
pub fn has_modified_mark(label: Option<&str>) -> bool {
    match label {
        Some(s) => s.ends_with(MODIFIED_MARK),
        None => false,
    }
}

/// Append the modified glyph unless the label already carries it
///
/// An absent label becomes the glyph alone.
pub fn add_modified_mark(label: Option<&str>) -> String {
    match label {
        Some(s) if has_modified_mark(Some(s)) => s.to_string(),
        Some(s) => format!("{}{}", s, MODIFIED_MARK),
        None => MODIFIED_MARK.to_string(),
    }
}

/// Strip the trailing modified glyph if present
pub fn remove_modified_mark(label: &str) -> String {
    match label.strip_suffix(MODIFIED_MARK) {
        Some(stripped) => stripped.to_string(),
        None => label.to_string(),
    }
}
