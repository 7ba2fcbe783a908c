//! CSV importer
//!
//! Input lines have the layout `number,area,name,lat,lng[,...]`. Fields are
//! split on plain commas with no quoting, exactly as the upload form produced
//! them. Lines with fewer than five fields are dropped without surfacing an
//! error.

use crate::error::MapError;
use crate::map::{LatLng, LayerType, MarkerRecord};
use encoding_rs::Encoding;
use log::{debug, warn};

/// Minimum number of comma-separated fields for a line to become a record
pub const MIN_FIELDS: usize = 5;

/// Result of parsing one CSV text
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub records: Vec<MarkerRecord>,
    /// Non-empty lines that were dropped
    pub dropped: usize,
}

/// Decode raw CSV bytes with the configured encoding
///
/// Undecodable byte sequences are replaced with U+FFFD and a warning is logged;
/// decoding itself never fails.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(
            "CSV input contains bytes that are not valid {}; replaced",
            used.name()
        );
    }
    text.into_owned()
}

/// Parse decoded CSV text into unmodified marker records
pub fn parse(text: &str) -> ParsedCsv {
    let normalized = text.replace("\r\n", "\n");
    let mut parsed = ParsedCsv::default();

    for (index, line) in normalized.split('\n').enumerate() {
        match parse_line(line, index + 1) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                if !line.is_empty() {
                    parsed.dropped += 1;
                }
                debug!("{}", e);
            }
        }
    }

    parsed
}

/// Decode and parse in one step
pub fn import(bytes: &[u8], encoding: &'static Encoding) -> ParsedCsv {
    parse(&decode(bytes, encoding))
}

fn parse_line(line: &str, line_no: usize) -> Result<MarkerRecord, MapError> {
    let values: Vec<&str> = line.split(',').collect();
    if values.len() < MIN_FIELDS {
        return Err(MapError::MalformedCsvLine {
            line: line_no,
            reason: format!(
                "expected at least {} fields, got {}",
                MIN_FIELDS,
                values.len()
            ),
        });
    }

    let lat = parse_coordinate(values[3], line_no)?;
    let lng = parse_coordinate(values[4], line_no)?;

    Ok(MarkerRecord {
        layer_type: LayerType::Marker,
        area: values[1].to_string(),
        number: Some(values[0].to_string()),
        name: Some(values[2].to_string()),
        lat_lng: LatLng::new(lat, lng),
        color: None,
        modified: false,
    })
}

// Surrounding whitespace is ignored, matching how the map library coerces strings
fn parse_coordinate(value: &str, line_no: usize) -> Result<f64, MapError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| MapError::MalformedCsvLine {
            line: line_no,
            reason: format!("'{}' is not a coordinate", value),
        })
}
