//! Error taxonomy for the map domain
//!
//! Every variant here is recovered locally by the caller that produces it.
//! Application plumbing (config files, startup) uses `anyhow` instead.

use thiserror::Error;

/// Errors raised by the map engine, the CSV importer and the persistence adapter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// The stored blob could not be read or decoded
    #[error("failed to load data from storage: {0}")]
    StorageRead(String),
    /// The stored blob could not be written; the previous blob is untouched
    #[error("failed to save data to storage: {0}")]
    StorageWrite(String),
    /// A record carried a `type` tag other than `marker`
    #[error("unknown layer type \"{0}\"")]
    UnrecognizedRecordType(String),
    /// A CSV line was too short or had non-numeric coordinates
    #[error("malformed CSV line {line}: {reason}")]
    MalformedCsvLine { line: usize, reason: String },
    /// The CSV input could not be read or decoded
    #[error("failed to read CSV file: {0}")]
    CsvRead(String),
    /// A command addressed a marker id that is not on the map
    #[error("marker {0} not found")]
    UnknownMarker(u32),
    /// A command addressed an area that has never been registered
    #[error("area \"{0}\" not found")]
    UnknownArea(String),
    /// Every marker id has been handed out
    #[error("no marker ids left")]
    MarkerIdsExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MapError::UnrecognizedRecordType("polyline".to_string()).to_string(),
            "unknown layer type \"polyline\""
        );
        assert_eq!(MapError::UnknownMarker(7).to_string(), "marker 7 not found");
        assert_eq!(
            MapError::MalformedCsvLine {
                line: 3,
                reason: "expected at least 5 fields, got 2".to_string()
            }
            .to_string(),
            "malformed CSV line 3: expected at least 5 fields, got 2"
        );
        assert_eq!(
            MapError::StorageRead("bad".to_string()).to_string(),
            "failed to load data from storage: bad"
        );
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(MapError::MarkerIdsExhausted);
        assert_eq!(err.to_string(), "no marker ids left");
    }
}
