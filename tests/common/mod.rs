//! Common test utilities for integration tests

#![allow(dead_code)]

use mymap_mcp::map::{LatLng, MarkerRecord};
use mymap_mcp::{Config, MapServerHandler, MemoryStore, Storage};
use std::io::Write;
use tempfile::NamedTempFile;

/// Create a handler on an in-memory store, returning a handle to the store
pub fn get_test_handler() -> (MapServerHandler, MemoryStore) {
    get_test_handler_with(Config::default())
}

pub fn get_test_handler_with(config: Config) -> (MapServerHandler, MemoryStore) {
    let store = MemoryStore::new();
    let storage = Storage::new(store.clone(), config.storage_key.clone());
    let handler = MapServerHandler::with_storage(storage, config).unwrap();
    (handler, store)
}

/// Read what is currently stored under the default key
pub fn stored_blob(store: &MemoryStore) -> Option<String> {
    Storage::new(store.clone(), "mymap-data").load()
}

/// Create an unmodified marker record
pub fn create_test_record(area: &str, name: &str, lat: f64, lng: f64) -> MarkerRecord {
    MarkerRecord::marker(area, Some(name), LatLng::new(lat, lng))
}

/// Write CSV text to a temporary file encoded as Shift_JIS
pub fn write_sjis_csv(text: &str) -> NamedTempFile {
    let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
    assert!(!had_errors, "test CSV must be representable in Shift_JIS");
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

/// Extract the marker ID from a list line such as "- [3] Name (35.0, 136.0) blue"
pub fn extract_id_from_line(line: &str) -> u32 {
    let start = line.find('[').unwrap() + 1;
    let end = line.find(']').unwrap();
    line[start..end].parse().unwrap()
}
