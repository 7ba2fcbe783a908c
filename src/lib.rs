//! Map Annotation MCP Server Library
//!
//! This library provides a Model Context Protocol (MCP) server for annotating
//! a tile map with markers grouped by area. Markers are imported from CSV
//! uploads, moved by the client, and the whole map is persisted as one JSON
//! blob after every move.
//!
//! # Architecture
//!
//! The library follows a 3-layer architecture:
//! - **MCP Layer**: `MapServerHandler` - Turns tool calls into engine commands
//! - **Domain Layer**: `map` module - Marker records, area groups, import/export engine
//! - **Persistence Layer**: `storage` module - Single-key blob storage
//!
//! # Example
//!
//! ```no_run
//! use mymap_mcp::{Config, MapServerHandler};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let handler = MapServerHandler::new("mymap.json", Config::default())?;
//!     // Use handler with MCP server...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod csv_import;
pub mod error;
pub mod formatting;
mod handlers;
pub mod map;
pub mod storage;

use anyhow::Result;
use log::info;
use mcp_attr::Result as McpResult;
use mcp_attr::server::{McpServer, mcp_server};
use std::sync::{Mutex, MutexGuard};

// Re-export commonly used types
pub use config::Config;
pub use error::MapError;
pub use map::{Command, LatLng, MapEngine, MarkerRecord, Outcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Storage};

/// MCP Server handler for map annotation
///
/// Holds the import/export engine behind a mutex so that tool calls run one
/// at a time, each to completion.
pub struct MapServerHandler {
    pub(crate) engine: Mutex<MapEngine>,
    pub(crate) config: Config,
}

impl MapServerHandler {
    /// Create a handler backed by a JSON store file
    ///
    /// # Arguments
    /// * `store_path` - Path to the store file (created on first save)
    /// * `config` - Server configuration
    ///
    /// # Returns
    /// Result containing the handler, or an error if the configuration is invalid
    pub fn new(store_path: &str, config: Config) -> Result<Self> {
        let storage = Storage::new(FileStore::new(store_path), config.storage_key.clone());
        Self::with_storage(storage, config)
    }

    /// Create a handler on top of an existing storage adapter
    ///
    /// The stored markers (or the configured seed) are placed immediately.
    pub fn with_storage(storage: Storage, config: Config) -> Result<Self> {
        config.validate()?;
        let mut engine = MapEngine::new(storage, config.palette.clone(), config.csv_decoder()?);
        let report = engine.load_data(&config.seed);
        info!(
            "map ready: {} marker(s) in {} area(s)",
            report.placed,
            engine.groups().len()
        );
        Ok(Self {
            engine: Mutex::new(engine),
            config,
        })
    }

    /// Lock the engine, recovering from a poisoned lock
    pub(crate) fn engine(&self) -> MutexGuard<'_, MapEngine> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of the current map as records
    pub fn export_records(&self) -> Vec<MarkerRecord> {
        self.engine().export_records()
    }
}

/// Map annotation server: markers on a tile map, grouped by area.
///
/// Markers come from a CSV upload (columns: number, area, name, lat, lng; Shift_JIS by default)
/// or from the stored snapshot. Each marker has a numeric ID shown by `list`.
/// Moving a marker with `drag_marker` marks it as modified (green icon, name suffixed with "*")
/// and saves the whole map.
///
/// Key concepts:
/// - **area**: overlay group of markers, can be hidden/shown
/// - **original**: marker still where it was imported (blue)
/// - **modified**: marker that has been moved (green, "*" suffix); never reverts
#[mcp_server]
impl McpServer for MapServerHandler {
    /// **List**: Show markers grouped by area with their IDs, labels, positions and colors.
    /// **Use**: No filter=all areas; area="..." to show one area.
    #[tool]
    async fn list(
        &self,
        /// Area name filter (optional)
        area: Option<String>,
    ) -> McpResult<String> {
        self.handle_list(area).await
    }

    /// **Import CSV**: Replace all markers with the rows of a CSV file.
    /// **Format**: number,area,name,lat,lng per line; lines with fewer than 5 fields are skipped.
    /// **Note**: Areas stay registered; the import is saved with the next drag.
    #[tool]
    async fn import_csv(
        &self,
        /// Path to the CSV file
        path: String,
    ) -> McpResult<String> {
        self.handle_import_csv(path).await
    }

    /// **Drag**: Move a marker to a new position. Marks it modified and saves the whole map.
    #[tool]
    async fn drag_marker(
        &self,
        /// Marker ID from list
        marker_id: u32,
        /// New latitude
        lat: f64,
        /// New longitude
        lng: f64,
    ) -> McpResult<String> {
        self.handle_drag_marker(marker_id, lat, lng).await
    }

    /// **Export**: Current markers as the stored JSON record list.
    #[tool]
    async fn export(&self) -> McpResult<String> {
        self.handle_export().await
    }

    /// **Layers**: Show base layers, area overlays with visibility, and the initial view.
    #[tool]
    async fn layers(&self) -> McpResult<String> {
        self.handle_layers().await
    }

    /// **Toggle area**: Show or hide the overlay of one area.
    #[tool]
    async fn set_area_visible(
        &self,
        /// Area name
        area: String,
        /// true=show, false=hide
        visible: bool,
    ) -> McpResult<String> {
        self.handle_set_area_visible(area, visible).await
    }

    /// **Clear**: Remove all markers from the map. Areas stay registered. Not saved by itself.
    #[tool]
    async fn clear(&self) -> McpResult<String> {
        self.handle_clear().await
    }
}
