//! Configuration for the map server
//!
//! Every field has a default, so an absent or partial TOML file is valid.
//! The defaults reproduce the original page: storage key `mymap-data`,
//! Shift_JIS CSV files, blue/green markers, GSI and OSM base layers.

use crate::map::MarkerRecord;
use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Key under which the marker list is stored
pub const DEFAULT_STORAGE_KEY: &str = "mymap-data";

/// Encoding of uploaded CSV files
pub const DEFAULT_CSV_ENCODING: &str = "Shift_JIS";

/// Marker icon colors
///
/// Supported sprite colors: blue/green/orange/yellow/red/purple/violet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Color of a marker that is still where it was imported
    pub original: String,
    /// Color of a marker that has been moved
    pub modified: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            original: "blue".to_string(),
            modified: "green".to_string(),
        }
    }
}

impl Palette {
    /// Resolve the icon color of a record
    ///
    /// An explicit color wins; otherwise a modified marker gets the
    /// `modified` entry and any other marker the `original` entry.
    pub fn resolve(&self, explicit: Option<&str>, modified: bool) -> String {
        match explicit {
            Some(color) => color.to_string(),
            None if modified => self.modified.clone(),
            None => self.original.clone(),
        }
    }
}

/// Initial map view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[lat, lng]` of the initial center
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [35.06841434635014, 136.02219521999362],
            zoom: 17,
        }
    }
}

/// A tile background selectable in the layer switcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    /// Tile URL template with `{z}/{x}/{y}` placeholders
    pub url: String,
    pub attribution: String,
    pub max_zoom: u8,
}

fn default_base_layers() -> Vec<BaseLayer> {
    vec![
        BaseLayer {
            name: "gsi".to_string(),
            url: "https://cyberjapandata.gsi.go.jp/xyz/std/{z}/{x}/{y}.png".to_string(),
            attribution: "<a href=\"https://maps.gsi.go.jp/development/ichiran.html\">国土地理院</a>"
                .to_string(),
            max_zoom: 18,
        },
        BaseLayer {
            name: "osm".to_string(),
            url: "https://{s}.tile.osm.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "Map data &copy; <a href=\"http://openstreetmap.org\">OpenStreetMap</a> contributors"
                    .to_string(),
            max_zoom: 18,
        },
    ]
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage key of the marker blob
    pub storage_key: String,
    /// Encoding label used to decode CSV uploads (WHATWG label)
    pub csv_encoding: String,
    pub palette: Palette,
    pub view: MapView,
    /// Base layers; the first one is shown initially
    pub base_layers: Vec<BaseLayer>,
    /// Records placed when nothing is stored yet
    pub seed: Vec<MarkerRecord>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            csv_encoding: DEFAULT_CSV_ENCODING.to_string(),
            palette: Palette::default(),
            view: MapView::default(),
            base_layers: default_base_layers(),
            seed: Vec::new(),
        }
    }
}

impl Config {
    /// Load a configuration file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise only fail on first use
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.is_empty() {
            bail!("storage_key must not be empty");
        }
        self.csv_decoder()?;
        Ok(())
    }

    /// Resolve `csv_encoding` to a decoder
    pub fn csv_decoder(&self) -> Result<&'static Encoding> {
        match Encoding::for_label(self.csv_encoding.as_bytes()) {
            Some(encoding) => Ok(encoding),
            None => bail!("Unknown CSV encoding '{}'", self.csv_encoding),
        }
    }
}
