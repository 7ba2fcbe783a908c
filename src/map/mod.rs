//! Map domain models and import/export logic
//!
//! Submodules:
//! - `marker`: marker record and modified-mark helpers
//! - `area`: area groups holding the placed markers
//! - `engine`: import/export engine and command handling
//! - `serde_impl`: tolerant serialization of stored records

mod area;
mod engine;
mod marker;
mod serde_impl;

pub use area::{AreaGroup, AreaGroups, MarkerId, PlacedMarker};
pub use engine::{Command, ImportReport, MapEngine, Outcome};
pub use marker::{
    LatLng, LayerType, MARKER_TYPE, MODIFIED_MARK, MarkerRecord, add_modified_mark,
    has_modified_mark, remove_modified_mark,
};
pub use serde_impl::{decode_records, encode_records};
