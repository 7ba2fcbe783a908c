//! Drag handler for the map server

use crate::MapServerHandler;
use crate::map::{Command, LatLng, Outcome};
use mcp_attr::{Result as McpResult, bail};

impl MapServerHandler {
    /// Moves a marker, marks it modified and saves the whole map.
    pub async fn handle_drag_marker(
        &self,
        marker_id: u32,
        lat: f64,
        lng: f64,
    ) -> McpResult<String> {
        let outcome = self.engine().handle(Command::ApplyDrag {
            marker_id,
            position: LatLng::new(lat, lng),
        });

        match outcome {
            Ok(Outcome::Moved {
                marker_id,
                label,
                saved: true,
            }) => Ok(format!(
                "Marker {} '{}' moved to ({}, {}) and saved",
                marker_id, label, lat, lng
            )),
            // The move stays on the map; the stored snapshot is the previous one
            Ok(Outcome::Moved {
                marker_id, label, ..
            }) => Ok(format!(
                "Marker {} '{}' moved to ({}, {}) but saving failed; previous data kept",
                marker_id, label, lat, lng
            )),
            Ok(other) => bail!("Unexpected outcome: {:?}", other),
            Err(e) => bail!("{}", e),
        }
    }
}
