//! List handler for the map server

use crate::MapServerHandler;
use crate::formatting::format_marker_list;
use mcp_attr::{Result as McpResult, bail};

impl MapServerHandler {
    /// Lists placed markers grouped by area, optionally for a single area.
    pub async fn handle_list(&self, area: Option<String>) -> McpResult<String> {
        let engine = self.engine();

        // Empty string means no filter
        let area = area.filter(|a| !a.is_empty());

        if let Some(ref name) = area
            && engine.groups().get(name).is_none()
        {
            let known: Vec<&str> = engine.groups().iter().map(|g| g.name()).collect();
            bail!(
                "Area '{}' does not exist.\nAvailable areas: {}",
                name,
                known.join(", ")
            );
        }

        Ok(format_marker_list(engine.groups(), area.as_deref()))
    }
}
