//! Export handler for the map server

use crate::MapServerHandler;
use mcp_attr::{Result as McpResult, bail};

impl MapServerHandler {
    /// Returns the current markers as a pretty-printed JSON record list.
    pub async fn handle_export(&self) -> McpResult<String> {
        let records = self.export_records();
        match serde_json::to_string_pretty(&records) {
            Ok(json) => Ok(json),
            Err(e) => bail!("Failed to serialize markers: {}", e),
        }
    }
}
