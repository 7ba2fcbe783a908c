//! Layer switcher handlers for the map server

use crate::MapServerHandler;
use crate::formatting::format_layers;
use crate::map::{Command, Outcome};
use mcp_attr::{Result as McpResult, bail};

impl MapServerHandler {
    /// Shows base layers, area overlays and the initial view.
    pub async fn handle_layers(&self) -> McpResult<String> {
        let engine = self.engine();
        Ok(format_layers(&self.config, engine.groups()))
    }

    /// Shows or hides one area overlay.
    pub async fn handle_set_area_visible(&self, area: String, visible: bool) -> McpResult<String> {
        let outcome = self.engine().handle(Command::SetAreaVisible {
            area: area.clone(),
            visible,
        });

        match outcome {
            Ok(_) => Ok(format!(
                "Area '{}' is now {}",
                area,
                if visible { "visible" } else { "hidden" }
            )),
            Err(e) => bail!("{}", e),
        }
    }

    /// Removes every marker; areas stay registered.
    pub async fn handle_clear(&self) -> McpResult<String> {
        match self.engine().handle(Command::ClearAll) {
            Ok(Outcome::Cleared { removed }) => Ok(format!("Removed {} marker(s)", removed)),
            Ok(other) => bail!("Unexpected outcome: {:?}", other),
            Err(e) => bail!("{}", e),
        }
    }
}
