//! CSV import handler for the map server

use crate::MapServerHandler;
use crate::error::MapError;
use crate::formatting::format_import_report;
use crate::map::{Command, Outcome};
use log::warn;
use mcp_attr::{Result as McpResult, bail};

impl MapServerHandler {
    /// Reads a CSV file and replaces the markers on the map with its rows.
    ///
    /// A file that cannot be read leaves the map untouched.
    pub async fn handle_import_csv(&self, path: String) -> McpResult<String> {
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = MapError::CsvRead(format!("{}: {}", path, e));
                warn!("{}", err);
                bail!("{}", err);
            }
        };

        let outcome = self.engine().handle(Command::ImportCsv(bytes));
        match outcome {
            Ok(Outcome::Imported(report)) => Ok(format!(
                "{} from {}",
                format_import_report(&report),
                path
            )),
            Ok(other) => bail!("Unexpected outcome: {:?}", other),
            Err(e) => bail!("{}", e),
        }
    }
}
