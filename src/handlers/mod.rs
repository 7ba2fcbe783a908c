//! MCP tool handlers for the map server
//!
//! This module contains the implementation of all MCP tool handlers.
//! Each handler is in a separate file for better organization.

pub mod drag_marker;
pub mod export;
pub mod import_csv;
pub mod layers;
pub mod list;
