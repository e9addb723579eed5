//! Sales lead tracking with two front doors over one store: an MCP
//! server for tool-calling assistants and a REST API for everything
//! else. Both speak the same JSON envelope and share the same operation
//! layer, so a lead created over MCP is immediately visible over HTTP.

pub mod api;
pub mod config;
pub mod mcp;
pub mod models;
pub mod ops;
pub mod reports;
pub mod store;
