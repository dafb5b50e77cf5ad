//! mcp-proxy - launcher and SSE relay for a single upstream MCP server.

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod handlers;
pub mod launcher;
pub mod output;
pub mod port;
pub mod server;
pub mod sse;
