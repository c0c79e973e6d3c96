// crates/file-search/src/lib.rs
// file-search - CLI and MCP server for Gemini File Search stores

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod batch;
pub mod completion;
pub mod config;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod http;
pub mod mcp;
pub mod operation;
pub mod output;
pub mod resolve;
pub mod transfer;

pub use error::{FileSearchError, Result};
