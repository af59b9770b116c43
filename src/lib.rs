//! # calendar-mcp
//!
//! Google Calendar tools for agents, authenticated through a Nango connection.
//!
//! ## Overview
//!
//! The OAuth grant for the user's Google account lives in a Nango vault. At
//! call time the [`auth::VaultBroker`] fetches it, refreshes the access token
//! if it is about to expire, and hands the [`calendar::CalendarClient`] a live
//! credential. The [`tools::ToolRegistry`] exposes six calendar operations as
//! named tools returning uniform JSON envelopes, and [`server::McpServer`]
//! serves them over stdio using the Model Context Protocol.
//!
//! ## Example
//!
//! ```rust,ignore
//! use calendar_mcp::{config::Config, tools, server::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_args(args)?;
//!     let registry = tools::create_registry(&config)?;
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!     McpServer::new(registry).serve(stdin, tokio::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod server;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use server::McpServer;
pub use tools::{create_registry, ToolRegistry};
pub use types::{CalendarSummary, EventList, EventRecord, EventTime, OperationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
