//!
//! liteglue - SQLite script-execution bridge.
//!
//! A thin binding exposing the embedded engine's statement execution and
//! result retrieval to a host language runtime: tagged column values,
//! multi-statement script marshaling with positional parameters, and
//! growable row buffers. The engine performs all parsing, planning, storage,
//! and transaction work; this crate marshals scripts in and typed rows out.
//!
//! ## Surface
//!
//! - [`Connection`]: open / execute / last_error / close
//! - [`Value`] / [`ValueTag`]: one scalar result cell or bound parameter
//! - [`Row`] / [`Rows`]: the final statement's captured output
//! - [`Error`] / [`ExecResult`]: the engine's diagnostic, tagged by phase
//!
//! A script may contain several semicolon-separated statements. Positional
//! parameters bind to the final statement only, and only the final
//! statement's rows are returned; intermediate statements run with their
//! placeholders unbound and their output discarded.
//!
//! Everything is synchronous and blocking. A [`Connection`] is `Send` but
//! not `Sync`; concurrent use requires external serialization or separate
//! connections.
//!

pub mod connection;
pub mod error;
pub mod rows;
mod script;
pub mod value;

pub use connection::Connection;
pub use error::{Error, ExecResult};
pub use rows::{Row, Rows};
pub use value::{Value, ValueTag};
