//! SQLite backend for the pricelog observation ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread. [`SqliteStore`] exposes the raw read/write primitives;
//! [`SqliteWriter`] layers the per-run change detection and transaction
//! handling on top.

mod encode;
mod schema;
mod store;
mod writer;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
pub use writer::SqliteWriter;
