//! Core types and ingestion logic for pricelog.
//!
//! This crate knows nothing about spreadsheets on disk or SQLite. It works on
//! the [`Sheet`](sheet::Sheet) grid abstraction and writes through the
//! [`ObservationWriter`](writer::ObservationWriter) trait; concrete readers
//! and stores live in sibling crates.

// Native `async fn` in traits; the writer is driven sequentially, so the
// missing `Send` bound on the returned futures is not a concern.
#![allow(async_fn_in_trait)]

pub mod city;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod locate;
pub mod model;
pub mod sheet;
pub mod writer;

pub use error::{Error, Result};
