//! Core types and transforms for the newsedits labeled-revision dataset.
//!
//! This crate is deliberately free of database dependencies. The SQLite
//! backend (`newsedits-store-sqlite`) and the `newsedits` binary depend on
//! it; it depends on nothing storage-specific.

pub mod config;
pub mod error;
pub mod index;
pub mod label;
pub mod pipeline;
pub mod sentence;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
pub use stats::EntryId;
