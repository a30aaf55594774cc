//! # grepcore
//!
//! The core of a trigram-indexed source-code search engine: a read-only,
//! memory-mapped shard format, a cost-ladder match-tree query compiler, and
//! the shard-level search loop that turns a query into ranked chunk matches.
//!
//! ## Architecture
//!
//! The crate is organized leaves-first, mirroring the layering of the format
//! itself:
//!
//! - [`format`] - the on-disk table-of-contents and section types
//! - [`ngram`] - case-folded Unicode trigram packing
//! - [`bloom`] - blocked bloom filter over word fragments
//! - [`varint`] - LEB128 varint and delta encoding for posting lists
//! - [`checksum`] - per-document CRC-64 content checksums
//! - [`index`] - the shard reader (`IndexData`) and reference builder
//! - [`query`] - query AST, simplification, match-tree compiler, and the
//!   search driver
//! - [`error`] - the structured error taxonomy surfaced to callers
//! - [`config`] - search and build configuration
//! - [`cancel`] - cooperative cancellation primitive
//!
//! ## Quick start
//!
//! ```ignore
//! use grepcore::index::reader::IndexData;
//! use grepcore::query::ast::Query;
//! use grepcore::config::SearchOptions;
//! use grepcore::cancel::CancellationToken;
//!
//! let shard = IndexData::open("repo.shard")?;
//! let query = Query::substring("needle", false, true, true);
//! let result = shard.search(&query, &SearchOptions::default(), &CancellationToken::new())?;
//! for file in &result.files {
//!     println!("{}: {} matches", file.path, file.chunks.len());
//! }
//! ```

pub mod bloom;
pub mod cancel;
pub mod checksum;
pub mod config;
pub mod error;
pub mod format;
pub mod index;
pub mod ngram;
pub mod query;
pub mod varint;

pub use error::{SearchError, SearchResult};
