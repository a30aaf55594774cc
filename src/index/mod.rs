//! The shard layer: on-disk data model, reader, and the in-scope reference
//! builder.
//!
//! Split into `types`, `reader`, `writer`, plus dictionary/posting helpers,
//! onto a single-file compound-shard layout.

pub mod doc_tables;
pub mod meta;
pub mod ngram_index;
pub mod reader;
pub mod repo_codec;
pub mod types;
pub mod writer;

pub use reader::IndexData;
pub use types::{Branch, Document, DocId, LanguageInfo, Repository, SubRepository, SymbolKind, SymbolMeta, SymbolSection};
