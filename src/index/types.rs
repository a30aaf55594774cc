//! Runtime data model for one shard: repositories, branches, documents, and
//! symbols.
//!
//! Generalized to a compound-shard model: a document's repository is an
//! index into a per-shard repository list rather than implicit, and a
//! repository carries its own branch table, sub-repositories, and
//! tombstone/config state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// `(name, version)` indexed into a repository's branch table; position `i`
/// defines the bit `1 << i` used in document branch masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub version: String,
}

/// A path-prefixed nested repository (e.g. a git submodule), treated as a
/// distinct reporting origin for matched files under that prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRepository {
    pub path: String,
    pub name: String,
}

/// One repository in a (possibly compound) shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u32,
    pub name: String,
    pub rank: u16,
    /// At most 64 entries; position is the branch-mask bit.
    pub branches: Vec<Branch>,
    pub sub_repos: Vec<SubRepository>,
    pub tombstone: bool,
    pub priority: i64,
    pub file_tombstones: Vec<String>,
    pub config: BTreeMap<String, String>,
    pub url_template: Option<String>,
    pub line_fragment_template: Option<String>,
}

impl Repository {
    pub fn branch_index(&self, name: &str) -> Option<usize> {
        self.branches.iter().position(|b| b.name == name)
    }

    pub fn is_file_tombstoned(&self, path: &str) -> bool {
        self.file_tombstones.iter().any(|p| p == path)
    }
}

/// Per-language "kind" of a symbol definition, used for scoring bonuses on
/// symbol matches (e.g. a Java class definition should outrank a local
/// variable). Kept generic across languages rather than per-language: only
/// the scoring *ordering* is a contract, not exact per-language taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum SymbolKind {
    Other = 0,
    Function = 1,
    Method = 2,
    Class = 3,
    Struct = 4,
    Interface = 5,
    Enum = 6,
    Constant = 7,
    Variable = 8,
    Module = 9,
}

impl SymbolKind {
    /// Definitions of a type or callable rank above plain variable/constant
    /// bindings for the per-language kind scoring bonus.
    pub fn is_important(&self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::Method
                | SymbolKind::Class
                | SymbolKind::Struct
                | SymbolKind::Interface
                | SymbolKind::Enum
        )
    }

    pub fn from_u16(v: u16) -> Self {
        match v {
            1 => SymbolKind::Function,
            2 => SymbolKind::Method,
            3 => SymbolKind::Class,
            4 => SymbolKind::Struct,
            5 => SymbolKind::Interface,
            6 => SymbolKind::Enum,
            7 => SymbolKind::Constant,
            8 => SymbolKind::Variable,
            9 => SymbolKind::Module,
            _ => SymbolKind::Other,
        }
    }
}

/// One identifier definition within a document's content: a
/// non-overlapping, rune-boundary-aligned byte range plus a reference into
/// the shard's symbol metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolSection {
    /// Document-relative byte offset, inclusive.
    pub start: u32,
    /// Document-relative byte offset, exclusive.
    pub end: u32,
    pub symbol_id: u32,
}

/// Global symbol metadata, referenced by [`SymbolSection::symbol_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMeta {
    pub name: String,
    pub kind: SymbolKind,
}

/// A language entry in the shard's language map: the human-readable name a
/// language code decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageInfo {
    pub name: String,
}

/// One document: a file version within one branch-set of one repository
///. Symbol sections and newline tables are not stored inline;
/// they are lazily loaded through [`crate::index::reader::IndexData`].
#[derive(Debug, Clone, Copy)]
pub struct Document {
    pub id: DocId,
    /// Dense index into the shard's repository list (not the stable
    /// repository id).
    pub repo_idx: u16,
    pub sub_repo_idx: u32,
    pub branch_mask: u64,
    pub language: u16,
    pub checksum: u64,
    /// Absolute byte range within the shard's content section.
    pub content_offset: u64,
    pub content_size: u64,
    /// Absolute byte range within the shard's filename section.
    pub name_offset: u64,
    pub name_size: u64,
}

impl Document {
    pub fn branch_index(&self) -> u32 {
        self.branch_mask.trailing_zeros()
    }
}
