//! Structured error taxonomy surfaced to callers.
//!
//! A `thiserror`-derived enum at the library boundary: callers of
//! [`crate::index::reader::IndexData`] need to distinguish a corrupt shard
//! from a canceled search from an invalid query, which a single
//! `anyhow::Error` cannot express.

use std::path::PathBuf;

/// The five error kinds a search or shard open can surface.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The shard fails a structural invariant at open or during read.
    #[error("corrupt index {path}: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    /// A posting or offset points outside the file.
    #[error("out-of-bounds read in {path}: offset {offset} size {size} exceeds file size {file_size}")]
    OutOfBoundsRead {
        path: PathBuf,
        offset: u64,
        size: u64,
        file_size: u64,
    },

    /// A regexp failed to parse, or a query cannot be simplified against
    /// this shard's metadata.
    #[error("invalid query: {reason}")]
    QueryInvalid { reason: String },

    /// The caller's cancellation token fired mid-search.
    #[error("search canceled after {shards_skipped} shard(s) skipped")]
    Canceled { shards_skipped: u64 },

    /// Builder-only: a repository was given more than 64 branches.
    #[error("repository {repo} has {count} branches, exceeding the 64-branch limit")]
    TooManyBranches { repo: String, count: usize },

    /// Low-level I/O failure reading the shard file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias, pinned to [`SearchError`] at the library boundary
/// rather than a blanket catch-all error type.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SearchError::CorruptIndex {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn query_invalid(reason: impl Into<String>) -> Self {
        SearchError::QueryInvalid {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable_and_informative() {
        let err = SearchError::CorruptIndex {
            path: PathBuf::from("repo.shard"),
            reason: "toc offset past end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt index repo.shard: toc offset past end of file"
        );

        let err = SearchError::TooManyBranches {
            repo: "monorepo".to_string(),
            count: 65,
        };
        assert!(err.to_string().contains("monorepo"));
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn canceled_carries_skip_count() {
        let err = SearchError::Canceled { shards_skipped: 3 };
        match err {
            SearchError::Canceled { shards_skipped } => assert_eq!(shards_skipped, 3),
            _ => panic!("wrong variant"),
        }
    }
}
