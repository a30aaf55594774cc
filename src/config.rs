//! Search and build configuration.
//!
//! Serde-derived, `Default`-implementing configuration structs, where the
//! defaults double as documentation for every tunable knob.

use crate::query::scorer::ScoringWeights;
use serde::{Deserialize, Serialize};

/// Per-call search options. Constructed once per `search` call
/// and passed by value/reference through the driver; never mutated after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    pub estimate_doc_count: bool,
    pub whole_content: bool,
    pub shard_max_match_count: u64,
    pub total_max_match_count: u64,
    pub shard_repo_max_match_count: u64,
    pub max_wall_time_ms: Option<u64>,
    pub flush_wall_time_ms: Option<u64>,
    pub max_doc_display_count: Option<u64>,
    pub num_context_lines: u32,
    pub chunk_matches: bool,
    pub use_document_ranks: bool,
    pub document_ranks_weight: f32,
    pub debug_score: bool,
    pub use_bm25: bool,
    pub trace_enabled: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        let shard_max_match_count = 100_000;
        Self {
            estimate_doc_count: false,
            whole_content: false,
            shard_max_match_count,
            total_max_match_count: shard_max_match_count * 10,
            shard_repo_max_match_count: u64::MAX,
            max_wall_time_ms: None,
            flush_wall_time_ms: None,
            max_doc_display_count: None,
            num_context_lines: 0,
            chunk_matches: true,
            use_document_ranks: false,
            document_ranks_weight: 0.0,
            debug_score: false,
            use_bm25: false,
            trace_enabled: false,
        }
    }
}

/// Shard-wide search configuration: knobs that affect how a shard is built
/// and read, as opposed to per-call query options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Desired bloom-filter false-positive rate.
    pub bloom_fpr: f64,
    /// Rune stride between consecutive rune-offset samples:
    /// "for every 100th rune of the content".
    pub rune_sample_stride: u32,
    /// Minimum literal length (in runes) that selects a two-ngram
    /// positional-distance intersection rather than a single-ngram
    /// candidate scan.
    pub min_runes_for_distance_pair: usize,
    pub scoring_weights: ScoringWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bloom_fpr: 0.01,
            rune_sample_stride: 100,
            min_runes_for_distance_pair: 4,
            scoring_weights: ScoringWeights::default(),
        }
    }
}

/// Configuration for the in-scope reference builder fixture. Not part of
/// the searcher API; consumed only by [`crate::index::writer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub max_file_size: u64,
    /// Files per parallel build batch.
    pub chunk_size: usize,
    /// Batch size used when parallel-sorting/delta-encoding postings.
    pub ngram_posting_chunk_size: usize,
    pub search: SearchConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            chunk_size: 50_000,
            ngram_posting_chunk_size: 4096,
            search: SearchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_options_default_caps_match_spec() {
        let opts = SearchOptions::default();
        assert_eq!(opts.shard_max_match_count, 100_000);
        assert_eq!(opts.total_max_match_count, 1_000_000);
    }

    #[test]
    fn search_config_round_trips_through_json() {
        let cfg = SearchConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.bloom_fpr, back.bloom_fpr);
        assert_eq!(cfg.rune_sample_stride, back.rune_sample_stride);
    }

    #[test]
    fn build_config_round_trips_through_json() {
        let cfg = BuildConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: BuildConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.chunk_size, back.chunk_size);
    }
}
