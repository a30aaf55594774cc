//! Match and document scoring.
//!
//! A `ScoringWeights`/`Scorer` pair that folds match-count, filename-match,
//! directory depth, and recency-style factors into one `f32`, generalized
//! into a richer per-match and per-document factor set: word-boundary
//! quality, symbol-span quality, atom coverage, shard/document rank, and an
//! optional BM25 mode. The overall shape -- a serde-derived weights struct
//! with a `Default`, and a stateless `Scorer` that folds a context into one
//! score -- stays fixed; only the factor list grows.

use serde::{Deserialize, Serialize};

/// Where a content match's surrounding boundary quality places it: a full
/// word-boundary match outranks a partial word-boundary match, which
/// outranks an interior match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryQuality {
    FullWord,
    PartialWord,
    Interior,
}

/// How a match relates to a symbol span it falls inside, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolQuality {
    /// The match spans exactly one symbol's definition.
    ExactSpan,
    /// The match overlaps part of a symbol span.
    PartialSpan,
    /// The match is inside a symbol's body but not its name span.
    Interior,
    /// The match is not associated with any symbol.
    None,
}

/// How a filename match relates to the file's basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameQuality {
    WholeBasename,
    PrefixOrSuffix,
    Interior,
}

/// All tunable per-factor weights, grouped so a caller can serialize a
/// tuned configuration. Only the *ordering* properties are load-bearing
/// for tests -- the numeric values here are defaults, not contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub word_boundary_full: f32,
    pub word_boundary_partial: f32,
    pub word_boundary_interior: f32,

    pub symbol_exact: f32,
    pub symbol_partial: f32,
    pub symbol_interior: f32,
    /// Extra bonus for matches on a symbol of a per-language "important"
    /// kind (e.g. a class or function definition rather than a local
    /// variable).
    pub symbol_important_kind_bonus: f32,

    pub filename_whole_basename: f32,
    pub filename_prefix_or_suffix: f32,
    pub filename_interior: f32,

    /// Weight applied to `matched_atoms / total_atoms`.
    pub atom_count_weight: f32,
    /// Per-document-index decay applied as a small early-documents boost.
    pub doc_order_weight: f32,
    /// Weight applied to `repo.rank / 0xFFFF`.
    pub shard_rank_weight: f32,
    /// Weight applied to `log2(document_rank) / 32`, itself scaled again
    /// by the caller's `document_ranks_weight` search option.
    pub document_rank_weight: f32,

    pub bm25_k1: f32,
    pub bm25_b: f32,
    /// Filename hits count `bm25_filename_multiplier` times as much as a
    /// single content hit, in BM25 mode.
    pub bm25_filename_multiplier: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            word_boundary_full: 3.0,
            word_boundary_partial: 1.5,
            word_boundary_interior: 0.5,

            symbol_exact: 4.0,
            symbol_partial: 2.0,
            symbol_interior: 0.75,
            symbol_important_kind_bonus: 1.0,

            filename_whole_basename: 5.0,
            filename_prefix_or_suffix: 2.5,
            filename_interior: 1.0,

            atom_count_weight: 2.0,
            doc_order_weight: 0.01,
            shard_rank_weight: 1.0,
            document_rank_weight: 1.0,

            bm25_k1: 1.2,
            bm25_b: 0.75,
            bm25_filename_multiplier: 5.0,
        }
    }
}

/// One content or filename match's contribution, before document-level
/// aggregation.
#[derive(Debug, Clone, Copy)]
pub struct MatchFactors {
    pub boundary: BoundaryQuality,
    pub symbol: SymbolQuality,
    pub symbol_is_important_kind: bool,
    pub is_filename_match: bool,
    pub filename_quality: Option<FilenameQuality>,
}

/// Everything [`Scorer::score_document`] needs beyond the individual match
/// list: shard- and document-level factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentScoreContext {
    pub matched_atoms: u32,
    pub total_atoms: u32,
    pub doc_index: u32,
    /// `repository.rank`, a `u16`.
    pub shard_rank: u16,
    /// Present only when `use_document_ranks` is set and the document
    /// carries a rank.
    pub document_rank: Option<u64>,
    pub document_ranks_weight: f32,
}

pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default())
    }

    /// Score one match.
    pub fn score_match(&self, factors: &MatchFactors) -> f32 {
        let w = &self.weights;
        let mut score = match factors.boundary {
            BoundaryQuality::FullWord => w.word_boundary_full,
            BoundaryQuality::PartialWord => w.word_boundary_partial,
            BoundaryQuality::Interior => w.word_boundary_interior,
        };

        score += match factors.symbol {
            SymbolQuality::ExactSpan => w.symbol_exact,
            SymbolQuality::PartialSpan => w.symbol_partial,
            SymbolQuality::Interior => w.symbol_interior,
            SymbolQuality::None => 0.0,
        };
        if factors.symbol_is_important_kind && !matches!(factors.symbol, SymbolQuality::None) {
            score += w.symbol_important_kind_bonus;
        }

        if factors.is_filename_match {
            score += match factors.filename_quality {
                Some(FilenameQuality::WholeBasename) => w.filename_whole_basename,
                Some(FilenameQuality::PrefixOrSuffix) => w.filename_prefix_or_suffix,
                Some(FilenameQuality::Interior) | None => w.filename_interior,
            };
        }

        score
    }

    /// Aggregate per-match scores plus per-document factors into the final
    /// document score.
    pub fn score_document(&self, match_scores: &[f32], ctx: &DocumentScoreContext) -> f32 {
        let w = &self.weights;
        let mut score: f32 = match_scores.iter().sum();

        if ctx.total_atoms > 0 {
            let coverage = ctx.matched_atoms as f32 / ctx.total_atoms as f32;
            score += coverage * w.atom_count_weight;
        }

        score += w.doc_order_weight / (1.0 + ctx.doc_index as f32);

        score += (ctx.shard_rank as f32 / 0xFFFFu32 as f32) * w.shard_rank_weight;

        if let Some(rank) = ctx.document_rank {
            if rank > 0 {
                let factor = ((rank as f32).log2() / 32.0).clamp(0.0, 1.0);
                score += factor * w.document_rank_weight * ctx.document_ranks_weight;
            }
        }

        score.max(0.0)
    }
}

/// Per-document term statistics needed for the BM25 second pass: term
/// frequency within this document, whether the term also hit the filename,
/// and the document's length in runes.
#[derive(Debug, Clone)]
pub struct Bm25DocumentTerms {
    /// `(term, content_term_frequency, filename_hit)`.
    pub terms: Vec<(String, u32, bool)>,
    pub doc_len: u32,
}

/// Shard-global statistics accumulated in BM25's first pass: how many
/// documents contain each term, and the total document count/average
/// length needed to normalize term frequency by document length.
#[derive(Debug, Clone, Default)]
pub struct Bm25Corpus {
    pub document_frequency: std::collections::HashMap<String, u32>,
    pub doc_count: u32,
    pub avg_doc_len: f32,
}

impl Bm25Corpus {
    fn idf(&self, term: &str) -> f32 {
        let df = *self.document_frequency.get(term).unwrap_or(&0) as f32;
        let n = self.doc_count as f32;
        (((n - df + 0.5) / (df + 0.5)) + 1.0).ln()
    }
}

/// Score one document under BM25, replacing
/// [`Scorer::score_document`]'s additive model entirely when
/// `SearchOptions::use_bm25` is set.
pub fn bm25_score(weights: &ScoringWeights, corpus: &Bm25Corpus, doc: &Bm25DocumentTerms) -> f32 {
    let l = if corpus.avg_doc_len > 0.0 {
        doc.doc_len as f32 / corpus.avg_doc_len
    } else {
        1.0
    };

    let mut score = 0.0f32;
    for (term, tf, filename_hit) in &doc.terms {
        let tf = *tf as f32 * if *filename_hit { weights.bm25_filename_multiplier } else { 1.0 };
        let idf = corpus.idf(term);
        let numerator = tf * (weights.bm25_k1 + 1.0);
        let denominator = weights.bm25_k1 * (1.0 - weights.bm25_b + weights.bm25_b * l) + tf;
        score += idf * (numerator / denominator);
    }
    score.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_word_boundary_outranks_partial_and_interior() {
        let scorer = Scorer::with_defaults();
        let full = scorer.score_match(&MatchFactors {
            boundary: BoundaryQuality::FullWord,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: false,
            filename_quality: None,
        });
        let partial = scorer.score_match(&MatchFactors {
            boundary: BoundaryQuality::PartialWord,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: false,
            filename_quality: None,
        });
        let interior = scorer.score_match(&MatchFactors {
            boundary: BoundaryQuality::Interior,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: false,
            filename_quality: None,
        });
        assert!(full > partial);
        assert!(partial > interior);
    }

    #[test]
    fn exact_symbol_span_outranks_partial_and_interior() {
        let scorer = Scorer::with_defaults();
        let base = MatchFactors {
            boundary: BoundaryQuality::Interior,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: false,
            filename_quality: None,
        };
        let exact = scorer.score_match(&MatchFactors { symbol: SymbolQuality::ExactSpan, ..base });
        let partial = scorer.score_match(&MatchFactors { symbol: SymbolQuality::PartialSpan, ..base });
        let interior = scorer.score_match(&MatchFactors { symbol: SymbolQuality::Interior, ..base });
        let none = scorer.score_match(&base);
        assert!(exact > partial);
        assert!(partial > interior);
        assert!(interior > none);
    }

    #[test]
    fn important_symbol_kind_only_bonuses_actual_symbol_matches() {
        let scorer = Scorer::with_defaults();
        let base = MatchFactors {
            boundary: BoundaryQuality::Interior,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: true,
            is_filename_match: false,
            filename_quality: None,
        };
        // Important-kind flag set but no symbol match: no bonus applied.
        let no_symbol = scorer.score_match(&base);
        let with_symbol = scorer.score_match(&MatchFactors { symbol: SymbolQuality::ExactSpan, ..base });
        let without_bonus = scorer.score_match(&MatchFactors {
            symbol: SymbolQuality::ExactSpan,
            symbol_is_important_kind: false,
            ..base
        });
        assert_eq!(no_symbol, 0.0);
        assert!(with_symbol > without_bonus);
    }

    #[test]
    fn whole_basename_outranks_prefix_and_interior() {
        let scorer = Scorer::with_defaults();
        let mk = |q: FilenameQuality| MatchFactors {
            boundary: BoundaryQuality::Interior,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: true,
            filename_quality: Some(q),
        };
        let whole = scorer.score_match(&mk(FilenameQuality::WholeBasename));
        let affix = scorer.score_match(&mk(FilenameQuality::PrefixOrSuffix));
        let interior = scorer.score_match(&mk(FilenameQuality::Interior));
        assert!(whole > affix);
        assert!(affix > interior);
    }

    #[test]
    fn higher_atom_coverage_scores_higher() {
        let scorer = Scorer::with_defaults();
        let low = scorer.score_document(
            &[],
            &DocumentScoreContext {
                matched_atoms: 1,
                total_atoms: 4,
                ..Default::default()
            },
        );
        let high = scorer.score_document(
            &[],
            &DocumentScoreContext {
                matched_atoms: 4,
                total_atoms: 4,
                ..Default::default()
            },
        );
        assert!(high > low);
    }

    #[test]
    fn earlier_documents_get_a_small_boost() {
        let scorer = Scorer::with_defaults();
        let earlier = scorer.score_document(
            &[],
            &DocumentScoreContext { doc_index: 0, ..Default::default() },
        );
        let later = scorer.score_document(
            &[],
            &DocumentScoreContext { doc_index: 1000, ..Default::default() },
        );
        assert!(earlier > later);
    }

    #[test]
    fn higher_shard_rank_scores_higher() {
        let scorer = Scorer::with_defaults();
        let low = scorer.score_document(
            &[],
            &DocumentScoreContext { shard_rank: 100, ..Default::default() },
        );
        let high = scorer.score_document(
            &[],
            &DocumentScoreContext { shard_rank: 60000, ..Default::default() },
        );
        assert!(high > low);
    }

    #[test]
    fn document_rank_only_applies_when_weighted() {
        let scorer = Scorer::with_defaults();
        let unweighted = scorer.score_document(
            &[],
            &DocumentScoreContext {
                document_rank: Some(1000),
                document_ranks_weight: 0.0,
                ..Default::default()
            },
        );
        let weighted = scorer.score_document(
            &[],
            &DocumentScoreContext {
                document_rank: Some(1000),
                document_ranks_weight: 1.0,
                ..Default::default()
            },
        );
        assert!(weighted > unweighted);
    }

    #[test]
    fn bm25_rewards_higher_term_frequency() {
        let weights = ScoringWeights::default();
        let corpus = Bm25Corpus {
            document_frequency: [("needle".to_string(), 10)].into_iter().collect(),
            doc_count: 1000,
            avg_doc_len: 500.0,
        };
        let low_tf = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 1, false)], doc_len: 500 },
        );
        let high_tf = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 10, false)], doc_len: 500 },
        );
        assert!(high_tf > low_tf);
    }

    #[test]
    fn bm25_weights_filename_hits_higher_than_content_hits() {
        let weights = ScoringWeights::default();
        let corpus = Bm25Corpus {
            document_frequency: [("needle".to_string(), 10)].into_iter().collect(),
            doc_count: 1000,
            avg_doc_len: 500.0,
        };
        let content_hit = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 1, false)], doc_len: 500 },
        );
        let filename_hit = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 1, true)], doc_len: 500 },
        );
        assert!(filename_hit > content_hit);
    }

    #[test]
    fn bm25_penalizes_longer_documents_for_equal_term_frequency() {
        let weights = ScoringWeights::default();
        let corpus = Bm25Corpus {
            document_frequency: [("needle".to_string(), 10)].into_iter().collect(),
            doc_count: 1000,
            avg_doc_len: 500.0,
        };
        let short_doc = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 3, false)], doc_len: 200 },
        );
        let long_doc = bm25_score(
            &weights,
            &corpus,
            &Bm25DocumentTerms { terms: vec![("needle".to_string(), 3, false)], doc_len: 5000 },
        );
        assert!(short_doc > long_doc);
    }
}
