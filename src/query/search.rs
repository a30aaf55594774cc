//! The shard-level search loop: simplify, compile a match tree, walk
//! candidate documents in ascending id order, confirm and chunk matches,
//! score, and enforce the match-count/time caps.
//!
//! Follows a simplify -> plan -> iterate -> score shape, scoped to the
//! per-shard call that [`crate::index::reader::IndexData::search`] wraps --
//! a federating layer above this crate is responsible for merging results
//! across shards.

use crate::cancel::{CancellationToken, Deadline};
use crate::config::SearchOptions;
use crate::error::SearchResult;
use crate::index::reader::IndexData;
use crate::index::types::{Branch, DocId, Repository};
use crate::query::ast::Query;
use crate::query::scorer::{
    BoundaryQuality, Bm25Corpus, Bm25DocumentTerms, DocumentScoreContext, FilenameQuality,
    MatchFactors, Scorer, SymbolQuality, bm25_score,
};
use crate::query::simplify;
use crate::query::tree::{self, CompiledNode, MatchSpan};
use regex::Regex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushReason {
    #[default]
    Complete,
    ShardMatchCountLimit,
    TotalMatchCountLimit,
    RepoMatchCountLimit,
    WallTimeLimit,
    Canceled,
    /// The bloom/ngram filter proved a required literal is absent from the
    /// whole shard; the document loop never ran.
    FilterRejected,
}

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub content_bytes_loaded: u64,
    pub index_bytes_loaded: u64,
    pub crashes: u32,
    pub duration: Duration,
    pub file_count: u64,
    pub shard_files_considered: u64,
    pub files_considered: u64,
    pub files_loaded: u64,
    pub files_skipped: u64,
    pub shards_scanned: u32,
    pub shards_skipped: u32,
    pub shards_skipped_filter: u32,
    pub match_count: u64,
    pub ngram_matches: u64,
    pub ngram_lookups: u64,
    pub wait: Duration,
    pub match_tree_construction: Duration,
    pub match_tree_search: Duration,
    pub regexps_considered: u32,
    pub flush_reason: FlushReason,
}

#[derive(Debug, Clone)]
pub struct MatchRange {
    pub line: u32,
    pub start_col: u32,
    pub end_col: u32,
    pub file_name: bool,
}

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub content: String,
    pub start_line: u32,
    pub ranges: Vec<MatchRange>,
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone)]
pub struct FileMatch {
    pub repo: String,
    pub path: String,
    /// Only the branches this query's `branch(...)` atoms actually matched
    ///; every branch the document lives on when the
    /// query carries no branch predicate.
    pub branches: Vec<String>,
    pub language: Option<String>,
    pub score: f32,
    pub chunks: Vec<ChunkMatch>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResultSet {
    pub files: Vec<FileMatch>,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub max_repo_display_count: Option<u64>,
    /// When true, each entry carries the full [`Repository`] record;
    /// otherwise only the minimal `{has_symbols, branches}` projection.
    pub full_repo_metadata: bool,
}

/// The minimal per-repository projection: whether any matching document
/// carries a symbol table, plus the repository's branch list.
#[derive(Debug, Clone, Default)]
pub struct MinimalRepoInfo {
    pub has_symbols: bool,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone)]
pub enum RepoMetadata {
    Full(Repository),
    Minimal(MinimalRepoInfo),
}

#[derive(Debug, Clone)]
pub struct ListEntry {
    pub repo: String,
    pub file_count: u64,
    pub match_count: u64,
    pub metadata: RepoMetadata,
}

pub fn search(
    index: &IndexData,
    query: &Query,
    options: &SearchOptions,
    cancel: &CancellationToken,
) -> SearchResult<SearchResultSet> {
    let wall_start = Instant::now();
    let mut stats = SearchStats::default();

    let simplified = simplify::simplify(query, index);
    if matches!(simplified, Query::Const(false)) {
        stats.shards_skipped_filter = 1;
        stats.duration = wall_start.elapsed();
        return Ok(SearchResultSet { files: Vec::new(), stats });
    }

    // Whole-shard bloom short-circuit: a literal that must be present
    // somewhere in a matching document (every `And`/`Symbol`/`Type`
    // conjunct, recursively) but that the shard's word-fragment bloom
    // filter proves absent means no document in this shard can match, so
    // the document loop never has to run at all.
    let required_literals = tree::collect_required_literals(&simplified);
    if required_literals.iter().any(|lit| !index.might_contain_literal(lit)) {
        stats.shards_skipped_filter = 1;
        stats.flush_reason = FlushReason::FilterRejected;
        stats.duration = wall_start.elapsed();
        return Ok(SearchResultSet { files: Vec::new(), stats });
    }
    stats.shards_scanned = 1;

    let construct_start = Instant::now();
    let compiled = tree::compile(&simplified, index)?;
    stats.match_tree_construction = construct_start.elapsed();
    stats.regexps_considered = tree::count_regexp_nodes(&simplified);

    let branch_predicates = tree::collect_branch_predicates(&simplified);
    let deadline = options.max_wall_time_ms.map(|ms| Deadline::after(Duration::from_millis(ms))).unwrap_or_else(Deadline::far_future);

    let scorer = Scorer::with_defaults();
    let mut files = Vec::new();
    // Parallel to `files`: each matched document's spans and byte length,
    // kept around for the optional BM25 rescoring pass below.
    let mut bm25_inputs: Vec<(Vec<MatchSpan>, u32)> = Vec::new();
    let mut repo_match_counts = std::collections::HashMap::<u16, u64>::new();
    let mut shard_match_count: u64 = 0;

    let search_start = Instant::now();
    'docs: for (doc_index, doc_id) in compiled.candidates.iter().enumerate() {
        if cancel.is_canceled() {
            stats.flush_reason = FlushReason::Canceled;
            break 'docs;
        }
        if deadline.expired() {
            stats.flush_reason = FlushReason::WallTimeLimit;
            break 'docs;
        }
        if shard_match_count >= options.shard_max_match_count {
            stats.flush_reason = FlushReason::ShardMatchCountLimit;
            break 'docs;
        }

        stats.shard_files_considered += 1;

        let doc = match index.document(doc_id) {
            Ok(d) => d,
            Err(_) => {
                stats.crashes += 1;
                continue;
            }
        };
        let repo = index.repo(doc.repo_idx)?;
        if repo.tombstone {
            stats.files_skipped += 1;
            continue;
        }

        let repo_count = repo_match_counts.entry(doc.repo_idx).or_insert(0);
        if *repo_count >= options.shard_repo_max_match_count {
            stats.files_skipped += 1;
            continue;
        }
        stats.files_considered += 1;

        let Some(spans) = compiled.evaluate(index, doc_id)? else {
            continue;
        };
        stats.files_loaded += 1;

        let name = index.doc_name_str(doc_id)?;
        if repo.is_file_tombstoned(name) {
            stats.files_skipped += 1;
            continue;
        }

        let branches = matched_branches(index, repo, doc.branch_mask, &branch_predicates);
        if branches.is_empty() && !branch_predicates.is_empty() {
            // every branch() predicate failed to match this document's own branches
            continue;
        }

        stats.match_count += 1;
        shard_match_count += 1;
        *repo_count += 1;
        stats.file_count += 1;

        let file_match = build_file_match(
            index,
            doc_id,
            &simplified,
            repo.name.clone(),
            name.to_string(),
            branches,
            &spans,
            &scorer,
            doc_index as u32,
            repo.rank,
            options,
        )?;
        files.push(file_match);
        if options.use_bm25 {
            bm25_inputs.push((spans, doc.content_size as u32));
        }

        if stats.match_count >= options.total_max_match_count {
            stats.flush_reason = FlushReason::TotalMatchCountLimit;
            break 'docs;
        }
    }
    stats.match_tree_search = search_start.elapsed();

    if options.use_bm25 {
        let corpus = build_bm25_corpus(&bm25_inputs);
        let weights = crate::query::scorer::ScoringWeights::default();
        for (file, (spans, doc_len)) in files.iter_mut().zip(bm25_inputs.iter()) {
            let terms = bm25_terms(spans);
            file.score = bm25_score(&weights, &corpus, &Bm25DocumentTerms { terms, doc_len: *doc_len });
        }
    }

    files.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(max) = options.max_doc_display_count {
        files.truncate(max as usize);
    }

    stats.duration = wall_start.elapsed();
    Ok(SearchResultSet { files, stats })
}

pub fn list(index: &IndexData, query: &Query, options: &ListOptions) -> SearchResult<Vec<ListEntry>> {
    let simplified = simplify::simplify(query, index);
    if matches!(simplified, Query::Const(false)) {
        return Ok(Vec::new());
    }
    let compiled = tree::compile(&simplified, index)?;

    let mut per_repo = std::collections::HashMap::<u16, (u64, u64, bool)>::new();
    for doc_id in compiled.candidates.iter() {
        let doc = index.document(doc_id)?;
        if compiled.evaluate(index, doc_id)?.is_none() {
            continue;
        }
        let has_symbols = !index.doc_symbols(doc_id)?.is_empty();
        let entry = per_repo.entry(doc.repo_idx).or_insert((0, 0, false));
        entry.0 += 1;
        entry.1 += 1;
        entry.2 |= has_symbols;
    }

    let mut entries: Vec<ListEntry> = per_repo
        .into_iter()
        .filter_map(|(repo_idx, (file_count, match_count, has_symbols))| {
            index.repo(repo_idx).ok().map(|r| {
                let metadata = if options.full_repo_metadata {
                    RepoMetadata::Full(r.clone())
                } else {
                    RepoMetadata::Minimal(MinimalRepoInfo { has_symbols, branches: r.branches.clone() })
                };
                ListEntry { repo: r.name.clone(), file_count, match_count, metadata }
            })
        })
        .collect();
    entries.sort_by(|a, b| a.repo.cmp(&b.repo));
    if let Some(max) = options.max_repo_display_count {
        entries.truncate(max as usize);
    }
    Ok(entries)
}

/// Build the shard-global statistics BM25 needs from the spans
/// and byte lengths of every document the first pass matched: how many of
/// those documents each term hit, and their average length.
fn build_bm25_corpus(inputs: &[(Vec<MatchSpan>, u32)]) -> Bm25Corpus {
    let mut document_frequency = std::collections::HashMap::<String, u32>::new();
    let mut total_len: u64 = 0;
    for (spans, doc_len) in inputs {
        let mut seen = std::collections::HashSet::new();
        for span in spans {
            if !span.term.is_empty() {
                seen.insert(span.term.as_str());
            }
        }
        for term in seen {
            *document_frequency.entry(term.to_string()).or_insert(0) += 1;
        }
        total_len += *doc_len as u64;
    }
    let doc_count = inputs.len() as u32;
    let avg_doc_len = if doc_count > 0 { total_len as f32 / doc_count as f32 } else { 0.0 };
    Bm25Corpus { document_frequency, doc_count, avg_doc_len }
}

/// Group one document's matched spans into BM25 term entries:
/// one `(term, frequency, is_filename_hit)` tuple per term per location
/// class, since a filename hit and a content hit of the same term carry
/// different weights.
fn bm25_terms(spans: &[MatchSpan]) -> Vec<(String, u32, bool)> {
    let mut counts = std::collections::HashMap::<(String, bool), u32>::new();
    for span in spans {
        if span.term.is_empty() {
            continue;
        }
        *counts.entry((span.term.clone(), span.file_name)).or_insert(0) += 1;
    }
    counts.into_iter().map(|((term, file_name), tf)| (term, tf, file_name)).collect()
}

/// One positive, content/filename-producing leaf atom of a query: the unit
/// the atom-count scoring factor rewards a file for satisfying many of.
/// A `not(...)` atom's absence can't be "satisfied", so it never appears
/// here.
enum ScoredAtom<'a> {
    Substring { pattern: &'a str },
    Regexp { pattern: &'a str, case_sensitive: bool, file_name: bool, content: bool },
}

fn collect_scored_atoms<'a>(query: &'a Query, out: &mut Vec<ScoredAtom<'a>>) {
    match query {
        Query::And(children) | Query::Or(children) => {
            for child in children {
                collect_scored_atoms(child, out);
            }
        }
        Query::Symbol(inner) | Query::Type(_, inner) => collect_scored_atoms(inner, out),
        Query::Substring { pattern, .. } => out.push(ScoredAtom::Substring { pattern }),
        Query::Regexp { pattern, case_sensitive, file_name, content } => {
            out.push(ScoredAtom::Regexp { pattern, case_sensitive: *case_sensitive, file_name: *file_name, content: *content });
        }
        _ => {}
    }
}

fn atom_is_satisfied(atom: &ScoredAtom, spans: &[MatchSpan], content: &str, path: &str) -> bool {
    match atom {
        ScoredAtom::Substring { pattern } => spans.iter().any(|s| s.term == *pattern),
        ScoredAtom::Regexp { pattern, case_sensitive, file_name, content: in_content } => {
            let src = if *case_sensitive { pattern.to_string() } else { format!("(?i){pattern}") };
            let Ok(re) = Regex::new(&src) else { return false };
            (*in_content && re.is_match(content)) || (*file_name && re.is_match(path))
        }
    }
}

fn matched_branches(
    index: &IndexData,
    repo: &crate::index::types::Repository,
    branch_mask: u64,
    predicates: &[(String, bool)],
) -> Vec<String> {
    let _ = index;
    let doc_branches: Vec<&str> = repo
        .branches
        .iter()
        .enumerate()
        .filter(|(i, _)| branch_mask & (1u64 << i) != 0)
        .map(|(_, b)| b.name.as_str())
        .collect();

    if predicates.is_empty() {
        return doc_branches.into_iter().map(String::from).collect();
    }
    doc_branches
        .into_iter()
        .filter(|name| predicates.iter().any(|(pattern, exact)| tree::branch_matches(pattern, *exact, name)))
        .map(String::from)
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn build_file_match(
    index: &IndexData,
    doc_id: DocId,
    query: &Query,
    repo_name: String,
    path: String,
    branches: Vec<String>,
    spans: &[MatchSpan],
    scorer: &Scorer,
    doc_index: u32,
    shard_rank: u16,
    options: &SearchOptions,
) -> SearchResult<FileMatch> {
    let doc = index.document(doc_id)?;
    let language = index.language_name(doc.language).map(String::from);
    let symbols = index.doc_symbols(doc_id)?;
    let newlines = index.doc_newlines(doc_id)?;
    let content_spans: Vec<&MatchSpan> = spans.iter().filter(|s| !s.file_name).collect();
    let filename_spans: Vec<&MatchSpan> = spans.iter().filter(|s| s.file_name).collect();

    let content = index.doc_content_str(doc_id)?;
    let mut match_scores = Vec::with_capacity(spans.len());

    let line_of = |offset: u32| newlines.partition_point(|&nl| nl < offset) as u32;

    for span in &content_spans {
        let boundary = classify_boundary(content, span.start as usize, span.end as usize);
        let symbol = classify_symbol(&symbols, span, &newlines, line_of);
        let symbol_is_important_kind = symbols
            .iter()
            .find(|sec| span.start >= sec.start && span.end <= sec.end)
            .and_then(|sec| index.symbol_meta(sec.symbol_id).ok())
            .map(|m| m.kind.is_important())
            .unwrap_or(false);

        match_scores.push(scorer.score_match(&MatchFactors {
            boundary,
            symbol,
            symbol_is_important_kind,
            is_filename_match: false,
            filename_quality: None,
        }));
    }
    for _span in &filename_spans {
        let quality = classify_filename_quality(&path, _span);
        match_scores.push(scorer.score_match(&MatchFactors {
            boundary: BoundaryQuality::FullWord,
            symbol: SymbolQuality::None,
            symbol_is_important_kind: false,
            is_filename_match: true,
            filename_quality: Some(quality),
        }));
    }

    let mut atoms = Vec::new();
    collect_scored_atoms(query, &mut atoms);
    let (matched_atoms, total_atoms) = if atoms.is_empty() {
        (if spans.is_empty() { 0 } else { 1 }, 1)
    } else {
        let matched = atoms.iter().filter(|a| atom_is_satisfied(a, spans, content, &path)).count() as u32;
        (matched, atoms.len() as u32)
    };
    let score = scorer.score_document(
        &match_scores,
        &DocumentScoreContext {
            matched_atoms,
            total_atoms,
            doc_index,
            shard_rank,
            document_rank: None,
            document_ranks_weight: options.document_ranks_weight,
        },
    );

    let chunks = if !options.chunk_matches {
        Vec::new()
    } else if !content_spans.is_empty() {
        chunk_content_spans(index, content, &content_spans, &symbols, &newlines, options.num_context_lines)
    } else if !filename_spans.is_empty() {
        // No content match survived, so the filename itself is reported as
        // the one match for this file: a single chunk, start=0, spanning
        // the whole filename.
        vec![filename_chunk(&path)]
    } else {
        Vec::new()
    };

    Ok(FileMatch { repo: repo_name, path, branches, language, score, chunks })
}

fn classify_boundary(content: &str, start: usize, end: usize) -> BoundaryQuality {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before_ok = content[..start].chars().next_back().map(|c| !is_word(c)).unwrap_or(true);
    let after_ok = content[end..].chars().next().map(|c| !is_word(c)).unwrap_or(true);
    match (before_ok, after_ok) {
        (true, true) => BoundaryQuality::FullWord,
        (true, false) | (false, true) => BoundaryQuality::PartialWord,
        (false, false) => BoundaryQuality::Interior,
    }
}

fn classify_symbol(
    symbols: &[crate::index::types::SymbolSection],
    span: &MatchSpan,
    _newlines: &[u32],
    line_of: impl Fn(u32) -> u32,
) -> SymbolQuality {
    for sec in symbols {
        if span.start == sec.start && span.end == sec.end {
            return SymbolQuality::ExactSpan;
        }
        let overlaps = span.start < sec.end && span.end > sec.start;
        if overlaps {
            return SymbolQuality::PartialSpan;
        }
        if line_of(span.start) == line_of(sec.start) {
            return SymbolQuality::Interior;
        }
    }
    SymbolQuality::None
}

fn classify_filename_quality(path: &str, span: &MatchSpan) -> FilenameQuality {
    let basename_start = path.rfind('/').map(|i| i + 1).unwrap_or(0) as u32;
    let end = path.len() as u32;
    if span.start == basename_start && span.end == end {
        FilenameQuality::WholeBasename
    } else if span.start == basename_start || span.end == end {
        FilenameQuality::PrefixOrSuffix
    } else {
        FilenameQuality::Interior
    }
}

/// The single match reported for a filename-only hit: one chunk covering
/// the whole filename, `start=0, length=filename length`, per §4.8.
fn filename_chunk(path: &str) -> ChunkMatch {
    let range = MatchRange { line: 0, start_col: 0, end_col: path.len() as u32, file_name: true };
    ChunkMatch { content: path.to_string(), start_line: 0, ranges: vec![range], symbols: Vec::new() }
}

fn chunk_content_spans(
    index: &IndexData,
    content: &str,
    spans: &[&MatchSpan],
    symbols: &[crate::index::types::SymbolSection],
    newlines: &[u32],
    context_lines: u32,
) -> Vec<ChunkMatch> {
    if spans.is_empty() {
        return Vec::new();
    }
    let line_of = |offset: u32| newlines.partition_point(|&nl| nl < offset) as u32;
    let line_start_byte = |line: u32| if line == 0 { 0 } else { newlines[(line - 1) as usize] + 1 };
    let line_end_byte = |line: u32| newlines.get(line as usize).copied().unwrap_or(content.len() as u32);

    let mut chunks = Vec::new();
    for span in spans {
        let line = line_of(span.start);
        let first = line.saturating_sub(context_lines);
        let last = (line + context_lines).min(newlines.len() as u32);
        let start_byte = line_start_byte(first);
        let end_byte = line_end_byte(last);
        let text = &content[start_byte as usize..end_byte as usize];

        let range = MatchRange {
            line,
            start_col: span.start - line_start_byte(line),
            end_col: span.end - line_start_byte(line),
            file_name: false,
        };

        let chunk_symbols: Vec<SymbolInfo> = symbols
            .iter()
            .filter(|sec| sec.start >= start_byte && sec.end <= end_byte)
            .filter_map(|sec| {
                let meta = index.symbol_meta(sec.symbol_id).ok()?;
                let kind = index.symbol_kind_name(meta.kind).map(String::from).unwrap_or_else(|| "other".to_string());
                Some(SymbolInfo { name: meta.name, kind })
            })
            .collect();

        chunks.push(ChunkMatch { content: text.to_string(), start_line: first, ranges: vec![range], symbols: chunk_symbols });
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::index::writer::ShardBuilder;
    use crate::index::types::{Branch, Repository};
    use std::collections::BTreeMap;

    fn repo(name: &str, branches: Vec<&str>) -> Repository {
        Repository {
            id: 1,
            name: name.to_string(),
            rank: 0,
            branches: branches.into_iter().map(|b| Branch { name: b.to_string(), version: "v1".to_string() }).collect(),
            sub_repos: Vec::new(),
            tombstone: false,
            priority: 0,
            file_tombstones: Vec::new(),
            config: BTreeMap::new(),
            url_template: None,
            line_fragment_template: None,
        }
    }

    #[test]
    fn substring_search_returns_a_scored_match() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("acme/widgets", vec!["main"]), "main", "a.txt", "hello needle world", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        let q = Query::substring("needle", false, false, true);
        let result = search(&index, &q, &SearchOptions::default(), &CancellationToken::new()).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "a.txt");
    }

    #[test]
    fn branch_query_reports_only_matched_branches() {
        let mut b = ShardBuilder::new();
        let r = repo("acme/widgets", vec!["master", "stable"]);
        b.add_document(r.clone(), "master", "f1.txt", "needle", &[]).unwrap();
        b.add_document(r, "stable", "f2.txt", "needle", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        let q = Query::and([Query::substring("needle", false, false, true), Query::branch("table", false)]);
        let result = search(&index, &q, &SearchOptions::default(), &CancellationToken::new()).unwrap();
        let f2 = result.files.iter().find(|f| f.path == "f2.txt").unwrap();
        assert_eq!(f2.branches, vec!["stable".to_string()]);
    }

    #[test]
    fn negated_query_matches_documents_without_the_literal() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("r", vec!["main"]), "main", "a.txt", "apple", &[]).unwrap();
        b.add_document(repo("r", vec!["main"]), "main", "b.txt", "banana", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        let q = Query::not(Query::substring("apple", false, false, true));
        let result = search(&index, &q, &SearchOptions::default(), &CancellationToken::new()).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, "b.txt");
    }

    #[test]
    fn bloom_filter_rejects_the_whole_shard_for_an_absent_literal() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("r", vec!["main"]), "main", "a.txt", "hello world", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        // "nonexiste" is a single 9-byte fragment that never appears
        // anywhere in the shard's content, so the bloom filter must prove
        // its absence without the document loop ever running.
        let q = Query::substring("nonexiste", false, false, true);
        let result = search(&index, &q, &SearchOptions::default(), &CancellationToken::new()).unwrap();
        assert!(result.files.is_empty());
        assert_eq!(result.stats.shards_skipped_filter, 1);
        assert_eq!(result.stats.shard_files_considered, 0);
        assert_eq!(result.stats.flush_reason, FlushReason::FilterRejected);
    }

    #[test]
    fn bloom_filter_does_not_reject_a_literal_present_in_the_shard() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("r", vec!["main"]), "main", "a.txt", "hello needle world", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        let q = Query::substring("needle", false, false, true);
        let result = search(&index, &q, &SearchOptions::default(), &CancellationToken::new()).unwrap();
        assert_eq!(result.stats.shards_skipped_filter, 0);
        assert_eq!(result.files.len(), 1);
    }
}
