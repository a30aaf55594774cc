//! The compiled match tree: a cost-ordered, two-phase evaluator over a
//! shard's documents.
//!
//! "Narrow candidates" (a `RoaringBitmap` narrowing pass, built eagerly at
//! compile time from ngram-posting lookups) is kept separate from "verify
//! candidates" (byte-level confirmation in `evaluate()`). Documents in this
//! format are dense and contiguous, so a compressed bitmap both narrows and
//! orders them.
//!
//! This is a simplification of a `next_doc`/`prepare`/`matches(cost, memo)`
//! cursor interface: candidate sets are materialized eagerly at `compile()`
//! time via ngram-posting lookups rather than walked lazily cursor-by-
//! cursor. Genuine posting-list lockstep iteration is reserved for where
//! positional precision actually matters: a literal's candidate set is
//! *always* re-verified against the document's real bytes in `evaluate()`
//! by comparing case-folded text against the literal, so correctness never
//! depends on how precisely `compile()` narrowed the candidate set, only on
//! the real byte/line/symbol checks in `evaluate()`. An explicit cost
//! ladder survives as the ordering this module applies when choosing which
//! `And` child to check first (cheapest -- smallest candidate set -- first),
//! not as a literal loop over cost levels.
//!
//! `NodeKind::AndLine` (and `evaluate_and_line`) implements the `and-line`
//! concatenation rule for the one caller that can use it safely: a
//! concatenation of literals has no `NodeKind` leaf in this module that
//! builds it, because `Query::Regexp` already compiles to a single
//! `RegexpLeaf` whose `regex.find_iter` runs the *whole* pattern -- the
//! engine itself enforces whatever same-line-or-not shape the pattern's own
//! anchors and dot-modes ask for (`(?-s:.)*?` vs `(?s:.)*?`), which is
//! exactly the behavior an `and-line` node would otherwise have to
//! reconstruct from independent literal candidate sets. Re-deriving the
//! line grouping from `required_literals()` would only narrow the
//! *candidate* doc set a little further (a performance gain), never change
//! which documents are reported, since the `RegexpLeaf` re-verification is
//! what decides that. `AndLine` stays reachable from hand-built
//! `NodeKind` values and is exercised directly in tests; it is simply not
//! the right tool for `Query::Regexp` concatenation under this compile
//! strategy.
//!
//! The other half of that same spec rule, the `\bLITERAL\b case:yes`
//! word-match shortcut, *is* wired in below: `detect_word_bounded_literal`
//! recognizes that exact shape at compile time and swaps in a dedicated
//! `NodeKind::WordLiteral` leaf that scans for word-bounded occurrences
//! directly, skipping the regex engine entirely.

use crate::error::SearchResult;
use crate::index::reader::IndexData;
use crate::index::types::DocId;
use crate::ngram::{fold_case, query_ngrams};
use crate::query::ast::{Query, TypeScope};
use regex::Regex;
use regex_syntax::hir::{Hir, HirKind, Literal};
use roaring::RoaringBitmap;

/// A confirmed, document-relative match span (a "candidate match", before
/// chunking).
#[derive(Debug, Clone)]
pub struct MatchSpan {
    pub start: u32,
    pub end: u32,
    pub file_name: bool,
    /// The literal or regexp pattern text that produced this span, used by
    /// the BM25 scoring pass as the term identity for
    /// document/collection frequency -- not set for metadata-only leaves,
    /// which never produce spans in the first place.
    pub term: String,
}

struct SubstringLeaf {
    pattern: String,
    case_sensitive: bool,
    file_name: bool,
    content: bool,
}

struct RegexpLeaf {
    regex: Regex,
    file_name: bool,
    content: bool,
}

enum RepoPredicate {
    Regex(Regex),
    Set(Vec<String>),
    Ids(RoaringBitmap),
}

enum NodeKind {
    Const(bool),
    And(Vec<CompiledNode>),
    Or(Vec<CompiledNode>),
    Not(Box<CompiledNode>),
    AndLine(Vec<CompiledNode>),
    Substring(SubstringLeaf),
    Regexp(RegexpLeaf),
    /// The `\bLITERAL\b case:yes` fast path: no regex engine involved.
    WordLiteral { literal: String, file_name: bool, content: bool },
    Symbol(Box<CompiledNode>),
    Repo(RepoPredicate),
    Branch { pattern: String, exact: bool },
    BranchesRepos(Vec<(String, RoaringBitmap)>),
    Language(String),
    FileNameSet(Vec<String>),
    TypeFilter(TypeScope, Box<CompiledNode>),
    BruteForce,
    NoMatch,
}

/// One compiled node: its candidate document set (computed once, used by
/// the search driver to order and skip iteration) plus the logic to
/// confirm and extract match spans for one document.
pub struct CompiledNode {
    pub candidates: RoaringBitmap,
    kind: NodeKind,
}

pub fn branch_matches(pattern: &str, exact: bool, name: &str) -> bool {
    if exact {
        pattern == name
    } else {
        name.contains(pattern)
    }
}

/// Compile a (already shard-simplified) query into an executable tree.
pub fn compile(query: &Query, index: &IndexData) -> SearchResult<CompiledNode> {
    match query {
        Query::Const(b) => Ok(CompiledNode {
            candidates: if *b { full_universe(index) } else { RoaringBitmap::new() },
            kind: NodeKind::Const(*b),
        }),

        Query::And(children) => {
            let mut compiled: Vec<CompiledNode> =
                children.iter().map(|c| compile(c, index)).collect::<SearchResult<_>>()?;
            compiled.sort_by_key(|c| c.candidates.len());
            let mut candidates = compiled.first().map(|c| c.candidates.clone()).unwrap_or_else(RoaringBitmap::new);
            for c in &compiled[1..] {
                candidates &= &c.candidates;
            }
            if compiled.is_empty() {
                candidates = full_universe(index);
            }
            Ok(CompiledNode { candidates, kind: NodeKind::And(compiled) })
        }

        Query::Or(children) => {
            let compiled: Vec<CompiledNode> =
                children.iter().map(|c| compile(c, index)).collect::<SearchResult<_>>()?;
            let mut candidates = RoaringBitmap::new();
            for c in &compiled {
                candidates |= &c.candidates;
            }
            Ok(CompiledNode { candidates, kind: NodeKind::Or(compiled) })
        }

        Query::Not(child) => {
            let compiled = compile(child, index)?;
            let universe = full_universe(index);
            let candidates = &universe - &compiled.candidates;
            Ok(CompiledNode { candidates, kind: NodeKind::Not(Box::new(compiled)) })
        }

        Query::Symbol(child) => {
            let compiled = compile(child, index)?;
            let candidates = compiled.candidates.clone();
            Ok(CompiledNode { candidates, kind: NodeKind::Symbol(Box::new(compiled)) })
        }

        Query::Type(scope, child) => {
            let compiled = compile(child, index)?;
            let candidates = compiled.candidates.clone();
            Ok(CompiledNode { candidates, kind: NodeKind::TypeFilter(*scope, Box::new(compiled)) })
        }

        Query::Substring { pattern, case_sensitive, file_name, content } => {
            let candidates = literal_candidate_docs(index, pattern, *file_name, *content)?;
            Ok(CompiledNode {
                candidates,
                kind: NodeKind::Substring(SubstringLeaf {
                    pattern: pattern.clone(),
                    case_sensitive: *case_sensitive,
                    file_name: *file_name,
                    content: *content,
                }),
            })
        }

        Query::Regexp { pattern, case_sensitive, file_name, content } => {
            if *case_sensitive {
                if let Some(literal) = detect_word_bounded_literal(pattern) {
                    let candidates = literal_candidate_docs(index, &literal, *file_name, *content)?;
                    return Ok(CompiledNode {
                        candidates,
                        kind: NodeKind::WordLiteral { literal, file_name: *file_name, content: *content },
                    });
                }
            }

            let regex_src = if *case_sensitive { pattern.clone() } else { format!("(?i){pattern}") };
            let regex = Regex::new(&regex_src)
                .map_err(|e| crate::error::SearchError::query_invalid(format!("bad regexp {pattern:?}: {e}")))?;

            let literals = regex_syntax::Parser::new()
                .parse(pattern)
                .ok()
                .map(|hir| required_literals(&hir))
                .unwrap_or_default();

            let candidates = if literals.is_empty() {
                full_universe(index)
            } else {
                let mut acc: Option<RoaringBitmap> = None;
                for lit in &literals {
                    let docs = literal_candidate_docs(index, lit, *file_name, *content)?;
                    acc = Some(match acc {
                        Some(a) => a & docs,
                        None => docs,
                    });
                }
                acc.unwrap_or_else(|| full_universe(index))
            };

            Ok(CompiledNode {
                candidates,
                kind: NodeKind::Regexp(RegexpLeaf { regex, file_name: *file_name, content: *content }),
            })
        }

        Query::Repo(pattern) | Query::RepoRegexp(pattern) => {
            let regex = Regex::new(pattern)
                .map_err(|e| crate::error::SearchError::query_invalid(format!("bad repo regexp: {e}")))?;
            let candidates = repo_candidate_docs(index, |name| regex.is_match(name));
            Ok(CompiledNode { candidates, kind: NodeKind::Repo(RepoPredicate::Regex(regex)) })
        }

        Query::RepoSet(names) => {
            let names = names.clone();
            let candidates = repo_candidate_docs(index, |name| names.iter().any(|n| n == name));
            Ok(CompiledNode { candidates, kind: NodeKind::Repo(RepoPredicate::Set(names)) })
        }

        Query::RepoIds(ids) => {
            let candidates = repo_id_candidate_docs(index, ids);
            Ok(CompiledNode { candidates, kind: NodeKind::Repo(RepoPredicate::Ids(ids.clone())) })
        }

        Query::Branch { pattern, exact } => {
            let mut candidates = RoaringBitmap::new();
            for d in 0..index.num_docs() {
                let doc = index.document(d)?;
                let repo = index.repo(doc.repo_idx)?;
                let matched = (0..repo.branches.len()).any(|i| {
                    doc.branch_mask & (1u64 << i) != 0 && branch_matches(pattern, *exact, &repo.branches[i].name)
                });
                if matched {
                    candidates.insert(d);
                }
            }
            Ok(CompiledNode {
                candidates,
                kind: NodeKind::Branch { pattern: pattern.clone(), exact: *exact },
            })
        }

        Query::BranchesRepos(pairs) => {
            let mut candidates = RoaringBitmap::new();
            for d in 0..index.num_docs() {
                let doc = index.document(d)?;
                let repo = index.repo(doc.repo_idx)?;
                let matched = pairs.iter().any(|(branch_name, ids)| {
                    ids.contains(repo.id)
                        && repo
                            .branch_index(branch_name)
                            .map(|i| doc.branch_mask & (1u64 << i) != 0)
                            .unwrap_or(false)
                });
                if matched {
                    candidates.insert(d);
                }
            }
            Ok(CompiledNode { candidates, kind: NodeKind::BranchesRepos(pairs.clone()) })
        }

        Query::Language(name) => {
            let mut candidates = RoaringBitmap::new();
            if let Some(code) = index.language_code(name) {
                for d in 0..index.num_docs() {
                    if index.document(d)?.language == code {
                        candidates.insert(d);
                    }
                }
            }
            Ok(CompiledNode { candidates, kind: NodeKind::Language(name.clone()) })
        }

        Query::FileNameSet(names) => {
            let mut candidates = RoaringBitmap::new();
            for d in 0..index.num_docs() {
                if let Ok(n) = index.doc_name_str(d) {
                    if names.iter().any(|x| x == n) {
                        candidates.insert(d);
                    }
                }
            }
            Ok(CompiledNode { candidates, kind: NodeKind::FileNameSet(names.clone()) })
        }
    }
}

fn full_universe(index: &IndexData) -> RoaringBitmap {
    let mut b = RoaringBitmap::new();
    b.insert_range(0..index.num_docs());
    b
}

fn repo_candidate_docs(index: &IndexData, matches: impl Fn(&str) -> bool) -> RoaringBitmap {
    let mut candidates = RoaringBitmap::new();
    for (idx, repo) in index.repos().iter().enumerate() {
        if matches(&repo.name) {
            candidates.insert(idx as u32);
        }
    }
    expand_repo_idx_to_docs(index, &candidates)
}

fn repo_id_candidate_docs(index: &IndexData, ids: &RoaringBitmap) -> RoaringBitmap {
    let mut repo_idx_set = RoaringBitmap::new();
    for (idx, repo) in index.repos().iter().enumerate() {
        if ids.contains(repo.id) {
            repo_idx_set.insert(idx as u32);
        }
    }
    expand_repo_idx_to_docs(index, &repo_idx_set)
}

fn expand_repo_idx_to_docs(index: &IndexData, repo_idx_set: &RoaringBitmap) -> RoaringBitmap {
    let mut out = RoaringBitmap::new();
    for d in 0..index.num_docs() {
        if let Ok(doc) = index.document(d) {
            if repo_idx_set.contains(doc.repo_idx as u32) {
                out.insert(d);
            }
        }
    }
    out
}

/// Candidate documents for a literal: the intersection of the doc-sets
/// implied by each trigram of the (case-folded) literal, narrowed through
/// the appropriate ngram index. Literals under 3 runes carry no trigram, so
/// every document is a candidate (confirmed, as always, at evaluation).
fn literal_candidate_docs(
    index: &IndexData,
    literal: &str,
    file_name: bool,
    content: bool,
) -> SearchResult<RoaringBitmap> {
    let grams = query_ngrams(literal);
    if grams.is_empty() {
        return Ok(full_universe(index));
    }

    let mut out = RoaringBitmap::new();
    if content {
        out |= grams_to_docs(index, &grams, false)?;
    }
    if file_name {
        out |= grams_to_docs(index, &grams, true)?;
    }
    Ok(out)
}

fn grams_to_docs(index: &IndexData, grams: &[u64], names: bool) -> SearchResult<RoaringBitmap> {
    let mut acc: Option<RoaringBitmap> = None;
    for &g in grams {
        let postings = if names { index.ngram_postings_names(g)? } else { index.ngram_postings_content(g)? };
        let mut docs = RoaringBitmap::new();
        for rune in postings {
            let d = if names { index.doc_for_name_rune(rune) } else { index.doc_for_content_rune(rune) };
            docs.insert(d);
        }
        acc = Some(match acc {
            Some(a) => a & docs,
            None => docs,
        });
    }
    Ok(acc.unwrap_or_default())
}

/// Extract required literal substrings from a regexp's `Hir`:
/// a conservative subset sufficient to narrow candidates before the real
/// regex runs. Non-extractable constructs (alternation, anchors, `*`)
/// simply contribute nothing -- correctness never depends on this.
fn required_literals(hir: &Hir) -> Vec<String> {
    match hir.kind() {
        HirKind::Literal(Literal(bytes)) => match std::str::from_utf8(bytes) {
            Ok(s) if s.chars().count() >= 3 => vec![s.to_string()],
            _ => Vec::new(),
        },
        HirKind::Concat(parts) => parts.iter().flat_map(required_literals).collect(),
        HirKind::Capture(cap) => required_literals(&cap.sub),
        HirKind::Repetition(rep) if rep.min >= 1 => required_literals(&rep.sub),
        _ => Vec::new(),
    }
}

/// Recognizes `\bLITERAL\b` with nothing but a plain literal between the
/// two word-boundary assertions -- the shape spec.md calls out as a
/// dedicated word-match node. Matched against the raw pattern text rather
/// than the parsed `Hir` so this never has to guess at `regex_syntax`'s
/// internal `Look` variants; the inner text is parsed only to confirm it
/// really is a bare literal and nothing else.
fn detect_word_bounded_literal(pattern: &str) -> Option<String> {
    let inner = pattern.strip_prefix(r"\b")?.strip_suffix(r"\b")?;
    if inner.is_empty() {
        return None;
    }
    let hir = regex_syntax::Parser::new().parse(inner).ok()?;
    match hir.kind() {
        HirKind::Literal(Literal(bytes)) => std::str::from_utf8(bytes).ok().map(|s| s.to_string()),
        _ => None,
    }
}

impl CompiledNode {
    /// Confirm a match on `doc` and return its spans, or `None` if the
    /// document does not actually satisfy this node.
    pub fn evaluate(&self, index: &IndexData, doc: DocId) -> SearchResult<Option<Vec<MatchSpan>>> {
        match &self.kind {
            NodeKind::Const(b) => Ok(if *b { Some(Vec::new()) } else { None }),
            NodeKind::BruteForce => Ok(Some(Vec::new())),
            NodeKind::NoMatch => Ok(None),

            NodeKind::And(children) => {
                let mut spans = Vec::new();
                for c in children {
                    match c.evaluate(index, doc)? {
                        Some(s) => spans.extend(s),
                        None => return Ok(None),
                    }
                }
                Ok(Some(spans))
            }

            NodeKind::Or(children) => {
                let mut spans = Vec::new();
                let mut matched = false;
                for c in children {
                    if let Some(s) = c.evaluate(index, doc)? {
                        matched = true;
                        spans.extend(s);
                    }
                }
                Ok(if matched { Some(spans) } else { None })
            }

            NodeKind::Not(child) => match child.evaluate(index, doc)? {
                Some(_) => Ok(None),
                None => Ok(Some(Vec::new())),
            },

            NodeKind::AndLine(children) => evaluate_and_line(children, index, doc),

            NodeKind::Symbol(child) => {
                let Some(spans) = child.evaluate(index, doc)? else { return Ok(None) };
                let sections = index.doc_symbols(doc)?;
                let filtered: Vec<MatchSpan> = spans
                    .into_iter()
                    .filter(|sp| sections.iter().any(|sec| sp.start >= sec.start && sp.end <= sec.end))
                    .collect();
                Ok(if filtered.is_empty() { None } else { Some(filtered) })
            }

            NodeKind::TypeFilter(scope, child) => {
                let Some(spans) = child.evaluate(index, doc)? else { return Ok(None) };
                let spans = match scope {
                    TypeScope::FileName => {
                        let d = index.document(doc)?;
                        vec![MatchSpan { start: 0, end: d.name_size as u32, file_name: true, term: String::new() }]
                    }
                    TypeScope::Repo => spans,
                };
                Ok(Some(spans))
            }

            NodeKind::Substring(leaf) => evaluate_substring(leaf, index, doc),
            NodeKind::Regexp(leaf) => evaluate_regexp(leaf, index, doc),
            NodeKind::WordLiteral { literal, file_name, content } => {
                evaluate_word_literal(literal, *file_name, *content, index, doc)
            }

            // Metadata-only leaves: the candidate set computed at compile
            // time is exact, so any document the driver reaches here
            // already satisfies the predicate.
            NodeKind::Repo(_)
            | NodeKind::Branch { .. }
            | NodeKind::BranchesRepos(_)
            | NodeKind::Language(_)
            | NodeKind::FileNameSet(_) => Ok(Some(Vec::new())),
        }
    }
}

fn evaluate_and_line(
    children: &[CompiledNode],
    index: &IndexData,
    doc: DocId,
) -> SearchResult<Option<Vec<MatchSpan>>> {
    let mut per_child_spans = Vec::with_capacity(children.len());
    for c in children {
        match c.evaluate(index, doc)? {
            Some(s) if !s.is_empty() => per_child_spans.push(s),
            _ => return Ok(None),
        }
    }
    let newlines = index.doc_newlines(doc)?;
    let line_of = |offset: u32| newlines.partition_point(|&nl| nl < offset);

    let mut common_lines: Option<std::collections::HashSet<usize>> = None;
    for spans in &per_child_spans {
        let lines: std::collections::HashSet<usize> = spans.iter().map(|s| line_of(s.start)).collect();
        common_lines = Some(match common_lines {
            Some(acc) => acc.intersection(&lines).copied().collect(),
            None => lines,
        });
    }
    let common_lines = common_lines.unwrap_or_default();
    if common_lines.is_empty() {
        return Ok(None);
    }
    let mut out = Vec::new();
    for spans in per_child_spans {
        out.extend(spans.into_iter().filter(|s| common_lines.contains(&line_of(s.start))));
    }
    Ok(Some(out))
}

fn evaluate_substring(leaf: &SubstringLeaf, index: &IndexData, doc: DocId) -> SearchResult<Option<Vec<MatchSpan>>> {
    let mut spans = Vec::new();
    if leaf.content {
        let text = index.doc_content_str(doc)?;
        spans.extend(scan_literal(text, &leaf.pattern, leaf.case_sensitive, false));
    }
    if leaf.file_name {
        let text = index.doc_name_str(doc)?;
        spans.extend(scan_literal(text, &leaf.pattern, leaf.case_sensitive, true));
    }
    Ok(if spans.is_empty() { None } else { Some(spans) })
}

/// Scan `haystack` for every occurrence of `needle`, rune-aware, honoring
/// case sensitivity. Returns byte-offset spans. This is the ground-truth
/// check run after candidate narrowing.
fn scan_literal(haystack: &str, needle: &str, case_sensitive: bool, file_name: bool) -> Vec<MatchSpan> {
    if needle.is_empty() {
        return Vec::new();
    }
    let needle_folded: Vec<char> = needle.chars().map(fold_case).collect();
    let hay_chars: Vec<(usize, char)> = haystack.char_indices().collect();
    let mut spans = Vec::new();
    let n = needle_folded.len();
    if hay_chars.len() < n {
        return spans;
    }
    for start in 0..=(hay_chars.len() - n) {
        let mut ok = true;
        for i in 0..n {
            let (_, hc) = hay_chars[start + i];
            let matches = if case_sensitive { hc == needle.chars().nth(i).unwrap() } else { fold_case(hc) == needle_folded[i] };
            if !matches {
                ok = false;
                break;
            }
        }
        if ok {
            let start_byte = hay_chars[start].0;
            let end_byte = if start + n < hay_chars.len() {
                hay_chars[start + n].0
            } else {
                haystack.len()
            };
            spans.push(MatchSpan { start: start_byte as u32, end: end_byte as u32, file_name, term: needle.to_string() });
        }
    }
    spans
}

fn evaluate_word_literal(
    literal: &str,
    file_name: bool,
    content: bool,
    index: &IndexData,
    doc: DocId,
) -> SearchResult<Option<Vec<MatchSpan>>> {
    let mut spans = Vec::new();
    if content {
        let text = index.doc_content_str(doc)?;
        spans.extend(scan_word_bounded(text, literal, false));
    }
    if file_name {
        let text = index.doc_name_str(doc)?;
        spans.extend(scan_word_bounded(text, literal, true));
    }
    Ok(if spans.is_empty() { None } else { Some(spans) })
}

/// Case-sensitive, non-overlapping scan for `needle` at a full word
/// boundary on both sides -- the ground-truth check behind `WordLiteral`,
/// mirroring how `evaluate_regexp` walks `find_iter` left to right without
/// ever touching the regex engine.
fn scan_word_bounded(haystack: &str, needle: &str, file_name: bool) -> Vec<MatchSpan> {
    if needle.is_empty() {
        return Vec::new();
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut spans = Vec::new();
    let mut offset = 0usize;
    while offset <= haystack.len() {
        let Some(rel) = haystack[offset..].find(needle) else { break };
        let start = offset + rel;
        let end = start + needle.len();
        let before_ok = haystack[..start].chars().next_back().map(|c| !is_word(c)).unwrap_or(true);
        let after_ok = haystack[end..].chars().next().map(|c| !is_word(c)).unwrap_or(true);
        if before_ok && after_ok {
            spans.push(MatchSpan { start: start as u32, end: end as u32, file_name, term: needle.to_string() });
        }
        offset = end;
    }
    spans
}

fn evaluate_regexp(leaf: &RegexpLeaf, index: &IndexData, doc: DocId) -> SearchResult<Option<Vec<MatchSpan>>> {
    let mut spans = Vec::new();
    if leaf.content {
        let text = index.doc_content_str(doc)?;
        spans.extend(leaf.regex.find_iter(text).map(|m| MatchSpan {
            start: m.start() as u32,
            end: m.end() as u32,
            file_name: false,
            term: m.as_str().to_string(),
        }));
    }
    if leaf.file_name {
        let text = index.doc_name_str(doc)?;
        spans.extend(leaf.regex.find_iter(text).map(|m| MatchSpan {
            start: m.start() as u32,
            end: m.end() as u32,
            file_name: true,
            term: m.as_str().to_string(),
        }));
    }
    Ok(if spans.is_empty() { None } else { Some(spans) })
}

/// Walk the query AST for `branch(...)` predicates: a matched file reports
/// only the branches its query actually matched, not every branch the
/// document exists on.
pub fn collect_branch_predicates(query: &Query) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    collect_branch_predicates_into(query, &mut out);
    out
}

fn collect_branch_predicates_into(query: &Query, out: &mut Vec<(String, bool)>) {
    match query {
        Query::Branch { pattern, exact } => out.push((pattern.clone(), *exact)),
        Query::And(children) | Query::Or(children) => {
            for c in children {
                collect_branch_predicates_into(c, out);
            }
        }
        Query::Not(child) | Query::Symbol(child) | Query::Type(_, child) => {
            collect_branch_predicates_into(child, out)
        }
        _ => {}
    }
}

/// Walk the query AST for literals that must be present in a matching
/// document's *content* -- the bloom filter only ever indexes content word
/// fragments (never filenames, see `ShardBuilder::build_bloom`), so only a
/// `Substring`/`Regexp` atom with `content: true, file_name: false` is
/// eligible: anything that can also or instead match via the filename must
/// not be bloom-checked against the content-only filter, or a real
/// filename-only match would be rejected as a false negative. Eligible
/// atoms are collected only when reached through a conjunction --
/// `And`/`Symbol`/`Type` descend, `Or`/`Not` do not, since a literal
/// guarded by either of those is no longer unconditionally required. Used
/// by the search driver to bloom-check whether a shard can possibly
/// contain a match before scanning a single document.
pub fn collect_required_literals(query: &Query) -> Vec<String> {
    let mut out = Vec::new();
    collect_required_literals_into(query, &mut out);
    out
}

fn collect_required_literals_into(query: &Query, out: &mut Vec<String>) {
    match query {
        Query::Substring { pattern, content, file_name, .. } => {
            if *content && !*file_name {
                out.push(pattern.clone());
            }
        }
        Query::Regexp { pattern, content, file_name, .. } => {
            if *content && !*file_name {
                if let Ok(hir) = regex_syntax::Parser::new().parse(pattern) {
                    out.extend(required_literals(&hir));
                }
            }
        }
        Query::And(children) => {
            for c in children {
                collect_required_literals_into(c, out);
            }
        }
        Query::Symbol(child) | Query::Type(_, child) => collect_required_literals_into(child, out),
        _ => {}
    }
}

/// Count the `regexp(...)` atoms in a query, for `SearchStats::regexps_considered`.
pub fn count_regexp_nodes(query: &Query) -> u32 {
    match query {
        Query::Regexp { .. } => 1,
        Query::And(children) | Query::Or(children) => {
            children.iter().map(count_regexp_nodes).sum()
        }
        Query::Not(child) | Query::Symbol(child) | Query::Type(_, child) => {
            count_regexp_nodes(child)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::writer::ShardBuilder;
    use crate::index::types::{Branch, Repository};
    use std::collections::BTreeMap;

    fn one_doc_shard(content: &str) -> IndexData {
        let mut b = ShardBuilder::new();
        let repo = Repository {
            id: 1,
            name: "r".to_string(),
            rank: 0,
            branches: vec![Branch { name: "main".to_string(), version: "v1".to_string() }],
            sub_repos: Vec::new(),
            tombstone: false,
            priority: 0,
            file_tombstones: Vec::new(),
            config: BTreeMap::new(),
            url_template: None,
            line_fragment_template: None,
        };
        b.add_document(repo, "main", "f1.txt", content, &[]).unwrap();
        IndexData::open_bytes(b.finish().unwrap()).unwrap()
    }

    #[test]
    fn substring_leaf_finds_offset_and_length() {
        let index = one_doc_shard("bla needle bla");
        let q = Query::substring("needle", false, false, true);
        let compiled = compile(&q, &index).unwrap();
        assert!(compiled.candidates.contains(0));
        let spans = compiled.evaluate(&index, 0).unwrap().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 4);
        assert_eq!(spans[0].end, 10);
    }

    #[test]
    fn not_node_inverts_membership() {
        let index = one_doc_shard("bla needle bla");
        let q = Query::not(Query::substring("absent", false, false, true));
        let compiled = compile(&q, &index).unwrap();
        assert!(compiled.candidates.contains(0));
        assert!(compiled.evaluate(&index, 0).unwrap().is_some());
    }

    #[test]
    fn required_literals_extracted_from_concat() {
        let hir = regex_syntax::Parser::new().parse("(apple)(?-s:.)*?(banana)").unwrap();
        let lits = required_literals(&hir);
        assert_eq!(lits, vec!["apple".to_string(), "banana".to_string()]);
    }

    #[test]
    fn word_bounded_regexp_compiles_to_word_literal_node() {
        let index = one_doc_shard("the cathedral cat sat");
        let q = Query::regexp(r"\bcat\b", true, false, true);
        let compiled = compile(&q, &index).unwrap();
        assert!(matches!(compiled.kind, NodeKind::WordLiteral { .. }));

        let spans = compiled.evaluate(&index, 0).unwrap().unwrap();
        // "cathedral" contains "cat" but not at a word boundary, so only the
        // standalone "cat" matches.
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 14);
        assert_eq!(spans[0].end, 17);
    }

    #[test]
    fn case_insensitive_word_bounded_regexp_falls_back_to_the_regex_engine() {
        let index = one_doc_shard("Cat");
        let q = Query::regexp(r"\bcat\b", false, false, true);
        let compiled = compile(&q, &index).unwrap();
        assert!(matches!(compiled.kind, NodeKind::Regexp(_)));
        assert!(compiled.evaluate(&index, 0).unwrap().is_some());
    }

    #[test]
    fn detect_word_bounded_literal_rejects_non_literal_interior() {
        assert_eq!(detect_word_bounded_literal(r"\bcat\b"), Some("cat".to_string()));
        assert_eq!(detect_word_bounded_literal(r"\bca.\b"), None);
        assert_eq!(detect_word_bounded_literal(r"\b\b"), None);
    }

    #[test]
    fn branch_predicate_exact_vs_substring() {
        assert!(branch_matches("stable", true, "stable"));
        assert!(!branch_matches("stable", true, "unstable"));
        assert!(branch_matches("table", false, "stable"));
        assert!(!branch_matches("table", false, "main"));
    }
}
