//! Reference shard builder: assembles one compound shard file from
//! already-extracted `(repository, branch, path, content, symbols)` tuples
//! in a single synchronous pass.
//!
//! The overall shape -- "accumulate documents, then emit one sealed index"
//! -- carries over, but channel-driven, multi-threaded, segment-per-chunk
//! construction does not: this crate's builder exists to make shards for
//! tests and benchmarks, not to walk a filesystem or shard a monorepo, so it
//! stays single-threaded and in-memory. Language detection by extension is
//! trimmed to the handful of languages this crate's tests exercise plus a
//! generic fallback.

use crate::bloom::{extract_word_fragment_keys, BloomFilter};
use crate::checksum::checksum_content;
use crate::config::BuildConfig;
use crate::error::{SearchError, SearchResult};
use crate::format::{Section, SectionKind, ShardWriter};
use crate::index::doc_tables::{encode_newlines, encode_symbol_sections, newlines_in};
use crate::index::ngram_index::SortedArrayNgramIndex;
use crate::index::reader::{encode_bloom, encode_language_map, encode_symbol_kind_map, encode_symbol_meta};
use crate::index::repo_codec::encode_repo;
use crate::index::types::{LanguageInfo, Repository, SymbolKind, SymbolMeta, SymbolSection};
use crate::ngram::{extract_ngrams_with_positions, is_plain_ascii};
use crate::varint::delta_encode;
use std::collections::{BTreeMap, HashMap};

/// One symbol definition within a document's content, as the builder's
/// caller already extracted it -- document-relative byte offsets, matching
/// [`SymbolSection`]. Symbol sections reference global symbol metadata by
/// id, assigned here at build time.
#[derive(Debug, Clone)]
pub struct SymbolSpec {
    pub start: u32,
    pub end: u32,
    pub kind: SymbolKind,
    pub name: String,
}

struct PendingDoc {
    repo_idx: usize,
    branch_mask: u64,
    path: String,
    content: String,
    language: &'static str,
    symbols: Vec<SymbolSpec>,
}

/// Accumulates repositories and documents, then assembles one shard file.
/// Every document's content is held in memory
/// until [`Self::finish`] -- acceptable for the test/bench fixture this
/// builder exists to be; a production builder's streaming, multi-threaded
/// segment writer is out of scope here.
pub struct ShardBuilder {
    config: BuildConfig,
    repos: Vec<Repository>,
    repo_index_by_id: HashMap<u32, usize>,
    docs: Vec<PendingDoc>,
    doc_index_by_key: HashMap<(usize, String, String), usize>,
    language_codes: HashMap<&'static str, u16>,
}

impl Default for ShardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardBuilder {
    pub fn new() -> Self {
        Self::with_config(BuildConfig::default())
    }

    pub fn with_config(config: BuildConfig) -> Self {
        Self {
            config,
            repos: Vec::new(),
            repo_index_by_id: HashMap::new(),
            docs: Vec::new(),
            doc_index_by_key: HashMap::new(),
            language_codes: HashMap::new(),
        }
    }

    /// Register (or extend) a document at `path` within `repo`, on `branch`.
    /// Calling this again with the same repository id, path, and content but
    /// a different branch merges the branch into the existing document's
    /// branch mask instead of creating a duplicate document: one document
    /// can live on more than one branch at once.
    pub fn add_document(
        &mut self,
        repo: Repository,
        branch: &str,
        path: &str,
        content: &str,
        symbols: &[SymbolSpec],
    ) -> SearchResult<()> {
        if repo.branches.len() > 64 {
            return Err(SearchError::TooManyBranches {
                repo: repo.name.clone(),
                count: repo.branches.len(),
            });
        }
        let branch_idx = repo.branch_index(branch).ok_or_else(|| {
            SearchError::query_invalid(format!("repo {:?} has no branch {branch:?}", repo.name))
        })?;

        let repo_idx = match self.repo_index_by_id.get(&repo.id) {
            Some(&idx) => idx,
            None => {
                let idx = self.repos.len();
                self.repo_index_by_id.insert(repo.id, idx);
                self.repos.push(repo);
                idx
            }
        };

        let key = (repo_idx, path.to_string(), content.to_string());
        if let Some(&doc_idx) = self.doc_index_by_key.get(&key) {
            self.docs[doc_idx].branch_mask |= 1u64 << branch_idx;
            return Ok(());
        }

        let doc_idx = self.docs.len();
        self.docs.push(PendingDoc {
            repo_idx,
            branch_mask: 1u64 << branch_idx,
            path: path.to_string(),
            content: content.to_string(),
            language: language_for_path(path),
            symbols: symbols.to_vec(),
        });
        self.doc_index_by_key.insert(key, doc_idx);
        Ok(())
    }

    /// Assemble the accumulated repositories and documents into one sealed
    /// shard file.
    pub fn finish(mut self) -> SearchResult<Vec<u8>> {
        // Document order invariant: repo-index ascending, then
        // build order. `sort_by_key` is stable, so ties keep insertion order.
        self.docs.sort_by_key(|d| d.repo_idx);

        for name in self.docs.iter().map(|d| d.language) {
            let next = self.language_codes.len() as u16;
            self.language_codes.entry(name).or_insert(next);
        }

        let num_docs = self.docs.len() as u32;
        let num_repos = self.repos.len() as u32;

        let full_content: String = self.docs.iter().map(|d| d.content.as_str()).collect();
        let full_names: String = self.docs.iter().map(|d| d.path.as_str()).collect();
        let plain_ascii = is_plain_ascii(&full_content) && is_plain_ascii(&full_names);

        let mut writer = ShardWriter::new();

        let mut meta_bytes = Vec::new();
        crate::format::Metadata {
            format_version: crate::format::FORMAT_VERSION,
            feature_version: crate::format::FEATURE_VERSION,
            num_docs,
            num_repos,
            plain_ascii,
        }
        .encode(&mut meta_bytes);
        writer.write_section(SectionKind::Metadata, &meta_bytes);

        let repo_children: Vec<Vec<u8>> = self
            .repos
            .iter()
            .map(|r| {
                let mut buf = Vec::new();
                encode_repo(r, &mut buf);
                buf
            })
            .collect();
        let repo_refs: Vec<&[u8]> = repo_children.iter().map(|b| b.as_slice()).collect();
        writer.write_compound_section(SectionKind::Repositories, &repo_refs);

        let content_offset = writer.current_offset();
        writer.write_section(SectionKind::Content, full_content.as_bytes());
        let name_offset = writer.current_offset();
        writer.write_section(SectionKind::Names, full_names.as_bytes());

        let mut boundaries = Vec::with_capacity(self.docs.len() + 1);
        let mut name_boundaries = Vec::with_capacity(self.docs.len() + 1);
        let mut file_end_runes_content = Vec::with_capacity(self.docs.len());
        let mut file_end_runes_names = Vec::with_capacity(self.docs.len());
        let mut branch_masks = Vec::with_capacity(self.docs.len());
        let mut sub_repo_idx = Vec::with_capacity(self.docs.len());
        let mut repo_idx_table = Vec::with_capacity(self.docs.len());
        let mut checksums = Vec::with_capacity(self.docs.len());
        let mut languages = Vec::with_capacity(self.docs.len());
        let mut symbol_end_index = Vec::with_capacity(self.docs.len());
        let mut doc_symbol_children: Vec<Vec<u8>> = Vec::with_capacity(self.docs.len());
        let mut newline_children: Vec<Vec<u8>> = Vec::with_capacity(self.docs.len());
        let mut symbol_metadata_children: Vec<Vec<u8>> = Vec::new();

        let mut content_byte_cursor = content_offset;
        let mut name_byte_cursor = name_offset;
        let mut rune_cursor_content: u64 = 0;
        let mut rune_cursor_names: u64 = 0;
        let mut next_symbol_id: u32 = 0;

        boundaries.push(content_offset);
        name_boundaries.push(name_offset);

        let stride = self.config.search.rune_sample_stride.max(1) as u64;
        let mut rune_samples_content: Vec<(u64, u64)> = Vec::new();
        let mut rune_samples_names: Vec<(u64, u64)> = Vec::new();

        for doc in &self.docs {
            content_byte_cursor += doc.content.len() as u64;
            boundaries.push(content_byte_cursor);
            name_byte_cursor += doc.path.len() as u64;
            name_boundaries.push(name_byte_cursor);

            rune_cursor_content += doc.content.chars().count() as u64;
            file_end_runes_content.push(rune_cursor_content);
            rune_cursor_names += doc.path.chars().count() as u64;
            file_end_runes_names.push(rune_cursor_names);

            branch_masks.push(doc.branch_mask);
            sub_repo_idx.push(u32::MAX);
            repo_idx_table.push(doc.repo_idx as u32);
            checksums.push(checksum_content(doc.content.as_bytes()));
            languages.push(*self.language_codes.get(doc.language).unwrap());

            let mut sections = Vec::with_capacity(doc.symbols.len());
            for spec in &doc.symbols {
                sections.push(SymbolSection { start: spec.start, end: spec.end, symbol_id: next_symbol_id });
                let mut meta_buf = Vec::new();
                encode_symbol_meta(&SymbolMeta { name: spec.name.clone(), kind: spec.kind }, &mut meta_buf);
                symbol_metadata_children.push(meta_buf);
                next_symbol_id += 1;
            }
            symbol_end_index.push(next_symbol_id);
            let mut sym_buf = Vec::new();
            encode_symbol_sections(&sections, &mut sym_buf);
            doc_symbol_children.push(sym_buf);

            let mut nl_buf = Vec::new();
            encode_newlines(&newlines_in(doc.content.as_bytes()), &mut nl_buf);
            newline_children.push(nl_buf);
        }

        sample_runes(&full_content, content_offset, stride, &mut rune_samples_content);
        sample_runes(&full_names, name_offset, stride, &mut rune_samples_names);

        writer.write_section(SectionKind::Boundaries, &encode_u64_array(&boundaries));
        writer.write_section(SectionKind::NameBoundaries, &encode_u64_array(&name_boundaries));
        writer.write_section(SectionKind::FileEndRunesContent, &encode_u64_array(&file_end_runes_content));
        writer.write_section(SectionKind::FileEndRunesNames, &encode_u64_array(&file_end_runes_names));
        writer.write_section(
            SectionKind::RuneOffsetSamplesContent,
            &encode_rune_samples(&rune_samples_content),
        );
        writer.write_section(SectionKind::RuneOffsetSamplesNames, &encode_rune_samples(&rune_samples_names));
        writer.write_section(SectionKind::BranchMasks, &encode_u64_array(&branch_masks));
        writer.write_section(SectionKind::SubRepoIndices, &encode_u32_array(&sub_repo_idx));
        writer.write_section(SectionKind::RepoIndices, &encode_u32_array(&repo_idx_table));
        writer.write_section(SectionKind::Checksums, &encode_u64_array(&checksums));
        writer.write_section(SectionKind::LanguageCodes, &encode_u16_array_le(&languages));
        writer.write_section(SectionKind::SymbolEndIndex, &encode_u32_array(&symbol_end_index));

        let doc_symbol_refs: Vec<&[u8]> = doc_symbol_children.iter().map(|b| b.as_slice()).collect();
        writer.write_compound_section(SectionKind::DocumentSymbolSections, &doc_symbol_refs);
        let newline_refs: Vec<&[u8]> = newline_children.iter().map(|b| b.as_slice()).collect();
        writer.write_compound_section(SectionKind::NewlineTables, &newline_refs);
        let symbol_meta_refs: Vec<&[u8]> = symbol_metadata_children.iter().map(|b| b.as_slice()).collect();
        writer.write_compound_section(SectionKind::SymbolMetadata, &symbol_meta_refs);

        let mut symbol_kind_map = HashMap::new();
        for (kind, name) in [
            (SymbolKind::Other, "other"),
            (SymbolKind::Function, "function"),
            (SymbolKind::Method, "method"),
            (SymbolKind::Class, "class"),
            (SymbolKind::Struct, "struct"),
            (SymbolKind::Interface, "interface"),
            (SymbolKind::Enum, "enum"),
            (SymbolKind::Constant, "constant"),
            (SymbolKind::Variable, "variable"),
            (SymbolKind::Module, "module"),
        ] {
            symbol_kind_map.insert(kind as u16, name.to_string());
        }
        let mut symbol_kind_map_buf = Vec::new();
        encode_symbol_kind_map(&symbol_kind_map, &mut symbol_kind_map_buf);
        writer.write_section(SectionKind::SymbolKindMap, &symbol_kind_map_buf);

        let language_map: HashMap<u16, LanguageInfo> = self
            .language_codes
            .iter()
            .map(|(&name, &code)| (code, LanguageInfo { name: name.to_string() }))
            .collect();
        let mut language_map_buf = Vec::new();
        encode_language_map(&language_map, &mut language_map_buf);
        writer.write_section(SectionKind::LanguageMap, &language_map_buf);

        let (ngram_content_entries, content_postings_span) =
            build_ngram_postings(&mut writer, &self.docs, &file_end_runes_content, false);
        let (ngram_name_entries, name_postings_span) =
            build_ngram_postings(&mut writer, &self.docs, &file_end_runes_names, true);
        if let Some(span) = content_postings_span {
            writer.record_section(SectionKind::PostingsContent, span);
        }
        if let Some(span) = name_postings_span {
            writer.record_section(SectionKind::PostingsNames, span);
        }

        let content_ngram_index = SortedArrayNgramIndex::build(ngram_content_entries);
        let mut content_ngram_buf = Vec::new();
        content_ngram_index.encode(&mut content_ngram_buf);
        writer.write_section(SectionKind::NgramIndexContent, &content_ngram_buf);

        let name_ngram_index = SortedArrayNgramIndex::build(ngram_name_entries);
        let mut name_ngram_buf = Vec::new();
        name_ngram_index.encode(&mut name_ngram_buf);
        writer.write_section(SectionKind::NgramIndexNames, &name_ngram_buf);

        let bloom = build_bloom(&self.docs, self.config.search.bloom_fpr);
        let mut bloom_buf = Vec::new();
        encode_bloom(&bloom, &mut bloom_buf);
        writer.write_section(SectionKind::BloomFilter, &bloom_buf);

        Ok(writer.finish())
    }
}

fn encode_u64_array(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out
}

fn encode_u32_array(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out
}

/// Little-endian on disk, the one deliberate exception to an otherwise
/// big-endian format.
fn encode_u16_array_le(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn encode_rune_samples(samples: &[(u64, u64)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 16);
    for (rune, byte) in samples {
        out.extend_from_slice(&rune.to_be_bytes());
        out.extend_from_slice(&byte.to_be_bytes());
    }
    out
}

/// Sample `(global_rune_index, absolute_byte_offset)` every `stride` runes
/// across `text`, whose first byte sits at `base_offset` in the finished
/// shard file.
fn sample_runes(text: &str, base_offset: u64, stride: u64, out: &mut Vec<(u64, u64)>) {
    let mut rune_idx: u64 = 0;
    for (byte_idx, _) in text.char_indices() {
        if rune_idx % stride == 0 {
            out.push((rune_idx, base_offset + byte_idx as u64));
        }
        rune_idx += 1;
    }
}

/// Build the ngram -> posting-list index for either the content stream or
/// the filename stream: posting positions are global (shard-
/// wide) rune offsets, ascending, delta-varint encoded per ngram.
fn build_ngram_postings(
    writer: &mut ShardWriter,
    docs: &[PendingDoc],
    file_end_runes: &[u64],
    names: bool,
) -> (Vec<(u64, Section)>, Option<Section>) {
    let mut postings: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (i, doc) in docs.iter().enumerate() {
        let rune_base = if i == 0 { 0 } else { file_end_runes[i - 1] };
        let text = if names { doc.path.as_str() } else { doc.content.as_str() };
        for (ngram, local_rune) in extract_ngrams_with_positions(text) {
            postings.entry(ngram).or_default().push(rune_base + local_rune as u64);
        }
    }

    let span_start = writer.current_offset();
    let mut entries = Vec::with_capacity(postings.len());
    for (ngram, positions) in postings {
        let mut buf = Vec::new();
        delta_encode(&positions, &mut buf);
        let section = writer.append_raw(&buf);
        entries.push((ngram, section));
    }
    let span_end = writer.current_offset();
    let span = if span_end > span_start { Some(Section::new(span_start, span_end - span_start)) } else { None };
    (entries, span)
}

/// Build the shard-wide bloom filter over every document's word fragments
///, extracted per document so a fragment never spans two
/// unrelated files' adjacent bytes.
fn build_bloom(docs: &[PendingDoc], fpr: f64) -> BloomFilter {
    let mut keys = Vec::new();
    for doc in docs {
        keys.extend(extract_word_fragment_keys(doc.content.as_bytes()));
    }
    let mut bloom = BloomFilter::new(keys.len().max(1), fpr);
    for key in keys {
        bloom.insert(key);
    }
    bloom
}

/// Detect a document's language from its path's extension, trimmed to a
/// small language list with a generic fallback.
fn language_for_path(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().filter(|e| *e != path).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "rs" => "Rust",
        "py" | "pyi" | "pyw" => "Python",
        "js" | "mjs" | "cjs" => "JavaScript",
        "ts" | "mts" | "cts" | "tsx" | "jsx" => "TypeScript",
        "go" => "Go",
        "c" | "h" => "C",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => "C++",
        "java" => "Java",
        "rb" | "rake" => "Ruby",
        "sh" | "bash" | "zsh" | "fish" => "Shell",
        "md" | "markdown" => "Markdown",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "" => "Text",
        _ => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::reader::IndexData;
    use crate::index::types::Branch;

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
            config: Default::default(),
            url_template: None,
            line_fragment_template: None,
        }
    }

    #[test]
    fn single_document_round_trips() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("acme/widgets", vec!["main"]), "main", "a.rs", "fn main() {}", &[]).unwrap();
        let bytes = b.finish().unwrap();
        let index = IndexData::open_bytes(bytes).unwrap();

        assert_eq!(index.num_docs(), 1);
        assert_eq!(index.num_repos(), 1);
        assert_eq!(index.doc_content_str(0).unwrap(), "fn main() {}");
        assert_eq!(index.doc_name_str(0).unwrap(), "a.rs");
        assert_eq!(index.language_name(index.document(0).unwrap().language), Some("Rust"));
        assert!(index.verify_doc_checksum(0).unwrap());
    }

    #[test]
    fn repeated_add_document_on_another_branch_merges_into_one_document() {
        let mut b = ShardBuilder::new();
        let r = repo("acme/widgets", vec!["master", "stable"]);
        b.add_document(r.clone(), "master", "f2.txt", "shared content", &[]).unwrap();
        b.add_document(r, "stable", "f2.txt", "shared content", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        assert_eq!(index.num_docs(), 1);
        let doc = index.document(0).unwrap();
        let repo = index.repo(doc.repo_idx).unwrap();
        assert_eq!(repo.branches.len(), 2);
        assert_eq!(doc.branch_mask, 0b11);
    }

    #[test]
    fn too_many_branches_is_rejected() {
        let mut b = ShardBuilder::new();
        let branches: Vec<&str> = (0..65).map(|_| "b").collect();
        let r = repo("monorepo", branches);
        let err = b.add_document(r, "b", "a.txt", "x", &[]).unwrap_err();
        assert!(matches!(err, SearchError::TooManyBranches { .. }));
    }

    #[test]
    fn symbol_sections_are_attached_and_global_ids_assigned() {
        let mut b = ShardBuilder::new();
        b.add_document(
            repo("r", vec!["main"]),
            "main",
            "a.rs",
            "fn widget() {}",
            &[SymbolSpec { start: 3, end: 9, kind: SymbolKind::Function, name: "widget".to_string() }],
        )
        .unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();
        let sections = index.doc_symbols(0).unwrap();
        assert_eq!(sections.len(), 1);
        let meta = index.symbol_meta(sections[0].symbol_id).unwrap();
        assert_eq!(meta.name, "widget");
        assert_eq!(meta.kind, SymbolKind::Function);
    }

    #[test]
    fn multiple_repos_keep_repo_index_ascending_document_order() {
        let mut b = ShardBuilder::new();
        b.add_document(repo("b/repo", vec!["main"]), "main", "z.txt", "zzz", &[]).unwrap();
        let mut r2 = repo("a/repo", vec!["main"]);
        r2.id = 2;
        b.add_document(r2, "main", "a.txt", "aaa", &[]).unwrap();
        let index = IndexData::open_bytes(b.finish().unwrap()).unwrap();

        assert_eq!(index.document(0).unwrap().repo_idx, 0);
        assert_eq!(index.repo(0).unwrap().name, "b/repo");
        assert_eq!(index.document(1).unwrap().repo_idx, 1);
    }
}
