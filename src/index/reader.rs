//! The shard reader: `IndexData`.
//!
//! Parses a shard's TOC, materializes the eager per-doc/per-repo tables,
//! and exposes typed lookups that every higher layer (match tree, search
//! driver) builds on. Generalized from a multi-file-per-segment layout
//! (`docs.bin`, `paths.bin`, `segments/seg_NNNN/*`) to reads through the
//! single-file [`crate::format::Toc`], and from a single implicit
//! repository to a compound-shard repository list.

use crate::bloom::BloomFilter;
use crate::checksum;
use crate::error::{SearchError, SearchResult};
use crate::format::{Blob, LazyCompoundSection, Section, SectionKind, Toc};
use crate::index::doc_tables::{self};
use crate::index::meta::MetaSidecar;
use crate::index::ngram_index::{NgramIndex, SortedArrayNgramIndex};
use crate::index::repo_codec;
use crate::index::types::{Document, DocId, LanguageInfo, Repository, SymbolKind, SymbolMeta, SymbolSection};
use crate::query::ast::Query;
use crate::query::search::{self, ListEntry, ListOptions, SearchResultSet};
use crate::cancel::CancellationToken;
use crate::config::SearchOptions;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

fn decode_u64_array(buf: &[u8]) -> Vec<u64> {
    buf.chunks_exact(8)
        .map(|c| u64::from_be_bytes(c.try_into().unwrap()))
        .collect()
}

fn decode_u32_array(buf: &[u8]) -> Vec<u32> {
    buf.chunks_exact(4)
        .map(|c| u32::from_be_bytes(c.try_into().unwrap()))
        .collect()
}

fn decode_u16_array_be(buf: &[u8]) -> Vec<u16> {
    buf.chunks_exact(2)
        .map(|c| u16::from_be_bytes(c.try_into().unwrap()))
        .collect()
}

/// The language-code array is stored little-endian, the one deliberate
/// exception to this format's otherwise-big-endian fixed-width encoding.
fn decode_u16_array_le(buf: &[u8]) -> Vec<u16> {
    buf.chunks_exact(2)
        .map(|c| u16::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

fn decode_rune_samples(buf: &[u8]) -> Vec<(u64, u64)> {
    buf.chunks_exact(16)
        .map(|c| {
            let rune = u64::from_be_bytes(c[0..8].try_into().unwrap());
            let byte = u64::from_be_bytes(c[8..16].try_into().unwrap());
            (rune, byte)
        })
        .collect()
}

/// One shard, opened and parsed. Immutable after construction;
/// safely shared across concurrent `search`/`list` calls.
pub struct IndexData {
    blob: Box<dyn Blob>,
    toc: Toc,
    num_docs: u32,
    plain_ascii: bool,

    repos: Vec<Repository>,

    boundaries: Vec<u64>,
    name_boundaries: Vec<u64>,
    file_end_runes_content: Vec<u64>,
    file_end_runes_names: Vec<u64>,
    branch_masks: Vec<u64>,
    sub_repo_idx: Vec<u32>,
    repo_idx: Vec<u16>,
    checksums: Vec<u64>,
    languages: Vec<u16>,
    symbol_end_index: Vec<u32>,

    rune_samples_content: Vec<(u64, u64)>,
    rune_samples_names: Vec<(u64, u64)>,

    bloom: Option<BloomFilter>,

    ngram_index_content: SortedArrayNgramIndex,
    ngram_index_names: SortedArrayNgramIndex,

    symbol_kind_map: HashMap<u16, String>,
    language_map: HashMap<u16, LanguageInfo>,

    document_symbol_sections: LazyCompoundSection,
    symbol_metadata: LazyCompoundSection,
    newline_tables: LazyCompoundSection,
}

impl IndexData {
    /// Open a shard file, memory-mapping it read-only.
    /// If a `<path>.meta` sidecar exists alongside it, its overrides are
    /// applied immediately.
    pub fn open(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SearchError::Io { path: path.to_path_buf(), source: e })?;
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| SearchError::Io { path: path.to_path_buf(), source: e })?;
        let mut data = Self::from_blob(Box::new(mmap), path)?;

        let meta_path = sidecar_path(path);
        if let Ok(json) = std::fs::read_to_string(&meta_path) {
            match MetaSidecar::parse(&json) {
                Ok(sidecar) => sidecar.apply(&mut data.repos),
                Err(e) => eprintln!("ignoring malformed meta sidecar {}: {e}", meta_path.display()),
            }
        }
        Ok(data)
    }

    /// Open a shard already materialized as an in-memory buffer: the
    /// in-scope test/benchmark builder's primary consumption path, and this
    /// format's stand-in for "a buffered-pread fallback on platforms where
    /// mmap is unsuitable" -- `Vec<u8>` already implements
    /// [`Blob`] without any mapping.
    pub fn open_bytes(bytes: Vec<u8>) -> SearchResult<Self> {
        Self::from_blob(Box::new(bytes), Path::new("<memory>"))
    }

    fn from_blob(blob: Box<dyn Blob>, path: &Path) -> SearchResult<Self> {
        let toc = Toc::parse(blob.as_ref())?;
        let meta_section = toc.require(SectionKind::Metadata)?;
        let meta = crate::format::Metadata::decode(meta_section.read(blob.as_ref())?)?;

        let num_docs = meta.num_docs;
        let num_repos = meta.num_repos;

        let repos_section = toc.require(SectionKind::Repositories)?;
        let repos_compound = crate::format::CompoundSection::decode(blob.as_ref(), repos_section)?;
        if repos_compound.len() != num_repos as usize {
            return Err(SearchError::corrupt(path, "repository count mismatch"));
        }
        let mut repos = Vec::with_capacity(repos_compound.len());
        for i in 0..repos_compound.len() {
            let section = repos_compound.get(i).unwrap();
            let bytes = section.read(blob.as_ref())?;
            repos.push(repo_codec::decode_repo(bytes)?);
        }
        for repo in &repos {
            if repo.branches.len() > 64 {
                return Err(SearchError::corrupt(
                    path,
                    format!("repository {} has {} branches, exceeding 64", repo.name, repo.branches.len()),
                ));
            }
        }

        let boundaries = decode_u64_array(toc.require(SectionKind::Boundaries)?.read(blob.as_ref())?);
        let name_boundaries =
            decode_u64_array(toc.require(SectionKind::NameBoundaries)?.read(blob.as_ref())?);
        if boundaries.len() != num_docs as usize + 1 || name_boundaries.len() != num_docs as usize + 1 {
            return Err(SearchError::corrupt(path, "boundaries length mismatch with doc count"));
        }

        let file_end_runes_content =
            decode_u64_array(toc.require(SectionKind::FileEndRunesContent)?.read(blob.as_ref())?);
        let file_end_runes_names =
            decode_u64_array(toc.require(SectionKind::FileEndRunesNames)?.read(blob.as_ref())?);

        let branch_masks = decode_u64_array(toc.require(SectionKind::BranchMasks)?.read(blob.as_ref())?);
        let sub_repo_idx = decode_u32_array(toc.require(SectionKind::SubRepoIndices)?.read(blob.as_ref())?);
        let repo_idx_u32 = decode_u32_array(toc.require(SectionKind::RepoIndices)?.read(blob.as_ref())?);
        let repo_idx: Vec<u16> = repo_idx_u32.iter().map(|&v| v as u16).collect();
        let checksums = decode_u64_array(toc.require(SectionKind::Checksums)?.read(blob.as_ref())?);
        let languages = decode_u16_array_le(toc.require(SectionKind::LanguageCodes)?.read(blob.as_ref())?);
        let symbol_end_index =
            decode_u32_array(toc.require(SectionKind::SymbolEndIndex)?.read(blob.as_ref())?);

        for (d, &ri) in repo_idx.iter().enumerate() {
            if ri as usize >= repos.len() {
                return Err(SearchError::corrupt(path, format!("doc {d} references unknown repo {ri}")));
            }
        }
        for (d, repo) in repo_idx.iter().map(|&r| &repos[r as usize]).enumerate() {
            let sub = sub_repo_idx[d];
            if sub != u32::MAX && sub as usize >= repo.sub_repos.len() {
                return Err(SearchError::corrupt(path, format!("doc {d} sub-repo index out of range")));
            }
        }

        let rune_samples_content =
            decode_rune_samples(toc.require(SectionKind::RuneOffsetSamplesContent)?.read(blob.as_ref())?);
        let rune_samples_names =
            decode_rune_samples(toc.require(SectionKind::RuneOffsetSamplesNames)?.read(blob.as_ref())?);

        let bloom = match toc.get(SectionKind::BloomFilter) {
            Some(section) if !section.is_empty() => {
                let bytes = section.read(blob.as_ref())?;
                Some(decode_bloom(bytes).ok_or_else(|| SearchError::corrupt(path, "malformed bloom filter header"))?)
            }
            _ => None,
        };

        let ngram_index_content = SortedArrayNgramIndex::decode(
            toc.require(SectionKind::NgramIndexContent)?.read(blob.as_ref())?,
        )
        .ok_or_else(|| SearchError::corrupt(path, "malformed content ngram index"))?;
        let ngram_index_names = SortedArrayNgramIndex::decode(
            toc.require(SectionKind::NgramIndexNames)?.read(blob.as_ref())?,
        )
        .ok_or_else(|| SearchError::corrupt(path, "malformed filename ngram index"))?;

        let symbol_kind_map = decode_symbol_kind_map(toc.require(SectionKind::SymbolKindMap)?.read(blob.as_ref())?)
            .ok_or_else(|| SearchError::corrupt(path, "malformed symbol kind map"))?;
        let language_map = decode_language_map(toc.require(SectionKind::LanguageMap)?.read(blob.as_ref())?)
            .ok_or_else(|| SearchError::corrupt(path, "malformed language map"))?;

        let document_symbol_sections =
            LazyCompoundSection::new(toc.require(SectionKind::DocumentSymbolSections)?);
        let symbol_metadata = LazyCompoundSection::new(toc.require(SectionKind::SymbolMetadata)?);
        let newline_tables = LazyCompoundSection::new(toc.require(SectionKind::NewlineTables)?);

        Ok(Self {
            blob,
            toc,
            num_docs,
            plain_ascii: meta.plain_ascii,
            repos,
            boundaries,
            name_boundaries,
            file_end_runes_content,
            file_end_runes_names,
            branch_masks,
            sub_repo_idx,
            repo_idx,
            checksums,
            languages,
            symbol_end_index,
            rune_samples_content,
            rune_samples_names,
            bloom,
            ngram_index_content,
            ngram_index_names,
            symbol_kind_map,
            language_map,
            document_symbol_sections,
            symbol_metadata,
            newline_tables,
        })
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_repos(&self) -> u32 {
        self.repos.len() as u32
    }

    pub fn repos(&self) -> &[Repository] {
        &self.repos
    }

    pub fn repo(&self, idx: u16) -> SearchResult<&Repository> {
        self.repos
            .get(idx as usize)
            .ok_or_else(|| SearchError::corrupt("<shard>", format!("repo index {idx} out of range")))
    }

    pub fn repo_by_id(&self, id: u32) -> Option<&Repository> {
        self.repos.iter().find(|r| r.id == id)
    }

    pub fn plain_ascii(&self) -> bool {
        self.plain_ascii
    }

    pub fn language_name(&self, code: u16) -> Option<&str> {
        self.language_map.get(&code).map(|l| l.name.as_str())
    }

    pub fn language_code(&self, name: &str) -> Option<u16> {
        self.language_map.iter().find(|(_, v)| v.name == name).map(|(&k, _)| k)
    }

    pub fn symbol_kind_name(&self, kind: SymbolKind) -> Option<&str> {
        self.symbol_kind_map.get(&(kind as u16)).map(|s| s.as_str())
    }

    fn require_doc(&self, doc: DocId) -> SearchResult<()> {
        if doc >= self.num_docs {
            return Err(SearchError::corrupt("<shard>", format!("doc id {doc} out of range")));
        }
        Ok(())
    }

    pub fn document(&self, doc: DocId) -> SearchResult<Document> {
        self.require_doc(doc)?;
        let d = doc as usize;
        Ok(Document {
            id: doc,
            repo_idx: self.repo_idx[d],
            sub_repo_idx: self.sub_repo_idx[d],
            branch_mask: self.branch_masks[d],
            language: self.languages[d],
            checksum: self.checksums[d],
            content_offset: self.boundaries[d],
            content_size: self.boundaries[d + 1] - self.boundaries[d],
            name_offset: self.name_boundaries[d],
            name_size: self.name_boundaries[d + 1] - self.name_boundaries[d],
        })
    }

    pub fn doc_content(&self, doc: DocId) -> SearchResult<&[u8]> {
        let d = self.document(doc)?;
        self.blob.read(d.content_offset, d.content_size)
    }

    pub fn doc_content_str(&self, doc: DocId) -> SearchResult<&str> {
        std::str::from_utf8(self.doc_content(doc)?)
            .map_err(|_| SearchError::corrupt("<shard>", format!("doc {doc} content is not valid utf-8")))
    }

    pub fn doc_name(&self, doc: DocId) -> SearchResult<&[u8]> {
        let d = self.document(doc)?;
        self.blob.read(d.name_offset, d.name_size)
    }

    pub fn doc_name_str(&self, doc: DocId) -> SearchResult<&str> {
        std::str::from_utf8(self.doc_name(doc)?)
            .map_err(|_| SearchError::corrupt("<shard>", format!("doc {doc} name is not valid utf-8")))
    }

    pub fn verify_doc_checksum(&self, doc: DocId) -> SearchResult<bool> {
        let d = self.document(doc)?;
        Ok(checksum::verify_checksum(self.doc_content(doc)?, d.checksum))
    }

    /// Byte offset of rune `r` within document `doc`'s content.
    pub fn rune_to_byte_offset(&self, doc: DocId, r: u32) -> SearchResult<u32> {
        self.rune_to_byte_offset_generic(doc, r, false)
    }

    pub fn name_rune_to_byte_offset(&self, doc: DocId, r: u32) -> SearchResult<u32> {
        self.rune_to_byte_offset_generic(doc, r, true)
    }

    fn rune_to_byte_offset_generic(&self, doc: DocId, r: u32, names: bool) -> SearchResult<u32> {
        if self.plain_ascii {
            return Ok(r);
        }
        let d = self.document(doc)?;
        let base = self.rune_base(doc, names)?;
        let target = base + r as u64;
        let samples = if names { &self.rune_samples_names } else { &self.rune_samples_content };
        let idx = samples.partition_point(|&(ri, _)| ri <= target);
        let (mut rune_pos, mut byte_pos) = if idx == 0 {
            (0u64, if names { self.name_section_start() } else { self.content_section_start() })
        } else {
            samples[idx - 1]
        };

        let section_end = if names {
            self.toc.require(SectionKind::Names)?
        } else {
            self.toc.require(SectionKind::Content)?
        };
        let section_end = section_end.offset + section_end.size;
        let remaining = self.blob.read(byte_pos, section_end - byte_pos)?;
        let text = std::str::from_utf8(remaining)
            .map_err(|_| SearchError::corrupt("<shard>", "content is not valid utf-8"))?;
        for ch in text.chars() {
            if rune_pos == target {
                break;
            }
            byte_pos += ch.len_utf8() as u64;
            rune_pos += 1;
        }
        let doc_start = if names { d.name_offset } else { d.content_offset };
        Ok((byte_pos - doc_start) as u32)
    }

    fn content_section_start(&self) -> u64 {
        self.toc.get(SectionKind::Content).map(|s| s.offset).unwrap_or(0)
    }

    fn name_section_start(&self) -> u64 {
        self.toc.get(SectionKind::Names).map(|s| s.offset).unwrap_or(0)
    }

    fn rune_base(&self, doc: DocId, names: bool) -> SearchResult<u64> {
        self.require_doc(doc)?;
        if doc == 0 {
            return Ok(0);
        }
        let table = if names { &self.file_end_runes_names } else { &self.file_end_runes_content };
        Ok(table[doc as usize - 1])
    }

    /// Which document a global (shard-wide) content rune offset falls
    /// within; used to turn a posting-list rune position back into a
    /// document id.
    pub fn doc_for_content_rune(&self, global_rune: u64) -> DocId {
        self.file_end_runes_content.partition_point(|&c| c <= global_rune) as DocId
    }

    pub fn doc_for_name_rune(&self, global_rune: u64) -> DocId {
        self.file_end_runes_names.partition_point(|&c| c <= global_rune) as DocId
    }

    pub fn total_content_runes(&self) -> u64 {
        self.file_end_runes_content.last().copied().unwrap_or(0)
    }

    /// Decoded posting list for an ngram: global (shard-wide) content rune
    /// offsets, ascending.
    pub fn ngram_postings_content(&self, ngram: u64) -> SearchResult<Vec<u64>> {
        match self.ngram_index_content.lookup(ngram) {
            Some(section) => Ok(crate::varint::delta_decode(section.read(self.blob.as_ref())?)),
            None => Ok(Vec::new()),
        }
    }

    pub fn ngram_postings_names(&self, ngram: u64) -> SearchResult<Vec<u64>> {
        match self.ngram_index_names.lookup(ngram) {
            Some(section) => Ok(crate::varint::delta_decode(section.read(self.blob.as_ref())?)),
            None => Ok(Vec::new()),
        }
    }

    pub fn doc_symbols(&self, doc: DocId) -> SearchResult<Vec<SymbolSection>> {
        self.require_doc(doc)?;
        match self.document_symbol_sections.get(self.blob.as_ref(), doc as usize)? {
            Some(section) => doc_tables::decode_symbol_sections(section.read(self.blob.as_ref())?)
                .ok_or_else(|| SearchError::corrupt("<shard>", format!("malformed symbol sections for doc {doc}"))),
            None => Ok(Vec::new()),
        }
    }

    pub fn symbol_meta(&self, symbol_id: u32) -> SearchResult<SymbolMeta> {
        let section = self
            .symbol_metadata
            .get(self.blob.as_ref(), symbol_id as usize)?
            .ok_or_else(|| SearchError::corrupt("<shard>", format!("unknown symbol id {symbol_id}")))?;
        let bytes = section.read(self.blob.as_ref())?;
        decode_symbol_meta(bytes)
            .ok_or_else(|| SearchError::corrupt("<shard>", format!("malformed symbol metadata for id {symbol_id}")))
    }

    pub fn doc_newlines(&self, doc: DocId) -> SearchResult<Vec<u32>> {
        self.require_doc(doc)?;
        match self.newline_tables.get(self.blob.as_ref(), doc as usize)? {
            Some(section) => Ok(doc_tables::decode_newlines(section.read(self.blob.as_ref())?)),
            None => Ok(Vec::new()),
        }
    }

    pub fn symbol_count_through(&self, doc: DocId) -> u32 {
        self.symbol_end_index.get(doc as usize).copied().unwrap_or(0)
    }

    pub fn bloom(&self) -> Option<&BloomFilter> {
        self.bloom.as_ref()
    }

    /// Conservative bloom short-circuit: only sound for a literal
    /// that is itself a single word-fragment the builder would have
    /// inserted verbatim -- 4-10 bytes, all `[A-Za-z0-9_]`, not
    /// digit-leading. Any other literal shape returns `true` (cannot
    /// reject), never a false negative.
    pub fn might_contain_literal(&self, literal: &str) -> bool {
        let Some(bloom) = &self.bloom else { return true };
        let bytes = literal.as_bytes();
        if bytes.len() < 4 || bytes.len() > 10 {
            return true;
        }
        if bytes[0].is_ascii_digit() {
            return true;
        }
        if !bytes.iter().all(|&b| b.is_ascii_alphanumeric() || b == b'_') {
            return true;
        }
        bloom.might_contain(crate::bloom::fragment_lookup_key(literal))
    }

    pub fn search(
        &self,
        query: &Query,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchResultSet> {
        search::search(self, query, options, cancel)
    }

    pub fn list(&self, query: &Query, options: &ListOptions) -> SearchResult<Vec<ListEntry>> {
        search::list(self, query, options)
    }
}

fn sidecar_path(shard_path: &Path) -> PathBuf {
    let mut s = shard_path.as_os_str().to_owned();
    s.push(".meta");
    PathBuf::from(s)
}

fn decode_bloom(buf: &[u8]) -> Option<BloomFilter> {
    if buf.len() < 9 {
        return None;
    }
    let num_hashes = buf[0];
    let num_words = u64::from_be_bytes(buf[1..9].try_into().ok()?) as usize;
    if buf.len() < 9 + num_words * 8 {
        return None;
    }
    let bits: Vec<u64> = buf[9..9 + num_words * 8]
        .chunks_exact(8)
        .map(|c| u64::from_be_bytes(c.try_into().unwrap()))
        .collect();
    Some(BloomFilter::from_raw(bits, num_hashes))
}

pub(crate) fn encode_bloom(bloom: &BloomFilter, out: &mut Vec<u8>) {
    out.push(bloom.num_hashes());
    out.extend_from_slice(&(bloom.bits().len() as u64).to_be_bytes());
    for word in bloom.bits() {
        out.extend_from_slice(&word.to_be_bytes());
    }
}

fn decode_symbol_kind_map(buf: &[u8]) -> Option<HashMap<u16, String>> {
    if buf.len() < 4 {
        return None;
    }
    let count = u32::from_be_bytes(buf[0..4].try_into().ok()?) as usize;
    let mut pos = 4;
    let mut map = HashMap::with_capacity(count);
    for _ in 0..count {
        if buf.len() < pos + 4 {
            return None;
        }
        let kind = u16::from_be_bytes(buf[pos..pos + 2].try_into().ok()?);
        let name_len = u16::from_be_bytes(buf[pos + 2..pos + 4].try_into().ok()?) as usize;
        pos += 4;
        if buf.len() < pos + name_len {
            return None;
        }
        let name = String::from_utf8_lossy(&buf[pos..pos + name_len]).into_owned();
        pos += name_len;
        map.insert(kind, name);
    }
    Some(map)
}

pub(crate) fn encode_symbol_kind_map(map: &HashMap<u16, String>, out: &mut Vec<u8>) {
    out.extend_from_slice(&(map.len() as u32).to_be_bytes());
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| **k);
    for (kind, name) in entries {
        out.extend_from_slice(&kind.to_be_bytes());
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(name.as_bytes());
    }
}

fn decode_language_map(buf: &[u8]) -> Option<HashMap<u16, LanguageInfo>> {
    if buf.len() < 4 {
        return None;
    }
    let count = u32::from_be_bytes(buf[0..4].try_into().ok()?) as usize;
    let mut pos = 4;
    let mut map = HashMap::with_capacity(count);
    for _ in 0..count {
        if buf.len() < pos + 4 {
            return None;
        }
        let code = u16::from_be_bytes(buf[pos..pos + 2].try_into().ok()?);
        let name_len = u16::from_be_bytes(buf[pos + 2..pos + 4].try_into().ok()?) as usize;
        pos += 4;
        if buf.len() < pos + name_len {
            return None;
        }
        let name = String::from_utf8_lossy(&buf[pos..pos + name_len]).into_owned();
        pos += name_len;
        map.insert(code, LanguageInfo { name });
    }
    Some(map)
}

pub(crate) fn encode_language_map(map: &HashMap<u16, LanguageInfo>, out: &mut Vec<u8>) {
    out.extend_from_slice(&(map.len() as u32).to_be_bytes());
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| **k);
    for (code, info) in entries {
        out.extend_from_slice(&code.to_be_bytes());
        out.extend_from_slice(&(info.name.len() as u16).to_be_bytes());
        out.extend_from_slice(info.name.as_bytes());
    }
}

pub(crate) fn encode_symbol_meta(meta: &SymbolMeta, out: &mut Vec<u8>) {
    out.extend_from_slice(&(meta.kind as u16).to_be_bytes());
    crate::varint::encode_varint(meta.name.len() as u64, out);
    out.extend_from_slice(meta.name.as_bytes());
}

fn decode_symbol_meta(buf: &[u8]) -> Option<SymbolMeta> {
    if buf.len() < 2 {
        return None;
    }
    let kind = SymbolKind::from_u16(u16::from_be_bytes(buf[0..2].try_into().ok()?));
    let (len, consumed) = crate::varint::decode_varint(&buf[2..])?;
    let start = 2 + consumed;
    let name = String::from_utf8_lossy(buf.get(start..start + len as usize)?).into_owned();
    Some(SymbolMeta { name, kind })
}
