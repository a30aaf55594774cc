//! Binary encoding for [`Repository`] entries (the `RepoList` binary
//! encoding): varint-prefixed strings and counts throughout, zigzag varint
//! for the signed `priority` field. Kept separate from
//! [`crate::index::writer`]/[`crate::index::reader`] since both sides need
//! it symmetrically.

use crate::error::{SearchError, SearchResult};
use crate::index::types::{Branch, Repository, SubRepository};
use crate::varint::{decode_varint, encode_varint};
use std::collections::BTreeMap;

fn encode_str(s: &str, out: &mut Vec<u8>) {
    encode_varint(s.len() as u64, out);
    out.extend_from_slice(s.as_bytes());
}

fn decode_str(buf: &[u8], pos: &mut usize) -> SearchResult<String> {
    let (len, consumed) = decode_varint(&buf[*pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated string length"))?;
    *pos += consumed;
    let len = len as usize;
    if buf.len() < *pos + len {
        return Err(SearchError::corrupt("<repo>", "truncated string bytes"));
    }
    let s = String::from_utf8_lossy(&buf[*pos..*pos + len]).into_owned();
    *pos += len;
    Ok(s)
}

fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

pub fn encode_repo(repo: &Repository, out: &mut Vec<u8>) {
    encode_varint(repo.id as u64, out);
    out.extend_from_slice(&repo.rank.to_be_bytes());
    out.push(repo.tombstone as u8);
    encode_varint(zigzag_encode(repo.priority), out);
    encode_str(&repo.name, out);

    encode_varint(repo.branches.len() as u64, out);
    for b in &repo.branches {
        encode_str(&b.name, out);
        encode_str(&b.version, out);
    }

    encode_varint(repo.sub_repos.len() as u64, out);
    for sr in &repo.sub_repos {
        encode_str(&sr.path, out);
        encode_str(&sr.name, out);
    }

    encode_varint(repo.file_tombstones.len() as u64, out);
    for path in &repo.file_tombstones {
        encode_str(path, out);
    }

    encode_varint(repo.config.len() as u64, out);
    for (k, v) in &repo.config {
        encode_str(k, out);
        encode_str(v, out);
    }

    match &repo.url_template {
        Some(s) => {
            out.push(1);
            encode_str(s, out);
        }
        None => out.push(0),
    }
    match &repo.line_fragment_template {
        Some(s) => {
            out.push(1);
            encode_str(s, out);
        }
        None => out.push(0),
    }
}

pub fn decode_repo(buf: &[u8]) -> SearchResult<Repository> {
    let mut pos = 0usize;
    let (id, consumed) = decode_varint(buf)
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated repo id"))?;
    pos += consumed;

    if buf.len() < pos + 2 + 1 {
        return Err(SearchError::corrupt("<repo>", "truncated repo header"));
    }
    let rank = u16::from_be_bytes(buf[pos..pos + 2].try_into().unwrap());
    pos += 2;
    let tombstone = buf[pos] != 0;
    pos += 1;

    let (priority_raw, consumed) = decode_varint(&buf[pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated priority"))?;
    pos += consumed;
    let priority = zigzag_decode(priority_raw);

    let name = decode_str(buf, &mut pos)?;

    let (branch_count, consumed) = decode_varint(&buf[pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated branch count"))?;
    pos += consumed;
    let mut branches = Vec::with_capacity(branch_count as usize);
    for _ in 0..branch_count {
        let name = decode_str(buf, &mut pos)?;
        let version = decode_str(buf, &mut pos)?;
        branches.push(Branch { name, version });
    }

    let (sub_repo_count, consumed) = decode_varint(&buf[pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated sub-repo count"))?;
    pos += consumed;
    let mut sub_repos = Vec::with_capacity(sub_repo_count as usize);
    for _ in 0..sub_repo_count {
        let path = decode_str(buf, &mut pos)?;
        let name = decode_str(buf, &mut pos)?;
        sub_repos.push(SubRepository { path, name });
    }

    let (tomb_count, consumed) = decode_varint(&buf[pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated file-tombstone count"))?;
    pos += consumed;
    let mut file_tombstones = Vec::with_capacity(tomb_count as usize);
    for _ in 0..tomb_count {
        file_tombstones.push(decode_str(buf, &mut pos)?);
    }

    let (config_count, consumed) = decode_varint(&buf[pos..])
        .ok_or_else(|| SearchError::corrupt("<repo>", "truncated config count"))?;
    pos += consumed;
    let mut config = BTreeMap::new();
    for _ in 0..config_count {
        let k = decode_str(buf, &mut pos)?;
        let v = decode_str(buf, &mut pos)?;
        config.insert(k, v);
    }

    if pos >= buf.len() {
        return Err(SearchError::corrupt("<repo>", "truncated url-template flag"));
    }
    let url_template = if buf[pos] != 0 {
        pos += 1;
        Some(decode_str(buf, &mut pos)?)
    } else {
        pos += 1;
        None
    };

    if pos >= buf.len() {
        return Err(SearchError::corrupt("<repo>", "truncated line-fragment-template flag"));
    }
    let line_fragment_template = if buf[pos] != 0 {
        pos += 1;
        Some(decode_str(buf, &mut pos)?)
    } else {
        pos += 1;
        None
    };

    Ok(Repository {
        id: id as u32,
        name,
        rank,
        branches,
        sub_repos,
        tombstone,
        priority,
        file_tombstones,
        config,
        url_template,
        line_fragment_template,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_repo() -> Repository {
        let mut config = BTreeMap::new();
        config.insert("owner".to_string(), "acme".to_string());
        Repository {
            id: 7,
            name: "acme/widgets".to_string(),
            rank: 1234,
            branches: vec![
                Branch { name: "main".to_string(), version: "abc123".to_string() },
                Branch { name: "dev".to_string(), version: "def456".to_string() },
            ],
            sub_repos: vec![SubRepository {
                path: "vendor/lib".to_string(),
                name: "acme/lib".to_string(),
            }],
            tombstone: false,
            priority: -5,
            file_tombstones: vec!["src/secret.rs".to_string()],
            config,
            url_template: Some("https://example.com/{path}".to_string()),
            line_fragment_template: None,
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let repo = sample_repo();
        let mut buf = Vec::new();
        encode_repo(&repo, &mut buf);
        let back = decode_repo(&buf).unwrap();
        assert_eq!(back.id, repo.id);
        assert_eq!(back.name, repo.name);
        assert_eq!(back.rank, repo.rank);
        assert_eq!(back.branches, repo.branches);
        assert_eq!(back.sub_repos, repo.sub_repos);
        assert_eq!(back.priority, repo.priority);
        assert_eq!(back.file_tombstones, repo.file_tombstones);
        assert_eq!(back.config, repo.config);
        assert_eq!(back.url_template, repo.url_template);
        assert_eq!(back.line_fragment_template, repo.line_fragment_template);
    }

    #[test]
    fn negative_priority_roundtrips() {
        assert_eq!(zigzag_decode(zigzag_encode(-1)), -1);
        assert_eq!(zigzag_decode(zigzag_encode(i64::MIN)), i64::MIN);
        assert_eq!(zigzag_decode(zigzag_encode(i64::MAX)), i64::MAX);
    }
}
