//! The `.meta` sidecar: JSON-serialized repository overrides applied on top
//! of a shard's built-in repository metadata without rewriting the shard.
//!
//! The mutable field whitelist is `{tombstone, priority, rank,
//! file_tombstones}`. `id`, `name`, and `branches` are immutable and any
//! other field present in a sidecar entry is ignored (logged, not merged
//! and not rejected).

use crate::index::types::Repository;
use serde::{Deserialize, Serialize};

/// One repository override entry, matched to a shard repository by `id`.
/// `#[serde(flatten)]` into `extra` captures any field outside the
/// whitelist so it can be logged rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaOverride {
    pub id: u32,
    pub tombstone: Option<bool>,
    pub priority: Option<i64>,
    pub rank: Option<u16>,
    pub file_tombstones: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The whole sidecar file: an ordered JSON array of overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaSidecar {
    pub overrides: Vec<MetaOverride>,
}

impl MetaSidecar {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let overrides: Vec<MetaOverride> = serde_json::from_str(json)?;
        Ok(Self { overrides })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.overrides)
    }

    /// Apply overrides to `repos` in place, ignoring (and logging) any
    /// unrecognized field and any override whose `id` doesn't match a
    /// repository in this shard.
    pub fn apply(&self, repos: &mut [Repository]) {
        for ov in &self.overrides {
            let Some(repo) = repos.iter_mut().find(|r| r.id == ov.id) else {
                eprintln!("meta sidecar: repository id {} not present in shard", ov.id);
                continue;
            };
            if let Some(tombstone) = ov.tombstone {
                repo.tombstone = tombstone;
            }
            if let Some(priority) = ov.priority {
                repo.priority = priority;
            }
            if let Some(rank) = ov.rank {
                repo.rank = rank;
            }
            if let Some(file_tombstones) = &ov.file_tombstones {
                repo.file_tombstones = file_tombstones.clone();
            }
            if !ov.extra.is_empty() {
                eprintln!(
                    "meta sidecar: ignoring unrecognized field(s) {:?} for repository {}",
                    ov.extra.keys().collect::<Vec<_>>(),
                    ov.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn repo(id: u32) -> Repository {
        Repository {
            id,
            name: format!("repo-{id}"),
            rank: 0,
            branches: Vec::new(),
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
    fn applies_whitelisted_fields_only() {
        let sidecar = MetaSidecar::parse(
            r#"[{"id": 1, "tombstone": true, "rank": 42, "name": "ignored-should-not-apply"}]"#,
        )
        .unwrap();
        let mut repos = vec![repo(1)];
        sidecar.apply(&mut repos);
        assert!(repos[0].tombstone);
        assert_eq!(repos[0].rank, 42);
        assert_eq!(repos[0].name, "repo-1");
    }

    #[test]
    fn unknown_repo_id_is_ignored_not_fatal() {
        let sidecar = MetaSidecar::parse(r#"[{"id": 999, "tombstone": true}]"#).unwrap();
        let mut repos = vec![repo(1)];
        sidecar.apply(&mut repos);
        assert!(!repos[0].tombstone);
    }

    #[test]
    fn round_trips_through_json() {
        let sidecar = MetaSidecar {
            overrides: vec![MetaOverride {
                id: 7,
                tombstone: Some(true),
                priority: Some(5),
                rank: None,
                file_tombstones: Some(vec!["a.rs".to_string()]),
                extra: Default::default(),
            }],
        };
        let json = sidecar.to_json().unwrap();
        let back = MetaSidecar::parse(&json).unwrap();
        assert_eq!(back.overrides.len(), 1);
        assert_eq!(back.overrides[0].id, 7);
        assert_eq!(back.overrides[0].priority, Some(5));
    }
}
