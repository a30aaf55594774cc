//! Shard-aware query simplification: rewrite repo/branch/
//! language predicates using shard metadata, then fold Boolean constants.
//! This is the main driver of shard skipping -- a query that reduces to
//! `Const(false)` never touches the match tree or iterates a single
//! document.

use crate::index::reader::IndexData;
use crate::query::ast::Query;
use regex::Regex;

/// Simplify `query` against `index`'s repository/language metadata.
/// Returns the rewritten query; never fails (an unparsable repo-regexp is
/// left as a literal non-match rather than erroring, since repo regexps are
/// validated separately from content/filename regexps).
pub fn simplify(query: &Query, index: &IndexData) -> Query {
    let simplified = simplify_inner(query, index);
    fold_constants(simplified)
}

fn simplify_inner(query: &Query, index: &IndexData) -> Query {
    match query {
        Query::Const(b) => Query::Const(*b),

        Query::And(children) => {
            Query::And(children.iter().map(|c| simplify_inner(c, index)).collect())
        }
        Query::Or(children) => Query::Or(children.iter().map(|c| simplify_inner(c, index)).collect()),
        Query::Not(child) => Query::Not(Box::new(simplify_inner(child, index))),

        Query::Symbol(child) => {
            let inner = simplify_inner(child, index);
            if matches!(inner, Query::Const(false)) {
                Query::Const(false)
            } else {
                Query::Symbol(Box::new(inner))
            }
        }
        Query::Type(scope, child) => {
            let inner = simplify_inner(child, index);
            if matches!(inner, Query::Const(false)) {
                Query::Const(false)
            } else {
                Query::Type(*scope, Box::new(inner))
            }
        }

        Query::Repo(pattern) => simplify_repo_predicate(query, index, |name| {
            Regex::new(pattern).map(|re| re.is_match(name)).unwrap_or(false)
        }),
        Query::RepoRegexp(pattern) => simplify_repo_predicate(query, index, |name| {
            Regex::new(pattern).map(|re| re.is_match(name)).unwrap_or(false)
        }),
        Query::RepoSet(names) => {
            simplify_repo_predicate(query, index, |name| names.iter().any(|n| n == name))
        }
        Query::RepoIds(ids) => {
            if index.repos().iter().all(|r| ids.contains(r.id)) {
                Query::Const(true)
            } else if index.repos().iter().all(|r| !ids.contains(r.id)) {
                Query::Const(false)
            } else {
                query.clone()
            }
        }

        Query::BranchesRepos(pairs) => {
            let shard_has_any = pairs.iter().any(|(_, ids)| index.repos().iter().any(|r| ids.contains(r.id)));
            if shard_has_any {
                query.clone()
            } else {
                Query::Const(false)
            }
        }

        Query::Language(name) => {
            if index.language_code(name).is_none() {
                Query::Const(false)
            } else {
                query.clone()
            }
        }

        // No shard-level reduction defined for these atoms.
        Query::Substring { .. }
        | Query::Regexp { .. }
        | Query::Branch { .. }
        | Query::FileNameSet(_) => query.clone(),
    }
}

fn simplify_repo_predicate(
    original: &Query,
    index: &IndexData,
    matches: impl Fn(&str) -> bool,
) -> Query {
    if index.repos().is_empty() {
        return Query::Const(false);
    }
    let all_match = index.repos().iter().all(|r| matches(&r.name));
    if all_match {
        return Query::Const(true);
    }
    let none_match = index.repos().iter().all(|r| !matches(&r.name));
    if none_match {
        return Query::Const(false);
    }
    original.clone()
}

/// Boolean constant folding over `And`/`Or`/`Not`, applied bottom-up.
fn fold_constants(query: Query) -> Query {
    match query {
        Query::And(children) => {
            let mut folded: Vec<Query> = Vec::with_capacity(children.len());
            for c in children {
                let c = fold_constants(c);
                if matches!(c, Query::Const(false)) {
                    return Query::Const(false);
                }
                if !matches!(c, Query::Const(true)) {
                    folded.push(c);
                }
            }
            match folded.len() {
                0 => Query::Const(true),
                1 => folded.into_iter().next().unwrap(),
                _ => Query::And(folded),
            }
        }
        Query::Or(children) => {
            let mut folded: Vec<Query> = Vec::with_capacity(children.len());
            for c in children {
                let c = fold_constants(c);
                if matches!(c, Query::Const(true)) {
                    return Query::Const(true);
                }
                if !matches!(c, Query::Const(false)) {
                    folded.push(c);
                }
            }
            match folded.len() {
                0 => Query::Const(false),
                1 => folded.into_iter().next().unwrap(),
                _ => Query::Or(folded),
            }
        }
        Query::Not(child) => {
            let child = fold_constants(*child);
            match child {
                Query::Const(b) => Query::Const(!b),
                other => Query::Not(Box::new(other)),
            }
        }
        Query::Symbol(child) => Query::Symbol(Box::new(fold_constants(*child))),
        Query::Type(scope, child) => Query::Type(scope, Box::new(fold_constants(*child))),
        other => other,
    }
}
