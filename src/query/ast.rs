//! Query abstract syntax tree.
//!
//! A plain, serializable algebraic data type; no parser is in scope here --
//! query parsing lives in the federating scheduler that embeds this crate.
//! Callers build a `Query` directly and hand it to the compiler, playing
//! the parser's role themselves.

use roaring::RoaringBitmap;

/// One query atom or combinator.
#[derive(Debug, Clone)]
pub enum Query {
    Const(bool),
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
    Substring { pattern: String, case_sensitive: bool, file_name: bool, content: bool },
    Regexp { pattern: String, case_sensitive: bool, file_name: bool, content: bool },
    Symbol(Box<Query>),
    Repo(String),
    RepoRegexp(String),
    RepoSet(Vec<String>),
    RepoIds(RoaringBitmap),
    Branch { pattern: String, exact: bool },
    BranchesRepos(Vec<(String, RoaringBitmap)>),
    Language(String),
    FileNameSet(Vec<String>),
    Type(TypeScope, Box<Query>),
}

/// The projection scope for a `type(...)` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeScope {
    FileName,
    Repo,
}

impl Query {
    pub fn substring(
        pattern: impl Into<String>,
        case_sensitive: bool,
        file_name: bool,
        content: bool,
    ) -> Self {
        Query::Substring { pattern: pattern.into(), case_sensitive, file_name, content }
    }

    pub fn regexp(
        pattern: impl Into<String>,
        case_sensitive: bool,
        file_name: bool,
        content: bool,
    ) -> Self {
        Query::Regexp { pattern: pattern.into(), case_sensitive, file_name, content }
    }

    pub fn and(parts: impl IntoIterator<Item = Query>) -> Self {
        Query::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Query>) -> Self {
        Query::Or(parts.into_iter().collect())
    }

    pub fn not(inner: Query) -> Self {
        Query::Not(Box::new(inner))
    }

    pub fn symbol(inner: Query) -> Self {
        Query::Symbol(Box::new(inner))
    }

    pub fn branch(pattern: impl Into<String>, exact: bool) -> Self {
        Query::Branch { pattern: pattern.into(), exact }
    }

    pub fn repo(pattern: impl Into<String>) -> Self {
        Query::Repo(pattern.into())
    }

    pub fn repo_set(names: impl IntoIterator<Item = String>) -> Self {
        Query::RepoSet(names.into_iter().collect())
    }

    pub fn language(name: impl Into<String>) -> Self {
        Query::Language(name.into())
    }

    pub fn file_name_set(names: impl IntoIterator<Item = String>) -> Self {
        Query::FileNameSet(names.into_iter().collect())
    }

    pub fn type_filter(scope: TypeScope, inner: Query) -> Self {
        Query::Type(scope, Box::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_build_expected_shapes() {
        let q = Query::and([
            Query::substring("needle", false, true, true),
            Query::not(Query::branch("stable", true)),
        ]);
        match q {
            Query::And(children) => assert_eq!(children.len(), 2),
            _ => panic!("expected And"),
        }
    }
}
