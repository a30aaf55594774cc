//! Query layer: the AST callers build, shard-aware simplification, the
//! compiled match tree, scoring, and the search/list driver.
//!
//! No query-string parser lives here -- that's out of scope, a caller
//! builds the AST directly. Planning and execution are fused into
//! [`tree`]/[`search`], since this format's candidate-set computation and
//! execution share the same `RoaringBitmap`-backed representation.

pub mod ast;
pub mod scorer;
pub mod search;
pub mod simplify;
pub mod tree;

pub use ast::{Query, TypeScope};
