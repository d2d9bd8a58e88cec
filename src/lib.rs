//! `hvml-rt`: a streaming character-by-character parser for JSON and HVML,
//! a DOM tree builder over the parsed events, and an XPath-subset query
//! engine over the resulting tree.
//!
//! The pipeline runs in one direction — bytes in, tree out, queries over
//! the tree — and every stage is synchronous and single-threaded (§5).

pub mod dom;
pub mod error;
pub mod hvml;
pub mod interpreter;
pub mod json;
pub mod utf8;
pub mod xpath;

pub use dom::{load_from_reader, parse_str, Dom};
pub use error::{HvmlError, Result};
