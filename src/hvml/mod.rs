//! The HVML push parser: a superset-of-XML markup grammar that delegates
//! element content to the JSON parser for a configured set of tag names.

pub mod parser;

pub use parser::{HvmlEvents, HvmlParser, HvmlParserConfig};
