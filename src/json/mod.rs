//! Standalone JSON support: the value type DOM `Json` nodes carry, and the
//! push parser that produces lexeme events for both standalone JSON input
//! and JSON spans embedded in HVML element content.

pub mod parser;
pub mod value;

pub use parser::{JsonEvents, JsonParser};
pub use value::{JsonNumber, JsonValue, NumberValue};
