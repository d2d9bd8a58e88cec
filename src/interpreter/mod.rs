//! The classification pass that turns a parsed HVML document into a visible
//! `udom` plus the semantic-tag collections the runtime acts on (§4.7).

mod adverb;
mod classify;
mod event_type;

pub use adverb::Adverb;
pub use classify::{
    classify, ArchetypePart, Classification, InitPart, IteratePart, MustacheAttach,
    MustacheRegion, ObservePart,
};
pub use event_type::EventType;
