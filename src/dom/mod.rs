//! The tree builder: consumes HVML parser events and owns the resulting
//! tree and its invariants (§4.4), plus the traversal/serialisation
//! primitives built on top of it (§4.5).

pub mod builder;
pub mod node;
pub mod serialize;
pub mod traversal;

pub use builder::{parse_str, parse_str_with_config, DomBuilder};
pub use node::{Dom, NodeData};
pub use serialize::serialize;

use ego_tree::NodeId;
use std::io::Read;

use crate::error::Result;
use crate::hvml::HvmlParserConfig;

pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Dom> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_str_with_config(&buf, HvmlParserConfig::default())
}

/// The string value of a node under XPath coercion rules (§4.6): a Tag's
/// first text descendant, an Attr's value, a Text/string-JSON node's bytes,
/// or a number JSON node's original text.
pub fn string_value(dom: &Dom, id: NodeId) -> String {
    let node = dom.tree.get(id).unwrap();
    match node.value() {
        NodeData::Root => first_text_descendant(dom, id).unwrap_or_default(),
        NodeData::Tag(_) => first_text_descendant(dom, id).unwrap_or_default(),
        NodeData::Attr { val, .. } => val.clone().unwrap_or_default(),
        NodeData::Text(t) => t.clone(),
        NodeData::Json(v) => v.string_value(),
    }
}

fn first_text_descendant(dom: &Dom, id: NodeId) -> Option<String> {
    for child in traversal::content_children(dom, id) {
        match dom.tree.get(child).unwrap().value() {
            NodeData::Text(t) => return Some(t.clone()),
            NodeData::Tag(_) => {
                if let Some(t) = first_text_descendant(dom, child) {
                    return Some(t);
                }
            }
            _ => {}
        }
    }
    None
}
