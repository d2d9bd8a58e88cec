//! A subset of XPath 1.0 (§4.6): the grammar down through axes, node tests,
//! and predicates with `position()`/`last()`, evaluated directly against a
//! [`crate::dom::Dom`] with no external schema or namespace resolution.

mod ast;
mod eval;
mod lexer;
mod value;

pub use ast::{Axis, Expr, LocationPath, NodeKind, NodeTest, Step};
pub use ast::parse;
pub use value::Value;

use ego_tree::NodeId;

use crate::dom::Dom;
use crate::error::Result;

/// Parses `expr` and evaluates it with `context` as the context node,
/// returning the resulting node-set in document order.
pub fn select(dom: &Dom, context: NodeId, expr: &str) -> Result<Vec<NodeId>> {
    let parsed = parse(expr)?;
    eval::query(dom, context, &parsed)
}

/// Convenience wrapper that selects from the document root.
pub fn select_from_root(dom: &Dom, expr: &str) -> Result<Vec<NodeId>> {
    select(dom, dom.root_id(), expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_str;

    #[test]
    fn descendant_text() {
        let dom = parse_str("<r><p>hi</p><p>bye</p></r>").unwrap();
        let nodes = select_from_root(&dom, "//p/text()").unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn predicate_position_and_last() {
        let dom = parse_str("<r><a/><a/><a/></r>").unwrap();
        let second = select_from_root(&dom, "/r/a[position()=2]").unwrap();
        assert_eq!(second.len(), 1);
        let last = select_from_root(&dom, "/r/a[last()]").unwrap();
        assert_eq!(last.len(), 1);
        assert_ne!(second[0], last[0]);
        let all = select_from_root(&dom, "/r/a").unwrap();
        assert_eq!(last[0], all[2]);
    }

    #[test]
    fn attribute_axis() {
        let dom = parse_str("<r id=\"x\"><a/></r>").unwrap();
        let ids = select_from_root(&dom, "/r/@id").unwrap();
        assert_eq!(ids.len(), 1);
    }
}
