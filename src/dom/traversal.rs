//! A single depth-first traversal primitive drives serialisation,
//! pretty-printing, classification, and the XPath result collector, each by
//! implementing [`Visitor`] rather than walking the tree themselves.

use ego_tree::NodeId;

use crate::error::Result;

use super::node::{Dom, NodeData};

/// Four discriminators per Tag: `tag_open` (name known, attrs not yet
/// visited), `attr` (zero or more, in insertion order), then either
/// `tag_self_close` (no content children) or `tag_greater` (end of the
/// start tag) followed by content and `tag_close`.
#[allow(unused_variables)]
pub trait Visitor {
    fn tag_open(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn attr(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn tag_greater(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn tag_self_close(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn tag_close(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn text(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
    fn json(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        Ok(())
    }
}

pub fn content_children(dom: &Dom, id: NodeId) -> Vec<NodeId> {
    dom.tree
        .get(id)
        .unwrap()
        .children()
        .filter(|c| !matches!(c.value(), NodeData::Attr { .. }))
        .map(|c| c.id())
        .collect()
}

pub fn attr_children(dom: &Dom, id: NodeId) -> Vec<NodeId> {
    dom.tree
        .get(id)
        .unwrap()
        .children()
        .filter(|c| matches!(c.value(), NodeData::Attr { .. }))
        .map(|c| c.id())
        .collect()
}

pub fn traverse<V: Visitor>(dom: &Dom, start: NodeId, v: &mut V) -> Result<()> {
    let value = dom.tree.get(start).unwrap().value().clone();
    match value {
        NodeData::Root => {
            for child in content_children(dom, start) {
                traverse(dom, child, v)?;
            }
        }
        NodeData::Tag(_) => {
            v.tag_open(dom, start)?;
            for attr in attr_children(dom, start) {
                v.attr(dom, attr)?;
            }
            let content = content_children(dom, start);
            if content.is_empty() {
                v.tag_self_close(dom, start)?;
            } else {
                v.tag_greater(dom, start)?;
                for child in content {
                    traverse(dom, child, v)?;
                }
                v.tag_close(dom, start)?;
            }
        }
        NodeData::Text(_) => v.text(dom, start)?,
        NodeData::Json(_) => v.json(dom, start)?,
        NodeData::Attr { .. } => {}
    }
    Ok(())
}

/// Pre-order document-order index for every node, attributes included.
/// Attributes are numbered immediately after their owning Tag and before
/// its element children, per the XPath convention used by [`crate::xpath`].
pub fn document_order(dom: &Dom) -> std::collections::HashMap<NodeId, usize> {
    let mut map = std::collections::HashMap::new();
    let mut counter = 0usize;
    fn walk(
        dom: &Dom,
        id: NodeId,
        counter: &mut usize,
        map: &mut std::collections::HashMap<NodeId, usize>,
    ) {
        map.insert(id, *counter);
        *counter += 1;
        if matches!(dom.tree.get(id).unwrap().value(), NodeData::Tag(_)) {
            for attr in attr_children(dom, id) {
                map.insert(attr, *counter);
                *counter += 1;
            }
        }
        for child in content_children(dom, id) {
            walk(dom, child, counter, map);
        }
    }
    walk(dom, dom.root_id(), &mut counter, &mut map);
    map
}
