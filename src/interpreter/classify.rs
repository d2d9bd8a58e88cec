//! The classification pass (§4.7): one walk of a parsed DOM that builds the
//! visible `udom` and peels off the `init`/`observe`/`archetype`/`iterate`
//! subtrees and `{{ }}` mustache regions into separate collections.

use ego_tree::NodeId;
use regex::Regex;

use crate::dom::traversal::{attr_children, content_children};
use crate::dom::{Dom, NodeData};
use crate::error::Result;

use super::adverb::Adverb;
use super::event_type::EventType;

#[derive(Debug, Clone)]
pub struct InitPart {
    pub as_: Option<String>,
    pub by: Option<String>,
    pub adverb: Adverb,
    /// The `init` tag in the *original* document, not `udom`; its JSON
    /// child (if any) lives under it unchanged.
    pub source: NodeId,
}

#[derive(Debug, Clone)]
pub struct ObservePart {
    pub on: Option<String>,
    pub to: Option<String>,
    pub event: EventType,
    pub source: NodeId,
}

#[derive(Debug, Clone)]
pub struct ArchetypePart {
    pub source: NodeId,
}

#[derive(Debug, Clone)]
pub struct IteratePart {
    pub source: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MustacheAttach {
    Attr(NodeId),
    Text(NodeId),
}

#[derive(Debug, Clone)]
pub struct MustacheRegion {
    /// The full `{{ ... }}` match, braces included.
    pub outer: String,
    /// The trimmed expression inside the braces.
    pub inner: String,
    pub attach: MustacheAttach,
}

pub struct Classification {
    pub udom: Dom,
    pub inits: Vec<InitPart>,
    pub observes: Vec<ObservePart>,
    pub archetypes: Vec<ArchetypePart>,
    pub iterates: Vec<IteratePart>,
    pub mustaches: Vec<MustacheRegion>,
}

fn mustache_re() -> Regex {
    Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("static mustache pattern is valid")
}

pub fn classify(src: &Dom) -> Result<Classification> {
    let mut out = Classification {
        udom: Dom::new(),
        inits: vec![],
        observes: vec![],
        archetypes: vec![],
        iterates: vec![],
        mustaches: vec![],
    };
    let udom_root = out.udom.root_id();
    for child in content_children(src, src.root_id()) {
        walk(src, child, &mut out, udom_root);
    }
    scan_mustaches(&mut out);
    Ok(out)
}

fn walk(src: &Dom, id: NodeId, out: &mut Classification, udom_parent: NodeId) {
    let node = src.tree.get(id).unwrap();
    match node.value() {
        NodeData::Tag(name) if name == "init" => {
            out.inits.push(InitPart {
                as_: attr_value(src, id, "as"),
                by: attr_value(src, id, "by"),
                adverb: attr_value(src, id, "by")
                    .as_deref()
                    .map(Adverb::parse)
                    .unwrap_or_default(),
                source: id,
            });
        }
        NodeData::Tag(name) if name == "observe" => {
            out.observes.push(ObservePart {
                on: attr_value(src, id, "on"),
                to: attr_value(src, id, "to"),
                event: attr_value(src, id, "on")
                    .as_deref()
                    .map(EventType::parse)
                    .unwrap_or(EventType::Unknown),
                source: id,
            });
        }
        NodeData::Tag(name) if name == "archetype" => {
            out.archetypes.push(ArchetypePart { source: id });
        }
        NodeData::Tag(name) if name == "iterate" => {
            out.iterates.push(IteratePart { source: id });
        }
        NodeData::Tag(name) => {
            let name = name.clone();
            let new_id = {
                let mut udom_node = out.udom.tree.get_mut(udom_parent).unwrap();
                udom_node.append(NodeData::Tag(name)).id()
            };
            for attr in attr_children(src, id) {
                if let NodeData::Attr { key, val } = src.tree.get(attr).unwrap().value() {
                    out.udom
                        .tree
                        .get_mut(new_id)
                        .unwrap()
                        .append(NodeData::Attr {
                            key: key.clone(),
                            val: val.clone(),
                        });
                }
            }
            for child in content_children(src, id) {
                walk(src, child, out, new_id);
            }
        }
        NodeData::Text(t) => {
            out.udom
                .tree
                .get_mut(udom_parent)
                .unwrap()
                .append(NodeData::Text(t.clone()));
        }
        NodeData::Json(v) => {
            out.udom
                .tree
                .get_mut(udom_parent)
                .unwrap()
                .append(NodeData::Json(v.clone()));
        }
        NodeData::Attr { .. } | NodeData::Root => {}
    }
}

fn attr_value(dom: &Dom, tag_id: NodeId, key: &str) -> Option<String> {
    attr_children(dom, tag_id)
        .into_iter()
        .find_map(|a| match dom.tree.get(a).unwrap().value() {
            NodeData::Attr { key: k, val } if k == key => val.clone(),
            _ => None,
        })
}

fn scan_mustaches(out: &mut Classification) {
    let re = mustache_re();
    let udom = &out.udom;
    let mut found = vec![];
    fn walk_udom(
        udom: &Dom,
        id: NodeId,
        re: &Regex,
        found: &mut Vec<MustacheRegion>,
    ) {
        let node = udom.tree.get(id).unwrap();
        match node.value() {
            NodeData::Text(t) => {
                for cap in re.captures_iter(t) {
                    found.push(MustacheRegion {
                        outer: cap[0].to_string(),
                        inner: cap[1].to_string(),
                        attach: MustacheAttach::Text(id),
                    });
                }
            }
            NodeData::Tag(_) => {
                for attr in attr_children(udom, id) {
                    if let NodeData::Attr { val: Some(v), .. } = udom.tree.get(attr).unwrap().value() {
                        for cap in re.captures_iter(v) {
                            found.push(MustacheRegion {
                                outer: cap[0].to_string(),
                                inner: cap[1].to_string(),
                                attach: MustacheAttach::Attr(attr),
                            });
                        }
                    }
                }
                for child in content_children(udom, id) {
                    walk_udom(udom, child, re, found);
                }
            }
            _ => {}
        }
    }
    for child in content_children(udom, udom.root_id()) {
        walk_udom(udom, child, &re, &mut found);
    }
    out.mustaches = found;
}
