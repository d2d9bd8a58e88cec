//! Deterministic HVML serialisation: insertion-order attrs/children, no
//! introduced whitespace, escape sets exactly as specified in §4.5.

use ego_tree::NodeId;

use crate::error::Result;
use crate::json::{JsonValue, NumberValue};

use super::node::{Dom, NodeData};
use super::traversal::{traverse, Visitor};

pub fn serialize(dom: &Dom) -> String {
    let mut s = Serializer { out: String::new() };
    traverse(dom, dom.root_id(), &mut s).expect("serialisation cannot fail");
    s.out
}

struct Serializer {
    out: String,
}

impl Visitor for Serializer {
    fn tag_open(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        let name = dom.tree.get(id).unwrap().value().tag_name().unwrap();
        self.out.push('<');
        self.out.push_str(name);
        Ok(())
    }

    fn attr(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        if let NodeData::Attr { key, val } = dom.tree.get(id).unwrap().value() {
            self.out.push(' ');
            self.out.push_str(key);
            if let Some(v) = val {
                self.out.push_str("=\"");
                escape_attr_val(v, &mut self.out);
                self.out.push('"');
            }
        }
        Ok(())
    }

    fn tag_greater(&mut self, _dom: &Dom, _id: NodeId) -> Result<()> {
        self.out.push('>');
        Ok(())
    }

    fn tag_self_close(&mut self, _dom: &Dom, _id: NodeId) -> Result<()> {
        self.out.push_str("/>");
        Ok(())
    }

    fn tag_close(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        let name = dom.tree.get(id).unwrap().value().tag_name().unwrap();
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
        Ok(())
    }

    fn text(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        if let NodeData::Text(t) = dom.tree.get(id).unwrap().value() {
            escape_text(t, &mut self.out);
        }
        Ok(())
    }

    fn json(&mut self, dom: &Dom, id: NodeId) -> Result<()> {
        if let NodeData::Json(v) = dom.tree.get(id).unwrap().value() {
            serialize_json(v, &mut self.out);
        }
        Ok(())
    }
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr_val(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
}

pub fn serialize_json(v: &JsonValue, out: &mut String) {
    match v {
        JsonValue::Undefined => {}
        JsonValue::True => out.push_str("true"),
        JsonValue::False => out.push_str("false"),
        JsonValue::Null => out.push_str("null"),
        JsonValue::Number(n) => match n.value {
            NumberValue::Integer(_) => out.push_str(&n.origin),
            NumberValue::Double(_) => out.push_str(&n.origin),
        },
        JsonValue::String(s) => serialize_json_string(s, out),
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                serialize_json(item, out);
            }
            out.push(']');
        }
        JsonValue::Object(pairs) => {
            out.push('{');
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                serialize_json_string(k, out);
                out.push(':');
                serialize_json(v, out);
            }
            out.push('}');
        }
    }
}

fn serialize_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\0' => out.push_str("\\u0000"),
            _ => out.push(c),
        }
    }
    out.push('"');
}
