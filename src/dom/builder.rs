//! Thin adaptor: registers as the HVML parser's event sink and translates
//! events into node creations and attachments, owning the "current parent"
//! pointer described in §4.4.

use ego_tree::NodeId;

use crate::error::Result;
use crate::hvml::{HvmlEvents, HvmlParser, HvmlParserConfig};
use crate::json::{JsonEvents, JsonValue, NumberValue};

use super::node::{Dom, NodeData};

enum JsonFrame {
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>, Option<String>),
}

pub struct DomBuilder {
    dom: Dom,
    current: NodeId,
    pending_attr_key: Option<String>,
    json_frames: Vec<JsonFrame>,
    json_root: Option<JsonValue>,
}

impl DomBuilder {
    pub fn new() -> Self {
        let dom = Dom::new();
        let current = dom.root_id();
        Self {
            dom,
            current,
            pending_attr_key: None,
            json_frames: vec![],
            json_root: None,
        }
    }

    pub fn into_dom(self) -> Dom {
        self.dom
    }

    fn attach_value(&mut self, v: JsonValue) {
        match self.json_frames.last_mut() {
            Some(JsonFrame::Array(items)) => items.push(v),
            Some(JsonFrame::Object(pairs, pending)) => {
                let key = pending.take().expect("value seen before key in object");
                if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = v;
                } else {
                    pairs.push((key, v));
                }
            }
            None => self.json_root = Some(v),
        }
    }
}

impl Default for DomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HvmlEvents for DomBuilder {
    fn tag_open(&mut self, name: &str) -> Result<()> {
        let mut node = self.dom.tree.get_mut(self.current).unwrap();
        let child = node.append(NodeData::Tag(name.to_string()));
        self.current = child.id();
        Ok(())
    }

    fn attr_key(&mut self, key: &str) -> Result<()> {
        self.pending_attr_key = Some(key.to_string());
        Ok(())
    }

    fn attr_val(&mut self, val: &str) -> Result<()> {
        let key = self
            .pending_attr_key
            .take()
            .expect("attr_val fired without a preceding attr_key");
        let mut node = self.dom.tree.get_mut(self.current).unwrap();
        node.append(NodeData::Attr {
            key,
            val: Some(val.to_string()),
        });
        Ok(())
    }

    fn tag_close(&mut self, _name: &str) -> Result<()> {
        self.current = self
            .dom
            .tree
            .get(self.current)
            .unwrap()
            .parent()
            .map(|p| p.id())
            .unwrap_or_else(|| self.dom.root_id());
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let mut node = self.dom.tree.get_mut(self.current).unwrap();
        node.append(NodeData::Text(text.to_string()));
        Ok(())
    }
}

impl JsonEvents for DomBuilder {
    fn open_array(&mut self) -> Result<()> {
        self.json_frames.push(JsonFrame::Array(vec![]));
        Ok(())
    }

    fn close_array(&mut self) -> Result<()> {
        let items = match self.json_frames.pop() {
            Some(JsonFrame::Array(items)) => items,
            _ => panic!("close_array without matching open_array"),
        };
        self.attach_value(JsonValue::Array(items));
        Ok(())
    }

    fn open_obj(&mut self) -> Result<()> {
        self.json_frames.push(JsonFrame::Object(vec![], None));
        Ok(())
    }

    fn close_obj(&mut self) -> Result<()> {
        let pairs = match self.json_frames.pop() {
            Some(JsonFrame::Object(pairs, _)) => pairs,
            _ => panic!("close_obj without matching open_obj"),
        };
        self.attach_value(JsonValue::Object(pairs));
        Ok(())
    }

    fn key(&mut self, key: &str) -> Result<()> {
        if let Some(JsonFrame::Object(_, pending)) = self.json_frames.last_mut() {
            *pending = Some(key.to_string());
        }
        Ok(())
    }

    fn on_true(&mut self) -> Result<()> {
        self.attach_value(JsonValue::True);
        Ok(())
    }

    fn on_false(&mut self) -> Result<()> {
        self.attach_value(JsonValue::False);
        Ok(())
    }

    fn on_null(&mut self) -> Result<()> {
        self.attach_value(JsonValue::Null);
        Ok(())
    }

    fn string(&mut self, val: &str) -> Result<()> {
        self.attach_value(JsonValue::String(val.to_string()));
        Ok(())
    }

    fn integer(&mut self, origin: &str, val: i64) -> Result<()> {
        self.attach_value(JsonValue::Number(crate::json::JsonNumber {
            origin: origin.to_string(),
            value: NumberValue::Integer(val),
        }));
        Ok(())
    }

    fn double(&mut self, origin: &str, val: f64) -> Result<()> {
        self.attach_value(JsonValue::Number(crate::json::JsonNumber {
            origin: origin.to_string(),
            value: NumberValue::Double(val),
        }));
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if let Some(root) = self.json_root.take() {
            let mut node = self.dom.tree.get_mut(self.current).unwrap();
            node.append(NodeData::Json(root));
        }
        self.json_frames.clear();
        Ok(())
    }
}

/// Parses standalone HVML text into a [`Dom`], using the default JSON-tag
/// configuration (`init`, `archedata`).
pub fn parse_str(input: &str) -> Result<Dom> {
    parse_str_with_config(input, HvmlParserConfig::default())
}

pub fn parse_str_with_config(input: &str, config: HvmlParserConfig) -> Result<Dom> {
    let mut parser = HvmlParser::new(config);
    let mut builder = DomBuilder::new();
    parser.push_str(&mut builder, input)?;
    parser.finish()?;
    Ok(builder.into_dom())
}
