use std::collections::HashSet;

use crate::error::{HvmlError, Result, SyntaxError};
use crate::json::{JsonEvents, JsonParser};

/// Markup-level callback surface. A sink also implements [`JsonEvents`]
/// (its methods fire for the content of any tag configured as JSON-bearing).
#[allow(unused_variables)]
pub trait HvmlEvents: JsonEvents {
    fn document_begin(&mut self) -> Result<()> {
        Ok(())
    }
    fn tag_open(&mut self, name: &str) -> Result<()> {
        Ok(())
    }
    fn attr_key(&mut self, key: &str) -> Result<()> {
        Ok(())
    }
    fn attr_val(&mut self, val: &str) -> Result<()> {
        Ok(())
    }
    fn tag_open_done(&mut self) -> Result<()> {
        Ok(())
    }
    fn tag_close(&mut self, name: &str) -> Result<()> {
        Ok(())
    }
    fn text(&mut self, text: &str) -> Result<()> {
        Ok(())
    }
    fn document_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Which tag names get their content delegated to a nested JSON parser.
#[derive(Debug, Clone)]
pub struct HvmlParserConfig {
    pub json_tags: HashSet<String>,
}

impl Default for HvmlParserConfig {
    fn default() -> Self {
        Self {
            json_tags: ["init", "archedata"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    Markup,
    Exclamation,
    InDecl,
    Comment,
    Stag,
    EmptyTag,
    AttrOrEnd,
    Attr,
    AttrDone,
    AttrVal,
    Str,
    Escape,
    ExpGreater,
    Element,
    Etag,
    End,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Begin => "BEGIN",
            State::Markup => "MARKUP",
            State::Exclamation => "EXCLAMATION",
            State::InDecl => "IN_DECL",
            State::Comment => "COMMENT",
            State::Stag => "STAG",
            State::EmptyTag => "EMPTYTAG",
            State::AttrOrEnd => "ATTR_OR_END",
            State::Attr => "ATTR",
            State::AttrDone => "ATTR_DONE",
            State::AttrVal => "ATTR_VAL",
            State::Str => "STR",
            State::Escape => "ESCAPE",
            State::ExpGreater => "EXP_GREATER",
            State::Element => "ELEMENT",
            State::Etag => "ETAG",
            State::End => "END",
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == ':' || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ':' | '_' | '-' | '.')
}

pub struct HvmlParser {
    config: HvmlParserConfig,
    states: Vec<State>,
    cache: String,
    trail: String,
    quote: char,
    comment_tail: String,
    tag_stack: Vec<String>,
    json: Option<JsonParser>,
    line: usize,
    col: usize,
}

impl HvmlParser {
    pub fn new(config: HvmlParserConfig) -> Self {
        Self {
            config,
            states: vec![State::Begin],
            cache: String::new(),
            trail: String::new(),
            quote: '"',
            comment_tail: String::new(),
            tag_stack: vec![],
            json: None,
            line: 0,
            col: 0,
        }
    }

    fn state(&self) -> State {
        *self.states.last().unwrap()
    }

    fn push_state(&mut self, s: State) {
        self.states.push(s);
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().expect("state stack underflow")
    }

    fn chg_state(&mut self, s: State) {
        *self.states.last_mut().unwrap() = s;
    }

    fn err(&self, c: Option<char>) -> HvmlError {
        HvmlError::Syntax(SyntaxError {
            line: self.line + 1,
            col: self.col + 1,
            state: self.state().name(),
            trail: self.trail.clone(),
            found: c,
        })
    }

    pub fn push_byte<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<()> {
        loop {
            if !self.step(sink, c)? {
                break;
            }
        }
        if c == '\n' {
            self.trail.clear();
            self.line += 1;
            self.col = 0;
        } else {
            self.trail.push(c);
            self.col += 1;
        }
        Ok(())
    }

    pub fn push_str<S: HvmlEvents>(&mut self, sink: &mut S, s: &str) -> Result<()> {
        for c in s.chars() {
            self.push_byte(sink, c)?;
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        if self.states.len() == 1 && self.state() == State::End {
            Ok(())
        } else {
            Err(HvmlError::Structure(
                "hvml input ended with unclosed tags".into(),
            ))
        }
    }

    fn step<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        match self.state() {
            State::Begin => self.at_begin(c),
            State::Markup => self.at_markup(sink, c),
            State::Exclamation => self.at_exclamation(c),
            State::InDecl => self.at_in_decl(c),
            State::Comment => self.at_comment(c),
            State::Stag => self.at_stag(sink, c),
            State::EmptyTag => self.at_emptytag(sink, c),
            State::AttrOrEnd => self.at_attr_or_end(c),
            State::Attr => self.at_attr(c),
            State::AttrDone => self.at_attr_done(sink, c),
            State::AttrVal => self.at_attr_val(sink, c),
            State::Str => self.at_str(sink, c),
            State::Escape => self.at_escape(c),
            State::ExpGreater => self.at_exp_greater(sink, c),
            State::Element => self.at_element(sink, c),
            State::Etag => self.at_etag(sink, c),
            State::End => self.at_end(c),
        }
    }

    fn at_begin(&mut self, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == '<' {
            self.chg_state(State::End);
            self.push_state(State::Markup);
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_markup<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        match c {
            '!' => self.chg_state(State::Exclamation),
            '/' => {
                self.cache.clear();
                self.chg_state(State::Etag);
            }
            _ => {
                if !is_name_start(c) {
                    return Err(self.err(Some(c)));
                }
                self.cache.clear();
                self.cache.push(c);
                self.chg_state(State::Stag);
                if self.tag_stack.is_empty() {
                    sink.document_begin()?;
                }
            }
        }
        Ok(false)
    }

    fn at_exclamation(&mut self, c: char) -> Result<bool> {
        if c == '-' {
            self.comment_tail.clear();
            self.chg_state(State::Comment);
            return Ok(false);
        }
        self.cache.clear();
        self.cache.push(c);
        self.chg_state(State::InDecl);
        Ok(false)
    }

    fn at_in_decl(&mut self, c: char) -> Result<bool> {
        if c == '>' {
            self.pop_state();
            return Ok(false);
        }
        self.cache.push(c);
        Ok(false)
    }

    fn at_comment(&mut self, c: char) -> Result<bool> {
        self.comment_tail.push(c);
        if self.comment_tail.len() > 3 {
            let drop = self.comment_tail.len() - 3;
            self.comment_tail.drain(0..drop);
        }
        if self.comment_tail.ends_with("-->") {
            self.pop_state();
        }
        Ok(false)
    }

    fn at_stag<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if is_name_char(c) {
            self.cache.push(c);
            return Ok(false);
        }
        if c.is_whitespace() || c == '>' || c == '/' {
            let name = self.cache.clone();
            self.tag_stack.push(name.clone());
            sink.tag_open(&name)?;
            if c == '>' {
                self.chg_state(State::ExpGreater);
                return Ok(true);
            }
            if c == '/' {
                self.chg_state(State::EmptyTag);
                return Ok(false);
            }
            self.chg_state(State::AttrOrEnd);
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_attr_or_end(&mut self, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == '>' {
            self.chg_state(State::ExpGreater);
            return Ok(true);
        }
        if c == '/' {
            self.chg_state(State::EmptyTag);
            return Ok(false);
        }
        if is_name_start(c) {
            self.cache.clear();
            self.cache.push(c);
            self.chg_state(State::Attr);
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_attr(&mut self, c: char) -> Result<bool> {
        if is_name_char(c) {
            self.cache.push(c);
            return Ok(false);
        }
        if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
            self.chg_state(State::AttrDone);
            return Ok(true);
        }
        Err(self.err(Some(c)))
    }

    fn at_attr_done<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == '=' {
            self.chg_state(State::AttrVal);
            return Ok(false);
        }
        let key = self.cache.clone();
        sink.attr_key(&key)?;
        sink.attr_val("")?;
        self.cache.clear();
        self.chg_state(State::AttrOrEnd);
        Ok(true)
    }

    fn at_attr_val<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == '"' || c == '\'' {
            let key = self.cache.clone();
            sink.attr_key(&key)?;
            self.quote = c;
            self.cache.clear();
            self.chg_state(State::Str);
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_str<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if c == self.quote {
            let val = self.cache.clone();
            sink.attr_val(&val)?;
            self.cache.clear();
            self.chg_state(State::AttrOrEnd);
            return Ok(false);
        }
        if c == '\\' {
            self.push_state(State::Escape);
            return Ok(false);
        }
        self.cache.push(c);
        Ok(false)
    }

    fn at_escape(&mut self, c: char) -> Result<bool> {
        let ch = match c {
            'b' => '\u{8}',
            't' => '\t',
            'f' => '\u{c}',
            'r' => '\r',
            'n' => '\n',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return Err(self.err(Some(c))),
        };
        self.cache.push(ch);
        self.pop_state();
        Ok(false)
    }

    fn at_exp_greater<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if c != '>' {
            return Err(self.err(Some(c)));
        }
        sink.tag_open_done()?;
        if let Some(name) = self.tag_stack.last() {
            if self.config.json_tags.contains(name) {
                self.json = Some(JsonParser::new(true));
            }
        }
        self.cache.clear();
        self.chg_state(State::Element);
        Ok(false)
    }

    fn at_emptytag<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if c != '>' {
            return Err(self.err(Some(c)));
        }
        sink.tag_open_done()?;
        let name = self.tag_stack.pop().expect("tag stack empty");
        sink.tag_close(&name)?;
        if self.tag_stack.is_empty() {
            self.pop_state();
            sink.document_end()?;
            return Ok(false);
        }
        self.chg_state(State::Element);
        Ok(false)
    }

    fn at_element<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if let Some(json) = &mut self.json {
            if c == '<' && json.is_ending() {
                self.json = None;
                sink.end()?;
                return Ok(true);
            }
            json.push_byte(sink, c)?;
            return Ok(false);
        }
        if c == '<' {
            if !self.cache.is_empty() {
                let text = self.cache.clone();
                sink.text(&text)?;
                self.cache.clear();
            }
            self.push_state(State::Markup);
            return Ok(false);
        }
        self.cache.push(c);
        Ok(false)
    }

    fn at_etag<S: HvmlEvents>(&mut self, sink: &mut S, c: char) -> Result<bool> {
        if is_name_char(c) {
            let top = self.tag_stack.last().cloned().unwrap_or_default();
            self.cache.push(c);
            if !top.starts_with(self.cache.as_str()) {
                return Err(self.err(Some(c)));
            }
            return Ok(false);
        }
        if c.is_whitespace() || c == '>' {
            let top = self.tag_stack.last().cloned().unwrap_or_default();
            if top != self.cache {
                return Err(self.err(Some(c)));
            }
            if c == '>' {
                let name = self.tag_stack.pop().unwrap();
                sink.tag_close(&name)?;
                if self.tag_stack.is_empty() {
                    self.pop_state();
                    sink.document_end()?;
                    return Ok(false);
                }
                self.pop_state();
                return Ok(false);
            }
            self.chg_state(State::ExpGreater);
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_end(&mut self, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }
}
