//! Pure push parser: bytes in, JSON-lexeme events out.
//!
//! The state stack is independent of nesting depth — depth lives in the
//! caller's own open/close bookkeeping, not in this parser. One call to
//! [`JsonParser::push_byte`] drives zero or more state transitions and zero
//! or more [`JsonEvents`] callbacks, then returns.

use crate::error::{HvmlError, Result, SyntaxError};

/// Callback surface matching §4.2's contract. Every method has a no-op
/// default so a consumer only overrides the events it cares about.
#[allow(unused_variables)]
pub trait JsonEvents {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }
    fn open_array(&mut self) -> Result<()> {
        Ok(())
    }
    fn close_array(&mut self) -> Result<()> {
        Ok(())
    }
    fn open_obj(&mut self) -> Result<()> {
        Ok(())
    }
    fn close_obj(&mut self) -> Result<()> {
        Ok(())
    }
    fn key(&mut self, key: &str) -> Result<()> {
        Ok(())
    }
    fn on_true(&mut self) -> Result<()> {
        Ok(())
    }
    fn on_false(&mut self) -> Result<()> {
        Ok(())
    }
    fn on_null(&mut self) -> Result<()> {
        Ok(())
    }
    fn string(&mut self, val: &str) -> Result<()> {
        Ok(())
    }
    fn integer(&mut self, origin: &str, val: i64) -> Result<()> {
        Ok(())
    }
    fn double(&mut self, origin: &str, val: f64) -> Result<()> {
        Ok(())
    }
    fn item_done(&mut self) -> Result<()> {
        Ok(())
    }
    fn val_done(&mut self) -> Result<()> {
        Ok(())
    }
    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Begin,
    OpenObj,
    KeyDone,
    Str,
    Escape,
    EscapeU1,
    EscapeU2,
    EscapeU3,
    EscapeU4,
    Colon,
    ValDone,
    ObjComma,
    OpenArray,
    ItemDone,
    ArrayComma,
    Tfn,
    Number,
    Minus,
    Zero,
    Integer,
    Decimal,
    Esym,
    Exponent,
    End,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Begin => "BEGIN",
            State::OpenObj => "OPEN_OBJ",
            State::KeyDone => "KEY_DONE",
            State::Str => "STR",
            State::Escape => "ESCAPE",
            State::EscapeU1 => "ESCAPE_U1",
            State::EscapeU2 => "ESCAPE_U2",
            State::EscapeU3 => "ESCAPE_U3",
            State::EscapeU4 => "ESCAPE_U4",
            State::Colon => "COLON",
            State::ValDone => "VAL_DONE",
            State::ObjComma => "OBJ_COMMA",
            State::OpenArray => "OPEN_ARRAY",
            State::ItemDone => "ITEM_DONE",
            State::ArrayComma => "ARRAY_COMMA",
            State::Tfn => "TFN",
            State::Number => "NUMBER",
            State::Minus => "MINUS",
            State::Zero => "ZERO",
            State::Integer => "INTEGER",
            State::Decimal => "DECIMAL",
            State::Esym => "ESYM",
            State::Exponent => "EXPONENT",
            State::End => "END",
        }
    }
}

/// When `embedded` is set, `BEGIN` refuses to declare completion on the
/// first non-JSON byte (the caller may probe it), and `END` reports
/// end-of-value via [`JsonParser::is_ending`] instead of raising a syntax
/// error, so an outer grammar (the HVML parser) can resume on that byte.
pub struct JsonParser {
    states: Vec<State>,
    cache: String,
    trail: String,
    embedded: bool,
    line: usize,
    col: usize,
    shi: u32,
    slo: u32,
    awaiting_low_surrogate: bool,
}

impl JsonParser {
    pub fn new(embedded: bool) -> Self {
        Self {
            states: vec![State::Begin],
            cache: String::new(),
            trail: String::new(),
            embedded,
            line: 0,
            col: 0,
            shi: 0,
            slo: 0,
            awaiting_low_surrogate: false,
        }
    }

    pub fn is_begin(&self) -> bool {
        self.states.len() == 1 && self.states[0] == State::Begin
    }

    pub fn is_ending(&self) -> bool {
        self.states.len() == 1 && self.states[0] == State::End
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

    pub fn push_byte(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<()> {
        loop {
            match self.step(sink, c)? {
                true => continue,
                false => break,
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

    pub fn push_str(&mut self, sink: &mut dyn JsonEvents, s: &str) -> Result<()> {
        for c in s.chars() {
            self.push_byte(sink, c)?;
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        if self.states.len() == 1 && matches!(self.state(), State::End | State::Begin) {
            Ok(())
        } else {
            Err(HvmlError::Structure(
                "json input ended in the middle of a value".into(),
            ))
        }
    }

    /// Returns `true` when the caller should retry the same byte (the
    /// state transitioned without consuming it).
    fn step(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        match self.state() {
            State::Begin => self.at_begin(sink, c),
            State::OpenObj => self.at_open_obj(sink, c),
            State::KeyDone => self.at_key_done(c),
            State::Str => self.at_str(sink, c),
            State::Escape => self.at_escape(c),
            State::EscapeU1 | State::EscapeU2 | State::EscapeU3 | State::EscapeU4 => {
                self.at_escape_u(c)
            }
            State::Colon => self.at_colon(sink, c),
            State::ValDone => self.at_val_done(sink, c),
            State::ObjComma => self.at_obj_comma(sink, c),
            State::OpenArray => self.at_open_array(sink, c),
            State::ItemDone => self.at_item_done(sink, c),
            State::ArrayComma => self.at_array_comma(sink, c),
            State::Tfn => self.at_tfn(sink, c),
            State::Number => self.at_number(c),
            State::Minus => self.at_minus(c),
            State::Zero => self.at_zero(sink, c),
            State::Integer => self.at_integer(sink, c),
            State::Decimal => self.at_decimal(sink, c),
            State::Esym => self.at_esym(c),
            State::Exponent => self.at_exponent(sink, c),
            State::End => self.at_end(sink, c),
        }
    }

    fn at_begin(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '{' => {
                self.chg_state(State::End);
                self.push_state(State::OpenObj);
                sink.begin()?;
                sink.open_obj()?;
            }
            '[' => {
                self.chg_state(State::End);
                self.push_state(State::OpenArray);
                sink.begin()?;
                sink.open_array()?;
            }
            '"' => {
                self.chg_state(State::End);
                self.push_state(State::Str);
                sink.begin()?;
            }
            't' | 'f' | 'n' => {
                self.chg_state(State::End);
                self.push_state(State::Tfn);
                sink.begin()?;
                return Ok(true);
            }
            '0'..='9' | '+' | '-' => {
                self.chg_state(State::End);
                self.push_state(State::Number);
                sink.begin()?;
                return Ok(true);
            }
            _ => {
                if self.embedded {
                    return Err(self.err(Some(c)));
                }
                return Err(self.err(Some(c)));
            }
        }
        Ok(false)
    }

    fn at_open_obj(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '"' => {
                self.chg_state(State::KeyDone);
                self.push_state(State::Str);
            }
            '}' => {
                self.pop_state();
                sink.close_obj()?;
            }
            ',' => {}
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_key_done(&mut self, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == ':' {
            self.chg_state(State::Colon);
            Ok(false)
        } else {
            Err(self.err(Some(c)))
        }
    }

    fn at_str(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if self.awaiting_low_surrogate {
            if c == '\\' {
                self.cache.push(c);
                self.chg_state(State::Escape);
                return Ok(false);
            }
            return Err(self.err(Some(c)));
        }
        match c {
            '"' => {
                self.pop_state();
                match self.state() {
                    State::KeyDone => {
                        let key = std::mem::take(&mut self.cache);
                        sink.key(&key)?;
                    }
                    State::ValDone | State::ItemDone | State::End => {
                        let val = std::mem::take(&mut self.cache);
                        sink.string(&val)?;
                    }
                    _ => return Err(self.err(Some(c))),
                }
            }
            '\\' => {
                self.push_state(State::Escape);
                self.cache.push(c);
            }
            _ => self.cache.push(c),
        }
        Ok(false)
    }

    fn at_escape(&mut self, c: char) -> Result<bool> {
        if self.awaiting_low_surrogate {
            if c == 'u' {
                self.cache.push(c);
                self.chg_state(State::EscapeU1);
                return Ok(false);
            }
            return Err(self.err(Some(c)));
        }
        let replaced = match c {
            '"' => Some('"'),
            '/' => Some('/'),
            '\\' => Some('\\'),
            'b' => Some('\u{8}'),
            't' => Some('\t'),
            'f' => Some('\u{c}'),
            'r' => Some('\r'),
            'n' => Some('\n'),
            'u' => None,
            _ => return Err(self.err(Some(c))),
        };
        match replaced {
            Some(ch) => {
                self.cache.pop();
                self.cache.push(ch);
                self.pop_state();
            }
            None => {
                self.cache.push(c);
                self.chg_state(State::EscapeU1);
            }
        }
        Ok(false)
    }

    fn at_escape_u(&mut self, c: char) -> Result<bool> {
        let digit = c.to_digit(16).ok_or_else(|| self.err(Some(c)))?;
        self.cache.push(c);
        let cur_state = self.state();
        let slot = if self.awaiting_low_surrogate {
            &mut self.slo
        } else {
            &mut self.shi
        };
        let shift = match cur_state {
            State::EscapeU1 => 12,
            State::EscapeU2 => 8,
            State::EscapeU3 => 4,
            State::EscapeU4 => 0,
            _ => unreachable!(),
        };
        *slot |= digit << shift;

        let next = match self.state() {
            State::EscapeU1 => Some(State::EscapeU2),
            State::EscapeU2 => Some(State::EscapeU3),
            State::EscapeU3 => Some(State::EscapeU4),
            State::EscapeU4 => None,
            _ => unreachable!(),
        };
        if let Some(n) = next {
            self.chg_state(n);
            return Ok(false);
        }

        // four hex digits collected
        if !self.awaiting_low_surrogate {
            let hi = self.shi;
            if (0xD800..=0xDBFF).contains(&hi) {
                self.awaiting_low_surrogate = true;
                self.chg_state(State::Str);
                return Ok(false);
            }
            if (0xDC00..=0xDFFF).contains(&hi) {
                return Err(self.err(None));
            }
            self.cache.truncate(self.cache.len() - 6);
            let ch = char::from_u32(hi).ok_or_else(|| self.err(None))?;
            self.cache.push(ch);
            self.shi = 0;
            self.pop_state();
            return Ok(false);
        }

        let lo = self.slo;
        if !(0xDC00..=0xDFFF).contains(&lo) {
            return Err(self.err(None));
        }
        let cp = 0x10000 + ((self.shi - 0xD800) << 10) + (lo - 0xDC00);
        self.cache.truncate(self.cache.len() - 12);
        let ch = char::from_u32(cp).ok_or_else(|| self.err(None))?;
        self.cache.push(ch);
        self.shi = 0;
        self.slo = 0;
        self.awaiting_low_surrogate = false;
        self.pop_state();
        Ok(false)
    }

    fn at_colon(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '{' => {
                self.chg_state(State::ValDone);
                self.push_state(State::OpenObj);
                sink.open_obj()?;
            }
            '[' => {
                self.chg_state(State::ValDone);
                self.push_state(State::OpenArray);
                sink.open_array()?;
            }
            '"' => {
                self.chg_state(State::ValDone);
                self.push_state(State::Str);
            }
            't' | 'f' | 'n' => {
                self.chg_state(State::ValDone);
                self.push_state(State::Tfn);
                return Ok(true);
            }
            '0'..='9' | '+' | '-' => {
                self.chg_state(State::ValDone);
                self.push_state(State::Number);
                return Ok(true);
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_val_done(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '}' => {
                self.pop_state();
                sink.val_done()?;
                sink.close_obj()?;
            }
            ',' => {
                self.chg_state(State::ObjComma);
                sink.val_done()?;
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_obj_comma(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '"' => {
                self.chg_state(State::KeyDone);
                self.push_state(State::Str);
            }
            ',' => {}
            '}' => {
                self.pop_state();
                sink.close_obj()?;
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_open_array(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            ']' => {
                self.pop_state();
                sink.close_array()?;
            }
            '{' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::OpenObj);
                sink.open_obj()?;
            }
            '[' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::OpenArray);
                sink.open_array()?;
            }
            '"' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Str);
            }
            't' | 'f' | 'n' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Tfn);
                return Ok(true);
            }
            '0'..='9' | '+' | '-' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Number);
                return Ok(true);
            }
            ',' => {}
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_item_done(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            ',' => {
                self.chg_state(State::ArrayComma);
                sink.item_done()?;
            }
            ']' => {
                self.pop_state();
                sink.item_done()?;
                sink.close_array()?;
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_array_comma(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        match c {
            '{' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::OpenObj);
                sink.open_obj()?;
            }
            '[' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::OpenArray);
                sink.open_array()?;
            }
            '"' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Str);
            }
            't' | 'f' | 'n' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Tfn);
                return Ok(true);
            }
            '0'..='9' | '+' | '-' => {
                self.chg_state(State::ItemDone);
                self.push_state(State::Number);
                return Ok(true);
            }
            ',' => {}
            ']' => {
                self.pop_state();
                sink.close_array()?;
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_tfn(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        const TRUE: &str = "true";
        const FALSE: &str = "false";
        const NULL: &str = "null";
        if self.cache.is_empty() {
            if matches!(c, 't' | 'f' | 'n') {
                self.cache.push(c);
                return Ok(false);
            }
            return Err(self.err(Some(c)));
        }
        let word = match self.cache.as_bytes()[0] {
            b't' => TRUE,
            b'f' => FALSE,
            b'n' => NULL,
            _ => unreachable!(),
        };
        let next = word.as_bytes().get(self.cache.len()).copied();
        if next == Some(c as u8) {
            self.cache.push(c);
            if self.cache.len() < word.len() {
                return Ok(false);
            }
            self.cache.clear();
            self.pop_state();
            match word {
                TRUE => sink.on_true()?,
                FALSE => sink.on_false()?,
                _ => sink.on_null()?,
            }
            return Ok(false);
        }
        Err(self.err(Some(c)))
    }

    fn at_number(&mut self, c: char) -> Result<bool> {
        match c {
            '+' | '-' => {
                self.cache.push(c);
                self.chg_state(State::Minus);
            }
            '0' => {
                self.cache.push(c);
                self.chg_state(State::Zero);
            }
            '1'..='9' => {
                self.cache.push(c);
                self.chg_state(State::Integer);
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn at_minus(&mut self, c: char) -> Result<bool> {
        match c {
            '0' => {
                self.cache.push(c);
                self.chg_state(State::Zero);
            }
            '1'..='9' => {
                self.cache.push(c);
                self.chg_state(State::Integer);
            }
            _ => return Err(self.err(Some(c))),
        }
        Ok(false)
    }

    fn finish_number(&mut self, sink: &mut dyn JsonEvents) -> Result<()> {
        let origin = std::mem::take(&mut self.cache);
        if origin.is_empty() || origin.ends_with('+') || origin.ends_with('-') {
            return Err(self.err(None));
        }
        let is_float = origin.contains(['.', 'e', 'E']);
        if !is_float {
            let normalized = origin.trim_start_matches('+');
            if let Ok(v) = normalized.parse::<i64>() {
                sink.integer(&origin, v)?;
                return Ok(());
            }
        }
        let normalized = origin.trim_start_matches('+');
        let v: f64 = normalized
            .parse()
            .map_err(|_| self.err(None))?;
        sink.double(&origin, v)?;
        Ok(())
    }

    fn at_zero(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        match c {
            '.' => {
                self.cache.push(c);
                self.chg_state(State::Decimal);
                Ok(false)
            }
            'e' | 'E' => {
                self.cache.push(c);
                self.chg_state(State::Esym);
                Ok(false)
            }
            _ => {
                self.pop_state();
                self.finish_number(sink)?;
                Ok(true)
            }
        }
    }

    fn at_integer(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        match c {
            '.' => {
                self.cache.push(c);
                self.chg_state(State::Decimal);
                Ok(false)
            }
            'e' | 'E' => {
                self.cache.push(c);
                self.chg_state(State::Esym);
                Ok(false)
            }
            '0'..='9' => {
                self.cache.push(c);
                Ok(false)
            }
            _ => {
                self.pop_state();
                self.finish_number(sink)?;
                Ok(true)
            }
        }
    }

    fn at_decimal(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        match c {
            'e' | 'E' => {
                self.cache.push(c);
                self.chg_state(State::Esym);
                Ok(false)
            }
            '0'..='9' => {
                self.cache.push(c);
                Ok(false)
            }
            _ => {
                self.pop_state();
                self.finish_number(sink)?;
                Ok(true)
            }
        }
    }

    fn at_esym(&mut self, c: char) -> Result<bool> {
        match c {
            '+' | '-' | '0'..='9' => {
                self.cache.push(c);
                self.chg_state(State::Exponent);
                Ok(false)
            }
            _ => Err(self.err(Some(c))),
        }
    }

    fn at_exponent(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        match c {
            '0'..='9' => {
                self.cache.push(c);
                Ok(false)
            }
            _ => {
                self.pop_state();
                self.finish_number(sink)?;
                Ok(true)
            }
        }
    }

    fn at_end(&mut self, sink: &mut dyn JsonEvents, c: char) -> Result<bool> {
        if c.is_whitespace() {
            return Ok(false);
        }
        if c == ',' {
            return Ok(false);
        }
        sink.end()?;
        if self.embedded {
            return Err(self.err(Some(c)));
        }
        Err(self.err(Some(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl JsonEvents for Recorder {
        fn begin(&mut self) -> Result<()> {
            self.events.push("begin".into());
            Ok(())
        }
        fn open_obj(&mut self) -> Result<()> {
            self.events.push("open_obj".into());
            Ok(())
        }
        fn close_obj(&mut self) -> Result<()> {
            self.events.push("close_obj".into());
            Ok(())
        }
        fn open_array(&mut self) -> Result<()> {
            self.events.push("open_array".into());
            Ok(())
        }
        fn close_array(&mut self) -> Result<()> {
            self.events.push("close_array".into());
            Ok(())
        }
        fn key(&mut self, key: &str) -> Result<()> {
            self.events.push(format!("key({key})"));
            Ok(())
        }
        fn string(&mut self, val: &str) -> Result<()> {
            self.events.push(format!("string({val})"));
            Ok(())
        }
        fn integer(&mut self, origin: &str, val: i64) -> Result<()> {
            self.events.push(format!("integer({origin},{val})"));
            Ok(())
        }
        fn double(&mut self, origin: &str, val: f64) -> Result<()> {
            self.events.push(format!("double({origin},{val})"));
            Ok(())
        }
        fn val_done(&mut self) -> Result<()> {
            self.events.push("val_done".into());
            Ok(())
        }
    }

    fn run(input: &str) -> Recorder {
        let mut p = JsonParser::new(false);
        let mut r = Recorder::default();
        p.push_str(&mut r, input).unwrap();
        p.finish().unwrap();
        r
    }

    #[test]
    fn integer_and_double_roundtrip_scenario() {
        let r = run(r#"{"a":-0,"b":1e2}"#);
        assert!(r.events.contains(&"integer(-0,0)".to_string()));
        assert!(r.events.contains(&"double(1e2,100)".to_string()));
    }

    #[test]
    fn surrogate_pair_decodes_to_single_code_point() {
        let r = run(r#""😀""#);
        assert_eq!(r.events, vec!["begin".to_string(), "string(\u{1F600})".to_string()]);
    }

    #[test]
    fn chunking_is_transparent_to_event_order() {
        let whole = run(r#"[1,2,3]"#);
        let mut p = JsonParser::new(false);
        let mut r = Recorder::default();
        for chunk in ["[1", ",2", ",3]"] {
            p.push_str(&mut r, chunk).unwrap();
        }
        p.finish().unwrap();
        assert_eq!(whole.events, r.events);
    }
}
