//! The grammar subset's AST, and the recursive-descent parser that builds it.

use super::lexer::{lex, Tok};
use crate::error::{HvmlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    SelfAxis,
    Child,
    Parent,
    Descendant,
    DescendantOrSelf,
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Following,
    FollowingSibling,
    Preceding,
    PrecedingSibling,
}

impl Axis {
    fn from_name(name: &str) -> Option<Axis> {
        Some(match name {
            "self" => Axis::SelfAxis,
            "child" => Axis::Child,
            "parent" => Axis::Parent,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "attribute" => Axis::Attribute,
            "following" => Axis::Following,
            "following-sibling" => Axis::FollowingSibling,
            "preceding" => Axis::Preceding,
            "preceding-sibling" => Axis::PrecedingSibling,
            _ => return None,
        })
    }

    /// Axes whose natural iteration order runs backward through document
    /// order; `position()`/`last()` inside a predicate on one of these axes
    /// number nodes nearest-first rather than in document order.
    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    Star,
    Name(String),
    NodeType(NodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Node,
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub sep_descendant: bool,
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStart {
    Absolute,
    AbsoluteDescendant,
    Relative,
}

#[derive(Debug, Clone)]
pub struct LocationPath {
    pub start: PathStart,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Neq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Mod(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Path(LocationPath),
    /// A primary expression that itself begins a relative path, e.g.
    /// `(//a)[1]` or a future grouped sub-expression as a path base.
    FilterPath(Box<Expr>, Vec<Expr>, Option<LocationPath>),
    Number(f64),
    Literal(String),
    Call(String, Vec<Expr>),
}

pub fn parse(input: &str) -> Result<Expr> {
    let toks = lex(input).map_err(HvmlError::XPathParse)?;
    let mut p = Parser { toks, pos: 0 };
    let e = p.parse_expr()?;
    p.expect_eof()?;
    Ok(e)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.toks[self.pos]
    }

    fn bump(&mut self) -> Tok {
        let t = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, t: &Tok) -> bool {
        if self.peek() == t {
            self.bump();
            true
        } else {
            false
        }
    }

    fn err(&self, msg: &str) -> HvmlError {
        HvmlError::XPathParse(format!("{} (at token {:?})", msg, self.peek()))
    }

    fn expect_eof(&self) -> Result<()> {
        if *self.peek() == Tok::Eof {
            Ok(())
        } else {
            Err(self.err("trailing tokens after expression"))
        }
    }

    fn is_name(&self, s: &str) -> bool {
        matches!(self.peek(), Tok::Name(n) if n == s)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.is_name("or") {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_eq()?;
        while self.is_name("and") {
            self.bump();
            let rhs = self.parse_eq()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_eq(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_rel()?;
        loop {
            if self.eat(&Tok::Eq) {
                lhs = Expr::Eq(Box::new(lhs), Box::new(self.parse_rel()?));
            } else if self.eat(&Tok::Neq) {
                lhs = Expr::Neq(Box::new(lhs), Box::new(self.parse_rel()?));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_rel(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_add()?;
        loop {
            if self.eat(&Tok::Lt) {
                lhs = Expr::Lt(Box::new(lhs), Box::new(self.parse_add()?));
            } else if self.eat(&Tok::Le) {
                lhs = Expr::Le(Box::new(lhs), Box::new(self.parse_add()?));
            } else if self.eat(&Tok::Gt) {
                lhs = Expr::Gt(Box::new(lhs), Box::new(self.parse_add()?));
            } else if self.eat(&Tok::Ge) {
                lhs = Expr::Ge(Box::new(lhs), Box::new(self.parse_add()?));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_add(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            if self.eat(&Tok::Plus) {
                lhs = Expr::Add(Box::new(lhs), Box::new(self.parse_mul()?));
            } else if self.eat(&Tok::Minus) {
                lhs = Expr::Sub(Box::new(lhs), Box::new(self.parse_mul()?));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.eat(&Tok::Star) {
                lhs = Expr::Mul(Box::new(lhs), Box::new(self.parse_unary()?));
            } else if self.is_name("div") {
                self.bump();
                lhs = Expr::Div(Box::new(lhs), Box::new(self.parse_unary()?));
            } else if self.is_name("mod") {
                self.bump();
                lhs = Expr::Mod(Box::new(lhs), Box::new(self.parse_unary()?));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Tok::Minus) {
            Ok(Expr::Neg(Box::new(self.parse_unary()?)))
        } else {
            self.parse_union()
        }
    }

    fn parse_union(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_path()?;
        while self.eat(&Tok::Pipe) {
            let rhs = self.parse_path()?;
            lhs = Expr::Union(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    /// `PathExpr`: either a `LocationPath`, or a filter expression
    /// (primary + predicates) optionally continued by a relative path.
    fn parse_path(&mut self) -> Result<Expr> {
        if self.starts_location_path() {
            return Ok(Expr::Path(self.parse_location_path()?));
        }
        let primary = self.parse_primary()?;
        let mut predicates = vec![];
        while self.eat(&Tok::LBracket) {
            predicates.push(self.parse_expr()?);
            if !self.eat(&Tok::RBracket) {
                return Err(self.err("expected ']'"));
            }
        }
        let tail = if self.eat(&Tok::SlashSlash) {
            let mut rel = self.parse_relative_path(true)?;
            rel.start = PathStart::Relative;
            Some(rel)
        } else if self.eat(&Tok::Slash) {
            let mut rel = self.parse_relative_path(false)?;
            rel.start = PathStart::Relative;
            Some(rel)
        } else {
            None
        };
        if predicates.is_empty() && tail.is_none() {
            Ok(primary)
        } else {
            Ok(Expr::FilterPath(Box::new(primary), predicates, tail))
        }
    }

    fn starts_location_path(&self) -> bool {
        match self.peek() {
            Tok::Slash | Tok::SlashSlash | Tok::At | Tok::Dot | Tok::DotDot | Tok::Star => true,
            Tok::Name(n) => {
                if matches!(n.as_str(), "or" | "and" | "div" | "mod") {
                    return false;
                }
                // `name(` is a step only for the reserved node-type tests;
                // every other `name(` is a function call (a primary expr).
                if self.toks.get(self.pos + 1) == Some(&Tok::LParen) {
                    matches!(n.as_str(), "node" | "text" | "json" | "comment")
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    fn parse_location_path(&mut self) -> Result<LocationPath> {
        if self.eat(&Tok::SlashSlash) {
            let mut path = self.parse_relative_path(true)?;
            path.start = PathStart::AbsoluteDescendant;
            Ok(path)
        } else if self.eat(&Tok::Slash) {
            if self.at_step_start() {
                let mut path = self.parse_relative_path(false)?;
                path.start = PathStart::Absolute;
                Ok(path)
            } else {
                Ok(LocationPath {
                    start: PathStart::Absolute,
                    steps: vec![],
                })
            }
        } else {
            self.parse_relative_path(false)
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.peek(),
            Tok::At | Tok::Dot | Tok::DotDot | Tok::Star | Tok::Name(_)
        )
    }

    fn parse_relative_path(&mut self, first_is_descendant: bool) -> Result<LocationPath> {
        let mut steps = vec![self.parse_step(first_is_descendant)?];
        loop {
            if self.eat(&Tok::SlashSlash) {
                steps.push(self.parse_step(true)?);
            } else if self.eat(&Tok::Slash) {
                steps.push(self.parse_step(false)?);
            } else {
                break;
            }
        }
        Ok(LocationPath {
            start: PathStart::Relative,
            steps,
        })
    }

    fn parse_step(&mut self, sep_descendant: bool) -> Result<Step> {
        if self.eat(&Tok::Dot) {
            return Ok(Step {
                sep_descendant,
                axis: Axis::SelfAxis,
                test: NodeTest::NodeType(NodeKind::Node),
                predicates: vec![],
            });
        }
        if self.eat(&Tok::DotDot) {
            return Ok(Step {
                sep_descendant,
                axis: Axis::Parent,
                test: NodeTest::NodeType(NodeKind::Node),
                predicates: vec![],
            });
        }
        let axis = if self.eat(&Tok::At) {
            Axis::Attribute
        } else if let Tok::Name(n) = self.peek().clone() {
            if self.toks.get(self.pos + 1) == Some(&Tok::ColonColon) {
                let axis = Axis::from_name(&n)
                    .ok_or_else(|| self.err(&format!("unknown axis '{}'", n)))?;
                self.bump();
                self.bump();
                axis
            } else {
                Axis::Child
            }
        } else {
            Axis::Child
        };
        let test = self.parse_node_test()?;
        let mut predicates = vec![];
        while self.eat(&Tok::LBracket) {
            predicates.push(self.parse_expr()?);
            if !self.eat(&Tok::RBracket) {
                return Err(self.err("expected ']'"));
            }
        }
        Ok(Step {
            sep_descendant,
            axis,
            test,
            predicates,
        })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest> {
        if self.eat(&Tok::Star) {
            return Ok(NodeTest::Star);
        }
        match self.bump() {
            Tok::Name(n) => {
                if *self.peek() == Tok::LParen {
                    let kind = match n.as_str() {
                        "node" => NodeKind::Node,
                        "text" => NodeKind::Text,
                        "json" => NodeKind::Json,
                        "comment" => {
                            return Err(self.err("comment() node test is not supported"))
                        }
                        other => return Err(self.err(&format!("unknown node type '{}'", other))),
                    };
                    self.bump();
                    if !self.eat(&Tok::RParen) {
                        return Err(self.err("expected ')'"));
                    }
                    Ok(NodeTest::NodeType(kind))
                } else {
                    Ok(NodeTest::Name(n))
                }
            }
            other => Err(HvmlError::XPathParse(format!(
                "expected a node test, found {:?}",
                other
            ))),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().clone() {
            Tok::LParen => {
                self.bump();
                let e = self.parse_expr()?;
                if !self.eat(&Tok::RParen) {
                    return Err(self.err("expected ')'"));
                }
                Ok(e)
            }
            Tok::Literal(s) => {
                self.bump();
                Ok(Expr::Literal(s))
            }
            Tok::Number(n) => {
                self.bump();
                Ok(Expr::Number(n))
            }
            Tok::Name(n) if *self.toks.get(self.pos + 1).unwrap_or(&Tok::Eof) == Tok::LParen => {
                self.bump();
                self.bump();
                let mut args = vec![];
                if *self.peek() != Tok::RParen {
                    args.push(self.parse_expr()?);
                    while self.eat(&Tok::Comma) {
                        args.push(self.parse_expr()?);
                    }
                }
                if !self.eat(&Tok::RParen) {
                    return Err(self.err("expected ')'"));
                }
                Ok(Expr::Call(n, args))
            }
            other => Err(HvmlError::XPathParse(format!(
                "expected a primary expression, found {:?}",
                other
            ))),
        }
    }
}
