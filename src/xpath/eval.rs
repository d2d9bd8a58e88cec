//! Evaluates a parsed [`Expr`] against a [`Dom`]: axis walks, node tests,
//! predicates with `position()`/`last()`, and the operator/coercion rules.

use std::collections::HashSet;

use ego_tree::NodeId;

use crate::dom::{string_value, traversal, Dom};
use crate::error::{HvmlError, Result};

use super::ast::{Axis, Expr, LocationPath, NodeKind, NodeTest, PathStart, Step};
use super::value::Value;

struct Ctx<'a> {
    dom: &'a Dom,
    node: NodeId,
    position: usize,
    size: usize,
    doc_order: &'a std::collections::HashMap<NodeId, usize>,
}

/// Runs `expr` with `context` as the single initial context node and
/// returns its result node-set, sorted in document order with duplicates
/// removed (the "Document order" property).
pub fn query(dom: &Dom, context: NodeId, expr: &Expr) -> Result<Vec<NodeId>> {
    let doc_order = traversal::document_order(dom);
    let ctx = Ctx {
        dom,
        node: context,
        position: 1,
        size: 1,
        doc_order: &doc_order,
    };
    let v = eval(&ctx, expr)?;
    let mut nodes = match v {
        Value::NodeSet(ns) => ns,
        other => return Err(HvmlError::XPathEval(format!(
            "query root expression did not evaluate to a node-set: {:?}",
            other
        ))),
    };
    nodes.sort_by_key(|id| doc_order.get(id).copied().unwrap_or(usize::MAX));
    nodes.dedup();
    Ok(nodes)
}

fn eval(ctx: &Ctx, expr: &Expr) -> Result<Value> {
    Ok(match expr {
        Expr::Or(a, b) => Value::Boolean(eval(ctx, a)?.boolean() || eval(ctx, b)?.boolean()),
        Expr::And(a, b) => Value::Boolean(eval(ctx, a)?.boolean() && eval(ctx, b)?.boolean()),
        Expr::Eq(a, b) => Value::Boolean(compare_eq(ctx, a, b, false)?),
        Expr::Neq(a, b) => Value::Boolean(compare_eq(ctx, a, b, true)?),
        Expr::Lt(a, b) => Value::Boolean(compare_rel(ctx, a, b, |x, y| x < y)?),
        Expr::Le(a, b) => Value::Boolean(compare_rel(ctx, a, b, |x, y| x <= y)?),
        Expr::Gt(a, b) => Value::Boolean(compare_rel(ctx, a, b, |x, y| x > y)?),
        Expr::Ge(a, b) => Value::Boolean(compare_rel(ctx, a, b, |x, y| x >= y)?),
        Expr::Add(a, b) => Value::Number(eval(ctx, a)?.number(ctx.dom) + eval(ctx, b)?.number(ctx.dom)),
        Expr::Sub(a, b) => Value::Number(eval(ctx, a)?.number(ctx.dom) - eval(ctx, b)?.number(ctx.dom)),
        Expr::Mul(a, b) => Value::Number(eval(ctx, a)?.number(ctx.dom) * eval(ctx, b)?.number(ctx.dom)),
        Expr::Div(a, b) => Value::Number(eval(ctx, a)?.number(ctx.dom) / eval(ctx, b)?.number(ctx.dom)),
        Expr::Mod(a, b) => {
            let (x, y) = (eval(ctx, a)?.number(ctx.dom), eval(ctx, b)?.number(ctx.dom));
            Value::Number(x % y)
        }
        Expr::Neg(a) => Value::Number(-eval(ctx, a)?.number(ctx.dom)),
        Expr::Union(a, b) => {
            let mut ns = node_set(ctx, eval(ctx, a)?)?;
            ns.extend(node_set(ctx, eval(ctx, b)?)?);
            ns.sort_by_key(|id| ctx.doc_order.get(id).copied().unwrap_or(usize::MAX));
            ns.dedup();
            Value::NodeSet(ns)
        }
        Expr::Number(n) => Value::Number(*n),
        Expr::Literal(s) => Value::Str(s.clone()),
        Expr::Path(path) => Value::NodeSet(eval_location_path(ctx, &[ctx.node], path)?),
        Expr::FilterPath(primary, predicates, tail) => {
            let base = node_set(ctx, eval(ctx, primary)?)?;
            let filtered = apply_predicates(ctx, base, predicates, Axis::Child)?;
            match tail {
                Some(path) => Value::NodeSet(eval_location_path(ctx, &filtered, path)?),
                None => Value::NodeSet(filtered),
            }
        }
        Expr::Call(name, args) => eval_call(ctx, name, args)?,
    })
}

fn node_set(ctx: &Ctx, v: Value) -> Result<Vec<NodeId>> {
    match v {
        Value::NodeSet(ns) => Ok(ns),
        other => Err(HvmlError::XPathEval(format!(
            "expected a node-set, found {:?} at node {:?}",
            other, ctx.node
        ))),
    }
}

fn eval_call(ctx: &Ctx, name: &str, args: &[Expr]) -> Result<Value> {
    match (name, args.len()) {
        ("position", 0) => Ok(Value::Number(ctx.position as f64)),
        ("last", 0) => Ok(Value::Number(ctx.size as f64)),
        _ => Err(HvmlError::XPathEval(format!(
            "unsupported function '{}' with {} argument(s)",
            name,
            args.len()
        ))),
    }
}

fn compare_eq(ctx: &Ctx, a: &Expr, b: &Expr, negate: bool) -> Result<bool> {
    let va = eval(ctx, a)?;
    let vb = eval(ctx, b)?;
    // Precedence per the type-coercion rules: node-set vs anything compares
    // member-wise, then boolean beats number beats string.
    let eq = match (&va, &vb) {
        (Value::NodeSet(xs), Value::NodeSet(ys)) => xs.iter().any(|x| {
            ys.iter()
                .any(|y| string_value(ctx.dom, *x) == string_value(ctx.dom, *y))
        }),
        (Value::NodeSet(xs), other) | (other, Value::NodeSet(xs)) => xs.iter().any(|x| match other {
            Value::Number(n) => string_value(ctx.dom, *x).trim().parse::<f64>().ok() == Some(*n),
            Value::Str(s) => &string_value(ctx.dom, *x) == s,
            Value::Boolean(b) => !string_value(ctx.dom, *x).is_empty() == *b,
            Value::NodeSet(_) => unreachable!(),
        }),
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => va.boolean() == vb.boolean(),
        (Value::Number(_), _) | (_, Value::Number(_)) => va.number(ctx.dom) == vb.number(ctx.dom),
        _ => va.string(ctx.dom) == vb.string(ctx.dom),
    };
    Ok(eq != negate)
}

fn compare_rel(ctx: &Ctx, a: &Expr, b: &Expr, op: fn(f64, f64) -> bool) -> Result<bool> {
    let va = eval(ctx, a)?.number(ctx.dom);
    let vb = eval(ctx, b)?.number(ctx.dom);
    Ok(op(va, vb))
}

fn eval_location_path(ctx: &Ctx, start: &[NodeId], path: &LocationPath) -> Result<Vec<NodeId>> {
    let mut current: Vec<NodeId> = match path.start {
        PathStart::Absolute | PathStart::AbsoluteDescendant => vec![ctx.dom.root_id()],
        PathStart::Relative => start.to_vec(),
    };
    let steps = &path.steps;
    let first_sep_descendant = path.start == PathStart::AbsoluteDescendant;
    for (i, step) in steps.iter().enumerate() {
        let descendant_sep = if i == 0 { first_sep_descendant } else { step.sep_descendant };
        if descendant_sep {
            // `//` before a step means descendant-or-self::node()/ first.
            let mut expanded = HashSet::new();
            for n in &current {
                for d in axis_nodes(ctx.dom, *n, Axis::DescendantOrSelf) {
                    expanded.insert(d);
                }
            }
            current = expanded.into_iter().collect();
        }
        current = eval_step(ctx, &current, step)?;
    }
    Ok(current)
}

fn eval_step(ctx: &Ctx, input: &[NodeId], step: &Step) -> Result<Vec<NodeId>> {
    let mut result = vec![];
    for &n in input {
        let mut candidates = axis_nodes(ctx.dom, n, step.axis);
        if step.axis.is_reverse() {
            candidates.reverse();
        }
        let candidates: Vec<NodeId> = candidates
            .into_iter()
            .filter(|c| node_matches_test(ctx.dom, *c, &step.test, step.axis))
            .collect();
        let filtered = apply_predicates(ctx, candidates, &step.predicates, step.axis)?;
        result.extend(filtered);
    }
    Ok(result)
}

fn apply_predicates(
    ctx: &Ctx,
    mut candidates: Vec<NodeId>,
    predicates: &[Expr],
    axis: Axis,
) -> Result<Vec<NodeId>> {
    for pred in predicates {
        let size = candidates.len();
        let mut survivors = vec![];
        for (idx, &c) in candidates.iter().enumerate() {
            let position = idx + 1;
            let pctx = Ctx {
                dom: ctx.dom,
                node: c,
                position,
                size,
                doc_order: ctx.doc_order,
            };
            let v = eval(&pctx, pred)?;
            let keep = match v {
                Value::Number(n) => n == position as f64,
                other => other.boolean(),
            };
            if keep {
                survivors.push(c);
            }
        }
        candidates = survivors;
    }
    let _ = axis;
    Ok(candidates)
}

fn node_matches_test(dom: &Dom, id: NodeId, test: &NodeTest, axis: Axis) -> bool {
    use crate::dom::NodeData;
    let data = dom.tree.get(id).unwrap().value();
    match test {
        NodeTest::Star => matches!(
            data,
            NodeData::Tag(_) | NodeData::Attr { .. }
        ) && axis_kind_ok(axis, data),
        NodeTest::Name(name) => match data {
            NodeData::Tag(t) => t == name && axis != Axis::Attribute,
            NodeData::Attr { key, .. } => key == name && axis == Axis::Attribute,
            _ => false,
        },
        NodeTest::NodeType(NodeKind::Node) => true,
        NodeTest::NodeType(NodeKind::Text) => matches!(data, NodeData::Text(_)),
        NodeTest::NodeType(NodeKind::Json) => matches!(data, NodeData::Json(_)),
    }
}

fn axis_kind_ok(axis: Axis, _data: &crate::dom::NodeData) -> bool {
    // `*` on the attribute axis matches attributes; on every other axis it
    // matches element-like (Tag) nodes only, never Text/Json/Root.
    matches!(axis, Axis::Attribute) == matches!(_data, crate::dom::NodeData::Attr { .. })
}

fn axis_nodes(dom: &Dom, id: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::SelfAxis => vec![id],
        Axis::Child => traversal::content_children(dom, id),
        Axis::Attribute => traversal::attr_children(dom, id),
        Axis::Parent => dom
            .tree
            .get(id)
            .unwrap()
            .parent()
            .map(|p| vec![p.id()])
            .unwrap_or_default(),
        Axis::Descendant => descendants(dom, id, false),
        Axis::DescendantOrSelf => descendants(dom, id, true),
        Axis::Ancestor => ancestors(dom, id, false),
        Axis::AncestorOrSelf => ancestors(dom, id, true),
        Axis::FollowingSibling => siblings(dom, id, true),
        Axis::PrecedingSibling => siblings(dom, id, false),
        Axis::Following => following(dom, id),
        Axis::Preceding => preceding(dom, id),
    }
}

fn descendants(dom: &Dom, id: NodeId, include_self: bool) -> Vec<NodeId> {
    let mut out = vec![];
    if include_self {
        out.push(id);
    }
    for child in traversal::content_children(dom, id) {
        out.extend(descendants(dom, child, true));
    }
    out
}

fn ancestors(dom: &Dom, id: NodeId, include_self: bool) -> Vec<NodeId> {
    let mut out = vec![];
    if include_self {
        out.push(id);
    }
    let mut cur = dom.tree.get(id).unwrap().parent().map(|p| p.id());
    while let Some(p) = cur {
        out.push(p);
        cur = dom.tree.get(p).unwrap().parent().map(|gp| gp.id());
    }
    out
}

fn siblings(dom: &Dom, id: NodeId, following: bool) -> Vec<NodeId> {
    let parent = match dom.tree.get(id).unwrap().parent() {
        Some(p) => p.id(),
        None => return vec![],
    };
    let content = traversal::content_children(dom, parent);
    let idx = content.iter().position(|&c| c == id).unwrap_or(0);
    if following {
        content[idx + 1..].to_vec()
    } else {
        content[..idx].to_vec()
    }
}

fn following(dom: &Dom, id: NodeId) -> Vec<NodeId> {
    let order = traversal::document_order(dom);
    let my_end = subtree_max_order(dom, id, &order);
    let mut out: Vec<NodeId> = order
        .iter()
        .filter(|(n, pos)| **pos > my_end && !is_attr(dom, **n))
        .map(|(n, _)| *n)
        .collect();
    out.sort_by_key(|n| order[n]);
    out
}

fn preceding(dom: &Dom, id: NodeId) -> Vec<NodeId> {
    let order = traversal::document_order(dom);
    let ancestor_set: HashSet<NodeId> = ancestors(dom, id, true).into_iter().collect();
    let my_pos = order[&id];
    let mut out: Vec<NodeId> = order
        .iter()
        .filter(|(n, pos)| **pos < my_pos && !ancestor_set.contains(*n) && !is_attr(dom, **n))
        .map(|(n, _)| *n)
        .collect();
    out.sort_by_key(|n| order[n]);
    out
}

fn is_attr(dom: &Dom, id: NodeId) -> bool {
    matches!(dom.tree.get(id).unwrap().value(), crate::dom::NodeData::Attr { .. })
}

fn subtree_max_order(
    dom: &Dom,
    id: NodeId,
    order: &std::collections::HashMap<NodeId, usize>,
) -> usize {
    let mut max = order[&id];
    for child in traversal::content_children(dom, id) {
        max = max.max(subtree_max_order(dom, child, order));
    }
    max
}
