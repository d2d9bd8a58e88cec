//! End-to-end scenarios exercising the full parse -> DOM -> XPath pipeline.

use hvml_rt::dom::{self, NodeData};
use hvml_rt::error::HvmlError;
use hvml_rt::interpreter;
use hvml_rt::json::{JsonValue, NumberValue};
use hvml_rt::xpath;

#[test]
fn json_integer_and_double_round_trip() {
    let d = dom::parse_str(r#"<r><archedata>{"a":-0,"b":1e2}</archedata></r>"#).unwrap();
    let archedata = dom::traversal::content_children(&d, d.root_id())[0];
    let json = dom::traversal::content_children(&d, archedata)[0];
    let NodeData::Json(JsonValue::Object(pairs)) = d.tree.get(json).unwrap().value() else {
        panic!("expected a JSON object child");
    };
    let a = &pairs.iter().find(|(k, _)| k == "a").unwrap().1;
    let b = &pairs.iter().find(|(k, _)| k == "b").unwrap().1;
    match a {
        JsonValue::Number(n) => {
            assert_eq!(n.origin, "-0");
            assert_eq!(n.value, NumberValue::Integer(0));
        }
        other => panic!("unexpected value for a: {:?}", other),
    }
    match b {
        JsonValue::Number(n) => {
            assert_eq!(n.origin, "1e2");
            assert_eq!(n.value, NumberValue::Double(100.0));
        }
        other => panic!("unexpected value for b: {:?}", other),
    }

    let out = dom::serialize(&d);
    assert!(out.contains(r#"{"a":-0,"b":1e2}"#));
}

#[test]
fn hvml_with_embedded_json_and_mustache() {
    let input =
        r#"<hvml><init as="x">[1,"a"]</init><p>hi {{x}}</p></hvml>"#;
    let d = dom::parse_str(input).unwrap();
    let classified = interpreter::classify(&d).unwrap();

    assert_eq!(classified.inits.len(), 1);
    assert_eq!(classified.inits[0].as_.as_deref(), Some("x"));
    let init_tag = classified.inits[0].source;
    let json_child = dom::traversal::content_children(&d, init_tag)[0];
    match d.tree.get(json_child).unwrap().value() {
        NodeData::Json(JsonValue::Array(items)) => assert_eq!(items.len(), 2),
        other => panic!("expected a two-element JSON array, got {:?}", other),
    }

    assert_eq!(classified.mustaches.len(), 1);
    assert_eq!(classified.mustaches[0].inner, "x");

    // `init` must not appear in udom; `p` must.
    let udom_root_children = dom::traversal::content_children(&classified.udom, classified.udom.root_id());
    assert_eq!(udom_root_children.len(), 1);
    assert_eq!(
        classified
            .udom
            .tree
            .get(udom_root_children[0])
            .unwrap()
            .value()
            .tag_name(),
        Some("p")
    );
}

#[test]
fn xpath_descendant_text() {
    let input = r#"<hvml><init as="x">[1,"a"]</init><p>hi {{x}}</p></hvml>"#;
    let d = dom::parse_str(input).unwrap();
    let nodes = xpath::select_from_root(&d, "//p/text()").unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(dom::string_value(&d, nodes[0]), "hi {{x}}");
}

#[test]
fn xpath_predicate_position_and_last() {
    let d = dom::parse_str("<r><a/><a/><a/></r>").unwrap();
    let second = xpath::select_from_root(&d, "/r/a[position()=2]").unwrap();
    let last = xpath::select_from_root(&d, "/r/a[last()]").unwrap();
    let all = xpath::select_from_root(&d, "/r/a").unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(last.len(), 1);
    assert_eq!(second[0], all[1]);
    assert_eq!(last[0], all[2]);
}

#[test]
fn mismatched_end_tag_points_at_divergent_char() {
    let err = dom::parse_str("<a></b>").unwrap_err();
    match err {
        HvmlError::Syntax(e) => {
            assert_eq!(e.found, Some('b'));
        }
        other => panic!("expected a Syntax error, got {:?}", other),
    }
}
