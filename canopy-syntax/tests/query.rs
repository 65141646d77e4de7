mod common;

use canopy_syntax::{InactiveQueryCursor, Query, QueryErrorKind};
use common::{go, json, parse_go};

const GO_SOURCE: &str = r#"
package main
import "fmt"

func main() {
	fmt.Println("hello")
	run(3)
}

func run(a int) error {
	if a > 1 {
		return fmt.Errorf("a greater than 1")
	}
	return nil
}
"#;

const FUNC_ID_PATTERN: &str = "(function_declaration (identifier) @func_id)";

#[test]
fn unbalanced_pattern_reports_a_syntax_error() {
    let err = Query::new(json(), "(").unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::Syntax);
    assert_eq!(err.row, 0);
}

#[test]
fn unknown_node_type_is_reported_with_its_offset() {
    let err = Query::new(json(), "(no_such_node) @n").unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::NodeType);
    assert_eq!(err.offset, 1);
    assert_eq!(err.column, 1);
}

#[test]
fn unknown_field_name_is_reported() {
    let err = Query::new(json(), "(pair bogus_field: (string) @s)").unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::Field);
}

#[test]
fn predicate_on_undeclared_capture_is_reported() {
    let err = Query::new(json(), r#"((array) @a (#eq? @missing "x"))"#).unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::Capture);
}

#[test]
fn error_location_spans_rows() {
    let err = Query::new(json(), "(array)\n(no_such_node)").unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::NodeType);
    assert_eq!(err.row, 1);
}

#[test]
fn compiled_query_exposes_its_shape() {
    let query = Query::new(go(), FUNC_ID_PATTERN).unwrap();
    assert_eq!(query.text(), FUNC_ID_PATTERN);
    assert_eq!(query.pattern_count(), 1);
    assert_eq!(query.start_byte_for_pattern(0), 0);
    assert_eq!(query.capture_count(), 1);
    assert_eq!(query.capture_names().collect::<Vec<_>>(), ["func_id"]);
    assert_eq!(query.capture_index("func_id"), Some(0));
    assert_eq!(query.capture_index("nope"), None);
}

#[test]
fn function_identifiers_match_in_document_order() {
    let tree = parse_go(GO_SOURCE);
    let query = Query::new(go(), FUNC_ID_PATTERN).unwrap();

    let mut cursor = InactiveQueryCursor::new().execute(&query, &tree.root_node());
    let mut names = Vec::new();
    let mut ranges = Vec::new();
    while let Some(query_match) = cursor.next_match() {
        assert_eq!(query_match.pattern_index(), 0);
        let captures = query_match.captures();
        assert_eq!(captures.len(), 1);
        let capture = &captures[0];
        assert_eq!(capture.node.kind(), "identifier");
        assert_eq!(query.capture_name(capture.index), "func_id");
        names.push(&GO_SOURCE[capture.node.byte_range()]);
        ranges.push(capture.node.byte_range());
    }

    assert_eq!(names, ["main", "run"]);
    // disjoint and ordered by source position
    assert!(ranges[0].end <= ranges[1].start);

    // exhaustion is stable
    for _ in 0..3 {
        assert!(cursor.next_match().is_none());
    }
}

#[test]
fn cursor_is_reusable_across_queries() {
    let tree = parse_go(GO_SOURCE);
    let query = Query::new(go(), FUNC_ID_PATTERN).unwrap();

    let mut cursor = InactiveQueryCursor::new().execute(&query, &tree.root_node());
    let mut first_run = 0;
    while cursor.next_match().is_some() {
        first_run += 1;
    }
    assert_eq!(first_run, 2);

    // a second execution restarts iteration from scratch
    let mut cursor = cursor.reuse().execute(&query, &tree.root_node());
    let mut second_run = 0;
    while cursor.next_match().is_some() {
        second_run += 1;
    }
    assert_eq!(second_run, 2);
}

#[test]
fn byte_range_restricts_matches() {
    let tree = parse_go(GO_SOURCE);
    let query = Query::new(go(), FUNC_ID_PATTERN).unwrap();

    let mut inactive = InactiveQueryCursor::new();
    inactive.set_byte_range(0..GO_SOURCE.find("func run").unwrap());
    let mut cursor = inactive.execute(&query, &tree.root_node());

    let query_match = cursor.next_match().expect("main is inside the range");
    assert_eq!(
        &GO_SOURCE[query_match.captures()[0].node.byte_range()],
        "main"
    );
    assert!(cursor.next_match().is_none());
}

#[test]
fn captures_for_named_index() {
    let tree = parse_go(GO_SOURCE);
    let query = Query::new(go(), FUNC_ID_PATTERN).unwrap();
    let func_id = query.capture_index("func_id").unwrap();

    let mut cursor = InactiveQueryCursor::new().execute(&query, &tree.root_node());
    let query_match = cursor.next_match().unwrap();
    let nodes: Vec<_> = query_match.nodes_for_capture_index(func_id).collect();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].kind(), "identifier");
}

#[test]
fn match_limit_is_adjustable() {
    let mut cursor = InactiveQueryCursor::new();
    cursor.set_match_limit(64);
    assert_eq!(cursor.match_limit(), 64);
    assert!(!cursor.did_exceed_match_limit());
}

#[test]
fn queries_are_bound_to_their_grammar() {
    // a pattern valid for go but not for json
    let err = Query::new(json(), FUNC_ID_PATTERN).unwrap_err();
    assert_eq!(err.kind, QueryErrorKind::NodeType);
}
