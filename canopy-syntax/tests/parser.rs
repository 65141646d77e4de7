mod common;

use canopy_syntax::{
    InputEdit, ParseError, Parser, Point, Range, SyntaxTreeNode, LANGUAGE_VERSION,
    MIN_COMPATIBLE_LANGUAGE_VERSION,
};
use common::{go, json, parse_go, parse_json, parser_for};

#[test]
fn create_and_drop_parser() {
    let parser = Parser::new();
    assert!(parser.grammar().is_none());
    drop(parser);
    // a second parser is unaffected by the first one's lifetime
    let _parser = Parser::default();
}

#[test]
fn bundled_grammars_are_compatible() {
    for grammar in [json(), go()] {
        let version = grammar.version();
        assert!((MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version));
    }
}

#[test]
fn parse_without_grammar_is_rejected() {
    let mut parser = Parser::new();
    assert_eq!(parser.parse("[]", None).unwrap_err(), ParseError::NoGrammar);
}

#[test]
fn parse_json_document_shape() {
    let tree = parse_json("[1, null]");
    let root = tree.root_node();
    assert_eq!(root.kind(), "document");
    assert_eq!(root.child_count(), 1);

    let array = root.named_child(0).unwrap();
    assert_eq!(array.kind(), "array");
    // brackets and the comma count as (anonymous) children
    assert_eq!(array.child_count(), 5);
    assert_eq!(array.named_child_count(), 2);

    let number = array.named_child(0).unwrap();
    assert_eq!(number.kind(), "number");
    assert_eq!(number.child_count(), 0);
    assert!(number.is_named());
    assert_eq!(number.byte_range(), 1..2);
    assert_eq!(number.grammar(), json());

    let comma = array.child(2).unwrap();
    assert!(!comma.is_named());
}

#[test]
fn navigation_without_a_target_returns_none() {
    let tree = parse_json("[1, null]");
    let root = tree.root_node();
    assert!(root.parent().is_none());
    assert!(root.next_sibling().is_none());
    assert!(root.prev_sibling().is_none());

    let array = root.named_child(0).unwrap();
    assert!(array.child(array.child_count()).is_none());
    assert!(array.child(100).is_none());
    assert!(array.named_child(array.named_child_count()).is_none());

    let null = array.named_child(1).unwrap();
    assert_eq!(null.kind(), "null");
    assert!(null.next_named_sibling().is_none());
    assert!(null.prev_named_sibling().is_some());
}

#[test]
fn spans_are_ordered_across_the_whole_tree() {
    fn check(node: SyntaxTreeNode) {
        assert!(node.start_byte() <= node.end_byte());
        assert!(node.start_point() <= node.end_point());
        if let Some(parent) = node.parent() {
            assert!(parent.start_byte() <= node.start_byte());
            assert!(node.end_byte() <= parent.end_byte());
        }
        for i in 0..node.child_count() {
            check(node.child(i).expect("in-range child index"));
        }
    }

    let tree = parse_go(
        r#"
package main
import "fmt"

func main() {
	fmt.Println("hello")
}
"#,
    );
    check(tree.root_node());
}

#[test]
fn sexp_rendering() {
    let tree = parse_json("[1, null]");
    let sexp = tree.root_node().to_sexp();
    assert!(sexp.starts_with("(document"));
    assert!(sexp.contains("(array"));
    assert!(sexp.contains("(number"));
    // leaf nodes render as themselves
    let number = tree.root_node().named_child(0).unwrap().named_child(0).unwrap();
    assert_eq!(number.to_sexp(), "(number)");
}

#[test]
fn rebinding_grammar_affects_later_parses_only() {
    let mut parser = parser_for(json());
    let json_tree = parser.parse("[1, null]", None).unwrap();

    parser.set_grammar(go()).unwrap();
    let go_tree = parser.parse("package main\n", None).unwrap();

    assert_eq!(json_tree.root_node().kind(), "document");
    assert_eq!(go_tree.root_node().kind(), "source_file");
}

#[test]
fn descendants_by_byte_range() {
    let text = "[1, null]";
    let tree = parse_json(text);
    let offset = text.find("null").unwrap();
    let node = tree
        .root_node()
        .named_descendant_for_byte_range(offset, offset + "null".len())
        .unwrap();
    assert_eq!(node.kind(), "null");
    assert_eq!(node.start_point(), Point { row: 0, col: offset as u32 });
}

#[test]
fn edited_tree_supports_incremental_reparse() {
    let mut tree = parse_json("[1, null]");

    // replace "1" with "100"
    tree.edit(&InputEdit {
        start_byte: 1,
        old_end_byte: 2,
        new_end_byte: 4,
        start_point: Point { row: 0, col: 1 },
        old_end_point: Point { row: 0, col: 2 },
        new_end_point: Point { row: 0, col: 4 },
    });

    let new_tree = parser_for(json()).parse("[100, null]", Some(&tree)).unwrap();
    let root = new_tree.root_node();
    assert_eq!(root.kind(), "document");

    let array = root.named_child(0).unwrap();
    let number = array.named_child(0).unwrap();
    assert_eq!(number.kind(), "number");
    assert_eq!(number.byte_range(), 1..4);

    let null = array.named_child(1).unwrap();
    assert_eq!(null.kind(), "null");
    assert_eq!(null.byte_range(), 6..10);
}

#[test]
fn cloned_tree_outlives_the_original() {
    let tree = parse_json("[1, null]");
    let copy = tree.clone();
    drop(tree);
    assert_eq!(copy.root_node().kind(), "document");
}

#[test]
fn included_ranges_must_be_sorted() {
    let range = |start_byte: u32, end_byte: u32| Range {
        start_point: Point { row: 0, col: start_byte },
        end_point: Point { row: 0, col: end_byte },
        start_byte,
        end_byte,
    };
    let mut parser = parser_for(json());
    assert!(parser.set_included_ranges(&[range(8, 9), range(0, 4)]).is_err());
    assert!(parser.set_included_ranges(&[range(0, 4), range(8, 9)]).is_ok());
    // an empty slice restores whole-document parsing
    assert!(parser.set_included_ranges(&[]).is_ok());
}

#[test]
fn point_ordering_is_row_major() {
    assert!(Point { row: 0, col: 9 } < Point { row: 1, col: 0 });
    assert!(Point { row: 1, col: 0 } < Point { row: 1, col: 1 });
}
