#![allow(dead_code)]

use std::ptr::NonNull;

use canopy_syntax::{Grammar, GrammarData, Parser, SyntaxTree};

fn grammar_from(constructor: unsafe extern "C" fn() -> *const ()) -> Grammar {
    let raw = unsafe { constructor() };
    let ptr = NonNull::new(raw as *mut GrammarData).expect("grammar constructor returned null");
    unsafe { Grammar::from_raw(ptr) }.expect("bundled grammars have a compatible ABI")
}

pub fn json() -> Grammar {
    grammar_from(tree_sitter_json::LANGUAGE.into_raw())
}

pub fn go() -> Grammar {
    grammar_from(tree_sitter_go::LANGUAGE.into_raw())
}

pub fn parser_for(grammar: Grammar) -> Parser {
    let mut parser = Parser::new();
    parser.set_grammar(grammar).unwrap();
    parser
}

pub fn parse_json(text: &str) -> SyntaxTree {
    parser_for(json()).parse(text, None).unwrap()
}

pub fn parse_go(text: &str) -> SyntaxTree {
    parser_for(go()).parse(text, None).unwrap()
}
