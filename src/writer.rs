/*
    This module serializes grammars back to their textual form
*/

use itertools::Itertools;

use crate::grammar::{Alternative, Grammar, Symbol};

fn symbol_text(symbol: &Symbol) -> &str {
    match symbol {
        Symbol::Terminal(text) => text,
        Symbol::Nonterminal(name) => name,
        Symbol::Epsilon => "E",
    }
}

fn alternative_text(alternative: &Alternative) -> String {
    alternative.iter().map(symbol_text).collect()
}

fn rule_line(name: &str, rewrite: &[Alternative]) -> String {
    let alternatives = rewrite.iter().map(alternative_text).join(" | ");
    format!("{} : {}\n", name, alternatives)
}

// The start symbol comes first, the remaining nonterminals follow sorted by
// name. A start symbol with no productions (the empty language) produces no
// line at all.
pub fn write_grammar(grammar: &Grammar) -> String {
    let mut output = String::new();

    let start_rewrite = grammar.rewrite_of(&grammar.start_symbol);
    if !start_rewrite.is_empty() {
        output.push_str(&rule_line(&grammar.start_symbol, start_rewrite));
    }

    for (name, rewrite) in &grammar.rules {
        if *name == grammar.start_symbol || rewrite.is_empty() {
            continue;
        }
        output.push_str(&rule_line(name, rewrite));
    }

    output
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::generator::words;
    use crate::parser::parse_source;

    fn parsed(source: &str) -> Grammar {
        parse_source(source, PathBuf::new()).unwrap()
    }

    #[test]
    fn start_symbol_comes_first_then_sorted_names() {
        let grammar = parsed("S0 : A1S0B1 | C1\nA1 : a\nB1 : b\nC1 : c | E\n");

        assert_eq!(
            write_grammar(&grammar),
            "S0 : A1S0B1 | C1\nA1 : a\nB1 : b\nC1 : c | E\n"
        );
    }

    #[test]
    fn epsilon_is_written_as_its_letter() {
        let grammar = parsed("S0 : E\n");

        assert_eq!(write_grammar(&grammar), "S0 : E\n");
    }

    #[test]
    fn the_empty_language_writes_nothing() {
        let grammar = parsed("S0 : A1\nA1 : A1a\n");

        assert_eq!(write_grammar(&grammar), "");
    }

    #[test]
    fn written_grammars_read_back_equivalent() {
        let source = "S0 : A1S0A1 | B1S0B1 | E | A1 | B1\nA1 : a\nB1 : b\n";
        let grammar = parsed(source);
        let reread = parsed(&write_grammar(&grammar));

        assert_eq!(reread, grammar);
        assert_eq!(words(&reread, 3), words(&grammar, 3));
    }
}
