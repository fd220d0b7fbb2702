/*
    This module enumerates the words a grammar derives, up to a length bound
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::grammar::{Grammar, Symbol};

// Expansions allowed along one derivation branch. Derivation chains that loop
// without producing terminals are cut here instead of running forever; any
// grammar in a normal form stays far below this.
const EXPANSION_BUDGET: u32 = 65535;

// Shortest terminal string each nonterminal can derive, by upward fixpoint.
// Unproductive nonterminals keep usize::MAX and prune every branch that
// contains them.
fn minimal_lengths(grammar: &Grammar) -> BTreeMap<String, usize> {
    let mut minimal: BTreeMap<String, usize> =
        grammar.rules.keys().map(|name| (name.clone(), usize::MAX)).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (name, rewrite) in &grammar.rules {
            for alternative in rewrite {
                let length = alternative
                    .iter()
                    .fold(0usize, |sum, symbol| sum.saturating_add(symbol_cost(symbol, &minimal)));
                if length < minimal[name] {
                    minimal.insert(name.clone(), length);
                    changed = true;
                }
            }
        }
    }
    minimal
}

fn symbol_cost(symbol: &Symbol, minimal: &BTreeMap<String, usize>) -> usize {
    match symbol {
        Symbol::Terminal(text) => text.len(),
        Symbol::Epsilon => 0,
        Symbol::Nonterminal(name) => minimal.get(name).copied().unwrap_or(usize::MAX),
    }
}

fn suffix_cost(suffix: &[Symbol], minimal: &BTreeMap<String, usize>) -> usize {
    suffix
        .iter()
        .fold(0usize, |sum, symbol| sum.saturating_add(symbol_cost(symbol, minimal)))
}

// Depth-first enumeration over pairs of a terminal prefix and a pending
// symbol suffix. A branch dies as soon as its prefix plus the shortest
// possible completion of its suffix exceeds the bound.
pub fn words(grammar: &Grammar, max_len: usize) -> Vec<String> {
    let minimal = minimal_lengths(grammar);
    let mut found: BTreeSet<String> = BTreeSet::new();

    // Suffixes are stored reversed so the next symbol pops off the end
    let start = vec![Symbol::Nonterminal(grammar.start_symbol.clone())];
    let mut branches: Vec<(String, Vec<Symbol>, u32)> = vec![(String::new(), start, 0)];

    while let Some((mut prefix, mut suffix, expansions)) = branches.pop() {
        loop {
            match suffix.pop() {
                None => {
                    if prefix.len() <= max_len {
                        found.insert(prefix);
                    }
                    break;
                }
                Some(Symbol::Epsilon) => {}
                Some(Symbol::Terminal(text)) => {
                    prefix.push_str(&text);
                    if prefix.len() > max_len {
                        break;
                    }
                }
                Some(Symbol::Nonterminal(name)) => {
                    if expansions >= EXPANSION_BUDGET {
                        break;
                    }
                    let pending = suffix_cost(&suffix, &minimal);
                    for alternative in grammar.rewrite_of(&name) {
                        let shortest = prefix
                            .len()
                            .saturating_add(suffix_cost(alternative, &minimal))
                            .saturating_add(pending);
                        if shortest > max_len {
                            continue;
                        }
                        let mut next_suffix = suffix.clone();
                        next_suffix.extend(alternative.iter().rev().cloned());
                        branches.push((prefix.clone(), next_suffix, expansions + 1));
                    }
                    break;
                }
            }
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::parser::parse_source;

    fn parsed(source: &str) -> Grammar {
        parse_source(source, PathBuf::new()).unwrap()
    }

    #[test]
    fn palindromes_up_to_three_letters() {
        let grammar = parsed("S0 : A1S0A1 | B1S0B1 | E | A1 | B1\nA1 : a\nB1 : b\n");

        assert_eq!(
            words(&grammar, 3),
            vec!["", "a", "aa", "aaa", "aba", "b", "bab", "bb", "bbb"]
        );
    }

    #[test]
    fn nested_words_respect_the_bound() {
        let grammar = parsed("S0 : A1S0B1 | C1\nA1 : a\nB1 : b\nC1 : c | E\n");

        assert_eq!(words(&grammar, 4), vec!["", "aabb", "ab", "acb", "c"]);
        assert_eq!(words(&grammar, 0), vec![""]);
    }

    #[test]
    fn output_is_sorted_and_bounded() {
        let grammar = parsed("S0 : S0A1 | A1\nA1 : a | b\n");
        let found = words(&grammar, 3);

        let mut sorted = found.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(found, sorted);
        assert!(found.iter().all(|word| word.len() <= 3));
        assert_eq!(found.len(), 2 + 4 + 8);
    }

    #[test]
    fn unit_chains_still_reach_their_terminals() {
        let grammar = parsed("S0 : A1\nA1 : B1\nB1 : a | b\n");

        assert_eq!(words(&grammar, 1), vec!["a", "b"]);
    }

    #[test]
    fn the_empty_language_yields_no_words() {
        let grammar = parsed("S0 : A1\nA1 : A1a\n");

        assert_eq!(words(&grammar, 5), Vec::<String>::new());
    }

    #[test]
    fn epsilon_only_grammars_yield_the_empty_word() {
        let grammar = parsed("S0 : E\n");

        assert_eq!(words(&grammar, 5), vec![""]);
    }
}
