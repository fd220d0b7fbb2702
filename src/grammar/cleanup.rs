/*
    Removal of useless nonterminals: empty, unproductive and unreachable
*/

use std::collections::BTreeSet;

use super::{Alternative, Grammar, Symbol};

fn mentions_any(alternative: &Alternative, names: &BTreeSet<String>) -> bool {
    alternative.iter().any(|symbol| match symbol {
        Symbol::Nonterminal(name) => names.contains(name),
        _ => false,
    })
}

// Drops every nonterminal whose rewrite is empty, together with any
// production referencing it. Removing productions can empty further rewrites,
// so this iterates to a fixpoint.
pub fn remove_empty(grammar: &mut Grammar) {
    loop {
        let empty: BTreeSet<String> = grammar
            .rules
            .iter()
            .filter(|(_, rewrite)| rewrite.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        if empty.is_empty() {
            break;
        }

        grammar.rules.retain(|name, _| !empty.contains(name));
        for rewrite in grammar.rules.values_mut() {
            rewrite.retain(|alternative| !mentions_any(alternative, &empty));
        }
    }
    grammar.sync_nonterminals();
}

// A nonterminal is productive iff one of its alternatives consists only of
// terminals, epsilons and productive nonterminals. Upward fixpoint.
pub fn remove_unproductive(grammar: &mut Grammar) {
    let mut productive: BTreeSet<String> = BTreeSet::new();
    let mut changed = true;
    while changed {
        changed = false;
        for (name, rewrite) in &grammar.rules {
            if productive.contains(name) {
                continue;
            }
            let derives_terminals = rewrite.iter().any(|alternative| {
                alternative.iter().all(|symbol| match symbol {
                    Symbol::Nonterminal(inner) => productive.contains(inner),
                    Symbol::Terminal(_) | Symbol::Epsilon => true,
                })
            });
            if derives_terminals {
                productive.insert(name.clone());
                changed = true;
            }
        }
    }

    let unproductive: BTreeSet<String> = grammar
        .rules
        .keys()
        .filter(|name| !productive.contains(*name))
        .cloned()
        .collect();
    if unproductive.is_empty() {
        return;
    }

    grammar.rules.retain(|name, _| productive.contains(name));
    for rewrite in grammar.rules.values_mut() {
        rewrite.retain(|alternative| !mentions_any(alternative, &unproductive));
    }
    grammar.sync_nonterminals();
}

// Keeps only the nonterminals in the forward closure of the start symbol
pub fn remove_unreachable(grammar: &mut Grammar) {
    let mut reachable = BTreeSet::new();
    let mut stack = vec![grammar.start_symbol.clone()];
    while let Some(current) = stack.pop() {
        if !reachable.insert(current.clone()) {
            continue;
        }
        for alternative in grammar.rewrite_of(&current) {
            for symbol in alternative {
                if let Symbol::Nonterminal(name) = symbol {
                    if !reachable.contains(name) {
                        stack.push(name.clone());
                    }
                }
            }
        }
    }

    grammar.rules.retain(|name, _| reachable.contains(name));
    grammar.sync_nonterminals();
}

// Runs the three passes in order until the grammar stops shrinking. When the
// start symbol itself is useless the grammar collapses to a bare start symbol
// with no productions, which every downstream stage tolerates.
pub fn cleanup(grammar: &mut Grammar) {
    loop {
        let before = (grammar.rules.len(), grammar.production_count());
        remove_empty(grammar);
        remove_unproductive(grammar);
        remove_unreachable(grammar);
        if (grammar.rules.len(), grammar.production_count()) == before {
            break;
        }
    }

    if !grammar.rules.contains_key(&grammar.start_symbol) {
        grammar.rules.clear();
        grammar.rules.insert(grammar.start_symbol.clone(), Vec::new());
        grammar.sync_nonterminals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grammar() -> Grammar {
        // S0 : A1 | b    A1 : A1 a    B1 : b   (A1 unproductive, B1 unreachable)
        let mut grammar = Grammar::new("S0");
        grammar.add_production("S0", vec![Symbol::nonterminal("A1")]);
        grammar.add_production("S0", vec![Symbol::terminal("b")]);
        grammar.add_production("A1", vec![Symbol::nonterminal("A1"), Symbol::terminal("a")]);
        grammar.add_production("B1", vec![Symbol::terminal("b")]);
        grammar
    }

    #[test]
    fn unproductive_nonterminals_are_removed_with_their_mentions() {
        let mut grammar = sample_grammar();
        remove_unproductive(&mut grammar);

        assert!(!grammar.rules.contains_key("A1"));
        assert_eq!(grammar.rewrite_of("S0"), &[vec![Symbol::terminal("b")]]);
    }

    #[test]
    fn unreachable_nonterminals_are_removed() {
        let mut grammar = sample_grammar();
        cleanup(&mut grammar);

        assert!(!grammar.rules.contains_key("B1"));
        assert_eq!(grammar.rewrite_of("S0"), &[vec![Symbol::terminal("b")]]);
        assert_eq!(grammar.nonterminals.len(), 1);
    }

    #[test]
    fn useless_start_collapses_to_bare_start() {
        // S0 : A1    A1 : A1 a, so nothing derives a terminal string
        let mut grammar = Grammar::new("S0");
        grammar.add_production("S0", vec![Symbol::nonterminal("A1")]);
        grammar.add_production("A1", vec![Symbol::nonterminal("A1"), Symbol::terminal("a")]);
        cleanup(&mut grammar);

        assert_eq!(grammar.start_symbol, "S0");
        assert_eq!(grammar.rewrite_of("S0"), &[] as &[Alternative]);
        assert_eq!(grammar.nonterminals.len(), 1);
        assert_eq!(grammar.rules.len(), 1);
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut once = sample_grammar();
        cleanup(&mut once);
        let mut twice = once.clone();
        cleanup(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn epsilon_alternatives_count_as_productive() {
        let mut grammar = Grammar::new("S0");
        grammar.add_production("S0", vec![Symbol::Epsilon]);
        cleanup(&mut grammar);

        assert_eq!(grammar.rewrite_of("S0"), &[vec![Symbol::Epsilon]]);
    }
}
