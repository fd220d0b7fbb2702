/*
    Greibach normal form: every production becomes a terminal followed by
    nonterminals, except an epsilon production at the start symbol
*/

use std::collections::BTreeMap;

use crate::grammar::cleanup::cleanup;
use crate::grammar::{Alternative, Grammar, Rewrite, Symbol};

use super::{
    check_rule_sizes, eliminate_epsilon, eliminate_units, fresh, introduce_start, lift_terminals,
    Limits, Result, TransformError,
};

pub fn convert(grammar: &Grammar, limits: &Limits) -> Result<Grammar> {
    let mut normalized = grammar.clone();
    introduce_start(&mut normalized, "start introduction")?;
    eliminate_epsilon(&mut normalized, limits)?;
    eliminate_units(&mut normalized, limits)?;
    eliminate_left_recursion(&mut normalized, limits)?;
    unfold_heads(&mut normalized, limits)?;
    lift_terminals(&mut normalized, true, "terminal lifting")?;
    cleanup(&mut normalized);
    check_shape(&normalized)?;
    Ok(normalized)
}

// Paull's ordering pass: the start symbol first, the remaining nonterminals
// sorted by name. After step i every alternative of the i-th nonterminal
// starts with a terminal or a nonterminal no earlier in the order.
fn eliminate_left_recursion(grammar: &mut Grammar, limits: &Limits) -> Result<()> {
    const PASS: &str = "left recursion elimination";

    let mut order = vec![grammar.start_symbol.clone()];
    order.extend(
        grammar
            .rules
            .keys()
            .filter(|name| **name != grammar.start_symbol)
            .cloned(),
    );

    for i in 0..order.len() {
        let current = order[i].clone();
        if !grammar.rules.contains_key(&current) {
            continue;
        }
        for earlier in &order[..i] {
            if grammar.rules.contains_key(earlier) {
                substitute_leading(grammar, &current, earlier);
            }
        }
        remove_direct_recursion(grammar, &current)?;
        check_rule_sizes(grammar, limits, PASS)?;
    }
    Ok(())
}

// Replaces every `current : earlier gamma` by `current : delta gamma` for each
// alternative delta of `earlier`
fn substitute_leading(grammar: &mut Grammar, current: &str, earlier: &str) {
    let replacements = grammar.rules[earlier].clone();
    let rewrite = grammar.rules[current].clone();
    let mut substituted: Rewrite = Vec::new();

    for alternative in rewrite {
        match alternative.first() {
            Some(Symbol::Nonterminal(head)) if head == earlier => {
                let gamma = &alternative[1..];
                for delta in &replacements {
                    let combined = concatenate(delta, gamma);
                    if !substituted.contains(&combined) {
                        substituted.push(combined);
                    }
                }
            }
            _ => {
                if !substituted.contains(&alternative) {
                    substituted.push(alternative);
                }
            }
        }
    }
    grammar.rules.insert(current.to_string(), substituted);
}

// `current : current alpha | beta` becomes `current : beta tail | beta` and
// `tail : alpha tail | alpha`. With no beta at all the nonterminal derives
// nothing; its rewrite is emptied and cleanup disposes of it.
fn remove_direct_recursion(grammar: &mut Grammar, current: &str) -> Result<()> {
    let rewrite = grammar.rules[current].clone();
    let mut alphas: Vec<Alternative> = Vec::new();
    let mut betas: Vec<Alternative> = Vec::new();

    for alternative in rewrite {
        match alternative.first() {
            Some(Symbol::Nonterminal(head)) if head == current => {
                if alternative.len() > 1 {
                    alphas.push(alternative[1..].to_vec());
                }
                // `current : current` alone rewrites nothing and is dropped
            }
            _ => betas.push(alternative),
        }
    }

    if alphas.is_empty() {
        return Ok(());
    }
    if betas.is_empty() {
        grammar.rules.insert(current.to_string(), Vec::new());
        return Ok(());
    }

    let tail = fresh(grammar, "left recursion elimination")?;
    let tail_symbol = Symbol::Nonterminal(tail.clone());

    let mut current_rewrite: Rewrite = Vec::new();
    for beta in &betas {
        let mut extended = beta.clone();
        extended.push(tail_symbol.clone());
        if !current_rewrite.contains(&extended) {
            current_rewrite.push(extended);
        }
    }
    for beta in betas {
        if !current_rewrite.contains(&beta) {
            current_rewrite.push(beta);
        }
    }

    let mut tail_rewrite: Rewrite = Vec::new();
    for alpha in &alphas {
        let mut extended = alpha.clone();
        extended.push(tail_symbol.clone());
        if !tail_rewrite.contains(&extended) {
            tail_rewrite.push(extended);
        }
    }
    for alpha in alphas {
        if !tail_rewrite.contains(&alpha) {
            tail_rewrite.push(alpha);
        }
    }

    grammar.rules.insert(current.to_string(), current_rewrite);
    grammar.rules.insert(tail, tail_rewrite);
    Ok(())
}

// Repeatedly replaces nonterminal-headed alternatives by the alternatives of
// their head. Unfolding only ever adds transitive edges to the leftmost-head
// relation, so when that relation starts out acyclic the fixpoint is reached
// within one sweep per chain link. A cycle in the relation means left
// recursion survived; it is reported rather than looped on.
fn unfold_heads(grammar: &mut Grammar, limits: &Limits) -> Result<()> {
    const PASS: &str = "head unfolding";

    if let Some((nonterminal, head)) = find_head_cycle(grammar) {
        return Err(TransformError::HeadUnfoldCycle { nonterminal, head });
    }

    for _ in 0..limits.max_unfold_passes {
        let mut changed = false;

        let names: Vec<String> = grammar.rules.keys().cloned().collect();
        for name in names {
            let rewrite = grammar.rules.get(&name).cloned().unwrap_or_default();
            let mut unfolded: Rewrite = Vec::new();

            for alternative in rewrite {
                let head = match alternative.first() {
                    Some(Symbol::Nonterminal(head)) => head.clone(),
                    _ => {
                        if !unfolded.contains(&alternative) {
                            unfolded.push(alternative);
                        }
                        continue;
                    }
                };
                changed = true;

                let gamma = &alternative[1..];
                let replacements = grammar.rules.get(&head).cloned().unwrap_or_default();
                for delta in &replacements {
                    let combined = concatenate(delta, gamma);
                    if !unfolded.contains(&combined) {
                        unfolded.push(combined);
                    }
                }
            }

            grammar.rules.insert(name, unfolded);
        }

        check_rule_sizes(grammar, limits, PASS)?;
        if !changed {
            return Ok(());
        }
    }

    Err(TransformError::HeadUnfoldDiverged {
        passes: limits.max_unfold_passes,
    })
}

// Depth-first search for a cycle in the relation "appears as the leftmost
// symbol of". Returns one edge of the cycle for the error report.
fn find_head_cycle(grammar: &Grammar) -> Option<(String, String)> {
    const UNVISITED: u8 = 0;
    const IN_PROGRESS: u8 = 1;
    const FINISHED: u8 = 2;

    fn visit(
        grammar: &Grammar,
        name: &str,
        state: &mut BTreeMap<String, u8>,
    ) -> Option<(String, String)> {
        state.insert(name.to_string(), IN_PROGRESS);
        for alternative in grammar.rewrite_of(name) {
            if let Some(Symbol::Nonterminal(head)) = alternative.first() {
                match state.get(head).copied().unwrap_or(UNVISITED) {
                    IN_PROGRESS => return Some((name.to_string(), head.clone())),
                    UNVISITED => {
                        if let Some(edge) = visit(grammar, head, state) {
                            return Some(edge);
                        }
                    }
                    _ => {}
                }
            }
        }
        state.insert(name.to_string(), FINISHED);
        None
    }

    let mut state: BTreeMap<String, u8> = BTreeMap::new();
    let names: Vec<String> = grammar.rules.keys().cloned().collect();
    for name in names {
        if state.get(&name).copied().unwrap_or(UNVISITED) == UNVISITED {
            if let Some(edge) = visit(grammar, &name, &mut state) {
                return Some(edge);
            }
        }
    }
    None
}

// Joins a replacement alternative with the remainder of the one it replaces,
// flattening epsilon away. Both sides epsilon-only degenerates back to a bare
// epsilon alternative.
fn concatenate(delta: &Alternative, gamma: &[Symbol]) -> Alternative {
    let mut combined: Alternative = delta
        .iter()
        .chain(gamma.iter())
        .filter(|symbol| **symbol != Symbol::Epsilon)
        .cloned()
        .collect();
    if combined.is_empty() {
        combined.push(Symbol::Epsilon);
    }
    combined
}

fn check_shape(grammar: &Grammar) -> Result<()> {
    for (name, rewrite) in &grammar.rules {
        for alternative in rewrite {
            let conforming = match alternative.as_slice() {
                [Symbol::Epsilon] => *name == grammar.start_symbol,
                [Symbol::Terminal(_), rest @ ..] => rest.iter().all(Symbol::is_nonterminal),
                _ => false,
            };
            if !conforming {
                return Err(TransformError::NormalFormViolated {
                    form: "Greibach normal form",
                    nonterminal: name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::generator::words;
    use crate::parser::parse_source;

    fn converted(source: &str) -> Grammar {
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        convert(&grammar, &Limits::default()).unwrap()
    }

    fn assert_greibach_shape(grammar: &Grammar) {
        for (name, rewrite) in &grammar.rules {
            for alternative in rewrite {
                match alternative.as_slice() {
                    [Symbol::Epsilon] => assert_eq!(*name, grammar.start_symbol),
                    [Symbol::Terminal(_), rest @ ..] => {
                        assert!(rest.iter().all(Symbol::is_nonterminal))
                    }
                    other => panic!("non-conforming production {:?}", other),
                }
            }
        }
    }

    #[test]
    fn direct_left_recursion_is_eliminated() {
        let source = "S0 : S0A1 | A1\nA1 : a\n";
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        let gnf = convert(&grammar, &Limits::default()).unwrap();

        assert_greibach_shape(&gnf);
        assert_eq!(words(&gnf, 3), vec!["a", "aa", "aaa"]);
        assert_eq!(words(&grammar, 3), vec!["a", "aa", "aaa"]);
    }

    #[test]
    fn indirect_left_recursion_is_eliminated() {
        // S0 and A1 are mutually left recursive
        let source = "S0 : A1a | b\nA1 : S0a | S0\n";
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        let gnf = convert(&grammar, &Limits::default()).unwrap();

        assert_greibach_shape(&gnf);
        assert_eq!(words(&gnf, 3), words(&grammar, 3));
    }

    #[test]
    fn palindromes_reach_normal_form() {
        let source = "S0 : A1S0A1 | B1S0B1 | E | A1 | B1\nA1 : a\nB1 : b\n";
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        let gnf = convert(&grammar, &Limits::default()).unwrap();

        assert_greibach_shape(&gnf);
        let expected = vec!["", "a", "aa", "aaa", "aba", "b", "bab", "bb", "bbb"];
        assert_eq!(words(&gnf, 3), expected);
    }

    #[test]
    fn nested_grammar_matches_the_source_language() {
        let source = "S0 : A1S0B1 | C1\nA1 : a\nB1 : b\nC1 : c | E\n";
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        let gnf = convert(&grammar, &Limits::default()).unwrap();

        assert_greibach_shape(&gnf);
        assert_eq!(words(&gnf, 4), vec!["", "aabb", "ab", "acb", "c"]);
    }

    #[test]
    fn epsilon_only_start_keeps_its_epsilon() {
        let gnf = converted("S0 : E\n");

        assert_eq!(gnf.rewrite_of(&gnf.start_symbol.clone()), &[vec![Symbol::Epsilon]]);
        assert_eq!(words(&gnf, 5), vec![""]);
    }

    #[test]
    fn unit_chains_collapse() {
        let gnf = converted("S0 : A1\nA1 : B1\nB1 : a | b\n");

        assert_eq!(gnf.rewrite_of(&gnf.start_symbol.clone()), &[
            vec![Symbol::terminal("a")],
            vec![Symbol::terminal("b")]
        ]);
        assert_eq!(words(&gnf, 1), vec!["a", "b"]);
    }

    #[test]
    fn inline_terminals_are_lifted_out_of_tails() {
        let source = "S0 : aS0b | c\n";
        let grammar = parse_source(source, PathBuf::new()).unwrap();
        let gnf = convert(&grammar, &Limits::default()).unwrap();

        assert_greibach_shape(&gnf);
        assert_eq!(words(&gnf, 5), vec!["aacbb", "acb", "c"]);
    }

    #[test]
    fn purely_recursive_nonterminals_disappear() {
        let gnf = converted("S0 : A1 | b\nA1 : A1a\n");

        assert_greibach_shape(&gnf);
        assert_eq!(words(&gnf, 2), vec!["b"]);
    }
}
