/*
    Chomsky normal form: every production becomes `A : B C`, `A : a`, or an
    epsilon production at the start symbol alone
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
    lift_terminals(&mut normalized, false, "terminal lifting")?;
    binarize(&mut normalized, limits)?;
    eliminate_epsilon(&mut normalized, limits)?;
    eliminate_units(&mut normalized, limits)?;
    cleanup(&mut normalized);
    check_shape(&normalized)?;
    Ok(normalized)
}

// Rewrites every alternative of three or more symbols into a chain of pairs.
// Identical tails share one generated nonterminal across the whole grammar.
fn binarize(grammar: &mut Grammar, limits: &Limits) -> Result<()> {
    const PASS: &str = "binarization";

    let mut tail_cache: BTreeMap<Alternative, String> = BTreeMap::new();
    let names: Vec<String> = grammar.rules.keys().cloned().collect();
    for name in names {
        let rewrite = grammar.rules.get(&name).cloned().unwrap_or_default();
        let mut binarized: Rewrite = Vec::new();

        for alternative in rewrite {
            if alternative.len() <= 2 {
                if !binarized.contains(&alternative) {
                    binarized.push(alternative);
                }
                continue;
            }

            let head = alternative[0].clone();
            let tail = tail_nonterminal(grammar, &alternative[1..], &mut tail_cache)?;
            let pair = vec![head, Symbol::Nonterminal(tail)];
            if !binarized.contains(&pair) {
                binarized.push(pair);
            }
        }

        grammar.rules.insert(name, binarized);
    }

    check_rule_sizes(grammar, limits, PASS)
}

fn tail_nonterminal(
    grammar: &mut Grammar,
    tail: &[Symbol],
    tail_cache: &mut BTreeMap<Alternative, String>,
) -> Result<String> {
    if let Some(existing) = tail_cache.get(tail) {
        return Ok(existing.clone());
    }

    let name = fresh(grammar, "binarization")?;
    tail_cache.insert(tail.to_vec(), name.clone());

    let rewrite = if tail.len() == 2 {
        vec![tail.to_vec()]
    } else {
        let inner = tail_nonterminal(grammar, &tail[1..], tail_cache)?;
        vec![vec![tail[0].clone(), Symbol::Nonterminal(inner)]]
    };
    grammar.rules.insert(name.clone(), rewrite);
    Ok(name)
}

fn check_shape(grammar: &Grammar) -> Result<()> {
    for (name, rewrite) in &grammar.rules {
        for alternative in rewrite {
            let conforming = match alternative.as_slice() {
                [Symbol::Epsilon] => *name == grammar.start_symbol,
                [Symbol::Terminal(_)] => true,
                [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
                _ => false,
            };
            if !conforming {
                return Err(TransformError::NormalFormViolated {
                    form: "Chomsky normal form",
                    nonterminal: name.clone(),
                });
            }
        }
    }
    Ok(())
}
