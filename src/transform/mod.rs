/*
    This module rewrites grammars into normal forms. The passes shared by the
    Chomsky and Greibach pipelines live here; the pipelines themselves are in
    the chomsky and greibach submodules.
*/

pub mod chomsky;
pub mod greibach;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::grammar::{Alternative, Grammar, Rewrite, Symbol};

// Guards against pathological growth during transformation
#[derive(Debug, Clone)]
pub struct Limits {
    // Most alternatives any single nonterminal may accumulate
    pub max_productions_per_rule: usize,
    // Most sweeps the head-unfolding fixpoint may take
    pub max_unfold_passes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_productions_per_rule: 8192,
            max_unfold_passes: 512,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum TransformError {
    // The two-character name space is exhausted
    NamesExhausted(&'static str),
    // A rewrite outgrew the configured guard
    TooManyProductions {
        pass: &'static str,
        nonterminal: String,
        count: usize,
    },
    // The leftmost-head relation still contains a cycle, so unfolding would
    // never terminate
    HeadUnfoldCycle { nonterminal: String, head: String },
    // Head unfolding did not converge within the pass budget
    HeadUnfoldDiverged { passes: usize },
    // A pipeline postcondition does not hold; this is a bug, not bad input
    NormalFormViolated {
        form: &'static str,
        nonterminal: String,
    },
}

impl Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::NamesExhausted(pass) => {
                write!(f, "No fresh nonterminal names left during {}", pass)
            }
            TransformError::TooManyProductions { pass, nonterminal, count } => {
                write!(f, "`{}` reached {} productions during {}", nonterminal, count, pass)
            }
            TransformError::HeadUnfoldCycle { nonterminal, head } => {
                write!(f, "`{}` and its head `{}` form a leftmost cycle", nonterminal, head)
            }
            TransformError::HeadUnfoldDiverged { passes } => {
                write!(f, "Head unfolding did not converge within {} passes", passes)
            }
            TransformError::NormalFormViolated { form, nonterminal } => {
                write!(f, "`{}` violates the {} production shape", nonterminal, form)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

pub(crate) fn fresh(grammar: &mut Grammar, pass: &'static str) -> Result<String> {
    grammar
        .fresh_nonterminal()
        .ok_or(TransformError::NamesExhausted(pass))
}

pub(crate) fn check_rule_sizes(
    grammar: &Grammar,
    limits: &Limits,
    pass: &'static str,
) -> Result<()> {
    for (name, rewrite) in &grammar.rules {
        if rewrite.len() > limits.max_productions_per_rule {
            return Err(TransformError::TooManyProductions {
                pass,
                nonterminal: name.clone(),
                count: rewrite.len(),
            });
        }
    }
    Ok(())
}

fn push_unique(rewrite: &mut Rewrite, alternative: Alternative) {
    if !rewrite.contains(&alternative) {
        rewrite.push(alternative);
    }
}

// Introduces a fresh start symbol with the single production `new -> old`.
// Afterwards the start symbol never occurs on a right-hand side, which keeps
// the epsilon production legal at the start symbol alone.
pub fn introduce_start(grammar: &mut Grammar, pass: &'static str) -> Result<()> {
    let new_start = fresh(grammar, pass)?;
    let old_start = grammar.start_symbol.clone();
    grammar
        .rules
        .insert(new_start.clone(), vec![vec![Symbol::Nonterminal(old_start)]]);
    grammar.start_symbol = new_start;
    Ok(())
}

// Least set closed under: an epsilon alternative makes its owner nullable, and
// an alternative of only nullable symbols makes its owner nullable
pub fn nullable_set(grammar: &Grammar) -> BTreeSet<String> {
    let mut nullable = BTreeSet::new();
    let mut changed = true;
    while changed {
        changed = false;
        for (name, rewrite) in &grammar.rules {
            if nullable.contains(name) {
                continue;
            }
            let derives_empty = rewrite.iter().any(|alternative| {
                alternative.iter().all(|symbol| match symbol {
                    Symbol::Epsilon => true,
                    Symbol::Nonterminal(inner) => nullable.contains(inner),
                    Symbol::Terminal(_) => false,
                })
            });
            if derives_empty {
                nullable.insert(name.clone());
                changed = true;
            }
        }
    }
    nullable
}

// Epsilon elimination. Every alternative is replayed with each subset of its
// nullable positions deleted; empty results are dropped. The epsilon
// alternative survives only at a nullable start symbol.
pub fn eliminate_epsilon(grammar: &mut Grammar, limits: &Limits) -> Result<()> {
    const PASS: &str = "epsilon elimination";

    let nullable = nullable_set(grammar);
    let start_nullable = nullable.contains(&grammar.start_symbol);

    let names: Vec<String> = grammar.rules.keys().cloned().collect();
    for name in names {
        let rewrite = grammar.rules.get(&name).cloned().unwrap_or_default();
        let mut expanded: Rewrite = Vec::new();

        for alternative in rewrite {
            if alternative == [Symbol::Epsilon] {
                continue;
            }

            let positions: Vec<usize> = alternative
                .iter()
                .enumerate()
                .filter_map(|(index, symbol)| match symbol {
                    Symbol::Nonterminal(inner) if nullable.contains(inner) => Some(index),
                    _ => None,
                })
                .collect();

            if positions.len() >= usize::BITS as usize
                || 1usize << positions.len() > limits.max_productions_per_rule
            {
                return Err(TransformError::TooManyProductions {
                    pass: PASS,
                    nonterminal: name,
                    count: limits.max_productions_per_rule,
                });
            }

            for mask in 0..1usize << positions.len() {
                let variant: Alternative = alternative
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| {
                        match positions.iter().position(|p| p == index) {
                            Some(bit) => mask & (1 << bit) == 0,
                            None => true,
                        }
                    })
                    .map(|(_, symbol)| symbol.clone())
                    .collect();
                if !variant.is_empty() {
                    push_unique(&mut expanded, variant);
                }
            }
        }

        if name == grammar.start_symbol && start_nullable {
            push_unique(&mut expanded, vec![Symbol::Epsilon]);
        }
        grammar.rules.insert(name, expanded);
    }

    check_rule_sizes(grammar, limits, PASS)
}

// Unit elimination. For every nonterminal, walks the closure of its unit
// targets and copies their non-unit alternatives; unit productions themselves
// are dropped.
pub fn eliminate_units(grammar: &mut Grammar, limits: &Limits) -> Result<()> {
    const PASS: &str = "unit elimination";

    let mut new_rules = BTreeMap::new();
    for (name, rewrite) in &grammar.rules {
        let mut finals: Rewrite = Vec::new();
        let mut visited: BTreeSet<String> = BTreeSet::new();
        let mut targets: Vec<String> = Vec::new();

        for alternative in rewrite {
            match alternative.as_slice() {
                [Symbol::Nonterminal(target)] => {
                    if visited.insert(target.clone()) {
                        targets.push(target.clone());
                    }
                }
                _ => push_unique(&mut finals, alternative.clone()),
            }
        }

        while let Some(current) = targets.pop() {
            for alternative in grammar.rewrite_of(&current) {
                match alternative.as_slice() {
                    [Symbol::Nonterminal(target)] => {
                        if visited.insert(target.clone()) {
                            targets.push(target.clone());
                        }
                    }
                    _ => push_unique(&mut finals, alternative.clone()),
                }
            }
        }

        new_rules.insert(name.clone(), finals);
    }
    grammar.rules = new_rules;

    check_rule_sizes(grammar, limits, PASS)
}

// Replaces terminals inside alternatives of length two or more with dedicated
// nonterminals. With keep_head set, the first symbol is left alone, which is
// the variant the Greibach pipeline needs. An existing nonterminal stands in
// for a terminal only when that single terminal production is its entire
// rewrite.
pub fn lift_terminals(
    grammar: &mut Grammar,
    keep_head: bool,
    pass: &'static str,
) -> Result<()> {
    let mut stand_ins: BTreeMap<String, String> = BTreeMap::new();
    for (name, rewrite) in &grammar.rules {
        if let [alternative] = rewrite.as_slice() {
            if let [Symbol::Terminal(text)] = alternative.as_slice() {
                stand_ins.entry(text.clone()).or_insert_with(|| name.clone());
            }
        }
    }

    let names: Vec<String> = grammar.rules.keys().cloned().collect();
    for name in names {
        let rewrite = grammar.rules.get(&name).cloned().unwrap_or_default();
        let mut lifted: Rewrite = Vec::new();

        for alternative in rewrite {
            if alternative.len() < 2 {
                push_unique(&mut lifted, alternative);
                continue;
            }

            let mut replaced: Alternative = Vec::with_capacity(alternative.len());
            for (index, symbol) in alternative.into_iter().enumerate() {
                match symbol {
                    Symbol::Terminal(text) if !(keep_head && index == 0) => {
                        if !stand_ins.contains_key(&text) {
                            let stand_in = fresh(grammar, pass)?;
                            grammar
                                .rules
                                .insert(stand_in.clone(), vec![vec![Symbol::Terminal(text.clone())]]);
                            stand_ins.insert(text.clone(), stand_in);
                        }
                        replaced.push(Symbol::Nonterminal(stand_ins[&text].clone()));
                    }
                    other => replaced.push(other),
                }
            }
            push_unique(&mut lifted, replaced);
        }

        grammar.rules.insert(name, lifted);
    }
    Ok(())
}
