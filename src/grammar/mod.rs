/*
    This module is for storing and manipulating grammars
*/

pub mod cleanup;

use std::collections::{BTreeMap, BTreeSet};

// The base unit in a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
    Epsilon,
}

// The symbols in a single alternative. Epsilon only ever appears as the sole
// element of a length-1 alternative.
pub type Alternative = Vec<Symbol>;

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

// Candidate names for generated nonterminals. E is excluded because the text
// format reserves it for epsilon.
const NAME_LETTERS: &str = "ABCDFGHIJKLMNOPQRSTUVWXYZ";
const NAME_DIGITS: &str = "0123456789";

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub nonterminals: BTreeSet<String>,
    pub rules: BTreeMap<String, Rewrite>,
}

impl Grammar {
    pub fn new(start_symbol: &str) -> Self {
        let mut nonterminals = BTreeSet::new();
        nonterminals.insert(start_symbol.to_string());
        let mut rules = BTreeMap::new();
        rules.insert(start_symbol.to_string(), Vec::new());

        Grammar {
            start_symbol: start_symbol.to_string(),
            nonterminals,
            rules,
        }
    }

    // Registers the left-hand side and appends the alternative, keeping the
    // rewrite free of duplicates
    pub fn add_production(&mut self, lhs: &str, alternative: Alternative) {
        self.nonterminals.insert(lhs.to_string());
        let rewrite = self.rules.entry(lhs.to_string()).or_default();
        if !rewrite.contains(&alternative) {
            rewrite.push(alternative);
        }
    }

    pub fn rewrite_of(&self, nonterminal: &str) -> &[Alternative] {
        self.rules.get(nonterminal).map_or(&[], Vec::as_slice)
    }

    pub fn production_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    // First unused name in the order A0, B0, ..., Z0, A1, ... The name is
    // inserted into the nonterminal set before it is returned, so repeated
    // calls never hand out the same name twice. None once all names are taken.
    pub fn fresh_nonterminal(&mut self) -> Option<String> {
        for digit in NAME_DIGITS.chars() {
            for letter in NAME_LETTERS.chars() {
                let candidate: String = [letter, digit].iter().collect();
                if !self.nonterminals.contains(&candidate) {
                    self.nonterminals.insert(candidate.clone());
                    return Some(candidate);
                }
            }
        }
        None
    }

    // Rebuilds the nonterminal set from the rule table after passes that
    // delete nonterminals
    pub(crate) fn sync_nonterminals(&mut self) {
        self.nonterminals = self.rules.keys().cloned().collect();
    }
}

impl Symbol {
    pub fn terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    pub fn nonterminal(name: &str) -> Symbol {
        Symbol::Nonterminal(name.to_string())
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }
}
