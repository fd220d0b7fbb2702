use std::collections::HashSet;

use crate::grammar::Symbol::Nonterminal;
use super::ParseErrorType::UndefinedNonterminal;
use super::{FileResult, ParseError, ParseErrors, Rule};

fn undefined_symbols_in_rule<'a>(rule: &'a Rule, defined: &'a HashSet<&'a str>) -> impl Iterator<Item = ParseError> + 'a {
    // Keep only the nonterminals of the rewrite, then only the ones without a
    // defining rule, and report each at the rule's own line
    rule.rewrite.iter()
        .flatten()
        .filter_map(|symbol| match symbol {
            Nonterminal(name) => Some(name),
            _ => None
        })
        .filter(|name| !defined.contains(name.as_str()))
        .map(|name| ParseError {
            location: rule.location.clone(),
            error: UndefinedNonterminal(name.clone())
        })
}

// Every nonterminal mentioned on a right-hand side must be defined on some
// left-hand side. Checked before any transformation runs.
pub fn verify_rules(rules: &[Rule]) -> FileResult<()> {
    let defined: HashSet<&str> = rules.iter().map(|rule| rule.symbol.as_str()).collect();

    let errors: ParseErrors = rules.iter()
        .flat_map(|rule| undefined_symbols_in_rule(rule, &defined))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::super::parse_source;
    use super::*;

    #[test]
    fn defined_references_pass() {
        let source = "S0 : A1B1\nA1 : a\nB1 : b\n";

        assert!(parse_source(source, PathBuf::new()).is_ok());
    }

    #[test]
    fn each_undefined_reference_is_reported() {
        let errors = parse_source("S0 : A1B1 | a\nA1 : C1\n", PathBuf::new()).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error, UndefinedNonterminal("B1".to_string()));
        assert_eq!(errors[0].location.line, 1);
        assert_eq!(errors[1].error, UndefinedNonterminal("C1".to_string()));
        assert_eq!(errors[1].location.line, 2);
    }
}
