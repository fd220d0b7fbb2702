/*
    This module parses grammar files
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use crate::error_handling::*;
use crate::grammar::cleanup::cleanup;
use crate::grammar::{Alternative, Grammar, Rewrite, Symbol};
use itertools::Itertools;
use lexer::Token;

#[derive(Debug)]
pub enum ParseErrorType {
    // A character outside the grammar alphabet
    UnexpectedCharacter(char),
    // A rule line without a `:` after its left-hand side
    MissingSeparator,
    // A `:` inside the right-hand side
    UnexpectedSeparator,
    // The left-hand side of a rule is not a nonterminal
    MissingNonterminal,
    // Nothing between two `|`, or nothing after the `:`
    EmptyAlternative,
    // A nonterminal is used but never defined
    UndefinedNonterminal(String),
    // The file contains no rules at all
    EmptyGrammar,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for ParseErrorType {}

impl PartialEq for ParseErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParseErrorType::FileError(a), ParseErrorType::FileError(b)) => a.kind() == b.kind(),
            (ParseErrorType::UnexpectedCharacter(a), ParseErrorType::UnexpectedCharacter(b)) => {
                a == b
            }
            (ParseErrorType::UndefinedNonterminal(a), ParseErrorType::UndefinedNonterminal(b)) => {
                a == b
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for ParseErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            ParseErrorType::MissingSeparator => write!(f, "Expected `:` after the left-hand side"),
            ParseErrorType::UnexpectedSeparator => write!(f, "Unexpected `:` in a right-hand side"),
            ParseErrorType::MissingNonterminal => write!(f, "Rules must define a nonterminal"),
            ParseErrorType::EmptyAlternative => write!(f, "Empty alternative in a right-hand side"),
            ParseErrorType::UndefinedNonterminal(name) => {
                write!(f, "No definition for nonterminal `{}`", name)
            }
            ParseErrorType::EmptyGrammar => write!(f, "The grammar contains no rules"),
            ParseErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type ParseError = Error<ParseErrorType>;
pub type ParseErrors = Errors<ParseErrorType>;

pub type Result<T> = std::result::Result<T, ParseErrorType>;
pub type LineResult<T> = std::result::Result<T, ParseError>;
pub type FileResult<T> = std::result::Result<T, ParseErrors>;

// One parsed rule line, kept with its position for the verifier's reports
#[derive(PartialEq, Debug)]
struct Rule {
    symbol: String,
    rewrite: Rewrite,
    location: Location
}

// Epsilon stands for the empty string, so inside a longer alternative it
// contributes nothing and is dropped; an alternative of only epsilons is the
// empty derivation itself
fn normalize_epsilon(mut alternative: Alternative) -> Alternative {
    if alternative.len() > 1 {
        alternative.retain(|symbol| *symbol != Symbol::Epsilon);
        if alternative.is_empty() {
            alternative.push(Symbol::Epsilon);
        }
    }
    alternative
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    if tokens.is_empty() {
        return Err(ParseErrorType::EmptyAlternative);
    }

    let symbols = tokens.iter().map(|t| match t {
        Token::Separator => Err(ParseErrorType::UnexpectedSeparator),
        Token::Or => Err(ParseErrorType::EmptyAlternative),
        Token::Epsilon => Ok(Symbol::Epsilon),
        Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
        Token::Terminal(s) => Ok(Symbol::Terminal(s.clone()))
    }).collect::<Result<Alternative>>()?;

    Ok(normalize_epsilon(symbols))
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let symbol = match tokens.first() {
        Some(Token::Nonterminal(s)) => Ok(s.clone()),
        _ => Err(ParseErrorType::MissingNonterminal)
    }?;

    if tokens.get(1) != Some(&Token::Separator) {
        return Err(ParseErrorType::MissingSeparator)
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    return Ok(Rule {
        symbol,
        rewrite,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| ParseError { location, error })
}

// The first left-hand side in the file becomes the start symbol; later lines
// with an already-seen left-hand side accumulate alternatives
fn build_grammar(rules: Vec<Rule>) -> Grammar {
    let mut grammar = Grammar::new(&rules[0].symbol);
    for rule in rules {
        for alternative in rule.rewrite {
            grammar.add_production(&rule.symbol, alternative);
        }
    }
    grammar
}

pub fn parse_source(source: &str, file: PathBuf) -> FileResult<Grammar> {
    let parsed_lines = source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(num, line)| parse_lex_line(line, Location::at(file.clone(), num + 1)));

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition(LineResult::is_ok);
    if !errors.is_empty() {
        return Err(errors.into_iter().map(LineResult::unwrap_err).collect_vec());
    }

    let rules = rules.into_iter().map(LineResult::unwrap).collect_vec();
    if rules.is_empty() {
        return Err(vec![ParseError {
            location: Location::whole_file(file),
            error: ParseErrorType::EmptyGrammar
        }]);
    }

    verifier::verify_rules(&rules)?;

    let mut grammar = build_grammar(rules);
    cleanup(&mut grammar);
    Ok(grammar)
}

pub fn parse_file(path: &PathBuf) -> FileResult<Grammar> {
    let source = fs::read_to_string(path).map_err(|e| vec![ParseError {
        location: Location::whole_file(path.clone()),
        error: ParseErrorType::FileError(e)
    }])?;
    parse_source(&source, path.clone())
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    impl Location {
        pub fn new() -> Self {
            Location::whole_file(PathBuf::new())
        }
    }

    fn parsed(source: &str) -> Grammar {
        parse_source(source, PathBuf::new()).unwrap()
    }

    #[test]
    fn parse_normal_line() {
        let text = "S0 : A1S0B1 | c | E";
        let lexed = lexer::lex_line(text).unwrap();

        let answer = Rule {
            symbol: "S0".to_string(),
            rewrite: vec![
                vec![
                    Symbol::nonterminal("A1"),
                    Symbol::nonterminal("S0"),
                    Symbol::nonterminal("B1")
                ],
                vec![Symbol::terminal("c")],
                vec![Symbol::Epsilon]
            ],
            location: Location::new()
        };

        assert_eq!(parse_line(&lexed[..], Location::new()), Ok(answer));
    }

    #[test]
    fn epsilon_collapses_inside_longer_alternatives() {
        let lines = vec![
            "S0 : aE",
            "S0 : EE"
        ];
        let answers = vec![
            vec![Symbol::terminal("a")],
            vec![Symbol::Epsilon]
        ];

        for (line, answer) in zip(lines, answers) {
            let lexed = lexer::lex_line(line).unwrap();
            let rule = parse_line(&lexed[..], Location::new()).unwrap();
            assert_eq!(rule.rewrite, vec![answer]);
        }
    }

    #[test]
    fn parse_malformed_line() {
        let lines = vec![
            "S0 A1",
            "a : b",
            ": b",
            "S0 : a | | b",
            "S0 : ",
            "S0 : a : b"
        ];
        let answers = vec![
            ParseErrorType::MissingSeparator,
            ParseErrorType::MissingNonterminal,
            ParseErrorType::MissingNonterminal,
            ParseErrorType::EmptyAlternative,
            ParseErrorType::EmptyAlternative,
            ParseErrorType::UnexpectedSeparator
        ];

        for (line, answer) in zip(lines, answers) {
            let lexed = lexer::lex_line(line).unwrap();
            assert_eq!(parse_line(&lexed[..], Location::new()), Err(answer));
        }
    }

    #[test]
    fn first_left_hand_side_is_the_start_symbol() {
        let grammar = parsed("B1 : a | A1\nA1 : b\n");

        assert_eq!(grammar.start_symbol, "B1");
    }

    #[test]
    fn duplicate_left_hand_sides_accumulate() {
        let grammar = parsed("S0 : a\nS0 : b\n");

        assert_eq!(grammar.rewrite_of("S0"), &[
            vec![Symbol::terminal("a")],
            vec![Symbol::terminal("b")]
        ]);
    }

    #[test]
    fn undefined_nonterminals_are_rejected() {
        let errors = parse_source("S0 : A1\n", PathBuf::new()).unwrap_err();

        assert_eq!(errors, vec![ParseError {
            location: Location::at(PathBuf::new(), 1),
            error: ParseErrorType::UndefinedNonterminal("A1".to_string())
        }]);
    }

    #[test]
    fn empty_sources_are_rejected() {
        let errors = parse_source("\n\n", PathBuf::new()).unwrap_err();

        assert_eq!(errors[0].error, ParseErrorType::EmptyGrammar);
    }

    #[test]
    fn errors_are_reported_for_every_bad_line() {
        let errors = parse_source("S0 : a\nS0 ; b\nA1 b\n", PathBuf::new()).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].location.line, 2);
        assert_eq!(errors[0].error, ParseErrorType::UnexpectedCharacter(';'));
        assert_eq!(errors[1].location.line, 3);
        assert_eq!(errors[1].error, ParseErrorType::MissingSeparator);
    }

    #[test]
    fn parse_normal_file() {
        let path = PathBuf::from("example_data/nested.general");
        let grammar = parse_file(&path).unwrap();

        assert_eq!(grammar.start_symbol, "S0");
        assert_eq!(grammar.rules.len(), 4);
        assert_eq!(grammar.rewrite_of("C1"), &[
            vec![Symbol::terminal("c")],
            vec![Symbol::Epsilon]
        ]);
    }

    #[test]
    fn missing_files_report_an_io_error() {
        let path = PathBuf::from("example_data/no_such.general");
        let errors = parse_file(&path).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].error, ParseErrorType::FileError(_)));
        assert_eq!(errors[0].location.file, path);
    }

    #[test]
    fn parsing_runs_cleanup() {
        // A1 never derives a terminal string and B1 is unreachable
        let grammar = parsed("S0 : A1 | b\nA1 : A1a\nB1 : b\n");

        assert_eq!(grammar.rewrite_of("S0"), &[vec![Symbol::terminal("b")]]);
        assert!(!grammar.rules.contains_key("A1"));
        assert!(!grammar.rules.contains_key("B1"));
    }
}
