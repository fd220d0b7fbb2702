use itertools::{Itertools, PeekingNext};

use super::{ParseErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Separator,
    Or,
    Epsilon,
    Nonterminal(String),
    Terminal(String)
}

// An uppercase letter opens a nonterminal: one letter (anything but E, which
// is the epsilon token) followed by one digit. Whitespace between the two is
// tolerated and stripped, matching the historical grammar files.
pub fn lex_nonterminal(letter: char, line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    line.peeking_take_while(|c| *c == ' ' || *c == '\t').for_each(drop);

    match line.peeking_next(|c| c.is_ascii_digit()) {
        Some(digit) => Ok(Token::Nonterminal([letter, digit].iter().collect())),
        None => Err(ParseErrorType::UnexpectedCharacter(letter)),
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        if c == ':' {
            line_chars.next();
            tokens.push(Token::Separator);
        } else if c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if c == 'E' {
            line_chars.next();
            tokens.push(Token::Epsilon);
        } else if c.is_ascii_uppercase() {
            line_chars.next();
            tokens.push(lex_nonterminal(c, &mut line_chars)?);
        } else if c.is_ascii_lowercase() {
            line_chars.next();
            tokens.push(Token::Terminal(c.to_string()));
        } else if c == ' ' || c == '\t' {
            line_chars.next();
        } else {
            return Err(ParseErrorType::UnexpectedCharacter(c));
        }
    }

    return Ok(tokens);
}
