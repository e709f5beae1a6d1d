//! Lexer for minimized boolean formulas.

use winnow::ascii::multispace0;
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::take_while;

/// Token types for formulas.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String), // variable or function name

    LParen, // (
    RParen, // )
    Comma,  // ,

    Eof,
}

/// A token with its byte offset in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Lex an identifier: a letter or underscore, then alphanumerics or underscores.
fn lex_ident(input: &mut &str) -> PResult<Token> {
    let first = take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_').parse_next(input)?;
    let rest = take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    Ok(Token::Ident(format!("{}{}", first, rest)))
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    multispace0.parse_next(input)?;

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        ",".value(Token::Comma),
        lex_ident,
    ))
    .parse_next(input)
}

/// Tokenize the entire input. Errors carry the byte offset of the bad input.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, (usize, String)> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        let before = input.len() - remaining.len();
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(token) => {
                let consumed = input.len() - remaining.len();
                let offset = before + leading_space(&input[before..consumed]);
                tokens.push(Spanned { token, offset });
            }
            Err(_) => {
                let offset = before + leading_space(&input[before..]);
                let rest: String = input[offset..].chars().take(16).collect();
                return Err((offset, format!("unexpected input '{}'", rest)));
            }
        }
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: input.len(),
    });
    Ok(tokens)
}

fn leading_space(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn test_simple_call() {
        assert_eq!(
            tokens("And(v1, v2)"),
            vec![
                Token::Ident("And".into()),
                Token::LParen,
                Token::Ident("v1".into()),
                Token::Comma,
                Token::Ident("v2".into()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let spanned = tokenize("  Not( v12 )\n").unwrap();
        let offsets: Vec<usize> = spanned.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![2, 5, 7, 11, 13]);
    }

    #[test]
    fn test_rejects_unknown_symbols() {
        let err = tokenize("And(v1, ~v2)").unwrap_err();
        assert_eq!(err.0, 8);
    }
}
