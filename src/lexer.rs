// ABOUTME: Lexer turning source text into a token stream using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{recognize, value},
    sequence::delimited,
    IResult, Parser,
};

use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};

/// Tokenize a complete source text.
///
/// Rules are tried in a fixed order at each position and the first match
/// wins. Comments and whitespace are consumed silently but advance the
/// line counter; the returned stream always ends with an EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut line = 1usize;

    loop {
        // Trivia: `--` line comments and whitespace.
        loop {
            if let Ok((next, _)) = line_comment(rest) {
                rest = next;
                continue;
            }
            if let Ok((next, blank)) = multispace1::<_, nom::error::Error<_>>(rest) {
                line += blank.matches('\n').count();
                rest = next;
                continue;
            }
            break;
        }

        if rest.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, line));
            return Ok(tokens);
        }

        match token_rule(rest) {
            Ok((next, kind)) => {
                let consumed = &rest[..rest.len() - next.len()];
                tokens.push(Token::new(kind, line));
                // Long strings may span lines; the token keeps its start line.
                line += consumed.matches('\n').count();
                rest = next;
            }
            Err(_) => {
                return Err(unmatched_input_error(source, rest, line));
            }
        }
    }
}

fn token_rule(input: &str) -> IResult<&str, TokenKind> {
    alt((
        long_string,
        quoted_string,
        float_literal,
        integer_literal,
        word,
        operator,
        punctuation,
    ))
    .parse(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("--"), take_while(|c| c != '\n'))).parse(input)
}

/// `[[ ... ]]`, non-greedy, interior captured without the delimiters.
fn long_string(input: &str) -> IResult<&str, TokenKind> {
    delimited(tag("[["), take_until("]]"), tag("]]"))
        .map(|body: &str| TokenKind::LongStr(body.to_string()))
        .parse(input)
}

/// Single- or double-quoted string. No escape processing, no newlines.
fn quoted_string(input: &str) -> IResult<&str, TokenKind> {
    alt((
        delimited(
            char('"'),
            take_while(|c: char| c != '"' && c != '\n'),
            char('"'),
        ),
        delimited(
            char('\''),
            take_while(|c: char| c != '\'' && c != '\n'),
            char('\''),
        ),
    ))
    .map(|body: &str| TokenKind::Str(body.to_string()))
    .parse(input)
}

/// Digits on both sides of the point; `1..2` must stay integer-concat-integer.
fn float_literal(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = recognize((digit1, char('.'), digit1)).parse(input)?;
    Ok((rest, TokenKind::Float(text.parse().unwrap_or(f64::INFINITY))))
}

fn integer_literal(input: &str) -> IResult<&str, TokenKind> {
    let (rest, digits) = digit1(input)?;
    let kind = match digits.parse::<i64>() {
        Ok(n) => TokenKind::Integer(n),
        // Out-of-range integer literals degrade to floats.
        Err(_) => TokenKind::Float(digits.parse().unwrap_or(f64::INFINITY)),
    };
    Ok((rest, kind))
}

/// An identifier-shaped word, classified into keyword or identifier.
fn word(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = recognize((
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)?;
    Ok((rest, TokenKind::from_word(text)))
}

/// Longest-match ordering: two-character operators before their prefixes.
fn operator(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Concat, tag("..")),
        value(TokenKind::Equal, tag("==")),
        value(TokenKind::NotEqual, tag("~=")),
        value(TokenKind::LessEqual, tag("<=")),
        value(TokenKind::GreaterEqual, tag(">=")),
        value(TokenKind::Assign, char('=')),
        value(TokenKind::Less, char('<')),
        value(TokenKind::Greater, char('>')),
        value(TokenKind::Plus, char('+')),
        value(TokenKind::Minus, char('-')),
        value(TokenKind::Star, char('*')),
        value(TokenKind::Slash, char('/')),
        value(TokenKind::Percent, char('%')),
        value(TokenKind::Caret, char('^')),
        value(TokenKind::Hash, char('#')),
        value(TokenKind::Question, char('?')),
        value(TokenKind::Colon, char(':')),
    ))
    .parse(input)
}

fn punctuation(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::LParen, char('(')),
        value(TokenKind::RParen, char(')')),
        value(TokenKind::LCurly, char('{')),
        value(TokenKind::RCurly, char('}')),
        value(TokenKind::LBracket, char('[')),
        value(TokenKind::RBracket, char(']')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Semicolon, char(';')),
        value(TokenKind::Dot, char('.')),
    ))
    .parse(input)
}

fn unmatched_input_error(source: &str, rest: &str, line: usize) -> SyntaxError {
    let offending = rest.chars().next().unwrap_or('\u{0}');
    let message = if offending == '"' || offending == '\'' {
        "unterminated string literal".to_string()
    } else {
        format!("unknown character '{}'", offending.escape_default())
    };
    SyntaxError::at(message, line, source)
}
