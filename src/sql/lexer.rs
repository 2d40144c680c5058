use std::{fmt, str::FromStr};

use crate::{
    DataType,
    common::error::LexError,
    sql::parser::{Keyword, Literal, Operator},
};

/// Punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    LeftParen,
    RightParen,
    Comma,
    Dot,
}

impl Symbol {
    pub fn to_char(self) -> char {
        match self {
            Symbol::LeftParen => '(',
            Symbol::RightParen => ')',
            Symbol::Comma => ',',
            Symbol::Dot => '.',
        }
    }
}

/// A single lexical unit of a statement.
///
/// Keywords and data types are normalized; identifiers and string literals
/// borrow from the statement text and keep their original case.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    Literal(Literal<'src>),
    Keyword(Keyword),
    DataType(DataType),
    Operator(Operator),
    Identifier(&'src str),
    Symbol(Symbol),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(literal) => write!(f, "literal {literal}"),
            Token::Keyword(keyword) => write!(f, "keyword {keyword}"),
            Token::DataType(data_type) => write!(f, "type {data_type}"),
            Token::Operator(op) => write!(f, "'{op}'"),
            Token::Identifier(ident) => write!(f, "identifier \"{ident}\""),
            Token::Symbol(symbol) => write!(f, "'{}'", symbol.to_char()),
        }
    }
}

/// Single-pass scanner turning one statement into [`Token`]s.
///
/// Iterating yields tokens until the input is exhausted or an error is hit;
/// after an error the lexer is fused and yields nothing further.
pub(crate) struct Lexer<'a> {
    pub whole: &'a str,
    pub rest: &'a str,
    pub position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            whole: input,
            rest: input,
            position: 0,
        }
    }

    /// Scans the whole input, stopping at the first lexical error.
    pub fn tokenize(input: &'a str) -> Result<Vec<Token<'a>>, LexError> {
        Lexer::new(input).collect()
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn advance(&mut self, len: usize) {
        self.position += len;
        self.rest = &self.rest[len..];
    }

    fn emit(&mut self, len: usize, token: Token<'a>) -> Result<Token<'a>, LexError> {
        self.advance(len);
        Ok(token)
    }

    fn fuse(&mut self) {
        self.position = self.whole.len();
        self.rest = "";
    }

    fn consume_word(&mut self) -> Token<'a> {
        let word_end = self
            .rest
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(self.rest.len());

        let word = &self.rest[..word_end];
        self.advance(word_end);

        if word.eq_ignore_ascii_case("TRUE") {
            Token::Literal(Literal::Boolean(true))
        } else if word.eq_ignore_ascii_case("FALSE") {
            Token::Literal(Literal::Boolean(false))
        } else if word.eq_ignore_ascii_case("NULL") {
            Token::Literal(Literal::Null)
        } else if let Ok(keyword) = Keyword::from_str(word) {
            Token::Keyword(keyword)
        } else if let Ok(data_type) = DataType::from_str(word) {
            Token::DataType(data_type)
        } else {
            Token::Identifier(word)
        }
    }

    fn consume_string(&mut self, closing: char) -> Result<Token<'a>, LexError> {
        let Some(end_index) = self.rest[1..].find(closing) else {
            let span = (self.position, self.rest.len()).into();
            self.fuse();
            return Err(LexError::UnterminatedString { span });
        };

        let string_value = &self.rest[1..end_index + 1];
        self.advance(end_index + 2);

        Ok(Token::Literal(Literal::String(string_value)))
    }

    fn consume_number(&mut self) -> Result<Token<'a>, LexError> {
        let sign_len = usize::from(self.rest.starts_with('-'));
        let number_end = self.rest[sign_len..]
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .map(|end| end + sign_len)
            .unwrap_or(self.rest.len());

        let number_str = &self.rest[..number_end];
        match number_str.parse::<f64>() {
            Ok(number) if number.is_finite() => {
                self.emit(number_end, Token::Literal(Literal::Number(number)))
            }
            _ => {
                let span = (self.position, number_end).into();
                self.fuse();
                Err(LexError::InvalidNumber {
                    text: number_str.to_owned(),
                    span,
                })
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let mut chars = self.rest.chars();
        let char = chars.next()?;
        let lookahead = chars.next();

        let token = match char {
            _ if char.is_ascii_digit() => self.consume_number(),
            '-' if lookahead.is_some_and(|c| c.is_ascii_digit()) => self.consume_number(),
            '\'' | '"' => self.consume_string(char),
            _ if char.is_alphabetic() => Ok(self.consume_word()),

            '=' => self.emit(1, Token::Operator(Operator::Equal)),
            '!' if lookahead == Some('=') => self.emit(2, Token::Operator(Operator::NotEqual)),
            '<' if lookahead == Some('=') => {
                self.emit(2, Token::Operator(Operator::LessThanEqual))
            }
            '<' => self.emit(1, Token::Operator(Operator::LessThan)),
            '>' if lookahead == Some('=') => {
                self.emit(2, Token::Operator(Operator::GreaterThanEqual))
            }
            '>' => self.emit(1, Token::Operator(Operator::GreaterThan)),
            '+' => self.emit(1, Token::Operator(Operator::Add)),
            '-' => self.emit(1, Token::Operator(Operator::Subtract)),
            '*' => self.emit(1, Token::Operator(Operator::Multiply)),
            '/' => self.emit(1, Token::Operator(Operator::Divide)),

            '(' => self.emit(1, Token::Symbol(Symbol::LeftParen)),
            ')' => self.emit(1, Token::Symbol(Symbol::RightParen)),
            ',' => self.emit(1, Token::Symbol(Symbol::Comma)),
            '.' => self.emit(1, Token::Symbol(Symbol::Dot)),

            _ => {
                let span = (self.position, char.len_utf8()).into();
                self.fuse();
                Err(LexError::UnexpectedCharacter {
                    character: char,
                    span,
                })
            }
        };

        Some(token)
    }
}
