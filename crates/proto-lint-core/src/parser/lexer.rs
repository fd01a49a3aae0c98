//! Tokenizer for `.proto` source text.

use super::ParseError;
use crate::schema::Position;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    /// String literal contents without the surrounding quotes.
    Str(String),
    Symbol(char),
    /// Line or block comment, markers included.
    Comment(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: Position,
    /// Byte offset one past the last character.
    pub end: usize,
    pub end_line: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl Lexer<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn position(&mut self) -> Position {
        let offset = self.offset();
        Position::new(self.line, self.column, offset)
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }

        let start = self.position();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let kind = match c {
            '/' if self.peek_second() == Some('/') => self.line_comment(start),
            '/' if self.peek_second() == Some('*') => self.block_comment(start)?,
            '"' | '\'' => self.string(start)?,
            '.' if self.peek_second().is_some_and(|n| n.is_ascii_digit()) => self.number(start),
            c if c.is_ascii_digit() => self.number(start),
            c if c.is_alphabetic() || c == '_' => self.ident(start),
            c => {
                self.bump();
                TokenKind::Symbol(c)
            }
        };

        let end = self.offset();
        Ok(Some(Token {
            kind,
            position: start,
            end,
            end_line: self.line,
        }))
    }

    fn line_comment(&mut self, start: Position) -> TokenKind {
        while self.peek().is_some_and(|c| c != '\n') {
            self.bump();
        }
        let end = self.offset();
        TokenKind::Comment(self.source[start.offset..end].trim_end().to_string())
    }

    fn block_comment(&mut self, start: Position) -> Result<TokenKind, ParseError> {
        self.bump();
        self.bump();
        loop {
            match self.bump() {
                None => return Err(ParseError::new(start, "unterminated block comment")),
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    break;
                }
                Some(_) => {}
            }
        }
        let end = self.offset();
        Ok(TokenKind::Comment(self.source[start.offset..end].to_string()))
    }

    fn string(&mut self, start: Position) -> Result<TokenKind, ParseError> {
        let quote = self.bump();
        let content_start = self.offset();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(ParseError::new(start, "unterminated string literal"))
                }
                Some('\\') => {
                    self.bump();
                }
                c if c == quote => break,
                Some(_) => {}
            }
        }
        // The closing quote is a single byte.
        let content_end = self.offset() - 1;
        Ok(TokenKind::Str(
            self.source[content_start..content_end].to_string(),
        ))
    }

    fn number(&mut self, start: Position) -> TokenKind {
        let is_hex = self.peek() == Some('0') && matches!(self.peek_second(), Some('x' | 'X'));
        let mut previous = '\0';
        while let Some(c) = self.peek() {
            let exponent_sign =
                !is_hex && matches!(c, '+' | '-') && matches!(previous, 'e' | 'E');
            if c.is_ascii_alphanumeric() || c == '.' || exponent_sign {
                previous = c;
                self.bump();
            } else {
                break;
            }
        }
        let end = self.offset();
        let text = self.source[start.offset..end].to_string();
        let is_float = !is_hex && text.contains(['.', 'e', 'E']);
        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn ident(&mut self, start: Position) -> TokenKind {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let end = self.offset();
        TokenKind::Ident(self.source[start.offset..end].to_string())
    }
}
