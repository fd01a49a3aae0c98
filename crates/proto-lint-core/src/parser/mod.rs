//! Recursive-descent parser producing the [`crate::schema`] model.
//!
//! Covers proto2, proto3 and editions syntax well enough for linting:
//! declarations, fields, options, services and comments. Option values are
//! kept as raw source text rather than interpreted.
//!
//! A comment block becomes a declaration's leading comment when its last
//! line sits directly above the declaration's first token.

mod lexer;

use crate::schema::{
    Comment, Element, Enum, EnumValue, Extensions, Field, FieldLabel, Group, Import, MapField,
    Message, OptionDecl, Oneof, Package, Position, ProtoFile, Reserved, Rpc, Service, Syntax,
};
use lexer::{Token, TokenKind};

/// Error produced when source text cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// Line of the offending token (1-indexed).
    pub line: usize,
    /// Column of the offending token (1-indexed).
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }
}

/// Parses `.proto` source text into a [`ProtoFile`].
///
/// # Errors
///
/// Returns a [`ParseError`] pointing at the first token that does not fit
/// the grammar.
pub fn parse(source: &str) -> Result<ProtoFile> {
    let tokens = lexer::tokenize(source)?;
    let mut parser = Parser::new(source, tokens);
    parser.file()
}

/// A non-comment token with the comment block directly above it.
struct Lexeme {
    token: Token,
    leading: Option<Comment>,
}

type Result<T> = std::result::Result<T, ParseError>;

struct Parser<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
    pos: usize,
    eof: Position,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        let eof = tokens
            .last()
            .map_or_else(Position::default, |t| Position::new(t.end_line, 1, t.end));
        Self {
            source,
            lexemes: attach_comments(tokens),
            pos: 0,
            eof,
        }
    }

    // ── token access ──

    fn peek(&self) -> Option<&Token> {
        self.lexemes.get(self.pos).map(|l| &l.token)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.lexemes.get(self.pos + n).map(|l| &l.token)
    }

    fn advance(&mut self) -> Result<Token> {
        let lexeme = self
            .lexemes
            .get(self.pos)
            .ok_or_else(|| ParseError::new(self.eof, "unexpected end of input"))?;
        self.pos += 1;
        Ok(lexeme.token.clone())
    }

    /// Position and leading comment of the next token.
    fn start(&self) -> (Position, Option<Comment>) {
        self.lexemes
            .get(self.pos)
            .map_or((self.eof, None), |l| (l.token.position, l.leading.clone()))
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let position = self.peek().map_or(self.eof, |t| t.position);
        ParseError::new(position, message)
    }

    fn is_symbol(&self, c: char) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Symbol(s), .. }) if *s == c)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Ident(s), .. }) if s == keyword)
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.is_symbol(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, c: char) -> Result<()> {
        if self.eat_symbol(c) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{c}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.is_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{keyword}'")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(s),
                ..
            }) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn expect_str(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Str(s),
                ..
            }) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    /// `ident { "." ident }`
    fn full_ident(&mut self, what: &str) -> Result<String> {
        let mut name = self.expect_ident(what)?;
        while self.is_symbol('.') {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_ident(what)?);
        }
        Ok(name)
    }

    /// `[ "." ] full_ident`, kept verbatim.
    fn type_name(&mut self) -> Result<String> {
        if self.eat_symbol('.') {
            Ok(format!(".{}", self.full_ident("type name")?))
        } else {
            self.full_ident("type name")
        }
    }

    fn int_value(&mut self) -> Result<i64> {
        let negative = self.eat_symbol('-');
        let position = self.start().0;
        let text = match self.advance()?.kind {
            TokenKind::Int(text) => text,
            _ => return Err(ParseError::new(position, "expected integer")),
        };
        let parsed = if let Some(hex) = text.strip_prefix("0x").or(text.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
        } else if text.len() > 1 && text.starts_with('0') {
            i64::from_str_radix(&text[1..], 8)
        } else {
            text.parse()
        };
        let value =
            parsed.map_err(|_| ParseError::new(position, format!("invalid integer '{text}'")))?;
        Ok(if negative { -value } else { value })
    }

    /// Parses a constant and returns its source text.
    fn constant(&mut self) -> Result<String> {
        let start = self.start().0.offset;
        if self.is_symbol('{') {
            self.skip_balanced('{', '}')?;
        } else {
            if self.is_symbol('-') || self.is_symbol('+') {
                self.pos += 1;
            }
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Int(_) | TokenKind::Float(_)) => {
                    self.pos += 1;
                }
                Some(TokenKind::Str(_)) => {
                    while matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Str(_))) {
                        self.pos += 1;
                    }
                }
                Some(TokenKind::Ident(_)) => {
                    self.type_name()?;
                }
                _ => return Err(self.error_here("expected constant")),
            }
        }
        Ok(self.source[start..self.previous_end()].to_string())
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.lexemes.get(i))
            .map_or(0, |l| l.token.end)
    }

    fn skip_balanced(&mut self, open: char, close: char) -> Result<()> {
        self.expect_symbol(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance()?.kind {
                TokenKind::Symbol(c) if c == open => depth += 1,
                TokenKind::Symbol(c) if c == close => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    // ── options ──

    /// `( ident | "(" type_name ")" ) { "." ( ident | "(" type_name ")" ) }`
    fn option_name(&mut self) -> Result<String> {
        let mut name = String::new();
        loop {
            if self.eat_symbol('(') {
                name.push('(');
                name.push_str(&self.type_name()?);
                self.expect_symbol(')')?;
                name.push(')');
            } else {
                name.push_str(&self.expect_ident("option name")?);
            }
            if !self.eat_symbol('.') {
                break;
            }
            name.push('.');
        }
        Ok(name)
    }

    /// `option name = constant ;`
    fn option_statement(&mut self) -> Result<OptionDecl> {
        let (_, comment) = self.start();
        self.expect_keyword("option")?;
        let position = self.start().0;
        let name = self.option_name()?;
        self.expect_symbol('=')?;
        let value = self.constant()?;
        self.expect_symbol(';')?;
        Ok(OptionDecl {
            name,
            value,
            comment,
            position,
        })
    }

    /// `[ name = constant { , name = constant } ]`, empty when absent.
    fn compact_options(&mut self) -> Result<Vec<OptionDecl>> {
        let mut options = Vec::new();
        if !self.eat_symbol('[') {
            return Ok(options);
        }
        loop {
            let position = self.start().0;
            let name = self.option_name()?;
            self.expect_symbol('=')?;
            let value = self.constant()?;
            options.push(OptionDecl {
                name,
                value,
                comment: None,
                position,
            });
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(']')?;
        Ok(options)
    }

    // ── file level ──

    fn file(&mut self) -> Result<ProtoFile> {
        let mut elements = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Symbol(';') {
                self.pos += 1;
                continue;
            }
            elements.push(self.top_level()?);
        }
        Ok(ProtoFile { elements })
    }

    fn top_level(&mut self) -> Result<Element> {
        let keyword = match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(s)) => s,
            _ => return Err(self.error_here("expected declaration")),
        };
        match keyword.as_str() {
            "syntax" | "edition" => self.syntax().map(Element::Syntax),
            "package" => self.package().map(Element::Package),
            "import" => self.import().map(Element::Import),
            "option" => self.option_statement().map(Element::Option),
            "message" => self.message().map(Element::Message),
            "enum" => self.enumeration().map(Element::Enum),
            "service" => self.service().map(Element::Service),
            "extend" => self.extend().map(Element::Message),
            other => Err(self.error_here(format!("unexpected '{other}'"))),
        }
    }

    fn syntax(&mut self) -> Result<Syntax> {
        let (position, comment) = self.start();
        let keyword = self.expect_ident("'syntax' or 'edition'")?;
        self.expect_symbol('=')?;
        let value = self.expect_str("quoted syntax value")?;
        self.expect_symbol(';')?;
        Ok(Syntax {
            keyword,
            value,
            comment,
            position,
        })
    }

    fn package(&mut self) -> Result<Package> {
        let (position, comment) = self.start();
        self.expect_keyword("package")?;
        let name = self.full_ident("package name")?;
        self.expect_symbol(';')?;
        Ok(Package {
            name,
            comment,
            position,
        })
    }

    fn import(&mut self) -> Result<Import> {
        let (position, comment) = self.start();
        self.expect_keyword("import")?;
        let kind = if self.is_keyword("public") || self.is_keyword("weak") {
            Some(self.expect_ident("import kind")?)
        } else {
            None
        };
        let path = self.expect_str("import path")?;
        self.expect_symbol(';')?;
        Ok(Import {
            path,
            kind,
            comment,
            position,
        })
    }

    // ── messages ──

    fn message(&mut self) -> Result<Message> {
        let (position, comment) = self.start();
        self.expect_keyword("message")?;
        let name = self.expect_ident("message name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        while !self.eat_symbol('}') {
            if self.eat_symbol(';') {
                continue;
            }
            elements.push(self.message_element()?);
        }
        Ok(Message {
            name,
            elements,
            comment,
            position,
            is_extend: false,
        })
    }

    fn message_element(&mut self) -> Result<Element> {
        let keyword = match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(s)) => s,
            Some(TokenKind::Symbol('.')) => return self.field_element(),
            Some(_) => return Err(self.error_here("expected message element")),
            None => return Err(self.error_here("unexpected end of input")),
        };
        match keyword.as_str() {
            "message" => self.message().map(Element::Message),
            "enum" => self.enumeration().map(Element::Enum),
            "extend" => self.extend().map(Element::Message),
            "option" => self.option_statement().map(Element::Option),
            "oneof" => self.oneof().map(Element::Oneof),
            "reserved" => self.reserved().map(Element::Reserved),
            "extensions" => self.extensions().map(Element::Extensions),
            "map" if self.peek_nth(1).is_some_and(|t| t.kind == TokenKind::Symbol('<')) => {
                self.map_field().map(Element::MapField)
            }
            _ => self.field_element(),
        }
    }

    /// `extend Type { fields }`, modelled as a message with `is_extend`.
    fn extend(&mut self) -> Result<Message> {
        let (position, comment) = self.start();
        self.expect_keyword("extend")?;
        let name = self.type_name()?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        while !self.eat_symbol('}') {
            if self.eat_symbol(';') {
                continue;
            }
            elements.push(self.field_element()?);
        }
        Ok(Message {
            name,
            elements,
            comment,
            position,
            is_extend: true,
        })
    }

    /// A field, or a proto2 group when the type is `group` and a body follows.
    fn field_element(&mut self) -> Result<Element> {
        let (position, comment) = self.start();
        let label = if self.is_keyword("repeated") {
            Some(FieldLabel::Repeated)
        } else if self.is_keyword("optional") {
            Some(FieldLabel::Optional)
        } else if self.is_keyword("required") {
            Some(FieldLabel::Required)
        } else {
            None
        };
        if label.is_some() {
            self.pos += 1;
        }
        let type_name = self.type_name()?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.int_value()?;
        let options = self.compact_options()?;
        if type_name == "group" && self.eat_symbol('{') {
            let mut elements = Vec::new();
            while !self.eat_symbol('}') {
                if self.eat_symbol(';') {
                    continue;
                }
                elements.push(self.message_element()?);
            }
            return Ok(Element::Group(Group {
                name,
                label,
                number,
                options,
                elements,
                comment,
                position,
            }));
        }
        self.expect_symbol(';')?;
        Ok(Element::Field(Field {
            name,
            type_name,
            number,
            label,
            options,
            comment,
            position,
        }))
    }

    fn map_field(&mut self) -> Result<MapField> {
        let (position, comment) = self.start();
        self.expect_keyword("map")?;
        self.expect_symbol('<')?;
        let key_type = self.type_name()?;
        self.expect_symbol(',')?;
        let value_type = self.type_name()?;
        self.expect_symbol('>')?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.int_value()?;
        let options = self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(MapField {
            name,
            key_type,
            value_type,
            number,
            options,
            comment,
            position,
        })
    }

    fn oneof(&mut self) -> Result<Oneof> {
        let (position, comment) = self.start();
        self.expect_keyword("oneof")?;
        let name = self.expect_ident("oneof name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        while !self.eat_symbol('}') {
            if self.eat_symbol(';') {
                continue;
            }
            if self.is_keyword("option") {
                elements.push(Element::Option(self.option_statement()?));
            } else {
                elements.push(self.field_element()?);
            }
        }
        Ok(Oneof {
            name,
            elements,
            comment,
            position,
        })
    }

    /// `from [ to ( to_value | max ) ]`
    fn range(&mut self) -> Result<String> {
        let from = self.int_value()?;
        if !self.is_keyword("to") {
            return Ok(from.to_string());
        }
        self.pos += 1;
        if self.is_keyword("max") {
            self.pos += 1;
            Ok(format!("{from} to max"))
        } else {
            Ok(format!("{from} to {}", self.int_value()?))
        }
    }

    fn reserved(&mut self) -> Result<Reserved> {
        let (position, comment) = self.start();
        self.expect_keyword("reserved")?;
        let mut ranges = Vec::new();
        let mut names = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Str(s)) => {
                    names.push(s.clone());
                    self.pos += 1;
                }
                Some(TokenKind::Ident(s)) => {
                    names.push(s.clone());
                    self.pos += 1;
                }
                _ => ranges.push(self.range()?),
            }
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(';')?;
        Ok(Reserved {
            ranges,
            names,
            comment,
            position,
        })
    }

    fn extensions(&mut self) -> Result<Extensions> {
        let (position, comment) = self.start();
        self.expect_keyword("extensions")?;
        let mut ranges = vec![self.range()?];
        while self.eat_symbol(',') {
            ranges.push(self.range()?);
        }
        self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(Extensions {
            ranges,
            comment,
            position,
        })
    }

    // ── enums ──

    fn enumeration(&mut self) -> Result<Enum> {
        let (position, comment) = self.start();
        self.expect_keyword("enum")?;
        let name = self.expect_ident("enum name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        while !self.eat_symbol('}') {
            if self.eat_symbol(';') {
                continue;
            }
            let element = if self.is_keyword("option") {
                Element::Option(self.option_statement()?)
            } else if self.is_keyword("reserved") {
                Element::Reserved(self.reserved()?)
            } else {
                Element::EnumValue(self.enum_value()?)
            };
            elements.push(element);
        }
        Ok(Enum {
            name,
            elements,
            comment,
            position,
        })
    }

    fn enum_value(&mut self) -> Result<EnumValue> {
        let (position, comment) = self.start();
        let name = self.expect_ident("enum value name")?;
        self.expect_symbol('=')?;
        let number = self.int_value()?;
        let options = self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(EnumValue {
            name,
            number,
            options,
            comment,
            position,
        })
    }

    // ── services ──

    fn service(&mut self) -> Result<Service> {
        let (position, comment) = self.start();
        self.expect_keyword("service")?;
        let name = self.expect_ident("service name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        while !self.eat_symbol('}') {
            if self.eat_symbol(';') {
                continue;
            }
            let element = if self.is_keyword("option") {
                Element::Option(self.option_statement()?)
            } else {
                Element::Rpc(self.rpc()?)
            };
            elements.push(element);
        }
        Ok(Service {
            name,
            elements,
            comment,
            position,
        })
    }

    /// `"(" [ "stream" ] type_name ")"`
    fn rpc_type(&mut self) -> Result<(bool, String)> {
        self.expect_symbol('(')?;
        let streams = self.is_keyword("stream")
            && !self
                .peek_nth(1)
                .is_some_and(|t| t.kind == TokenKind::Symbol(')'));
        if streams {
            self.pos += 1;
        }
        let type_name = self.type_name()?;
        self.expect_symbol(')')?;
        Ok((streams, type_name))
    }

    fn rpc(&mut self) -> Result<Rpc> {
        let (position, comment) = self.start();
        self.expect_keyword("rpc")?;
        let name = self.expect_ident("rpc name")?;
        let (streams_request, request_type) = self.rpc_type()?;
        self.expect_keyword("returns")?;
        let (streams_returns, returns_type) = self.rpc_type()?;

        let mut options = Vec::new();
        if self.eat_symbol('{') {
            while !self.eat_symbol('}') {
                if self.eat_symbol(';') {
                    continue;
                }
                options.push(self.option_statement()?);
            }
        } else {
            self.expect_symbol(';')?;
        }

        Ok(Rpc {
            name,
            request_type,
            returns_type,
            streams_request,
            streams_returns,
            options,
            comment,
            position,
        })
    }
}

/// Strips comment tokens, attaching each comment block to the token that
/// starts on the line right after it.
fn attach_comments(tokens: Vec<Token>) -> Vec<Lexeme> {
    let mut lexemes = Vec::new();
    let mut block: Option<(Comment, usize)> = None;
    let mut last_code_line = 0;

    for token in tokens {
        if let TokenKind::Comment(text) = &token.kind {
            // Trailing comment on a line that already holds code.
            if token.position.line == last_code_line {
                continue;
            }
            let lines = text.lines().map(|l| l.trim_end().to_string());
            let adjacent = block
                .as_ref()
                .is_some_and(|(_, end_line)| end_line + 1 == token.position.line);
            match &mut block {
                Some((comment, end_line)) if adjacent => {
                    comment.lines.extend(lines);
                    *end_line = token.end_line;
                }
                _ => {
                    block = Some((
                        Comment {
                            lines: lines.collect(),
                            position: token.position,
                        },
                        token.end_line,
                    ));
                }
            }
            continue;
        }

        let leading = block
            .take()
            .filter(|(_, end_line)| end_line + 1 == token.position.line)
            .map(|(comment, _)| comment);
        last_code_line = token.end_line;
        lexemes.push(Lexeme { token, leading });
    }

    lexemes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(file: &ProtoFile) -> Vec<&Message> {
        file.elements
            .iter()
            .filter_map(|e| match e {
                Element::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_header() {
        let file = parse(
            r#"syntax = "proto3";
package acme.billing.v1;
import public "google/protobuf/timestamp.proto";
option go_package = "acme/billing";
"#,
        )
        .unwrap();
        assert_eq!(file.elements.len(), 4);
        assert_eq!(file.package(), Some("acme.billing.v1"));
        match &file.elements[2] {
            Element::Import(import) => {
                assert_eq!(import.path, "google/protobuf/timestamp.proto");
                assert_eq!(import.kind.as_deref(), Some("public"));
            }
            other => panic!("expected import, got {other:?}"),
        }
        match &file.elements[3] {
            Element::Option(option) => {
                assert_eq!(option.name, "go_package");
                assert_eq!(option.value, "\"acme/billing\"");
            }
            other => panic!("expected option, got {other:?}"),
        }
    }

    #[test]
    fn attaches_leading_comment() {
        let file = parse(
            "// Foo does X.\n// Second line.\nmessage Foo {}\n\n// Detached.\n\nmessage Bar {}\n",
        )
        .unwrap();
        let msgs = messages(&file);
        let foo = msgs[0].comment.as_ref().unwrap();
        assert_eq!(foo.lines, vec!["// Foo does X.", "// Second line."]);
        assert_eq!(foo.position.line, 1);
        assert!(msgs[1].comment.is_none());
    }

    #[test]
    fn trailing_comment_is_not_leading() {
        let file = parse("message Foo {} // trailing\nmessage Bar {}\n").unwrap();
        let msgs = messages(&file);
        assert!(msgs[1].comment.is_none());
    }

    #[test]
    fn block_comment_attaches() {
        let file = parse("/* Foo\n * spans lines */\nmessage Foo {}\n").unwrap();
        let comment = messages(&file)[0].comment.clone().unwrap();
        assert_eq!(comment.lines, vec!["/* Foo", " * spans lines */"]);
    }

    #[test]
    fn parses_nested_messages_and_fields() {
        let file = parse(
            r#"
message Outer {
  // Inner is nested.
  message Inner {
    repeated string tags = 1 [deprecated = true, (acme.rules).max = 3];
  }
  map<string, Inner> items = 2;
  oneof choice {
    int64 id = 3;
    string name = 4;
  }
  reserved 5, 9 to 11, 100 to max;
  reserved "old";
  enum Kind { KIND_UNSPECIFIED = 0; KIND_A = 1 [(x) = { a: 1 }]; }
  .acme.Other other = 6;
}
"#,
        )
        .unwrap();
        let outer = messages(&file)[0];
        assert_eq!(outer.elements.len(), 7);
        match &outer.elements[0] {
            Element::Message(inner) => {
                assert_eq!(inner.name, "Inner");
                assert_eq!(inner.comment.as_ref().unwrap().lines, vec!["// Inner is nested."]);
                match &inner.elements[0] {
                    Element::Field(f) => {
                        assert_eq!(f.label, Some(FieldLabel::Repeated));
                        assert_eq!(f.options.len(), 2);
                        assert_eq!(f.options[1].name, "(acme.rules).max");
                    }
                    other => panic!("expected field, got {other:?}"),
                }
            }
            other => panic!("expected message, got {other:?}"),
        }
        match &outer.elements[3] {
            Element::Reserved(r) => assert_eq!(r.ranges, vec!["5", "9 to 11", "100 to max"]),
            other => panic!("expected reserved, got {other:?}"),
        }
        match &outer.elements[6] {
            Element::Field(f) => assert_eq!(f.type_name, ".acme.Other"),
            other => panic!("expected field, got {other:?}"),
        }
    }

    #[test]
    fn parses_proto2_groups() {
        let file = parse(
            r#"
syntax = "proto2";
message SearchResponse {
  // Result holds one hit.
  repeated group Result = 1 [deprecated = true] {
    required string url = 2;
    optional .acme.Snippet snippet = 3;
  }
  oneof hit {
    group Best = 4 { optional int32 rank = 5; }
  }
  optional group group_id = 6;
}
"#,
        )
        .unwrap();
        let message = messages(&file)[0];
        assert_eq!(message.elements.len(), 3);
        match &message.elements[0] {
            Element::Group(group) => {
                assert_eq!(group.name, "Result");
                assert_eq!(group.label, Some(FieldLabel::Repeated));
                assert_eq!(group.number, 1);
                assert_eq!(group.options.len(), 1);
                assert_eq!(group.elements.len(), 2);
                assert_eq!(
                    group.comment.as_ref().unwrap().lines,
                    vec!["// Result holds one hit."]
                );
            }
            other => panic!("expected group, got {other:?}"),
        }
        match &message.elements[1] {
            Element::Oneof(oneof) => {
                assert!(matches!(&oneof.elements[0], Element::Group(g) if g.name == "Best"));
            }
            other => panic!("expected oneof, got {other:?}"),
        }
        match &message.elements[2] {
            Element::Field(f) => assert_eq!(f.type_name, "group"),
            other => panic!("expected field, got {other:?}"),
        }
    }

    #[test]
    fn parses_service_and_rpcs() {
        let file = parse(
            r#"
service Billing {
  option (acme.visibility) = "internal";
  rpc Charge(ChargeRequest) returns (ChargeResponse);
  rpc Watch(stream .acme.WatchRequest) returns (stream WatchEvent) {
    option idempotency_level = NO_SIDE_EFFECTS;
  }
}
"#,
        )
        .unwrap();
        let Element::Service(service) = &file.elements[0] else {
            panic!("expected service");
        };
        let rpcs: Vec<&Rpc> = service
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Rpc(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(rpcs.len(), 2);
        assert_eq!(rpcs[0].request_type, "ChargeRequest");
        assert_eq!(rpcs[0].returns_type, "ChargeResponse");
        assert!(rpcs[1].streams_request && rpcs[1].streams_returns);
        assert_eq!(rpcs[1].request_type, ".acme.WatchRequest");
        assert_eq!(rpcs[1].options[0].value, "NO_SIDE_EFFECTS");
    }

    #[test]
    fn extend_is_message_with_flag() {
        let file = parse("extend google.protobuf.MessageOptions {\n  string tag = 50000;\n}\n")
            .unwrap();
        let ext = messages(&file)[0];
        assert!(ext.is_extend);
        assert_eq!(ext.name, "google.protobuf.MessageOptions");
        assert_eq!(ext.keyword(), "extend");
    }

    #[test]
    fn positions_point_at_keyword() {
        let file = parse("syntax = \"proto3\";\n\n  message Foo {}\n").unwrap();
        assert_eq!(messages(&file)[0].position, Position::new(3, 3, 22));
    }

    #[test]
    fn reports_unexpected_token() {
        let err = parse("message Foo {\n  string = 1;\n}\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("field name"));
    }

    #[test]
    fn reports_unexpected_end() {
        let err = parse("message Foo {").unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
    }
}
