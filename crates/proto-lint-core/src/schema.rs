//! Schema model for parsed `.proto` files.
//!
//! The tree is produced once per file by [`crate::parse`] and is never
//! mutated afterwards. Every declaration kind is a variant of the closed
//! [`Element`] sum type, so traversal code can `match` exhaustively.

/// Source position of a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in characters).
    pub column: usize,
    /// Byte offset from the start of the file.
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

/// A comment attached to a declaration.
///
/// Lines are stored exactly as written, markers included, so a line comment
/// reads `// Foo does X` and a block comment keeps its `/*` and `*/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw comment lines.
    pub lines: Vec<String>,
    /// Position of the first comment line.
    pub position: Position,
}

impl Comment {
    /// Returns the comment lines joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Returns the line number of the last comment line.
    #[must_use]
    pub fn end_line(&self) -> usize {
        self.position.line + self.lines.len().saturating_sub(1)
    }
}

/// A parsed schema file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtoFile {
    /// Top-level declarations in document order.
    pub elements: Vec<Element>,
}

impl ProtoFile {
    /// Returns the declared package, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            Element::Package(p) => Some(p.name.as_str()),
            _ => None,
        })
    }
}

/// Any declaration that can appear in a schema file.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `syntax = "proto3";` or `edition = "2023";`
    Syntax(Syntax),
    /// `package foo.bar;`
    Package(Package),
    /// `import "foo.proto";`
    Import(Import),
    /// `option java_package = "...";`
    Option(OptionDecl),
    /// `message Foo { ... }` or `extend Foo { ... }`
    Message(Message),
    /// `enum Foo { ... }`
    Enum(Enum),
    /// `FOO_BAR = 1;` inside an enum.
    EnumValue(EnumValue),
    /// `service Foo { ... }`
    Service(Service),
    /// `rpc Do(Req) returns (Resp);`
    Rpc(Rpc),
    /// `repeated string name = 1;`
    Field(Field),
    /// `map<string, Foo> items = 2;`
    MapField(MapField),
    /// `oneof choice { ... }`
    Oneof(Oneof),
    /// proto2 `optional group Result = 1 { ... }`
    Group(Group),
    /// `reserved 2, 15, 9 to 11;` or `reserved "foo";`
    Reserved(Reserved),
    /// `extensions 100 to max;`
    Extensions(Extensions),
}

/// Syntax or edition declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    /// `syntax` or `edition`.
    pub keyword: String,
    /// Declared value without quotes.
    pub value: String,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// Package declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Dotted package name.
    pub name: String,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// Import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported path without quotes.
    pub path: String,
    /// `public`, `weak`, or `None`.
    pub kind: Option<String>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// Option declaration, either standalone or inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Option name as written, e.g. `(my.ext).field`.
    pub name: String,
    /// Raw option value text.
    pub value: String,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the option name.
    pub position: Position,
}

/// A message declaration, or an `extend` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Unqualified name. For `extend` blocks, the extended type as written.
    pub name: String,
    /// Child declarations in document order.
    pub elements: Vec<Element>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the `message` or `extend` keyword.
    pub position: Position,
    /// True for `extend` blocks.
    pub is_extend: bool,
}

impl Message {
    /// Returns the declaring keyword.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        if self.is_extend {
            "extend"
        } else {
            "message"
        }
    }
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    /// Unqualified name.
    pub name: String,
    /// Values, options, and reserved ranges.
    pub elements: Vec<Element>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// A single enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Value name.
    pub name: String,
    /// Integer value.
    pub number: i64,
    /// Value options in `[...]`.
    pub options: Vec<OptionDecl>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the name.
    pub position: Position,
}

/// A service declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    /// Unqualified name.
    pub name: String,
    /// RPCs and options.
    pub elements: Vec<Element>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// An RPC declaration inside a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpc {
    /// Method name.
    pub name: String,
    /// Request type exactly as written in the signature.
    pub request_type: String,
    /// Response type exactly as written in the signature.
    pub returns_type: String,
    /// `stream` on the request side.
    pub streams_request: bool,
    /// `stream` on the response side.
    pub streams_returns: bool,
    /// Options declared in the RPC body.
    pub options: Vec<OptionDecl>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// Field cardinality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    /// `repeated`
    Repeated,
    /// `optional`
    Optional,
    /// `required`
    Required,
}

/// A normal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type as written.
    pub type_name: String,
    /// Field number.
    pub number: i64,
    /// Cardinality label, if written.
    pub label: Option<FieldLabel>,
    /// Field options in `[...]`.
    pub options: Vec<OptionDecl>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the first token.
    pub position: Position,
}

/// A `map<K, V>` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapField {
    /// Field name.
    pub name: String,
    /// Key type.
    pub key_type: String,
    /// Value type as written.
    pub value_type: String,
    /// Field number.
    pub number: i64,
    /// Field options in `[...]`.
    pub options: Vec<OptionDecl>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the `map` keyword.
    pub position: Position,
}

/// A `oneof` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    /// Oneof name.
    pub name: String,
    /// Fields and options.
    pub elements: Vec<Element>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// A proto2 group: a field whose type is declared inline.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group name, which is also the name of its inline type.
    pub name: String,
    /// Cardinality label, if written.
    pub label: Option<FieldLabel>,
    /// Field number.
    pub number: i64,
    /// Field options in `[...]`.
    pub options: Vec<OptionDecl>,
    /// Body declarations, parsed like a message body.
    pub elements: Vec<Element>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the first token.
    pub position: Position,
}

/// A `reserved` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reserved {
    /// Reserved numeric ranges as written (`2`, `9 to 11`, `100 to max`).
    pub ranges: Vec<String>,
    /// Reserved field names.
    pub names: Vec<String>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}

/// An `extensions` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions {
    /// Extension ranges as written.
    pub ranges: Vec<String>,
    /// Leading comment.
    pub comment: Option<Comment>,
    /// Position of the keyword.
    pub position: Position,
}
