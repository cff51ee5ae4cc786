//! Go syntax trees as the loader delivers them.
//!
//! A deliberately plain, owned representation: every node kind is a
//! variant of one of four tagged enums ([`Expr`], [`Stmt`], [`Decl`],
//! [`Spec`]), and consumers dispatch by matching on the tag. The trees are
//! position-faithful (every identifier and literal records its byte
//! [`Pos`]) but not lossless: tokens that can never carry a symbol
//! occurrence (operators, keywords, punctuation) are not represented.

use serde::{Deserialize, Serialize};

use crate::fileset::{FileId, Pos};

// ============================================================================
// Atoms
// ============================================================================

/// An identifier token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub pos: Pos,
    pub name: String,
}

impl Ident {
    pub fn new(pos: Pos, name: impl Into<String>) -> Self {
        Ident {
            pos,
            name: name.into(),
        }
    }

    /// Position one past the identifier's last byte.
    pub fn end(&self) -> Pos {
        self.pos.add(self.name.len() as u32)
    }

    /// The blank identifier binds nothing and is never indexed.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// Literal kind tags for [`BasicLit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// A literal token. String literal values retain their quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicLit {
    pub pos: Pos,
    pub kind: LitKind,
    pub value: String,
}

impl BasicLit {
    pub fn string(pos: Pos, quoted: impl Into<String>) -> Self {
        BasicLit {
            pos,
            kind: LitKind::String,
            value: quoted.into(),
        }
    }

    /// The literal's text without surrounding quotes, for string literals.
    pub fn unquoted(&self) -> &str {
        self.value.trim_matches(|c| c == '"' || c == '`')
    }
}

/// A contiguous comment block (`//` run or `/* */`).
///
/// Comments carry no identifiers; the visitor traverses them only so file
/// walks mirror the source structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub pos: Pos,
    pub text: String,
}

// ============================================================================
// Fields
// ============================================================================

/// A field declaration: struct fields, interface methods, parameters,
/// results, receivers, and type parameters all use this shape.
///
/// An empty `names` list marks an embedded field (the type stands alone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
}

impl Field {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A parenthesized, braced, or bracketed list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

impl FieldList {
    pub fn new(fields: Vec<Field>) -> Self {
        FieldList { fields }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression and type nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    /// `T{...}`; the type is absent inside nested literals.
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    Paren {
        x: Box<Expr>,
    },
    /// `x.sel`
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    /// `x[index]`
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    /// `x[a, b]`, a generic instantiation with several arguments.
    IndexList {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; the type is absent for the `x.(type)` switch header form.
    TypeAssert {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `*x` as both dereference and pointer type.
    Star {
        x: Box<Expr>,
    },
    Unary {
        x: Box<Expr>,
    },
    Binary {
        x: Box<Expr>,
        y: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    StructType {
        fields: FieldList,
    },
    FuncTypeExpr {
        ty: FuncType,
    },
    InterfaceType {
        methods: FieldList,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        value: Box<Expr>,
    },
    Ellipsis {
        elt: Option<Box<Expr>>,
    },
}

impl Expr {
    pub fn ident(pos: Pos, name: impl Into<String>) -> Expr {
        Expr::Ident(Ident::new(pos, name))
    }

    /// The base identifier of a receiver or embedded-field type
    /// expression, looking through pointers, parens, and generic
    /// instantiations: `*pkg.List[T]` yields `List`.
    pub fn base_type_name(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            Expr::Paren { x } | Expr::Star { x } => x.base_type_name(),
            Expr::Selector { sel, .. } => Some(sel),
            Expr::Index { x, .. } | Expr::IndexList { x, .. } => x.base_type_name(),
            _ => None,
        }
    }
}

/// A function signature. Shared between declarations, literals, and the
/// `func(...)` type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncType {
    pub type_params: Option<FieldList>,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

impl FuncType {
    pub fn new(params: FieldList) -> Self {
        FuncType {
            type_params: None,
            params,
            results: None,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

/// One arm of a switch or type switch.
///
/// An empty `values` list is the `default` arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseClause {
    pub pos: Pos,
    pub values: Vec<Expr>,
    pub body: Vec<Stmt>,
}

/// One arm of a select statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommClause {
    pub pos: Pos,
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

/// Statement nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    Decl(Decl),
    Empty,
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
    },
    /// Assignment or short variable declaration; `define` is true for `:=`.
    Assign {
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
        define: bool,
    },
    Go {
        call: Expr,
    },
    Defer {
        call: Expr,
    },
    Return {
        results: Vec<Expr>,
    },
    /// `break`/`continue`/`goto`, possibly labeled.
    Branch {
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        body: Vec<CaseClause>,
    },
    /// `switch v := x.(type) { ... }`; `assign` is the header statement,
    /// either an `Assign` with a single `TypeAssert` RHS or a bare `Expr`.
    TypeSwitch {
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        body: Vec<CaseClause>,
    },
    Select {
        body: Vec<CommClause>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: Block,
    },
}

// ============================================================================
// Declarations
// ============================================================================

/// Grouped declaration keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

/// Top-level and statement-level declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    /// `import (...)`, `const (...)`, `var (...)`, `type (...)`.
    Gen {
        kind: DeclKind,
        specs: Vec<Spec>,
    },
    Func(FuncDecl),
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub doc: Option<CommentGroup>,
    /// Receiver field list; present exactly for methods.
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    pub body: Option<Block>,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }

    /// Unqualified name of the receiver's base type, for methods.
    pub fn receiver_type_name(&self) -> Option<&Ident> {
        self.recv
            .as_ref()
            .and_then(|fields| fields.fields.first())
            .and_then(|field| field.ty.base_type_name())
    }
}

/// One entry of a grouped declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spec {
    Import(ImportSpec),
    /// `const`/`var` names with optional type and initializers.
    Value {
        names: Vec<Ident>,
        ty: Option<Expr>,
        values: Vec<Expr>,
    },
    Type(TypeSpec),
}

/// A single import line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Local name: a rename, `.` for dot-imports, absent otherwise.
    pub name: Option<Ident>,
    pub path: BasicLit,
}

impl ImportSpec {
    /// Import path without quotes.
    pub fn path_value(&self) -> &str {
        self.path.unquoted()
    }

    pub fn is_dot(&self) -> bool {
        self.name.as_ref().is_some_and(|n| n.name == ".")
    }
}

/// A type declaration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Option<FieldList>,
    pub ty: Expr,
}

// ============================================================================
// Files
// ============================================================================

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub doc: Option<CommentGroup>,
    /// The package-clause identifier. Never walked by visitors; its
    /// occurrence is synthesized up front.
    pub name: Ident,
    pub decls: Vec<Decl>,
}
