//! Fixture builders for indexer integration tests.
//!
//! The package loader is an external collaborator, so tests construct
//! [`Program`] values by hand: source text supplies positions (via
//! token lookup), and the builder wires entities into the defs/uses
//! tables exactly as an elaborated load would.

// Each test binary compiles its own copy; not every binary uses every
// helper.
#![allow(dead_code)]

use scind_core::symbol::{Descriptor, PackageInfo, Symbol};
use scind_core::{Document, Occurrence, Range};
use scind_go_ast::ast::{self, BasicLit, Ident};
use scind_go_ast::{
    Entity, EntityId, EntityKind, FileId, Implicit, ImplicitOwner, ModuleInfo, Package, PackageId,
    Pos, Program, TypeInfo,
};

pub const MODULE_PATH: &str = "example.com/mod";
pub const MODULE_VERSION: &str = "v1.0.0";

// ============================================================================
// Source text and positions
// ============================================================================

/// One fixture file: registered with the file set, keeps its text for
/// token-position lookups.
pub struct Source {
    pub file: FileId,
    base: Pos,
    text: String,
}

impl Source {
    /// Byte position of the `nth` occurrence (0-based) of `token`,
    /// matched on identifier boundaries.
    pub fn pos(&self, token: &str, nth: usize) -> Pos {
        self.base.add(find_nth_token(&self.text, token, nth))
    }

    pub fn ident(&self, token: &str, nth: usize) -> Ident {
        Ident::new(self.pos(token, nth), token)
    }

    /// The `nth` occurrence of the string literal `"content"`, including
    /// its quotes.
    pub fn str_lit_nth(&self, content: &str, nth: usize) -> BasicLit {
        let quoted = format!("\"{content}\"");
        let offset = self
            .text
            .match_indices(&quoted)
            .nth(nth)
            .map(|(offset, _)| offset)
            .unwrap_or_else(|| panic!("literal {quoted} occurrence {nth} not in fixture"));
        BasicLit::string(self.base.add(offset as u32), quoted)
    }

    /// The first occurrence of the string literal `"content"`.
    pub fn str_lit(&self, content: &str) -> BasicLit {
        self.str_lit_nth(content, 0)
    }

    /// Expected occurrence range of a token, computed from the raw text
    /// independently of the file set.
    pub fn token_range(&self, token: &str, nth: usize) -> Range {
        let offset = find_nth_token(&self.text, token, nth) as usize;
        let prefix = &self.text[..offset];
        let line = prefix.matches('\n').count() as u32;
        let col = (offset - prefix.rfind('\n').map(|i| i + 1).unwrap_or(0)) as u32;
        Range::single_line(line, col, col + token.len() as u32)
    }

    /// Expected range of an import path's content, quotes excluded.
    pub fn path_range(&self, content: &str) -> Range {
        let quoted = format!("\"{content}\"");
        let offset = self.text.find(&quoted).expect("literal in fixture");
        let prefix = &self.text[..offset];
        let line = prefix.matches('\n').count() as u32;
        let col = (offset - prefix.rfind('\n').map(|i| i + 1).unwrap_or(0)) as u32;
        Range::single_line(line, col + 1, col + 1 + content.len() as u32)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn find_nth_token(text: &str, token: &str, nth: usize) -> u32 {
    let mut seen = 0;
    for (offset, _) in text.match_indices(token) {
        let before_ok = offset == 0
            || !token.starts_with(is_ident_char)
            || !text[..offset].chars().next_back().is_some_and(is_ident_char);
        let after = offset + token.len();
        let after_ok = after >= text.len()
            || !token.ends_with(is_ident_char)
            || !text[after..].chars().next().is_some_and(is_ident_char);
        if before_ok && after_ok {
            if seen == nth {
                return offset as u32;
            }
            seen += 1;
        }
    }
    panic!("token {token:?} occurrence {nth} not found in fixture");
}

// ============================================================================
// Entities
// ============================================================================

pub fn entity(
    program: &mut Program,
    pkg: Option<PackageId>,
    name: &str,
    pos: Pos,
    kind: EntityKind,
    ty: Option<&str>,
) -> EntityId {
    program.add_entity(Entity {
        id: EntityId(0),
        name: name.to_string(),
        pos,
        pkg,
        kind,
        ty: ty.map(str::to_string),
    })
}

pub fn builtin(program: &mut Program, name: &str) -> EntityId {
    entity(
        program,
        None,
        name,
        Pos::NONE,
        EntityKind::Builtin,
        Some(name),
    )
}

/// The predeclared `nil`.
pub fn nil_value(program: &mut Program) -> EntityId {
    entity(program, None, "nil", Pos::NONE, EntityKind::Nil, None)
}

// ============================================================================
// Package assembly
// ============================================================================

/// Accumulates one package's parts, then registers it with the program.
pub struct PackageBuilder {
    pub id: PackageId,
    name: String,
    pkg_path: String,
    files: Vec<FileId>,
    asts: Vec<ast::File>,
    type_info: TypeInfo,
    imports: Vec<(String, PackageId)>,
}

impl PackageBuilder {
    pub fn new(program: &mut Program, pkg_path: &str, name: &str) -> Self {
        PackageBuilder {
            id: program.intern_package(pkg_path, MODULE_VERSION),
            name: name.to_string(),
            pkg_path: pkg_path.to_string(),
            files: Vec::new(),
            asts: Vec::new(),
            type_info: TypeInfo::default(),
            imports: Vec::new(),
        }
    }

    pub fn source(&mut self, program: &mut Program, path: &str, text: &str) -> Source {
        let file = program.fset.add_file(path, text);
        self.files.push(file);
        Source {
            file,
            base: program.fset.file(file).unwrap().base(),
            text: text.to_string(),
        }
    }

    pub fn ast(&mut self, file: ast::File) {
        self.asts.push(file);
    }

    pub fn def(&mut self, pos: Pos, entity: EntityId) {
        self.type_info.defs.insert(pos, entity);
    }

    pub fn use_(&mut self, pos: Pos, entity: EntityId) {
        self.type_info.uses.insert(pos, entity);
    }

    pub fn implicit_case(&mut self, clause_pos: Pos, entity: EntityId) {
        self.type_info.implicits.push(Implicit {
            owner: ImplicitOwner::CaseClause { pos: clause_pos },
            entity,
        });
    }

    /// The package-name binding of an import with no rename, recorded
    /// against the import spec the way the checker reports it.
    pub fn implicit_import(&mut self, spec_pos: Pos, entity: EntityId) {
        self.type_info.implicits.push(Implicit {
            owner: ImplicitOwner::ImportSpec { pos: spec_pos },
            entity,
        });
    }

    pub fn type_of(&mut self, pos: Pos, ty: &str) {
        self.type_info.type_of.insert(pos, ty.to_string());
    }

    pub fn import(&mut self, path: &str, id: PackageId) {
        self.imports.push((path.to_string(), id));
    }

    pub fn finish(self, program: &mut Program) -> PackageId {
        let id = self.id;
        program
            .add_package(Package {
                id,
                name: self.name,
                pkg_path: self.pkg_path,
                module: ModuleInfo::new(MODULE_PATH, MODULE_VERSION),
                files: self.files,
                asts: self.asts,
                type_info: self.type_info,
                imports: self.imports.into_iter().collect(),
            })
            .expect("fixture package registered twice");
        id
    }
}

// ============================================================================
// Expected symbols
// ============================================================================

/// Build the expected global symbol string for a descriptor path under
/// the fixture module.
pub fn global_symbol(pkg_path: &str, descriptors: Vec<Descriptor>) -> String {
    Symbol::global(
        "scip-go",
        PackageInfo::new("gomod", MODULE_PATH, MODULE_VERSION),
    )
    .descriptor(Descriptor::namespace(pkg_path))
    .descriptors(descriptors)
    .build()
    .format()
}

/// The package-name symbol for a fixture package.
pub fn package_symbol(pkg_path: &str) -> String {
    global_symbol(pkg_path, Vec::new())
}

// ============================================================================
// Document assertions
// ============================================================================

/// Find the document for `path`, panicking with the available paths on a
/// miss.
pub fn document<'a>(documents: &'a [Document], path: &str) -> &'a Document {
    documents
        .iter()
        .find(|doc| doc.relative_path == path)
        .unwrap_or_else(|| {
            let paths: Vec<_> = documents.iter().map(|d| d.relative_path.as_str()).collect();
            panic!("no document for {path}; have {paths:?}")
        })
}

/// Assert exactly one occurrence exists at `range` with the given symbol
/// and role, returning it.
pub fn occurrence_at<'a>(
    doc: &'a Document,
    range: Range,
    symbol: &str,
    definition: bool,
) -> &'a Occurrence {
    let matches: Vec<_> = doc
        .occurrences
        .iter()
        .filter(|occ| {
            occ.range == range
                && occ.symbol == symbol
                && occ.symbol_roles.is_definition() == definition
        })
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "expected exactly one {} of {symbol} at {range:?} in {}; occurrences: {:#?}",
        if definition { "definition" } else { "reference" },
        doc.relative_path,
        doc.occurrences
    );
    matches[0]
}

/// Assert no occurrence covers the given range.
pub fn assert_no_occurrence_at(doc: &Document, range: Range) {
    assert!(
        doc.occurrences.iter().all(|occ| occ.range != range),
        "unexpected occurrence at {range:?} in {}",
        doc.relative_path
    );
}

// ============================================================================
// The shared dependency package
// ============================================================================

/// Handles into the fixture dependency package `example.com/mod/dep`:
///
/// ```go
/// package dep
///
/// type C struct {
///     F int
/// }
///
/// func (c C) M() {}
///
/// func Bar() {}
/// ```
pub struct DepPackage {
    pub id: PackageId,
    pub source: Source,
    pub c: EntityId,
    pub f: EntityId,
    pub m: EntityId,
    pub bar: EntityId,
}

pub const DEP_PATH: &str = "example.com/mod/dep";

pub fn add_dep_package(program: &mut Program) -> DepPackage {
    let text = "package dep\n\ntype C struct {\n\tF int\n}\n\nfunc (c C) M() {}\n\nfunc Bar() {}\n";
    let mut builder = PackageBuilder::new(program, DEP_PATH, "dep");
    let source = builder.source(program, "dep/dep.go", text);

    let c_type = entity(
        program,
        Some(builder.id),
        "C",
        source.pos("C", 0),
        EntityKind::TypeName,
        Some("example.com/mod/dep.C"),
    );
    let f_field = entity(
        program,
        Some(builder.id),
        "F",
        source.pos("F", 0),
        EntityKind::field(false),
        Some("int"),
    );
    let recv = entity(
        program,
        Some(builder.id),
        "c",
        source.pos("c", 0),
        EntityKind::var(),
        Some("example.com/mod/dep.C"),
    );
    let m_method = entity(
        program,
        Some(builder.id),
        "M",
        source.pos("M", 0),
        EntityKind::method("C"),
        Some("func()"),
    );
    let bar_func = entity(
        program,
        Some(builder.id),
        "Bar",
        source.pos("Bar", 0),
        EntityKind::func(),
        Some("func()"),
    );
    let int_builtin = builtin(program, "int");

    builder.def(source.pos("C", 0), c_type);
    builder.def(source.pos("F", 0), f_field);
    builder.def(source.pos("c", 0), recv);
    builder.def(source.pos("M", 0), m_method);
    builder.def(source.pos("Bar", 0), bar_func);
    builder.use_(source.pos("C", 1), c_type);
    builder.use_(source.pos("int", 0), int_builtin);

    builder.ast(ast::File {
        id: source.file,
        doc: None,
        name: source.ident("dep", 0),
        decls: vec![
            ast::Decl::Gen {
                kind: ast::DeclKind::Type,
                specs: vec![ast::Spec::Type(ast::TypeSpec {
                    name: source.ident("C", 0),
                    type_params: None,
                    ty: ast::Expr::StructType {
                        fields: ast::FieldList::new(vec![ast::Field {
                            names: vec![source.ident("F", 0)],
                            ty: ast::Expr::Ident(source.ident("int", 0)),
                        }]),
                    },
                })],
            },
            ast::Decl::Func(ast::FuncDecl {
                doc: None,
                recv: Some(ast::FieldList::new(vec![ast::Field {
                    names: vec![source.ident("c", 0)],
                    ty: ast::Expr::Ident(source.ident("C", 1)),
                }])),
                name: source.ident("M", 0),
                ty: ast::FuncType::new(ast::FieldList::default()),
                body: Some(ast::Block::default()),
            }),
            ast::Decl::Func(ast::FuncDecl {
                doc: None,
                recv: None,
                name: source.ident("Bar", 0),
                ty: ast::FuncType::new(ast::FieldList::default()),
                body: Some(ast::Block::default()),
            }),
        ],
    });

    let id = builder.finish(program);
    DepPackage {
        id,
        source,
        c: c_type,
        f: f_field,
        m: m_method,
        bar: bar_func,
    }
}
