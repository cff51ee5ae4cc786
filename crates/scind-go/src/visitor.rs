//! File visitor: occurrence emission for one syntax tree.
//!
//! The visitor walks a file's tree in source order, dispatching on node
//! tag. Almost every node walks structurally; the interesting cases are
//! import specs (alias locals, package-name overrides, path references),
//! selector expressions whose qualifier is a package name, and the
//! identifier rule itself, which consults the resolution tables to emit
//! definitions and references.
//!
//! One visitor exists per file and is never re-entered; a second local
//! minted at an already-owned position is a traversal bug and panics.

use std::collections::HashMap;

use scind_core::{Handler, Occurrence, Range, Symbol};
use scind_go_ast::ast::{
    Block, CaseClause, CommClause, Decl, Expr, Field, FieldList, FuncType, Ident, ImportSpec,
    Spec, Stmt,
};
use scind_go_ast::{EntityId, Package, PackageId, Pos, Program};
use thiserror::Error;

use crate::document::format_code;
use crate::global::{GlobalError, GlobalSymbols};
use crate::local::Local;
use crate::minter::PackageSymbols;

// ============================================================================
// Errors
// ============================================================================

/// Resolution problems found during a file walk.
///
/// All of these go through the [`Handler`]: strict mode aborts the
/// package, lenient mode skips the identifier and degrades the document.
/// `UnmappedPosition` is the exception; it is a broken file set and is
/// always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    #[error("missing package-name symbol for package {path:?}")]
    MissingPackageSymbol { path: String },

    #[error("identifier {name:?} at {location} has neither definition nor use")]
    Unresolved { name: String, location: String },

    #[error(transparent)]
    Global(#[from] GlobalError),

    #[error("position {pos} is outside every file in the file set")]
    UnmappedPosition { pos: Pos },
}

pub type VisitResult<T> = Result<T, VisitError>;

// ============================================================================
// Visitor
// ============================================================================

/// Traversal state for one file.
pub struct FileVisitor<'a> {
    program: &'a Program,
    pkg: &'a Package,
    file: &'a scind_go_ast::ast::File,
    pkg_symbols: &'a PackageSymbols,
    globals: &'a GlobalSymbols,
    handler: &'a Handler,

    /// Occurrences accumulated so far, seeded with the file's synthetic
    /// package-clause occurrence.
    occurrences: Vec<Occurrence>,

    /// Declaring position → minted local, for bindings that turned out
    /// to be file-local.
    locals: HashMap<Pos, Local>,
    local_order: Vec<Pos>,

    /// Position → per-case synthetic binding of a type switch. The same
    /// written name denotes a different entity in each case body.
    case_overrides: HashMap<Pos, EntityId>,

    /// Imported package → local symbol of its renamed alias in this
    /// file. Qualifiers prefer this over the global package-name symbol.
    pkg_name_overrides: HashMap<PackageId, String>,
}

impl<'a> FileVisitor<'a> {
    pub fn new(
        program: &'a Program,
        pkg: &'a Package,
        file: &'a scind_go_ast::ast::File,
        pkg_symbols: &'a PackageSymbols,
        globals: &'a GlobalSymbols,
        handler: &'a Handler,
        package_occurrence: Occurrence,
    ) -> Self {
        let mut case_overrides = HashMap::new();
        for entity_id in pkg.type_info.case_clause_bindings() {
            case_overrides.insert(program.entity(entity_id).pos, entity_id);
        }

        FileVisitor {
            program,
            pkg,
            file,
            pkg_symbols,
            globals,
            handler,
            occurrences: vec![package_occurrence],
            locals: HashMap::new(),
            local_order: Vec::new(),
            case_overrides,
            pkg_name_overrides: HashMap::new(),
        }
    }

    /// Walk the whole file. The package-clause identifier is skipped;
    /// its occurrence was seeded at construction.
    pub fn walk(&mut self) -> VisitResult<()> {
        for decl in &self.file.decls {
            self.walk_decl(decl)?;
        }
        Ok(())
    }

    /// Occurrences and locals, in emission/creation order.
    pub(crate) fn into_parts(self) -> (Vec<Occurrence>, Vec<Local>) {
        let locals = self
            .local_order
            .iter()
            .map(|pos| self.locals[pos].clone())
            .collect();
        (self.occurrences, locals)
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    fn new_local(&mut self, pos: Pos, entity: Option<EntityId>) -> String {
        if self.locals.contains_key(&pos) {
            panic!("local symbol already minted for {pos}; file visitor re-entered");
        }
        let symbol = Symbol::local(self.locals.len() as u32).format();
        self.locals.insert(
            pos,
            Local {
                symbol: symbol.clone(),
                entity,
            },
        );
        self.local_order.push(pos);
        symbol
    }

    fn ident_range(&self, ident: &Ident) -> VisitResult<Range> {
        let position = self
            .program
            .fset
            .position(ident.pos)
            .ok_or(VisitError::UnmappedPosition { pos: ident.pos })?;
        Ok(Range::single_line(
            position.line,
            position.col,
            position.col + ident.name.len() as u32,
        ))
    }

    fn location(&self, pos: Pos) -> String {
        match self.program.fset.position(pos) {
            Some(position) => {
                let path = self
                    .program
                    .fset
                    .file(position.file)
                    .map(|f| f.path())
                    .unwrap_or("?");
                format!("{}:{}:{}", path, position.line + 1, position.col + 1)
            }
            None => format!("{pos}"),
        }
    }

    // ------------------------------------------------------------------
    // Imports and qualifiers
    // ------------------------------------------------------------------

    fn import_spec(&mut self, spec: &ImportSpec) -> VisitResult<()> {
        let path = spec.path_value();
        let Some(imported) = self.pkg.import(path) else {
            tracing::warn!(path, "could not resolve import; skipping");
            return Ok(());
        };

        if let Some(name) = &spec.name {
            if !spec.is_dot() {
                let entity = self.pkg.type_info.def_at(name.pos);
                let symbol = self.new_local(name.pos, entity);
                let range = self.ident_range(name)?;
                self.occurrences.push(Occurrence::definition(&symbol, range));
                // The alias shadows the package name for the rest of
                // this file; qualifiers resolve to the local.
                self.pkg_name_overrides.insert(imported, symbol);
            }
        }

        let Some(symbol) = self.globals.get_package_name_symbol(imported) else {
            self.handler.report(VisitError::MissingPackageSymbol {
                path: path.to_string(),
            })?;
            return Ok(());
        };

        // Range over the path content, excluding the quotes.
        let position = self
            .program
            .fset
            .position(spec.path.pos)
            .ok_or(VisitError::UnmappedPosition { pos: spec.path.pos })?;
        let range = Range::single_line(
            position.line,
            position.col + 1,
            position.col + 1 + path.len() as u32,
        );
        self.occurrences.push(Occurrence::reference(symbol, range));
        Ok(())
    }

    /// A selector whose qualifier names a package: one reference for the
    /// qualifier, then only the selection is walked. Treating the alias
    /// as a value would emit a bogus reference.
    fn package_qualifier(&mut self, qualifier: &Ident, imported: PackageId) -> VisitResult<bool> {
        let symbol = match self.pkg_name_overrides.get(&imported) {
            Some(local) => local.clone(),
            None => match self.globals.get_package_name_symbol(imported) {
                Some(symbol) => symbol.to_string(),
                None => {
                    let path = self
                        .program
                        .package(imported)
                        .map(|p| p.pkg_path.clone())
                        .unwrap_or_else(|| imported.to_string());
                    self.handler
                        .report(VisitError::MissingPackageSymbol { path })?;
                    return Ok(false);
                }
            },
        };

        let range = self.ident_range(qualifier)?;
        self.occurrences.push(Occurrence::reference(symbol, range));
        Ok(true)
    }

    // ------------------------------------------------------------------
    // The identifier rule
    // ------------------------------------------------------------------

    fn walk_ident(&mut self, ident: &Ident) -> VisitResult<()> {
        if ident.is_blank() {
            return Ok(());
        }

        // A type-switch guard: each case clause binds a fresh synthetic
        // entity at this position.
        if let Some(&entity_id) = self.case_overrides.get(&ident.pos) {
            let entity = self.program.entity(entity_id);
            let pos = entity.pos;
            let symbol = self.new_local(pos, Some(entity_id));
            let range = self.ident_range(ident)?;
            self.occurrences.push(Occurrence::definition(symbol, range));
            return Ok(());
        }

        let def = self.pkg.type_info.def_at(ident.pos);
        if let Some(def_id) = def {
            let entity_pos = self.program.entity(def_id).pos;
            let symbol = if let Some(symbol) = self.pkg_symbols.get_symbol(entity_pos) {
                symbol.to_string()
            } else if let Some(symbol) = self.globals.get_symbol(self.pkg.id, entity_pos) {
                symbol.to_string()
            } else {
                self.new_local(entity_pos, Some(def_id))
            };
            let range = self.ident_range(ident)?;
            self.occurrences.push(Occurrence::definition(symbol, range));
        }

        let use_ = self.pkg.type_info.use_at(ident.pos);
        if let Some(use_id) = use_ {
            let entity = self.program.entity(use_id);
            let mut override_type: Option<String> = None;

            let symbol = if let Some(local) = self.locals.get(&entity.pos) {
                if self.case_overrides.contains_key(&entity.pos) {
                    // The reader should see the narrowed per-case type,
                    // not the scrutinee's declared type.
                    override_type = self.pkg.type_info.type_at(ident.pos).map(str::to_string);
                }
                Some(local.symbol.clone())
            } else {
                match self.globals.get_symbol_of_entity(entity) {
                    Ok(symbol) => symbol.map(str::to_string),
                    Err(err) => {
                        self.handler.report(VisitError::from(err))?;
                        None
                    }
                }
            };

            if let Some(symbol) = symbol {
                let range = self.ident_range(ident)?;
                let mut occurrence = Occurrence::reference(symbol, range);
                if let Some(ty) = override_type.filter(|ty| !ty.is_empty()) {
                    occurrence =
                        occurrence.with_override_documentation(vec![format_code(&ty)]);
                }
                self.occurrences.push(occurrence);
            }
        }

        if def.is_none() && use_.is_none() {
            self.handler.report(VisitError::Unresolved {
                name: ident.name.clone(),
                location: self.location(ident.pos),
            })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural walk
    // ------------------------------------------------------------------

    fn walk_decl(&mut self, decl: &Decl) -> VisitResult<()> {
        match decl {
            Decl::Gen { specs, .. } => {
                for spec in specs {
                    match spec {
                        Spec::Import(import) => self.import_spec(import)?,
                        Spec::Value { names, ty, values } => {
                            for name in names {
                                self.walk_ident(name)?;
                            }
                            if let Some(ty) = ty {
                                self.walk_expr(ty)?;
                            }
                            for value in values {
                                self.walk_expr(value)?;
                            }
                        }
                        Spec::Type(type_spec) => {
                            self.walk_ident(&type_spec.name)?;
                            if let Some(params) = &type_spec.type_params {
                                self.walk_field_list(params)?;
                            }
                            self.walk_expr(&type_spec.ty)?;
                        }
                    }
                }
                Ok(())
            }
            Decl::Func(func) => {
                if let Some(recv) = &func.recv {
                    self.walk_field_list(recv)?;
                }
                self.walk_ident(&func.name)?;
                self.walk_func_type(&func.ty)?;
                if let Some(body) = &func.body {
                    self.walk_block(body)?;
                }
                Ok(())
            }
        }
    }

    fn walk_func_type(&mut self, ty: &FuncType) -> VisitResult<()> {
        if let Some(params) = &ty.type_params {
            self.walk_field_list(params)?;
        }
        self.walk_field_list(&ty.params)?;
        if let Some(results) = &ty.results {
            self.walk_field_list(results)?;
        }
        Ok(())
    }

    fn walk_field_list(&mut self, fields: &FieldList) -> VisitResult<()> {
        for field in &fields.fields {
            self.walk_field(field)?;
        }
        Ok(())
    }

    fn walk_field(&mut self, field: &Field) -> VisitResult<()> {
        for name in &field.names {
            self.walk_ident(name)?;
        }
        self.walk_expr(&field.ty)
    }

    fn walk_block(&mut self, block: &Block) -> VisitResult<()> {
        for stmt in &block.stmts {
            self.walk_stmt(stmt)?;
        }
        Ok(())
    }

    fn walk_stmt(&mut self, stmt: &Stmt) -> VisitResult<()> {
        match stmt {
            Stmt::Decl(decl) => self.walk_decl(decl),
            Stmt::Empty => Ok(()),
            Stmt::Labeled { label, stmt } => {
                self.walk_ident(label)?;
                self.walk_stmt(stmt)
            }
            Stmt::Expr(expr) => self.walk_expr(expr),
            Stmt::Send { chan, value } => {
                self.walk_expr(chan)?;
                self.walk_expr(value)
            }
            Stmt::IncDec { x } => self.walk_expr(x),
            Stmt::Assign { lhs, rhs, .. } => {
                for expr in lhs {
                    self.walk_expr(expr)?;
                }
                for expr in rhs {
                    self.walk_expr(expr)?;
                }
                Ok(())
            }
            Stmt::Go { call } | Stmt::Defer { call } => self.walk_expr(call),
            Stmt::Return { results } => {
                for expr in results {
                    self.walk_expr(expr)?;
                }
                Ok(())
            }
            Stmt::Branch { label } => {
                if let Some(label) = label {
                    self.walk_ident(label)?;
                }
                Ok(())
            }
            Stmt::Block(block) => self.walk_block(block),
            Stmt::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    self.walk_stmt(init)?;
                }
                self.walk_expr(cond)?;
                self.walk_block(then)?;
                if let Some(els) = els {
                    self.walk_stmt(els)?;
                }
                Ok(())
            }
            Stmt::Switch { init, tag, body } => {
                if let Some(init) = init {
                    self.walk_stmt(init)?;
                }
                if let Some(tag) = tag {
                    self.walk_expr(tag)?;
                }
                self.walk_case_clauses(body)
            }
            Stmt::TypeSwitch { init, assign, body } => {
                if let Some(init) = init {
                    self.walk_stmt(init)?;
                }
                self.walk_stmt(assign)?;
                self.walk_case_clauses(body)
            }
            Stmt::Select { body } => {
                for clause in body {
                    self.walk_comm_clause(clause)?;
                }
                Ok(())
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    self.walk_stmt(init)?;
                }
                if let Some(cond) = cond {
                    self.walk_expr(cond)?;
                }
                if let Some(post) = post {
                    self.walk_stmt(post)?;
                }
                self.walk_block(body)
            }
            Stmt::Range {
                key,
                value,
                x,
                body,
                ..
            } => {
                if let Some(key) = key {
                    self.walk_expr(key)?;
                }
                if let Some(value) = value {
                    self.walk_expr(value)?;
                }
                self.walk_expr(x)?;
                self.walk_block(body)
            }
        }
    }

    fn walk_case_clauses(&mut self, clauses: &[CaseClause]) -> VisitResult<()> {
        for clause in clauses {
            for value in &clause.values {
                self.walk_expr(value)?;
            }
            for stmt in &clause.body {
                self.walk_stmt(stmt)?;
            }
        }
        Ok(())
    }

    fn walk_comm_clause(&mut self, clause: &CommClause) -> VisitResult<()> {
        if let Some(comm) = &clause.comm {
            self.walk_stmt(comm)?;
        }
        for stmt in &clause.body {
            self.walk_stmt(stmt)?;
        }
        Ok(())
    }

    fn walk_expr(&mut self, expr: &Expr) -> VisitResult<()> {
        match expr {
            Expr::Ident(ident) => self.walk_ident(ident),
            Expr::BasicLit(_) => Ok(()),
            Expr::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    self.walk_expr(ty)?;
                }
                for elt in elts {
                    self.walk_expr(elt)?;
                }
                Ok(())
            }
            Expr::FuncLit { ty, body } => {
                self.walk_func_type(ty)?;
                self.walk_block(body)
            }
            Expr::Paren { x } => self.walk_expr(x),
            Expr::Selector { x, sel } => {
                if let Expr::Ident(qualifier) = x.as_ref() {
                    if let Some(use_id) = self.pkg.type_info.use_at(qualifier.pos) {
                        if let Some(imported) = self.program.entity(use_id).imported_package() {
                            return if self.package_qualifier(qualifier, imported)? {
                                self.walk_ident(sel)
                            } else {
                                Ok(())
                            };
                        }
                    }
                }
                self.walk_expr(x)?;
                self.walk_ident(sel)
            }
            Expr::Index { x, index } => {
                self.walk_expr(x)?;
                self.walk_expr(index)
            }
            Expr::IndexList { x, indices } => {
                self.walk_expr(x)?;
                for index in indices {
                    self.walk_expr(index)?;
                }
                Ok(())
            }
            Expr::Slice { x, low, high, max } => {
                self.walk_expr(x)?;
                for bound in [low, high, max].into_iter().flatten() {
                    self.walk_expr(bound)?;
                }
                Ok(())
            }
            Expr::TypeAssert { x, ty } => {
                self.walk_expr(x)?;
                if let Some(ty) = ty {
                    self.walk_expr(ty)?;
                }
                Ok(())
            }
            Expr::Call { func, args } => {
                self.walk_expr(func)?;
                for arg in args {
                    self.walk_expr(arg)?;
                }
                Ok(())
            }
            Expr::Star { x } | Expr::Unary { x } => self.walk_expr(x),
            Expr::Binary { x, y } => {
                self.walk_expr(x)?;
                self.walk_expr(y)
            }
            Expr::KeyValue { key, value } => {
                self.walk_expr(key)?;
                self.walk_expr(value)
            }
            Expr::ArrayType { len, elem } => {
                if let Some(len) = len {
                    self.walk_expr(len)?;
                }
                self.walk_expr(elem)
            }
            Expr::StructType { fields } => self.walk_field_list(fields),
            Expr::FuncTypeExpr { ty } => self.walk_func_type(ty),
            Expr::InterfaceType { methods } => self.walk_field_list(methods),
            Expr::MapType { key, value } => {
                self.walk_expr(key)?;
                self.walk_expr(value)
            }
            Expr::ChanType { value } => self.walk_expr(value),
            Expr::Ellipsis { elt } => {
                if let Some(elt) = elt {
                    self.walk_expr(elt)?;
                }
                Ok(())
            }
        }
    }
}
