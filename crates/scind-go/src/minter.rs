//! Symbol minter: canonical global symbols for one package.
//!
//! Minting walks a package's top-level declarations once, before any file
//! of the package is visited, and assigns every package-level entity and
//! every reachable nested entity (struct fields, interface methods,
//! methods, type parameters) its canonical symbol string. The result is a
//! table keyed by declaring position, which is what the file visitor and
//! the global index consult.
//!
//! Descriptor shapes:
//!
//! ```text
//! const/var     pkg/path/Name.
//! func          pkg/path/Name.
//! method        pkg/path/Recv#Name().
//! type          pkg/path/Name#
//! struct field  pkg/path/Name#field.
//! iface method  pkg/path/Name#method().
//! type param    pkg/path/Name#[T]
//! ```
//!
//! Unexported entities are minted too; they are addressable from within
//! the package. Two entities sharing a name but not a suffix (a field and
//! a method, say) remain distinct symbols.

use std::collections::HashMap;

use scind_core::symbol::{Descriptor, PackageInfo, Symbol};
use scind_core::SymbolInformation;
use scind_go_ast::ast::{Decl, DeclKind, Expr, Field, FieldList, FuncDecl, Ident, Spec, TypeSpec};
use scind_go_ast::{Entity, EntityKind, FileId, Package, PackageId, Pos, Program};
use thiserror::Error;

use crate::{LANGUAGE, MANAGER, SCHEME};

// ============================================================================
// Errors
// ============================================================================

/// Minting failures. Fatal for the package being minted; the indexer
/// reports them and moves on to other packages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    /// A declaring identifier the resolution tables know nothing about.
    #[error("no type information for declaration {name:?} at {location}")]
    MissingTypeInfo { name: String, location: String },

    /// A declaring position outside every file of the file set.
    #[error("declaration position {pos} is outside the file set")]
    UnmappedPosition { pos: Pos },
}

pub type MintResult<T> = Result<T, MintError>;

// ============================================================================
// Package symbol table
// ============================================================================

/// The minted symbols of one package.
///
/// Frozen once minting completes; the file visitors and the global index
/// only read it.
#[derive(Debug, Clone)]
pub struct PackageSymbols {
    package: PackageId,
    package_name_symbol: String,
    package_name_info: SymbolInformation,
    by_pos: HashMap<Pos, String>,
    infos_by_file: HashMap<FileId, Vec<SymbolInformation>>,
}

impl PackageSymbols {
    pub fn package(&self) -> PackageId {
        self.package
    }

    /// Symbol minted for the declaration at `pos`, if any.
    pub fn get_symbol(&self, pos: Pos) -> Option<&str> {
        self.by_pos.get(&pos).map(String::as_str)
    }

    /// The symbol standing for the package itself, referenced by import
    /// paths and qualifiers.
    pub fn package_name_symbol(&self) -> &str {
        &self.package_name_symbol
    }

    /// Metadata for the package-scope symbols declared in `file`,
    /// preceded by the package's own symbol metadata.
    pub fn symbols_for_file(&self, file: FileId) -> Vec<SymbolInformation> {
        let mut symbols = vec![self.package_name_info.clone()];
        if let Some(infos) = self.infos_by_file.get(&file) {
            symbols.extend(infos.iter().cloned());
        }
        symbols
    }
}

// ============================================================================
// Minting
// ============================================================================

/// Mint canonical symbols for every package-level and reachable nested
/// declaration of `pkg`.
pub fn mint_package(program: &Program, pkg: &Package) -> MintResult<PackageSymbols> {
    let mut minter = Minter {
        program,
        pkg,
        out: PackageSymbols {
            package: pkg.id,
            package_name_symbol: package_symbol(pkg).format(),
            package_name_info: SymbolInformation::new(package_symbol(pkg).format())
                .with_display_name(&pkg.name)
                .with_signature(LANGUAGE, format!("package {}", pkg.name)),
            by_pos: HashMap::new(),
            infos_by_file: HashMap::new(),
        },
    };

    for file in &pkg.asts {
        for decl in &file.decls {
            minter.mint_decl(decl)?;
        }
    }

    Ok(minter.out)
}

/// The package's own symbol: the package identity plus a single
/// namespace descriptor holding the import path.
fn package_symbol(pkg: &Package) -> Symbol {
    Symbol::global(
        SCHEME,
        PackageInfo::new(MANAGER, &pkg.module.path, &pkg.module.version),
    )
    .descriptor(Descriptor::namespace(&pkg.pkg_path))
    .build()
}

struct Minter<'a> {
    program: &'a Program,
    pkg: &'a Package,
    out: PackageSymbols,
}

impl<'a> Minter<'a> {
    fn mint_decl(&mut self, decl: &Decl) -> MintResult<()> {
        match decl {
            Decl::Gen { kind, specs } => match kind {
                DeclKind::Import => Ok(()),
                DeclKind::Const | DeclKind::Var => {
                    for spec in specs {
                        if let Spec::Value { names, .. } = spec {
                            for name in names {
                                if name.is_blank() {
                                    continue;
                                }
                                self.mint_value(name)?;
                            }
                        }
                    }
                    Ok(())
                }
                DeclKind::Type => {
                    for spec in specs {
                        if let Spec::Type(type_spec) = spec {
                            self.mint_type(type_spec)?;
                        }
                    }
                    Ok(())
                }
            },
            Decl::Func(func) => self.mint_func(func),
        }
    }

    /// A package-level const or var.
    fn mint_value(&mut self, name: &Ident) -> MintResult<()> {
        let entity = self.entity_at(name)?;
        let signature = value_signature(entity);
        self.record(name, vec![Descriptor::term(&name.name)], signature)
    }

    /// A type declaration and its reachable members.
    fn mint_type(&mut self, spec: &TypeSpec) -> MintResult<()> {
        if spec.name.is_blank() {
            return Ok(());
        }
        let type_descriptor = Descriptor::type_name(&spec.name.name);
        self.record(
            &spec.name,
            vec![type_descriptor.clone()],
            format!("type {}", spec.name.name),
        )?;

        if let Some(params) = &spec.type_params {
            self.mint_type_params(params, &[type_descriptor.clone()])?;
        }

        match &spec.ty {
            Expr::StructType { fields } => {
                for field in &fields.fields {
                    self.mint_struct_field(&type_descriptor, field)?;
                }
            }
            Expr::InterfaceType { methods } => {
                for method in &methods.fields {
                    // Embedded interfaces carry no declaring identifier;
                    // the visitor emits plain references for them.
                    for name in &method.names {
                        if name.is_blank() {
                            continue;
                        }
                        let entity = self.entity_at(name)?;
                        let signature = func_signature(entity, &name.name);
                        self.record(
                            name,
                            vec![type_descriptor.clone(), Descriptor::method(&name.name)],
                            signature,
                        )?;
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// One struct field, named or embedded. An embedded field declares a
    /// field named after the base type's unqualified name, at the type
    /// expression's identifier.
    fn mint_struct_field(&mut self, type_descriptor: &Descriptor, field: &Field) -> MintResult<()> {
        if field.is_embedded() {
            let Some(base) = field.ty.base_type_name() else {
                return Ok(());
            };
            let entity = self.entity_at(base)?;
            let signature = value_signature(entity);
            return self.record(
                base,
                vec![type_descriptor.clone(), Descriptor::term(&base.name)],
                signature,
            );
        }
        for name in &field.names {
            if name.is_blank() {
                continue;
            }
            let entity = self.entity_at(name)?;
            let signature = value_signature(entity);
            self.record(
                name,
                vec![type_descriptor.clone(), Descriptor::term(&name.name)],
                signature,
            )?;
        }
        Ok(())
    }

    /// A function or method declaration, plus its type parameters.
    fn mint_func(&mut self, func: &FuncDecl) -> MintResult<()> {
        if func.name.is_blank() {
            return Ok(());
        }
        let entity = self.entity_at(&func.name)?;
        let signature = func_signature(entity, &func.name.name);

        let descriptors = match func.receiver_type_name() {
            Some(recv) => vec![
                Descriptor::type_name(&recv.name),
                Descriptor::method(&func.name.name),
            ],
            None => vec![Descriptor::term(&func.name.name)],
        };
        self.record(&func.name, descriptors.clone(), signature)?;

        if let Some(params) = &func.ty.type_params {
            self.mint_type_params(params, &descriptors)?;
        }
        Ok(())
    }

    /// Named type parameters, in declaration order, nested under `under`.
    fn mint_type_params(&mut self, params: &FieldList, under: &[Descriptor]) -> MintResult<()> {
        for field in &params.fields {
            for name in &field.names {
                if name.is_blank() {
                    continue;
                }
                self.entity_at(name)?;
                let mut descriptors = under.to_vec();
                descriptors.push(Descriptor::type_parameter(&name.name));
                self.record(name, descriptors, name.name.clone())?;
            }
        }
        Ok(())
    }

    /// Build the symbol string for `descriptors`, store it under the
    /// declaring position, and file its metadata with the hosting file.
    fn record(
        &mut self,
        ident: &Ident,
        descriptors: Vec<Descriptor>,
        signature: String,
    ) -> MintResult<()> {
        let file = self
            .program
            .fset
            .file_containing(ident.pos)
            .ok_or(MintError::UnmappedPosition { pos: ident.pos })?
            .id();

        let symbol = Symbol::global(
            SCHEME,
            PackageInfo::new(MANAGER, &self.pkg.module.path, &self.pkg.module.version),
        )
        .descriptor(Descriptor::namespace(&self.pkg.pkg_path))
        .descriptors(descriptors)
        .build()
        .format();

        let info = SymbolInformation::new(&symbol)
            .with_display_name(&ident.name)
            .with_signature(LANGUAGE, signature);

        self.out.by_pos.insert(ident.pos, symbol);
        self.out.infos_by_file.entry(file).or_default().push(info);
        Ok(())
    }

    fn entity_at(&self, ident: &Ident) -> MintResult<&'a Entity> {
        match self.pkg.type_info.def_at(ident.pos) {
            Some(id) => Ok(self.program.entity(id)),
            None => Err(MintError::MissingTypeInfo {
                name: ident.name.clone(),
                location: self.location(ident.pos),
            }),
        }
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
}

// ============================================================================
// Signatures
// ============================================================================

fn value_signature(entity: &Entity) -> String {
    let prefix = match entity.kind {
        EntityKind::Const => "const ",
        _ => "var ",
    };
    match entity.ty.as_deref() {
        Some(ty) if !ty.is_empty() => format!("{prefix}{} {ty}", entity.name),
        _ => format!("{prefix}{}", entity.name),
    }
}

/// Splice the declared name into a rendered `func(...)` type.
fn func_signature(entity: &Entity, name: &str) -> String {
    match entity.ty.as_deref().and_then(|ty| ty.strip_prefix("func")) {
        Some(rest) => format!("func {name}{rest}"),
        None => format!("func {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scind_go_ast::EntityId;

    fn entity_with(kind: EntityKind, name: &str, ty: Option<&str>) -> Entity {
        Entity {
            id: EntityId(0),
            name: name.to_string(),
            pos: Pos(1),
            pkg: None,
            kind,
            ty: ty.map(str::to_string),
        }
    }

    #[test]
    fn func_signature_splices_the_name() {
        let entity = entity_with(
            EntityKind::func(),
            "Parse",
            Some("func(s string) (int, error)"),
        );
        assert_eq!(
            func_signature(&entity, "Parse"),
            "func Parse(s string) (int, error)"
        );
    }

    #[test]
    fn func_signature_survives_missing_type() {
        let entity = entity_with(EntityKind::func(), "Parse", None);
        assert_eq!(func_signature(&entity, "Parse"), "func Parse");
    }

    #[test]
    fn value_signature_uses_const_prefix() {
        let entity = entity_with(EntityKind::Const, "limit", Some("int"));
        assert_eq!(value_signature(&entity), "const limit int");
    }
}
