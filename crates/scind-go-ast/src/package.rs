//! Packages, per-package type information, and the loaded program.
//!
//! A [`Program`] is the complete artifact the loader hands over: the file
//! set, the interned entity table, and one [`Package`] per loaded import
//! path. Package identity is interned by `(import path, module version)`,
//! so two loads of the same path within an invocation share a
//! [`PackageId`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ast::File;
use crate::entity::{Entity, EntityId};
use crate::fileset::{FileId, FileSet, Pos};

// ============================================================================
// Identity
// ============================================================================

/// Opaque stable handle for a loaded package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub u32);

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pkg_{}", self.0)
    }
}

/// The module a package belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module path, e.g. `example.com/mod`.
    pub path: String,
    /// Module version: a semver tag or a short commit hash. Supplied by
    /// the version inferrer for the module under index and by the module
    /// graph for third-party packages.
    pub version: String,
}

impl ModuleInfo {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        ModuleInfo {
            path: path.into(),
            version: version.into(),
        }
    }
}

// ============================================================================
// Type information
// ============================================================================

/// What a synthetic (implicit) binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitOwner {
    /// One per type-switch case clause; the entity is the per-case
    /// narrowed binding of the scrutinee variable.
    CaseClause { pos: Pos },
    /// An import without a rename still binds the package name.
    ImportSpec { pos: Pos },
}

/// A synthetic binding recorded by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implicit {
    pub owner: ImplicitOwner,
    pub entity: EntityId,
}

/// Elaboration output for one package.
///
/// Keyed by source position: position keys are stable within one
/// invocation and avoid entity hashing at emission sites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Declaring identifier position → declared entity.
    pub defs: HashMap<Pos, EntityId>,
    /// Using identifier position → referenced entity.
    pub uses: HashMap<Pos, EntityId>,
    /// Synthetic bindings (case clauses, plain imports).
    pub implicits: Vec<Implicit>,
    /// Expression position → rendered static type. Present at least for
    /// references to type-switch case bindings, where the narrowed type
    /// differs from the binding's declared type.
    pub type_of: HashMap<Pos, String>,
}

impl TypeInfo {
    pub fn def_at(&self, pos: Pos) -> Option<EntityId> {
        self.defs.get(&pos).copied()
    }

    pub fn use_at(&self, pos: Pos) -> Option<EntityId> {
        self.uses.get(&pos).copied()
    }

    pub fn type_at(&self, pos: Pos) -> Option<&str> {
        self.type_of.get(&pos).map(String::as_str)
    }

    /// The per-case bindings of every type-switch in the package, keyed
    /// by the position of the entity (the scrutinee identifier).
    pub fn case_clause_bindings(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.implicits.iter().filter_map(|implicit| {
            matches!(implicit.owner, ImplicitOwner::CaseClause { .. })
                .then_some(implicit.entity)
        })
    }
}

// ============================================================================
// Packages
// ============================================================================

/// One loaded package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    /// Package name as written in the package clause.
    pub name: String,
    /// Canonical import path.
    pub pkg_path: String,
    pub module: ModuleInfo,
    pub files: Vec<FileId>,
    pub asts: Vec<File>,
    pub type_info: TypeInfo,
    /// Import path → loaded package, for every import in any file of this
    /// package. Deterministically ordered.
    pub imports: BTreeMap<String, PackageId>,
}

impl Package {
    pub fn import(&self, path: &str) -> Option<PackageId> {
        self.imports.get(path).copied()
    }
}

// ============================================================================
// Program
// ============================================================================

/// Errors raised while assembling or querying a program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("package {id} registered twice")]
    DuplicatePackage { id: PackageId },

    #[error("package {id} was interned but never loaded")]
    MissingPackage { id: PackageId },
}

/// The complete loader hand-off: file set, entities, packages.
#[derive(Debug, Default)]
pub struct Program {
    pub fset: FileSet,
    entities: Vec<Entity>,
    packages: Vec<Option<Package>>,
    ids_by_key: BTreeMap<(String, String), PackageId>,
    load_order: Vec<PackageId>,
}

impl Program {
    pub fn new(fset: FileSet) -> Self {
        Program {
            fset,
            ..Program::default()
        }
    }

    /// Intern a package identity. Repeated calls with the same import
    /// path and version return the same id.
    pub fn intern_package(&mut self, import_path: &str, version: &str) -> PackageId {
        if let Some(id) = self
            .ids_by_key
            .get(&(import_path.to_string(), version.to_string()))
        {
            return *id;
        }
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(None);
        self.ids_by_key
            .insert((import_path.to_string(), version.to_string()), id);
        id
    }

    /// Attach the loaded package body for an interned id.
    pub fn add_package(&mut self, package: Package) -> Result<(), ProgramError> {
        let id = package.id;
        let slot = self
            .packages
            .get_mut(id.0 as usize)
            .ok_or(ProgramError::MissingPackage { id })?;
        if slot.is_some() {
            return Err(ProgramError::DuplicatePackage { id });
        }
        *slot = Some(package);
        self.load_order.push(id);
        Ok(())
    }

    /// Intern an entity, handing out its id.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0 as usize]
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Loaded packages in load order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.load_order
            .iter()
            .filter_map(|id| self.package(*id))
    }

    /// Packages ordered so that every import precedes its importers.
    /// Within that constraint, load order is preserved. Import cycles
    /// cannot occur in well-formed input; if present, the cycle is broken
    /// at the first revisited package.
    pub fn topological_order(&self) -> Vec<PackageId> {
        let mut order = Vec::with_capacity(self.load_order.len());
        let mut visited: HashSet<PackageId> = HashSet::new();

        for &root in &self.load_order {
            self.topo_visit(root, &mut visited, &mut order);
        }
        order
    }

    fn topo_visit(
        &self,
        id: PackageId,
        visited: &mut HashSet<PackageId>,
        order: &mut Vec<PackageId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(package) = self.package(id) else {
            return;
        };
        for &imported in package.imports.values() {
            self.topo_visit(imported, visited, order);
        }
        order.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_package(program: &mut Program, path: &str, imports: &[PackageId]) -> PackageId {
        let id = program.intern_package(path, "v1.0.0");
        let package = Package {
            id,
            name: path.rsplit('/').next().unwrap().to_string(),
            pkg_path: path.to_string(),
            module: ModuleInfo::new("example.com/mod", "v1.0.0"),
            files: vec![],
            asts: vec![],
            type_info: TypeInfo::default(),
            imports: imports
                .iter()
                .enumerate()
                .map(|(i, id)| (format!("dep/{i}"), *id))
                .collect(),
        };
        program.add_package(package).unwrap();
        id
    }

    #[test]
    fn interning_is_stable_per_path_and_version() {
        let mut program = Program::default();
        let a = program.intern_package("example.com/mod/a", "v1.0.0");
        let same = program.intern_package("example.com/mod/a", "v1.0.0");
        let other = program.intern_package("example.com/mod/a", "v2.0.0");
        assert_eq!(a, same);
        assert_ne!(a, other);
    }

    #[test]
    fn topological_order_puts_imports_first() {
        let mut program = Program::default();
        let leaf = stub_package(&mut program, "m/leaf", &[]);
        let mid = stub_package(&mut program, "m/mid", &[leaf]);
        let root = stub_package(&mut program, "m/root", &[mid, leaf]);

        let order = program.topological_order();
        let index = |id| order.iter().position(|p| *p == id).unwrap();
        assert!(index(leaf) < index(mid));
        assert!(index(mid) < index(root));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn case_clause_bindings_skip_import_implicits() {
        let mut info = TypeInfo::default();
        info.implicits.push(Implicit {
            owner: ImplicitOwner::ImportSpec { pos: Pos(5) },
            entity: EntityId(0),
        });
        info.implicits.push(Implicit {
            owner: ImplicitOwner::CaseClause { pos: Pos(9) },
            entity: EntityId(1),
        });

        let bindings: Vec<_> = info.case_clause_bindings().collect();
        assert_eq!(bindings, vec![EntityId(1)]);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut program = Program::default();
        let id = stub_package(&mut program, "m/a", &[]);
        let copy = Package {
            id,
            name: "a".into(),
            pkg_path: "m/a".into(),
            module: ModuleInfo::new("m", "v1.0.0"),
            files: vec![],
            asts: vec![],
            type_info: TypeInfo::default(),
            imports: BTreeMap::new(),
        };
        assert_eq!(
            program.add_package(copy),
            Err(ProgramError::DuplicatePackage { id })
        );
    }
}
