//! Global symbol index: lookups across package boundaries.
//!
//! Per-package symbol tables accumulate here in topological import
//! order, so by the time any file of a package is visited, every package
//! it imports has already been minted and frozen. The index is
//! append-only; visitors never mutate it.

use std::collections::HashMap;

use scind_go_ast::{Entity, PackageId, Pos};
use thiserror::Error;

use crate::minter::PackageSymbols;

/// Cross-package lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlobalError {
    /// The entity's owning package is not part of the load set.
    #[error("entity {name:?} belongs to unindexed package {package}")]
    UnknownPackage { name: String, package: PackageId },
}

/// Symbol tables for every package minted so far.
#[derive(Debug, Default)]
pub struct GlobalSymbols {
    packages: HashMap<PackageId, PackageSymbols>,
}

impl GlobalSymbols {
    /// Publish a freshly minted package table.
    pub fn add_package(&mut self, symbols: PackageSymbols) {
        self.packages.insert(symbols.package(), symbols);
    }

    pub fn contains(&self, package: PackageId) -> bool {
        self.packages.contains_key(&package)
    }

    pub fn package_symbols(&self, package: PackageId) -> Option<&PackageSymbols> {
        self.packages.get(&package)
    }

    /// Symbol minted by `package` for the declaration at `pos`.
    pub fn get_symbol(&self, package: PackageId, pos: Pos) -> Option<&str> {
        self.packages.get(&package)?.get_symbol(pos)
    }

    /// The symbol standing for a package itself, used when its import
    /// path is written as a qualifier.
    pub fn get_package_name_symbol(&self, package: PackageId) -> Option<&str> {
        self.packages
            .get(&package)
            .map(|symbols| symbols.package_name_symbol())
    }

    /// Resolve an entity referenced from another package by its owning
    /// package and declaring position.
    ///
    /// `Ok(None)` means the entity deliberately has no symbol here:
    /// predeclared builtins (no owning package) and positions the owner
    /// never minted. `Err` means the owner is not in the load set at all.
    pub fn get_symbol_of_entity(&self, entity: &Entity) -> Result<Option<&str>, GlobalError> {
        let Some(owner) = entity.pkg else {
            // Predeclared builtin; handled by the caller.
            return Ok(None);
        };

        let Some(symbols) = self.packages.get(&owner) else {
            return Err(GlobalError::UnknownPackage {
                name: entity.name.clone(),
                package: owner,
            });
        };

        if let Some(imported) = entity.imported_package() {
            return Ok(self.get_package_name_symbol(imported));
        }

        Ok(symbols.get_symbol(entity.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scind_go_ast::{EntityId, EntityKind};

    fn builtin(name: &str) -> Entity {
        Entity {
            id: EntityId(0),
            name: name.to_string(),
            pos: Pos::NONE,
            pkg: None,
            kind: EntityKind::Builtin,
            ty: None,
        }
    }

    #[test]
    fn builtins_resolve_to_no_symbol() {
        let globals = GlobalSymbols::default();
        assert_eq!(globals.get_symbol_of_entity(&builtin("len")), Ok(None));
    }

    #[test]
    fn unknown_owner_is_an_error() {
        let globals = GlobalSymbols::default();
        let entity = Entity {
            id: EntityId(0),
            name: "Foo".to_string(),
            pos: Pos(10),
            pkg: Some(PackageId(7)),
            kind: EntityKind::func(),
            ty: None,
        };
        assert_eq!(
            globals.get_symbol_of_entity(&entity),
            Err(GlobalError::UnknownPackage {
                name: "Foo".to_string(),
                package: PackageId(7),
            })
        );
    }
}
