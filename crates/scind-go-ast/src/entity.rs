//! Resolved declaration objects.
//!
//! An [`Entity`] is what the type checker resolved an identifier to: a
//! constant, variable, function, named type, imported package name, label,
//! or predeclared builtin. Entities are interned program-wide; the
//! per-package resolution tables refer to them by [`EntityId`], so a
//! cross-package use and its definition share one entity.

use serde::{Deserialize, Serialize};

use crate::fileset::Pos;
use crate::package::PackageId;

/// Unique identifier for an entity within an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity_{}", self.0)
    }
}

/// What kind of declaration an entity is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Const,
    /// A variable binding. Struct fields set `is_field`; embedded fields
    /// additionally set `is_embedded`.
    Var { is_field: bool, is_embedded: bool },
    /// A function. Methods carry the unqualified name of their
    /// receiver's base type.
    Func { receiver: Option<String> },
    TypeName,
    /// The binding an import introduces; qualifiers resolve to this.
    PkgName { imported: PackageId },
    Label,
    /// Predeclared identifier (`len`, `error`, ...). Owns no package and
    /// never receives a symbol.
    Builtin,
    /// The predeclared `nil`. Like builtins, owns no package and never
    /// receives a symbol.
    Nil,
}

impl EntityKind {
    /// A plain (non-field) variable.
    pub fn var() -> Self {
        EntityKind::Var {
            is_field: false,
            is_embedded: false,
        }
    }

    /// A struct field, embedded or named.
    pub fn field(embedded: bool) -> Self {
        EntityKind::Var {
            is_field: true,
            is_embedded: embedded,
        }
    }

    /// A function without a receiver.
    pub fn func() -> Self {
        EntityKind::Func { receiver: None }
    }

    /// A method on the named receiver base type.
    pub fn method(receiver: impl Into<String>) -> Self {
        EntityKind::Func {
            receiver: Some(receiver.into()),
        }
    }
}

/// A compiler-resolved declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    /// Position of the declaring identifier; `Pos::NONE` for builtins.
    pub pos: Pos,
    /// Owning package; `None` for builtins and labels.
    pub pkg: Option<PackageId>,
    pub kind: EntityKind,
    /// The entity's static type rendered as source-faithful text, used
    /// for signature documentation. Absent where the checker supplies
    /// none (package names, labels).
    pub ty: Option<String>,
}

impl Entity {
    /// Whether the first letter is upper case, making the entity visible
    /// outside its package.
    pub fn is_exported(&self) -> bool {
        self.name
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
    }

    pub fn imported_package(&self) -> Option<PackageId> {
        match &self.kind {
            EntityKind::PkgName { imported } => Some(*imported),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_helpers_fill_in_payloads() {
        assert_eq!(
            EntityKind::field(true),
            EntityKind::Var {
                is_field: true,
                is_embedded: true,
            }
        );
        assert_eq!(
            EntityKind::method("C"),
            EntityKind::Func {
                receiver: Some("C".to_string()),
            }
        );
        assert_eq!(EntityKind::func(), EntityKind::Func { receiver: None });
    }

    #[test]
    fn exported_follows_first_rune_case() {
        let mut entity = Entity {
            id: EntityId(0),
            name: "Foo".to_string(),
            pos: Pos(1),
            pkg: None,
            kind: EntityKind::func(),
            ty: None,
        };
        assert!(entity.is_exported());
        entity.name = "foo".to_string();
        assert!(!entity.is_exported());
        entity.name = String::new();
        assert!(!entity.is_exported());
    }
}
