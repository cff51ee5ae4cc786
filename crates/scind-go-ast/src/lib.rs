//! Resolved Go program model consumed by the scind indexer.
//!
//! The package loader (an external collaborator) parses and type-checks a
//! module and hands the indexer a [`Program`]: a set of packages, each with
//! syntax trees, a shared file set for position mapping, and the
//! name-resolution tables produced by elaboration (`defs`, `uses`,
//! `implicits`, `type_of`). This crate defines those shapes; it performs no
//! parsing or checking of its own.
//!
//! Positions are byte offsets into the file set ([`Pos`]); only the file
//! set converts them to line/column form. Lines and columns are 0-based.

pub mod ast;
pub mod entity;
pub mod fileset;
pub mod package;

pub use entity::{Entity, EntityId, EntityKind};
pub use fileset::{FileId, FileSet, Pos, Position, SourceFile};
pub use package::{
    Implicit, ImplicitOwner, ModuleInfo, Package, PackageId, Program, TypeInfo,
};
