//! SCIP indexer core for Go.
//!
//! Consumes a resolved [`Program`] (parsed syntax plus elaborated name
//! resolution, supplied by an external package loader) and produces one
//! SCIP document per source file. The pipeline runs in strict dependency
//! order:
//!
//! 1. the [symbol minter](minter) assigns canonical global symbols to
//!    every package-level and reachable nested declaration, one package
//!    at a time in topological import order;
//! 2. minted tables accumulate in the [global index](global), which
//!    serves cross-package lookups;
//! 3. the [file visitor](visitor) traverses each syntax tree emitting
//!    occurrences, minting `local N` symbols for file-scoped bindings.
//!
//! Within a package files are visited sequentially, so local counters
//! and package-name overrides are deterministic; the minted tables are
//! frozen before the first visitor runs.

pub mod document;
pub mod gitver;
pub mod global;
pub mod local;
pub mod minter;
pub mod visitor;

use scind_core::{Document, Handler, Strictness};
use scind_go_ast::Program;
use thiserror::Error;

pub use global::GlobalSymbols;
pub use minter::{mint_package, PackageSymbols};
pub use visitor::FileVisitor;

/// Canonical short name of the indexed language.
pub const LANGUAGE: &str = "go";

/// Symbol scheme for this indexer.
pub const SCHEME: &str = "scip-go";

/// Package manager component of every global symbol.
pub const MANAGER: &str = "gomod";

/// Run-wide indexing options.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Strict mode turns every reported resolution problem into an
    /// error; lenient mode records them and degrades the document.
    pub strictness: Strictness,
}

/// The produced artifact: one document per indexed file, in load order.
#[derive(Debug, Clone, Default)]
pub struct Index {
    pub documents: Vec<Document>,
}

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Mint(#[from] minter::MintError),

    #[error(transparent)]
    Visit(#[from] visitor::VisitError),

    #[error(transparent)]
    Document(#[from] document::DocumentError),
}

/// Index a whole program.
///
/// Packages are minted in topological import order, so every
/// cross-package reference resolves against an already-populated index.
/// A package whose minting fails is reported and skipped (its files
/// produce no documents); in strict mode the failure aborts the run.
pub fn index_program(program: &Program, options: &IndexOptions) -> Result<Index, IndexError> {
    let handler = Handler::new(options.strictness);
    let mut globals = GlobalSymbols::default();

    for id in program.topological_order() {
        let Some(pkg) = program.package(id) else {
            continue;
        };
        match mint_package(program, pkg) {
            Ok(symbols) => globals.add_package(symbols),
            Err(err) => {
                tracing::error!(package = %pkg.pkg_path, error = %err, "aborting package");
                handler.report(err)?;
            }
        }
    }

    let mut index = Index::default();
    for pkg in program.packages() {
        // A package whose minting failed produces no documents.
        let Some(pkg_symbols) = globals.package_symbols(pkg.id) else {
            continue;
        };
        for file in &pkg.asts {
            let document =
                document::build_document(program, pkg, file, pkg_symbols, &globals, &handler)?;
            index.documents.push(document);
        }
    }

    Ok(index)
}
