//! Core infrastructure for scind.
//!
//! This crate provides the language-agnostic half of the indexer:
//! - SCIP document model (ranges, occurrences, symbol information)
//! - Symbol string grammar: structured form, formatter, and parser
//! - Error types and the strict/lenient report handler
//!
//! Nothing in this crate knows about the target language. The language
//! model and the visitors that consume these types live in `scind-go-ast`
//! and `scind-go`.

pub mod error;
pub mod model;
pub mod range;
pub mod symbol;

pub use error::{Handler, Strictness};
pub use model::{Document, Occurrence, SignatureDocumentation, SymbolInformation, SymbolRoles};
pub use range::Range;
pub use symbol::{Descriptor, GlobalSymbol, PackageInfo, Suffix, Symbol};
