//! SCIP document model: occurrences, symbol information, documents.
//!
//! These are the in-memory shapes handed to the wire serializer. One
//! `Document` is produced per source file; it lists every occurrence of a
//! symbol in that file plus the metadata for symbols the file defines or
//! hosts.

use serde::{Deserialize, Serialize};

use crate::range::Range;

// ============================================================================
// Symbol roles
// ============================================================================

/// Bitset of roles a symbol plays at an occurrence.
///
/// The indexer core only ever sets `DEFINITION` and `READ_ACCESS`; the
/// remaining bits exist so parsed documents round-trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolRoles(pub u32);

impl SymbolRoles {
    pub const DEFINITION: SymbolRoles = SymbolRoles(0x1);
    pub const IMPORT: SymbolRoles = SymbolRoles(0x2);
    pub const WRITE_ACCESS: SymbolRoles = SymbolRoles(0x4);
    pub const READ_ACCESS: SymbolRoles = SymbolRoles(0x8);

    /// Whether every bit in `other` is set in `self`.
    pub fn contains(self, other: SymbolRoles) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_definition(self) -> bool {
        self.contains(SymbolRoles::DEFINITION)
    }
}

impl std::ops::BitOr for SymbolRoles {
    type Output = SymbolRoles;

    fn bitor(self, rhs: SymbolRoles) -> SymbolRoles {
        SymbolRoles(self.0 | rhs.0)
    }
}

// ============================================================================
// Occurrences
// ============================================================================

/// A single (range, symbol, roles) record tying a source location to a
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub range: Range,
    pub symbol: String,
    pub symbol_roles: SymbolRoles,
    /// Formatted type text attached when the static type at this reference
    /// differs from the referent's declared type (type-switch case bodies).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_documentation: Vec<String>,
}

impl Occurrence {
    pub fn definition(symbol: impl Into<String>, range: Range) -> Self {
        Occurrence {
            range,
            symbol: symbol.into(),
            symbol_roles: SymbolRoles::DEFINITION,
            override_documentation: Vec::new(),
        }
    }

    pub fn reference(symbol: impl Into<String>, range: Range) -> Self {
        Occurrence {
            range,
            symbol: symbol.into(),
            symbol_roles: SymbolRoles::READ_ACCESS,
            override_documentation: Vec::new(),
        }
    }

    /// Attach override documentation lines to a reference.
    pub fn with_override_documentation(mut self, docs: Vec<String>) -> Self {
        self.override_documentation = docs;
        self
    }
}

// ============================================================================
// Symbol information
// ============================================================================

/// A one-document signature rendering, tagged with its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDocumentation {
    pub language: String,
    pub text: String,
}

/// Metadata for one symbol: display name plus an optional signature.
///
/// Emitted once per symbol in the document that defines or hosts it; for
/// locals, in the file where the local was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInformation {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_documentation: Option<SignatureDocumentation>,
}

impl SymbolInformation {
    pub fn new(symbol: impl Into<String>) -> Self {
        SymbolInformation {
            symbol: symbol.into(),
            display_name: String::new(),
            signature_documentation: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Attach a signature document in the given language. Empty text is
    /// dropped rather than serialized.
    pub fn with_signature(mut self, language: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.signature_documentation = Some(SignatureDocumentation {
                language: language.to_string(),
                text,
            });
        }
        self
    }
}

// ============================================================================
// Documents
// ============================================================================

/// The index record for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Canonical short name of the source language.
    pub language: String,
    /// Path relative to the repository root.
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub occurrences: Vec<Occurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolInformation>,
}

impl Document {
    pub fn new(language: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Document {
            language: language.into(),
            relative_path: relative_path.into(),
            occurrences: Vec::new(),
            symbols: Vec::new(),
        }
    }

    /// Normalize occurrence order: start position, then end position, then
    /// roles with definitions before references. Idempotent on input that
    /// is already in source order.
    pub fn sort_occurrences(&mut self) {
        self.occurrences.sort_by(|a, b| {
            a.range
                .cmp(&b.range)
                .then_with(|| role_rank(a.symbol_roles).cmp(&role_rank(b.symbol_roles)))
        });
    }
}

/// Definitions sort ahead of everything else at the same range.
fn role_rank(roles: SymbolRoles) -> u8 {
    if roles.is_definition() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_compose_as_bits() {
        let both = SymbolRoles::DEFINITION | SymbolRoles::READ_ACCESS;
        assert!(both.contains(SymbolRoles::DEFINITION));
        assert!(both.contains(SymbolRoles::READ_ACCESS));
        assert!(!SymbolRoles::READ_ACCESS.contains(SymbolRoles::DEFINITION));
    }

    #[test]
    fn sort_puts_definitions_before_references_at_same_range() {
        let range = Range::single_line(3, 0, 5);
        let mut doc = Document::new("go", "a.go");
        doc.occurrences.push(Occurrence::reference("local 0", range));
        doc.occurrences
            .push(Occurrence::definition("local 0", range));
        doc.sort_occurrences();
        assert!(doc.occurrences[0].symbol_roles.is_definition());
        assert!(!doc.occurrences[1].symbol_roles.is_definition());
    }

    #[test]
    fn sort_is_stable_for_ordered_input() {
        let mut doc = Document::new("go", "a.go");
        doc.occurrences
            .push(Occurrence::definition("local 0", Range::single_line(0, 0, 2)));
        doc.occurrences
            .push(Occurrence::reference("local 0", Range::single_line(1, 4, 6)));
        let before = doc.occurrences.clone();
        doc.sort_occurrences();
        assert_eq!(doc.occurrences, before);
    }

    #[test]
    fn document_round_trips_through_json() {
        let mut doc = Document::new("go", "pkg/a.go");
        doc.occurrences.push(Occurrence::definition(
            "scip-go gomod m v1 `m/pkg`/Foo#",
            Range::single_line(2, 5, 8),
        ));
        doc.occurrences.push(
            Occurrence::reference("local 0", Range::single_line(4, 1, 2))
                .with_override_documentation(vec!["```go\n*T\n```".to_string()]),
        );
        doc.symbols.push(
            SymbolInformation::new("local 0")
                .with_display_name("v")
                .with_signature("go", "var v *T"),
        );

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        assert_eq!(serde_json::to_string(&back).unwrap(), json);
    }

    #[test]
    fn empty_fields_are_skipped_in_json() {
        let doc = Document::new("go", "pkg/a.go");
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("occurrences").is_none());
        assert!(json.get("symbols").is_none());

        let occ = Occurrence::reference("local 1", Range::single_line(0, 0, 1));
        let json = serde_json::to_value(&occ).unwrap();
        assert!(json.get("override_documentation").is_none());
    }
}
