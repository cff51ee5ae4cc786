//! Symbol string grammar: structured form, formatter, and parser.
//!
//! A global symbol is the space-separated tuple
//! `scheme manager package-name package-version descriptor-path`, where the
//! descriptor path is a sequence of `(name, suffix)` descriptors rendered
//! with their suffix characters:
//!
//! ```text
//! namespace       name/
//! type            name#
//! term            name.
//! method          name().
//! type-parameter  [name]
//! parameter       (name)
//! meta            name:
//! ```
//!
//! Descriptor names that are not plain identifiers are wrapped in
//! backticks, with embedded backticks doubled. Empty package components
//! are rendered as `.`.
//!
//! A local symbol is the string `local N`; locals are only meaningful
//! within the document that created them.
//!
//! `format` and `parse` are exact inverses: `parse(format(s)) == s` and
//! re-formatting a parsed string reproduces it byte for byte.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use winnow::combinator::{alt, delimited, eof, repeat};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};
use winnow::ModalResult;

// ============================================================================
// Structured form
// ============================================================================

/// Descriptor kind, encoded by the suffix character(s) in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suffix {
    Namespace,
    Type,
    Term,
    Method,
    TypeParameter,
    Parameter,
    Meta,
}

/// One `(name, suffix)` element of a descriptor path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    pub suffix: Suffix,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, suffix: Suffix) -> Self {
        Descriptor {
            name: name.into(),
            suffix,
        }
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        Descriptor::new(name, Suffix::Namespace)
    }

    pub fn type_name(name: impl Into<String>) -> Self {
        Descriptor::new(name, Suffix::Type)
    }

    pub fn term(name: impl Into<String>) -> Self {
        Descriptor::new(name, Suffix::Term)
    }

    pub fn method(name: impl Into<String>) -> Self {
        Descriptor::new(name, Suffix::Method)
    }

    pub fn type_parameter(name: impl Into<String>) -> Self {
        Descriptor::new(name, Suffix::TypeParameter)
    }
}

/// Package identity of a global symbol: manager, name, version.
///
/// Components must not contain spaces; empty components render as `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageInfo {
    pub manager: String,
    pub name: String,
    pub version: String,
}

impl PackageInfo {
    pub fn new(
        manager: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        PackageInfo {
            manager: manager.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A fully spelled-out global symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalSymbol {
    pub scheme: String,
    pub package: PackageInfo,
    pub descriptors: Vec<Descriptor>,
}

/// A symbol identifier: either globally unique or file-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Symbol {
    Local(u32),
    Global(GlobalSymbol),
}

impl Symbol {
    pub fn local(index: u32) -> Self {
        Symbol::Local(index)
    }

    pub fn global(scheme: impl Into<String>, package: PackageInfo) -> GlobalSymbolBuilder {
        GlobalSymbolBuilder {
            symbol: GlobalSymbol {
                scheme: scheme.into(),
                package,
                descriptors: Vec::new(),
            },
        }
    }

    /// Render the symbol in the wire grammar.
    pub fn format(&self) -> String {
        match self {
            Symbol::Local(index) => format!("local {index}"),
            Symbol::Global(global) => {
                let mut out = String::new();
                out.push_str(&package_component(&global.scheme));
                out.push(' ');
                out.push_str(&package_component(&global.package.manager));
                out.push(' ');
                out.push_str(&package_component(&global.package.name));
                out.push(' ');
                out.push_str(&package_component(&global.package.version));
                out.push(' ');
                for descriptor in &global.descriptors {
                    format_descriptor(descriptor, &mut out);
                }
                out
            }
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

/// Chained construction for global symbols.
pub struct GlobalSymbolBuilder {
    symbol: GlobalSymbol,
}

impl GlobalSymbolBuilder {
    pub fn descriptor(mut self, descriptor: Descriptor) -> Self {
        self.symbol.descriptors.push(descriptor);
        self
    }

    pub fn descriptors(mut self, descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        self.symbol.descriptors.extend(descriptors);
        self
    }

    pub fn build(self) -> Symbol {
        Symbol::Global(self.symbol)
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn package_component(value: &str) -> String {
    debug_assert!(
        !value.contains(' '),
        "package component must not contain spaces: {value:?}"
    );
    if value.is_empty() {
        ".".to_string()
    } else {
        value.to_string()
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '+' | '-' | '$')
}

fn format_name(name: &str, out: &mut String) {
    if !name.is_empty() && name.chars().all(is_identifier_char) {
        out.push_str(name);
    } else {
        out.push('`');
        for c in name.chars() {
            if c == '`' {
                out.push('`');
            }
            out.push(c);
        }
        out.push('`');
    }
}

fn format_descriptor(descriptor: &Descriptor, out: &mut String) {
    match descriptor.suffix {
        Suffix::Namespace => {
            format_name(&descriptor.name, out);
            out.push('/');
        }
        Suffix::Type => {
            format_name(&descriptor.name, out);
            out.push('#');
        }
        Suffix::Term => {
            format_name(&descriptor.name, out);
            out.push('.');
        }
        Suffix::Method => {
            format_name(&descriptor.name, out);
            out.push_str("().");
        }
        Suffix::TypeParameter => {
            out.push('[');
            format_name(&descriptor.name, out);
            out.push(']');
        }
        Suffix::Parameter => {
            out.push('(');
            format_name(&descriptor.name, out);
            out.push(')');
        }
        Suffix::Meta => {
            format_name(&descriptor.name, out);
            out.push(':');
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Symbol string parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid symbol {input:?}: {message}")]
pub struct SymbolParseError {
    pub input: String,
    pub message: String,
}

/// Parse a symbol string back into its structured form.
pub fn parse(input: &str) -> Result<Symbol, SymbolParseError> {
    symbol_parser
        .parse(input)
        .map_err(|e| SymbolParseError {
            input: input.to_string(),
            message: format!("{e:?}"),
        })
}

fn symbol_parser(input: &mut &str) -> ModalResult<Symbol> {
    alt((local_symbol, global_symbol)).parse_next(input)
}

fn local_symbol(input: &mut &str) -> ModalResult<Symbol> {
    let (_, digits, _) = (
        "local ",
        take_while(1.., |c: char| c.is_ascii_digit()),
        eof,
    )
        .parse_next(input)?;
    let index: u32 = digits
        .parse()
        .map_err(|_| winnow::error::ErrMode::from_input(input))?;
    Ok(Symbol::Local(index))
}

fn global_symbol(input: &mut &str) -> ModalResult<Symbol> {
    let scheme = space_component(input)?;
    let _ = ' '.parse_next(input)?;
    let manager = space_component(input)?;
    let _ = ' '.parse_next(input)?;
    let name = space_component(input)?;
    let _ = ' '.parse_next(input)?;
    let version = space_component(input)?;
    let _ = ' '.parse_next(input)?;
    let descriptors: Vec<Descriptor> = repeat(1.., descriptor).parse_next(input)?;
    let _ = eof.parse_next(input)?;

    Ok(Symbol::Global(GlobalSymbol {
        scheme,
        package: PackageInfo {
            manager,
            name,
            version,
        },
        descriptors,
    }))
}

/// A space-delimited package component; `.` decodes to the empty string.
fn space_component(input: &mut &str) -> ModalResult<String> {
    let raw: &str = take_till(1.., |c| c == ' ').parse_next(input)?;
    Ok(if raw == "." { String::new() } else { raw.to_string() })
}

fn descriptor(input: &mut &str) -> ModalResult<Descriptor> {
    alt((
        delimited('[', name, ']').map(|n| Descriptor::new(n, Suffix::TypeParameter)),
        delimited('(', name, ')').map(|n| Descriptor::new(n, Suffix::Parameter)),
        suffixed_descriptor,
    ))
    .parse_next(input)
}

fn suffixed_descriptor(input: &mut &str) -> ModalResult<Descriptor> {
    let descriptor_name = name(input)?;
    let suffix = alt((
        "().".map(|_| Suffix::Method),
        '/'.map(|_| Suffix::Namespace),
        '#'.map(|_| Suffix::Type),
        '.'.map(|_| Suffix::Term),
        ':'.map(|_| Suffix::Meta),
    ))
    .parse_next(input)?;
    Ok(Descriptor::new(descriptor_name, suffix))
}

fn name(input: &mut &str) -> ModalResult<String> {
    alt((escaped_name, plain_name)).parse_next(input)
}

fn plain_name(input: &mut &str) -> ModalResult<String> {
    take_while(1.., is_identifier_char)
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

/// Backtick-escaped name; doubled backticks decode to a literal backtick.
fn escaped_name(input: &mut &str) -> ModalResult<String> {
    let _ = '`'.parse_next(input)?;
    let mut out = String::new();
    loop {
        let chunk: &str = take_till(0.., |c| c == '`').parse_next(input)?;
        out.push_str(chunk);
        let _ = '`'.parse_next(input)?;
        if input.starts_with('`') {
            let _ = '`'.parse_next(input)?;
            out.push('`');
        } else {
            return Ok(out);
        }
    }
}
