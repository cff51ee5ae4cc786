//! Document assembly: one SCIP document per source file.

use scind_core::{Document, Handler, Occurrence, Range, SymbolInformation};
use scind_go_ast::ast::File;
use scind_go_ast::{FileId, Package, Program};
use thiserror::Error;

use crate::global::GlobalSymbols;
use crate::local::{signature_text, Local};
use crate::minter::PackageSymbols;
use crate::visitor::FileVisitor;
use crate::{IndexError, LANGUAGE};

/// Fatal document-level failures. These indicate inconsistent loader
/// output, not bad source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("file {file} missing from the file set at document build")]
    MissingFile { file: FileId },
}

/// Render a type or signature string as a fenced code block.
pub(crate) fn format_code(text: &str) -> String {
    format!("```{LANGUAGE}\n{text}\n```")
}

/// Build the document for one file: seed the package-clause occurrence,
/// run the visitor, then merge minted and local symbol metadata.
pub fn build_document(
    program: &Program,
    pkg: &Package,
    file: &File,
    pkg_symbols: &PackageSymbols,
    globals: &GlobalSymbols,
    handler: &Handler,
) -> Result<Document, IndexError> {
    let source_file = program
        .fset
        .file(file.id)
        .ok_or(DocumentError::MissingFile { file: file.id })?;

    let package_occurrence = {
        let position = source_file.position(file.name.pos);
        let range = Range::single_line(
            position.line,
            position.col,
            position.col + file.name.name.len() as u32,
        );
        Occurrence::definition(pkg_symbols.package_name_symbol(), range)
    };

    let mut visitor = FileVisitor::new(
        program,
        pkg,
        file,
        pkg_symbols,
        globals,
        handler,
        package_occurrence,
    );
    visitor.walk()?;
    let (occurrences, locals) = visitor.into_parts();

    let mut document = Document::new(LANGUAGE, source_file.path());
    document.occurrences = occurrences;
    document.sort_occurrences();
    document.symbols = pkg_symbols.symbols_for_file(file.id);
    document
        .symbols
        .extend(locals.iter().map(|local| local_info(program, local)));

    Ok(document)
}

/// Synthesized metadata for a local: display name from the entity plus
/// the one-line signature.
fn local_info(program: &Program, local: &Local) -> SymbolInformation {
    let mut info = SymbolInformation::new(&local.symbol);
    if let Some(entity_id) = local.entity {
        let entity = program.entity(entity_id);
        info = info
            .with_display_name(&entity.name)
            .with_signature(LANGUAGE, signature_text(entity, program));
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_code_fences_with_language() {
        assert_eq!(format_code("*T"), "```go\n*T\n```");
    }
}
