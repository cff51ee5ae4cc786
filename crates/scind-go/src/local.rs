//! Local symbols and their signature rendering.

use scind_go_ast::{Entity, EntityId, EntityKind, Program};

/// A `local N` symbol minted during one file's traversal, together with
/// the entity it stands for.
#[derive(Debug, Clone)]
pub struct Local {
    pub symbol: String,
    pub entity: Option<EntityId>,
}

/// Build the one-line signature for a local symbol.
///
/// Prefix (`const`/`var`/`import`) by entity kind, then the name, then
/// the imported package's path for package aliases or the rendered static
/// type otherwise. Empty components are dropped; the rest join with
/// single spaces.
pub fn signature_text(entity: &Entity, program: &Program) -> String {
    let mut parts: Vec<&str> = Vec::new();

    match entity.kind {
        EntityKind::Const => parts.push("const"),
        EntityKind::PkgName { .. } => parts.push("import"),
        EntityKind::Var { .. } => parts.push("var"),
        _ => {}
    }

    if !entity.name.is_empty() {
        parts.push(&entity.name);
    }

    if let Some(imported) = entity.imported_package() {
        if let Some(package) = program.package(imported) {
            parts.push(&package.pkg_path);
        }
    } else if let Some(ty) = entity.ty.as_deref() {
        if !ty.is_empty() {
            parts.push(ty);
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scind_go_ast::Pos;

    fn entity(name: &str, kind: EntityKind, ty: Option<&str>) -> Entity {
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
    fn variable_signature_has_var_prefix_and_type() {
        let program = Program::default();
        let local = entity("count", EntityKind::var(), Some("int"));
        assert_eq!(signature_text(&local, &program), "var count int");
    }

    #[test]
    fn const_signature() {
        let program = Program::default();
        let local = entity("limit", EntityKind::Const, Some("untyped int"));
        assert_eq!(signature_text(&local, &program), "const limit untyped int");
    }

    #[test]
    fn function_value_signature_has_no_prefix() {
        let program = Program::default();
        let local = entity("f", EntityKind::func(), Some("func() error"));
        assert_eq!(signature_text(&local, &program), "f func() error");
    }

    #[test]
    fn empty_components_are_dropped() {
        let program = Program::default();
        let local = entity("x", EntityKind::var(), None);
        assert_eq!(signature_text(&local, &program), "var x");
    }
}
