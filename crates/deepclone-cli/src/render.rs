//! Plain-text tree rendering

use deepclone_core::{NodeKind, ReferenceTree, TreePath};
use indexmap::IndexSet;

/// One line per node, indented two spaces per level.
///
/// ```text
/// page-1 [page] Home
///   hero-1 [hero] Hero banner
///   author-1 [author] Jane (disabled)
/// ```
#[must_use]
pub fn render_tree(tree: &ReferenceTree, disabled: &IndexSet<TreePath>) -> String {
    let mut out = String::new();
    for (path, node) in tree.nodes() {
        let indent = "  ".repeat(path.len().saturating_sub(1));
        let line = match node.kind {
            NodeKind::More => format!("{indent}+more"),
            NodeKind::Entry | NodeKind::Repeated => {
                let mut line = format!("{indent}{} [{}]", node.entry_id, node.content_type_id);
                if !node.internal_name.is_empty() {
                    line.push(' ');
                    line.push_str(&node.internal_name);
                }
                if node.kind == NodeKind::Repeated {
                    line.push_str(" (repeated)");
                }
                if disabled.contains(&path) {
                    line.push_str(" (disabled)");
                }
                line
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepclone_core::ReferenceClosure;
    use deepclone_model::{FieldValue, Fields, Record};

    #[test]
    fn marks_repeated_nodes() {
        let closure: ReferenceClosure = vec![
            Record::new("a", "page", Fields::new().with("next", "en-US", FieldValue::entry_link("b"))),
            Record::new(
                "b",
                "page",
                Fields::new()
                    .with("name", "en-US", FieldValue::text("Bee"))
                    .with("back", "en-US", FieldValue::entry_link("a")),
            ),
        ]
        .into_iter()
        .collect();
        let tree = ReferenceTree::build(&closure, &"a".into()).unwrap();

        assert_eq!(
            render_tree(&tree, &IndexSet::new()),
            "a [page]\n  b [page] Bee\n    a [page] (repeated)\n"
        );
    }
}
