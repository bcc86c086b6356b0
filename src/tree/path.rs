//! Root-to-node path resolution
//!
//! Finds where a label lives in the tree and expresses that location as a
//! context string for grounding drill-down generation.
//!
//! Labels are not guaranteed unique. Lookup is depth-first pre-order, so
//! the first match wins: an ancestor before its descendants, an earlier
//! subtree before later siblings. With duplicate labels this may resolve a
//! different node than the one the user activated; callers get the
//! pre-order match, not an error.

use super::{Node, Tree};

/// Separator used when joining a path into a context string
pub const CONTEXT_SEPARATOR: &str = " > ";

/// Resolve the path from the root to the first node labeled `target_label`.
///
/// Returns the labels from the root through the match, inclusive, or
/// `None` when no node carries the label. O(tree size); fine for
/// interactive maps of tens to hundreds of nodes.
pub fn path_to<'a>(tree: &'a Tree, target_label: &str) -> Option<Vec<&'a str>> {
    let mut path = Vec::new();
    descend(&tree.root, target_label, &mut path).then_some(path)
}

/// Join a resolved path into a context string, e.g. `"Volcanoes > Types"`.
pub fn context_string(path: &[&str]) -> String {
    path.join(CONTEXT_SEPARATOR)
}

fn descend<'a>(node: &'a Node, target: &str, path: &mut Vec<&'a str>) -> bool {
    path.push(node.label.as_str());
    if node.label == target {
        return true;
    }
    for child in &node.children {
        if descend(child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tree() -> Tree {
        Tree::from_raw(&json!({
            "content": "Volcanoes",
            "children": [
                {"content": "Types", "children": [
                    {"content": "Shield", "children": []},
                    {"content": "Stratovolcano", "children": []},
                ]},
                {"content": "Eruptions", "children": [
                    {"content": "Shield", "children": []},
                ]},
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_root_resolves_to_itself() {
        let tree = sample_tree();
        assert_eq!(path_to(&tree, "Volcanoes"), Some(vec!["Volcanoes"]));
    }

    #[test]
    fn test_nested_path() {
        let tree = sample_tree();
        assert_eq!(
            path_to(&tree, "Stratovolcano"),
            Some(vec!["Volcanoes", "Types", "Stratovolcano"])
        );
    }

    #[test]
    fn test_duplicate_label_first_preorder_match_wins() {
        let tree = sample_tree();
        // "Shield" appears under both Types and Eruptions; the earlier
        // subtree wins.
        assert_eq!(
            path_to(&tree, "Shield"),
            Some(vec!["Volcanoes", "Types", "Shield"])
        );
    }

    #[test]
    fn test_ancestor_beats_descendant() {
        let tree = Tree::from_raw(&json!({
            "content": "A",
            "children": [
                {"content": "B", "children": [
                    {"content": "B", "children": []},
                ]},
            ]
        }))
        .unwrap();
        assert_eq!(path_to(&tree, "B"), Some(vec!["A", "B"]));
    }

    #[test]
    fn test_missing_label_is_none() {
        let tree = sample_tree();
        assert_eq!(path_to(&tree, "Geysers"), None);
    }

    #[test]
    fn test_context_string_join() {
        let tree = sample_tree();
        let path = path_to(&tree, "Types").unwrap();
        assert_eq!(context_string(&path), "Volcanoes > Types");
    }

    #[test]
    fn test_context_string_single_segment() {
        assert_eq!(context_string(&["Volcanoes"]), "Volcanoes");
    }
}
