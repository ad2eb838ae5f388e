//! Which vertices show support labels, and how they read.

use crate::model::support::{Support, SupportScale};
use crate::model::tree::{PhyloTree, VertexIndex};

/// Separator between the merged values of one clade
pub const SUPPORT_SEPARATOR: &str = "/";

/// Returns whether vertex `index` carries a support label.
///
/// Leaves and the root never do. In a rooted tree (bifurcating root) the
/// two branches at the root are one split of the unrooted tree, so its
/// children don't either.
pub fn shows_support(tree: &PhyloTree, index: VertexIndex) -> bool {
    let vertex = tree.vertex(index);
    if vertex.is_leaf() || vertex.is_root() {
        return false;
    }
    !(tree.is_rooted() && vertex.parent() == Some(tree.root_index()))
}

/// Renders merged supports, e.g. `*/87.3/-`.
///
/// # Example
/// ```
/// use fungphy::annotate::display::format_supports;
/// use fungphy::model::{Support, SupportScale};
///
/// let supports = [Support::Value(100.0), Support::Value(87.3), Support::Missing];
/// assert_eq!(format_supports(&supports, SupportScale::Auto), "*/87.3/-");
/// ```
pub fn format_supports(supports: &[Support], scale: SupportScale) -> String {
    supports
        .iter()
        .map(|s| s.display(scale))
        .collect::<Vec<_>>()
        .join(SUPPORT_SEPARATOR)
}

/// Support label of vertex `index`: its merged supports if present,
/// otherwise its own support value.
///
/// # Returns
/// `None` if the vertex shows no label or has no support.
pub fn support_label(tree: &PhyloTree, index: VertexIndex, scale: SupportScale) -> Option<String> {
    if !shows_support(tree, index) {
        return None;
    }

    let vertex = tree.vertex(index);
    match vertex.multi_support() {
        Some(supports) => Some(format_supports(supports, scale)),
        None => vertex.support().map(|s| Support::Value(s).display(scale)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newick::parse_str;

    #[test]
    fn test_rooted_tree_hides_root_children() {
        let tree = parse_str("(((A,B)90,C)80,(D,E)70);").unwrap();
        let root = tree.root();
        let left = root.children()[0];
        let inner = tree.vertex(left).children()[0];

        assert!(!shows_support(&tree, tree.root_index()));
        assert!(!shows_support(&tree, left));
        assert!(shows_support(&tree, inner));
        assert_eq!(support_label(&tree, inner, SupportScale::Auto), Some("90".to_string()));
        assert_eq!(support_label(&tree, left, SupportScale::Auto), None);
    }

    #[test]
    fn test_unrooted_tree_shows_root_children() {
        let tree = parse_str("((A,B)100,C,(D,E)0.5);").unwrap();
        let root = tree.root();
        let first = root.children()[0];
        let last = root.children()[2];

        assert_eq!(support_label(&tree, first, SupportScale::Auto), Some("*".to_string()));
        assert_eq!(support_label(&tree, last, SupportScale::Auto), Some("0.5".to_string()));
        assert_eq!(support_label(&tree, root.children()[1], SupportScale::Auto), None);
    }
}
