//! Labeled tree nodes produced by the renderer and the walker.

use serde::{Deserialize, Serialize};

/// One node of the rendered hardware tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Direct child with the given label.
    pub fn child(&self, label: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Follow a chain of child labels.
    pub fn find(&self, labels: &[&str]) -> Option<&TreeNode> {
        labels.iter().try_fold(self, |node, label| node.child(label))
    }

    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }

    /// Render as an indented text tree.
    ///
    /// A node with an empty label (the walk root) is not printed itself; its
    /// children are printed at top level.
    pub fn to_text(&self) -> String {
        if self.label.is_empty() {
            format_forest(&self.children)
        } else {
            format_forest(std::slice::from_ref(self))
        }
    }
}

/// Stable sort by label. Nodes with equal labels keep their relative order.
pub fn sort_by_label(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| a.label.cmp(&b.label));
}

/// True if labels are non-decreasing.
pub fn is_sorted_by_label(nodes: &[TreeNode]) -> bool {
    nodes.windows(2).all(|w| w[0].label <= w[1].label)
}

/// Render a list of sibling trees, one node per line.
pub fn format_forest(nodes: &[TreeNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node.label);
        out.push('\n');
        write_children(&node.children, "", &mut out);
    }
    out
}

fn write_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&child.label);
        out.push('\n');

        let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
        write_children(&child.children, &nested, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::branch(
            "CPU",
            vec![
                TreeNode::branch("Intel", vec![TreeNode::leaf("Family: 6")]),
                TreeNode::leaf("Has SMP: Yes"),
            ],
        )
    }

    #[test]
    fn test_count_and_find() {
        let tree = sample();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.find(&["Intel", "Family: 6"]).map(|n| n.is_leaf()), Some(true));
        assert!(tree.find(&["AMD"]).is_none());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut nodes = vec![
            TreeNode::branch("b", vec![TreeNode::leaf("1")]),
            TreeNode::leaf("a"),
            TreeNode::branch("b", vec![TreeNode::leaf("2")]),
        ];
        sort_by_label(&mut nodes);
        assert!(is_sorted_by_label(&nodes));
        assert_eq!(nodes[1].children[0].label, "1");
        assert_eq!(nodes[2].children[0].label, "2");
    }

    #[test]
    fn test_text_format() {
        let text = sample().to_text();
        assert_eq!(text, "CPU\n├── Intel\n│   └── Family: 6\n└── Has SMP: Yes\n");
    }

    #[test]
    fn test_text_format_skips_empty_root() {
        let root = TreeNode::branch("", vec![sample()]);
        assert!(root.to_text().starts_with("CPU\n"));
    }

    #[test]
    fn test_json_omits_empty_children() {
        let json = serde_json::to_string(&TreeNode::leaf("x")).unwrap();
        assert_eq!(json, r#"{"label":"x"}"#);
    }
}
