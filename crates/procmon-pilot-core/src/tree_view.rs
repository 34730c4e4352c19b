//! Expandable tree view state
//!
//! Nodes are identified by their pid path from the root, so expansion
//! survives re-filtering and refreshes as long as the same processes are
//! still there. Nodes never seen before start collapsed.

use procmon_rs::ProcessNode;
use std::collections::HashSet;

/// Pids from a root down to a node
pub type NodePath = Vec<i64>;

/// Set of expanded nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<NodePath>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &[i64]) -> bool {
        self.expanded.contains(path)
    }

    /// Flip one node; returns the new state
    pub fn toggle(&mut self, path: &[i64]) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_vec());
            true
        }
    }

    pub fn expand(&mut self, path: &[i64]) {
        self.expanded.insert(path.to_vec());
    }

    pub fn collapse(&mut self, path: &[i64]) {
        self.expanded.remove(path);
    }

    /// Expand every node that has children in `forest`
    pub fn expand_all(&mut self, forest: &[ProcessNode]) {
        fn walk(nodes: &[ProcessNode], path: &mut NodePath, expanded: &mut HashSet<NodePath>) {
            for node in nodes {
                if node.has_children() {
                    path.push(node.pid);
                    expanded.insert(path.clone());
                    walk(&node.children, path, expanded);
                    path.pop();
                }
            }
        }
        walk(forest, &mut Vec::new(), &mut self.expanded);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forget expanded paths that no longer exist in `forest`
    pub fn retain_present(&mut self, forest: &[ProcessNode]) {
        fn walk(nodes: &[ProcessNode], path: &mut NodePath, present: &mut HashSet<NodePath>) {
            for node in nodes {
                path.push(node.pid);
                present.insert(path.clone());
                walk(&node.children, path, present);
                path.pop();
            }
        }
        if self.expanded.is_empty() {
            return;
        }
        let mut present = HashSet::new();
        walk(forest, &mut Vec::new(), &mut present);
        self.expanded.retain(|path| present.contains(path));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// One visible line of the tree
#[derive(Debug, Clone)]
pub struct TreeRow<'a> {
    pub node: &'a ProcessNode,
    pub path: NodePath,
    /// Depth in tree (0 = root)
    pub depth: usize,
    /// Whether this is the last child at its level
    pub is_last: bool,
    /// Per ancestor level: whether that ancestor has more siblings below
    pub ancestors_have_siblings: Vec<bool>,
    pub has_children: bool,
    pub expanded: bool,
}

impl TreeRow<'_> {
    /// Connector prefix drawn before the node ("│ ├─" style); empty for roots
    pub fn tree_prefix(&self) -> String {
        if self.depth == 0 {
            return String::new();
        }
        let mut prefix = String::new();
        // The root level draws no connector column
        for &has_sibling in self.ancestors_have_siblings.iter().skip(1) {
            prefix.push_str(if has_sibling { "│ " } else { "  " });
        }
        prefix.push_str(if self.is_last { "└─" } else { "├─" });
        prefix
    }

    /// Expand marker: "▾" open, "▸" closed, blank for leaves
    pub fn marker(&self) -> &'static str {
        match (self.has_children, self.expanded) {
            (false, _) => " ",
            (true, true) => "▾",
            (true, false) => "▸",
        }
    }
}

/// Rows visible under the current expansion, in display order
///
/// Children of collapsed nodes are not emitted.
pub fn visible_rows<'a>(forest: &'a [ProcessNode], expansion: &ExpansionState) -> Vec<TreeRow<'a>> {
    fn add_rows<'a>(
        rows: &mut Vec<TreeRow<'a>>,
        nodes: &'a [ProcessNode],
        expansion: &ExpansionState,
        parent_path: &[i64],
        ancestors_have_siblings: Vec<bool>,
    ) {
        let count = nodes.len();
        for (i, node) in nodes.iter().enumerate() {
            let is_last = i + 1 == count;
            let mut path = parent_path.to_vec();
            path.push(node.pid);
            let expanded = node.has_children() && expansion.is_expanded(&path);

            rows.push(TreeRow {
                node,
                path: path.clone(),
                depth: parent_path.len(),
                is_last,
                ancestors_have_siblings: ancestors_have_siblings.clone(),
                has_children: node.has_children(),
                expanded,
            });

            if expanded {
                let mut child_ancestors = ancestors_have_siblings.clone();
                child_ancestors.push(!is_last);
                add_rows(rows, &node.children, expansion, &path, child_ancestors);
            }
        }
    }

    let mut rows = Vec::new();
    add_rows(&mut rows, forest, expansion, &[], Vec::new());
    rows
}
