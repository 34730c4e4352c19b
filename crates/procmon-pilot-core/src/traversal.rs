//! Forest traversal helpers

use crate::constants::UNKNOWN_STATUS;
use procmon_rs::ProcessNode;
use std::collections::HashMap;

/// Depth-first, parent-before-children iterator over every node of a forest
///
/// Created by [`flatten`].
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    stack: Vec<std::slice::Iter<'a, ProcessNode>>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a ProcessNode;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    if node.has_children() {
                        self.stack.push(node.children.iter());
                    }
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Walk every node of a forest in pre-order
///
/// ```
/// use procmon_pilot_core::traversal::flatten;
/// use procmon_rs::ProcessNode;
///
/// let leaf = ProcessNode { pid: 2, ..Default::default() };
/// let root = ProcessNode { pid: 1, children: vec![leaf], ..Default::default() };
/// let other = ProcessNode { pid: 3, ..Default::default() };
///
/// let pids: Vec<i64> = flatten(&[root, other]).map(|n| n.pid).collect();
/// assert_eq!(pids, vec![1, 2, 3]);
/// ```
pub fn flatten(forest: &[ProcessNode]) -> Flatten<'_> {
    Flatten {
        stack: vec![forest.iter()],
    }
}

/// Count nodes by lower-cased status; a missing status counts as "unknown"
pub fn histogram_by_status<'a, I>(nodes: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a ProcessNode>,
{
    let mut counts = HashMap::new();
    for node in nodes {
        let status = node
            .status
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        *counts.entry(status).or_insert(0) += 1;
    }
    counts
}

/// Number of nodes in a forest
pub fn count_nodes(forest: &[ProcessNode]) -> usize {
    flatten(forest).count()
}
