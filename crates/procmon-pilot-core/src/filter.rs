//! Process tree filtering
//!
//! Filtering is a pure function of the unfiltered forest and a
//! [`FilterConfig`]: it never mutates its input and always returns a freshly
//! built forest. Two gates decide whether a node is kept:
//!
//! - the **search gate** passes when the search term is empty, when the node's
//!   own name, pid, command line or user contains the term, or when at least
//!   one of its children survives filtering (subtree rescue);
//! - the **type gate** passes when the node's [`ProcessKind`] is included.
//!
//! The type gate is evaluated per node. A node that fails it is dropped along
//! with its whole subtree, even if some descendant would pass on its own.

use crate::constants::SYSTEM_USERS;
use procmon_rs::ProcessNode;

/// Search and type filter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Free text, matched case-insensitively after trimming
    pub search_term: String,
    pub include_system: bool,
    pub include_user: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            include_system: true,
            include_user: true,
        }
    }
}

impl FilterConfig {
    /// The search term as it is matched: trimmed and lower-cased
    pub fn needle(&self) -> String {
        self.search_term.trim().to_lowercase()
    }

    /// Whether filtering with this config returns the forest unchanged
    pub fn is_identity(&self) -> bool {
        self.include_system && self.include_user && self.needle().is_empty()
    }

    /// Whether the type gate lets a process of this kind through
    pub fn admits(&self, kind: ProcessKind) -> bool {
        match kind {
            ProcessKind::System => self.include_system,
            ProcessKind::User => self.include_user,
        }
    }
}

/// System vs user classification of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    System,
    User,
}

impl ProcessKind {
    /// Classify a process by its owner
    ///
    /// ```
    /// use procmon_pilot_core::filter::ProcessKind;
    /// use procmon_rs::ProcessNode;
    ///
    /// let daemon = ProcessNode { username: Some("Root".into()), ..Default::default() };
    /// let orphan = ProcessNode { username: None, ..Default::default() };
    /// let shell = ProcessNode { username: Some("alice".into()), ..Default::default() };
    ///
    /// assert_eq!(ProcessKind::of(&daemon), ProcessKind::System);
    /// assert_eq!(ProcessKind::of(&orphan), ProcessKind::System);
    /// assert_eq!(ProcessKind::of(&shell), ProcessKind::User);
    /// ```
    pub fn of(node: &ProcessNode) -> Self {
        if is_system_user(node.username.as_deref()) {
            ProcessKind::System
        } else {
            ProcessKind::User
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessKind::System => "system",
            ProcessKind::User => "user",
        }
    }
}

/// Whether an owner name denotes a reserved/service account or no owner at all
pub fn is_system_user(username: Option<&str>) -> bool {
    match username {
        None => true,
        Some(name) if name.is_empty() => true,
        Some(name) => {
            let lower = name.to_lowercase();
            SYSTEM_USERS.contains(&lower.as_str())
        }
    }
}

/// Whether a node's own text contains `needle`
///
/// `needle` must already be lower-cased (see [`FilterConfig::needle`]). An
/// empty needle matches everything.
pub fn matches_search(node: &ProcessNode, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(node.name.as_str())
        || node.pid.to_string().contains(needle)
        || node.cmdline.as_deref().is_some_and(contains)
        || node.username.as_deref().is_some_and(contains)
}

/// Filter a forest, returning a new forest
pub fn filter_forest(forest: &[ProcessNode], config: &FilterConfig) -> Vec<ProcessNode> {
    let needle = config.needle();
    filter_nodes(forest, &needle, config)
}

fn filter_nodes(nodes: &[ProcessNode], needle: &str, config: &FilterConfig) -> Vec<ProcessNode> {
    nodes
        .iter()
        .filter_map(|node| filter_node(node, needle, config))
        .collect()
}

fn filter_node(node: &ProcessNode, needle: &str, config: &FilterConfig) -> Option<ProcessNode> {
    if !config.admits(ProcessKind::of(node)) {
        return None;
    }

    let children = filter_nodes(&node.children, needle, config);
    if !children.is_empty() || matches_search(node, needle) {
        Some(node.with_children(children))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: i64, name: &str, user: Option<&str>, children: Vec<ProcessNode>) -> ProcessNode {
        ProcessNode {
            pid,
            name: name.to_string(),
            username: user.map(str::to_string),
            children,
            ..Default::default()
        }
    }

    fn sample_forest() -> Vec<ProcessNode> {
        vec![
            proc(
                1,
                "systemd",
                Some("root"),
                vec![
                    proc(
                        800,
                        "sshd",
                        Some("root"),
                        vec![proc(
                            900,
                            "bash",
                            Some("alice"),
                            vec![proc(950, "vim", Some("alice"), vec![])],
                        )],
                    ),
                    proc(300, "cron", Some("daemon"), vec![]),
                ],
            ),
            proc(
                2000,
                "tmux",
                Some("alice"),
                vec![
                    proc(2001, "grep", Some("alice"), vec![]),
                    proc(2002, "top", Some("alice"), vec![]),
                ],
            ),
            proc(3000, "kworker", None, vec![]),
        ]
    }

    fn names(forest: &[ProcessNode]) -> Vec<&str> {
        forest.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_identity_config_returns_forest_unchanged() {
        let forest = sample_forest();
        let config = FilterConfig::default();
        assert!(config.is_identity());
        assert_eq!(filter_forest(&forest, &config), forest);

        // Whitespace-only search is still identity
        let config = FilterConfig {
            search_term: "   ".to_string(),
            ..Default::default()
        };
        assert!(config.is_identity());
        assert_eq!(filter_forest(&forest, &config), forest);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let forest = sample_forest();
        for term in ["", "vim", "a", "20", "ROOT", "nothing-here"] {
            for include_system in [true, false] {
                for include_user in [true, false] {
                    let config = FilterConfig {
                        search_term: term.to_string(),
                        include_system,
                        include_user,
                    };
                    let once = filter_forest(&forest, &config);
                    let twice = filter_forest(&once, &config);
                    assert_eq!(once, twice, "config {:?}", config);
                }
            }
        }
    }

    #[test]
    fn test_descendant_match_rescues_ancestor() {
        let forest = vec![proc(
            10,
            "bash",
            Some("alice"),
            vec![proc(11, "grep", Some("alice"), vec![])],
        )];
        let config = FilterConfig {
            search_term: "grep".to_string(),
            ..Default::default()
        };

        let result = filter_forest(&forest, &config);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "bash");
        assert_eq!(result[0].children, vec![proc(11, "grep", Some("alice"), vec![])]);
        assert_eq!(ProcessKind::of(&result[0]), ProcessKind::User);
    }

    #[test]
    fn test_non_matching_siblings_are_dropped() {
        let config = FilterConfig {
            search_term: "GREP".to_string(),
            ..Default::default()
        };
        let result = filter_forest(&sample_forest(), &config);

        assert_eq!(names(&result), vec!["tmux"]);
        assert_eq!(names(&result[0].children), vec!["grep"]);
    }

    #[test]
    fn test_deep_match_keeps_whole_path() {
        let config = FilterConfig {
            search_term: "vim".to_string(),
            ..Default::default()
        };
        let result = filter_forest(&sample_forest(), &config);

        assert_eq!(names(&result), vec!["systemd"]);
        let sshd = &result[0].children;
        assert_eq!(names(sshd), vec!["sshd"]);
        assert_eq!(names(&sshd[0].children), vec!["bash"]);
        assert_eq!(names(&sshd[0].children[0].children), vec!["vim"]);
    }

    #[test]
    fn test_match_keeps_filtered_children_only() {
        // tmux matches itself; its children are still filtered
        let config = FilterConfig {
            search_term: "tmux".to_string(),
            ..Default::default()
        };
        let result = filter_forest(&sample_forest(), &config);
        assert_eq!(names(&result), vec!["tmux"]);
        assert!(result[0].children.is_empty());
    }

    #[test]
    fn test_search_matches_pid_cmdline_and_user() {
        let node = ProcessNode {
            pid: 4242,
            name: "python3".to_string(),
            cmdline: Some("/usr/bin/python3 -m http.server".to_string()),
            username: Some("Deploy".to_string()),
            ..Default::default()
        };
        assert!(matches_search(&node, "424"));
        assert!(matches_search(&node, "http.server"));
        assert!(matches_search(&node, "deploy"));
        assert!(matches_search(&node, ""));
        assert!(!matches_search(&node, "nginx"));
    }

    #[test]
    fn test_type_classification() {
        assert!(is_system_user(None));
        assert!(is_system_user(Some("")));
        assert!(is_system_user(Some("root")));
        assert!(is_system_user(Some("WWW-DATA")));
        assert!(!is_system_user(Some("alice")));
        assert_eq!(ProcessKind::User.label(), "user");
    }

    #[test]
    fn test_type_gate_user_only() {
        let forest = vec![
            proc(1, "a", Some("root"), vec![]),
            proc(2, "b", Some("alice"), vec![]),
        ];
        let config = FilterConfig {
            include_system: false,
            include_user: true,
            ..Default::default()
        };
        let result = filter_forest(&forest, &config);
        assert_eq!(result, vec![proc(2, "b", Some("alice"), vec![])]);
    }

    #[test]
    fn test_type_gate_drops_subtree() {
        // bash (alice) lives under root-owned sshd: no rescue through the type gate
        let config = FilterConfig {
            include_system: false,
            ..Default::default()
        };
        let result = filter_forest(&sample_forest(), &config);
        assert_eq!(names(&result), vec!["tmux"]);
        assert_eq!(names(&result[0].children), vec!["grep", "top"]);
    }

    #[test]
    fn test_nothing_matches() {
        let config = FilterConfig {
            search_term: "does-not-exist".to_string(),
            ..Default::default()
        };
        assert!(filter_forest(&sample_forest(), &config).is_empty());
        assert!(filter_forest(&[], &FilterConfig::default()).is_empty());

        let config = FilterConfig {
            include_system: false,
            include_user: false,
            ..Default::default()
        };
        assert!(filter_forest(&sample_forest(), &config).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let forest = sample_forest();
        let before = forest.clone();
        let config = FilterConfig {
            search_term: "vim".to_string(),
            include_system: true,
            include_user: true,
        };
        let _ = filter_forest(&forest, &config);
        assert_eq!(forest, before);
    }
}
