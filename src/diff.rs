//! Unified diffs for changed files.
//!
//! Recipes report whole-file before/after text; this module renders the
//! human-facing diff and the per-run counters external reporting sums up.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Line counters for one or more diffs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DiffStats {
    pub files_changed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl DiffStats {
    pub fn merge(&mut self, other: &DiffStats) {
        self.files_changed += other.files_changed;
        self.lines_added += other.lines_added;
        self.lines_removed += other.lines_removed;
    }
}

/// Generate a unified diff between the original and rewritten text of one
/// file, with `context_lines` lines of context around each hunk.
pub fn unified_diff(path: &str, before: &str, after: &str, context_lines: usize) -> (String, DiffStats) {
    let diff = TextDiff::from_lines(before, after);

    let mut stats = DiffStats::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.lines_added += 1,
            ChangeTag::Delete => stats.lines_removed += 1,
            ChangeTag::Equal => {}
        }
    }
    if stats.lines_added > 0 || stats.lines_removed > 0 {
        stats.files_changed = 1;
    }

    let mut output = String::new();
    output.push_str(&format!("--- {path}\n"));
    output.push_str(&format!("+++ {path}\n"));
    output.push_str(&diff.unified_diff().context_radius(context_lines).to_string());

    (output, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_reports_removed_line() {
        let before = "import java.util.List;\nclass A {\n    int x;\n}\n";
        let after = "class A {\n    int x;\n}\n";

        let (diff, stats) = unified_diff("src/A.java", before, after, 3);

        assert!(diff.contains("--- src/A.java"));
        assert!(diff.contains("+++ src/A.java"));
        assert!(diff.contains("-import java.util.List;"));
        assert_eq!(stats.files_changed, 1);
        assert_eq!(stats.lines_added, 0);
        assert_eq!(stats.lines_removed, 1);
    }

    #[test]
    fn test_unified_diff_no_changes() {
        let text = "class A {\n}\n";
        let (_, stats) = unified_diff("A.java", text, text, 3);
        assert_eq!(stats.files_changed, 0);
        assert_eq!(stats.lines_added, 0);
        assert_eq!(stats.lines_removed, 0);
    }

    #[test]
    fn test_stats_merge() {
        let mut total = DiffStats { files_changed: 1, lines_added: 5, lines_removed: 2 };
        total.merge(&DiffStats { files_changed: 2, lines_added: 3, lines_removed: 1 });
        assert_eq!(total.files_changed, 3);
        assert_eq!(total.lines_added, 8);
        assert_eq!(total.lines_removed, 3);
    }
}
