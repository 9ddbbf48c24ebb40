//! Rule matching
//!
//! Selects the files a rule applies to: the rule's glob is applied to either the
//! changed or the untracked files, then files whose extension is ignored and
//! files without any extension are dropped. Source order is preserved.

use crate::config::Rule;
use crate::shared::glob::extension;
use crate::svn::FileSet;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct RuleMatcher {
    ignore_extensions: HashSet<String>,
}

impl RuleMatcher {
    pub fn new(ignore_extensions: HashSet<String>) -> Self {
        Self { ignore_extensions }
    }

    /// Files `rule` should be dispatched for. Skipped rules never match.
    pub fn select(&self, rule: &Rule, files: &FileSet) -> Vec<String> {
        if rule.skip {
            return Vec::new();
        }

        files
            .source(rule.non_versioned)
            .iter()
            .filter(|file| rule.glob.is_match(file))
            .filter(|file| match extension(file) {
                Some(ext) => !self.ignore_extensions.contains(ext),
                None => false,
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rule;
    use crate::engine::dispatch::{CommandDefinition, ShellCommand};
    use crate::shared::glob::PatternMatcher;
    use crate::svn::{FileStatusRecord, StatusKind};

    fn rule(glob: &str) -> Rule {
        Rule {
            glob: PatternMatcher::new(glob).unwrap(),
            command: CommandDefinition::Shell(ShellCommand::parse("formatter --write").unwrap()),
            skip: false,
            non_versioned: false,
        }
    }

    fn matcher(ignore: &[&str]) -> RuleMatcher {
        RuleMatcher::new(ignore.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_ignored_extension_is_excluded() {
        let files = FileSet::classify(&[
            FileStatusRecord::new("a.js", StatusKind::Modified),
            FileStatusRecord::new("b.map", StatusKind::Modified),
        ]);
        let matched = matcher(&[".map"]).select(&rule("*"), &files);
        assert_eq!(matched, vec!["a.js"]);

        let matched = matcher(&[".map"]).select(&rule("*.js"), &files);
        assert_eq!(matched, vec!["a.js"]);
    }

    #[test]
    fn test_non_versioned_rule_uses_untracked_files() {
        let files = FileSet::classify(&[
            FileStatusRecord::new("x.ts", StatusKind::Unversioned),
            FileStatusRecord::new("y.txt", StatusKind::Unversioned),
            FileStatusRecord::new("z.ts", StatusKind::Modified),
        ]);
        let mut untracked_rule = rule("*.ts");
        untracked_rule.non_versioned = true;

        assert_eq!(matcher(&[]).select(&untracked_rule, &files), vec!["x.ts"]);
        assert_eq!(matcher(&[]).select(&rule("*.ts"), &files), vec!["z.ts"]);
    }

    #[test]
    fn test_files_without_extension_are_excluded() {
        let files = FileSet::explicit(vec![
            "Makefile".into(),
            "src/.gitignore".into(),
            "src/main.c".into(),
        ]);
        assert_eq!(matcher(&[]).select(&rule("**"), &files), vec!["src/main.c"]);
    }

    #[test]
    fn test_skipped_rule_matches_nothing() {
        let files = FileSet::explicit(vec!["a.js".into(), "b.js".into()]);
        let mut skipped = rule("*.js");
        skipped.skip = true;
        assert!(matcher(&[]).select(&skipped, &files).is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let files = FileSet::explicit(vec![
            "z.js".into(),
            "lib/a.js".into(),
            "m.css".into(),
            "b.js".into(),
        ]);
        assert_eq!(
            matcher(&[]).select(&rule("*.js"), &files),
            vec!["z.js", "lib/a.js", "b.js"]
        );
    }

    #[test]
    fn test_path_glob_only_matches_under_directory() {
        let files = FileSet::explicit(vec!["src/a.js".into(), "test/a.js".into()]);
        assert_eq!(matcher(&[]).select(&rule("src/**/*.js"), &files), vec!["src/a.js"]);
    }
}
