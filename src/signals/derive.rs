// src/signals/derive.rs
//! Derived signals: commit-day spread and file-naming conventions.
//! Pure functions over what the host returned.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::BTreeSet;

use super::CommitInfo;

/// Distinct UTC calendar dates among commit timestamps (undated commits ignored).
pub fn unique_commit_days(commits: &[CommitInfo]) -> usize {
    commits
        .iter()
        .filter_map(|c| c.date.map(|d| d.date_naive()))
        .collect::<BTreeSet<_>>()
        .len()
}

/// First line of each of the newest `max` commit messages.
pub fn recent_subjects(commits: &[CommitInfo], max: usize) -> Vec<String> {
    commits
        .iter()
        .take(max)
        .map(|c| c.message.lines().next().unwrap_or_default().trim().to_string())
        .collect()
}

/// Any path follows a test/spec naming convention
/// (`tests/`, `__tests__/`, `spec/`, `tests.py`, `test_*.py`, `*.test.ts`,
/// `*_test.go`, `FooTest.java`, ...).
pub fn has_tests(paths: &[String]) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?i)(^|/)(tests?|specs?|__tests__|testing)/|(^|/)test_[^/]+$|(^|/)(tests?|specs?)\.[a-z0-9]+$|[._-](test|tests|spec|specs)\.[a-z0-9]+$|(?-i:[a-z0-9](Test|Tests|Spec)\.[a-z]+$)|(^|/)conftest\.py$",
        )
        .expect("test path regex")
    });
    paths.iter().any(|p| re.is_match(p))
}

/// Any path is a known lint/format configuration file.
pub fn has_linting(paths: &[String]) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"(?i)(^|/)(\.eslintrc(\.[a-z]+)?|eslint\.config\.[a-z]+|\.prettierrc(\.[a-z]+)?|prettier\.config\.[a-z]+|\.editorconfig|tslint\.json|\.stylelintrc(\.[a-z]+)?|biome\.jsonc?|\.?rustfmt\.toml|\.?clippy\.toml|\.flake8|\.pylintrc|ruff\.toml|\.ruff\.toml|\.golangci\.ya?ml|\.rubocop\.yml|\.clang-format|\.clang-tidy|\.pre-commit-config\.yaml)$",
        )
        .expect("lint path regex")
    });
    paths.iter().any(|p| re.is_match(p))
}

/// Package manifests recognised at the repository root.
pub const ROOT_MANIFESTS: [&str; 14] = [
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "Gemfile",
    "composer.json",
    "mix.exs",
    "Package.swift",
    "pubspec.yaml",
];

pub fn has_package_manifest(paths: &[String]) -> bool {
    paths
        .iter()
        .any(|p| !p.contains('/') && ROOT_MANIFESTS.contains(&p.as_str()))
}

/// Keep at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn paths(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn commit(y: i32, m: u32, d: u32, h: u32, msg: &str) -> CommitInfo {
        CommitInfo {
            date: Some(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()),
            message: msg.to_string(),
        }
    }

    #[test]
    fn counts_distinct_days_not_commits() {
        let commits = vec![
            commit(2024, 3, 1, 9, "a"),
            commit(2024, 3, 1, 23, "b"),
            commit(2024, 3, 2, 0, "c"),
            CommitInfo {
                date: None,
                message: "undated".into(),
            },
        ];
        assert_eq!(unique_commit_days(&commits), 2);
        assert_eq!(unique_commit_days(&[]), 0);
    }

    #[test]
    fn subjects_keep_first_line_only() {
        let commits = vec![
            commit(2024, 1, 1, 0, "feat: add parser\n\nlong body"),
            commit(2024, 1, 1, 0, "fix: typo"),
        ];
        assert_eq!(recent_subjects(&commits, 1), vec!["feat: add parser"]);
        assert_eq!(recent_subjects(&commits, 20).len(), 2);
    }

    #[test]
    fn detects_test_conventions() {
        for p in [
            "tests/api.rs",
            "src/__tests__/App.jsx",
            "spec/models/user_spec.rb",
            "pkg/server_test.go",
            "src/App.test.tsx",
            "lib/foo.spec.js",
            "test_utils.py",
            "src/test/java/FooTest.java",
            "src/main/kotlin/OrderServiceTest.kt",
            "shop/tests.py",
            "src/tests.rs",
            "test.js",
            "spec.rb",
        ] {
            assert!(has_tests(&paths(&[p])), "{p}");
        }
        assert!(!has_tests(&paths(&["src/inspector.js", "README.md", "contest.md"])));
        assert!(!has_tests(&paths(&["src/latest.js", "docs/attestation.md", "Contest.java"])));
    }

    #[test]
    fn module_level_test_files_count_as_tests() {
        assert!(has_tests(&paths(&["shop/models.py", "shop/tests.py", "manage.py"])));
        assert!(has_tests(&paths(&["src/lib.rs", "src/tests.rs"])));
        assert!(has_tests(&paths(&["test.js", "index.js"])));
    }

    #[test]
    fn detects_lint_configs_by_file_name() {
        for p in [
            ".eslintrc.json",
            "web/.prettierrc",
            ".editorconfig",
            "rustfmt.toml",
            ".golangci.yml",
            "eslint.config.js",
        ] {
            assert!(has_linting(&paths(&[p])), "{p}");
        }
        assert!(!has_linting(&paths(&["src/eslint_notes.md", "main.rs"])));
    }

    #[test]
    fn manifest_must_be_at_root() {
        assert!(has_package_manifest(&paths(&["package.json"])));
        assert!(has_package_manifest(&paths(&["src/main.rs", "Cargo.toml"])));
        assert!(!has_package_manifest(&paths(&["web/package.json"])));
    }

    #[test]
    fn truncation_is_by_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}
