// src/prompt.rs
//! Prompt assembly: `(Role, &RepositorySignals) -> EvaluationRequest`.
//! Pure and deterministic; the output is bounded regardless of input size.

use crate::evaluation::Role;
use crate::rubric::{role_emphasis, SYSTEM_PROMPT};
use crate::signals::derive::truncate_chars;
use crate::signals::{RepositorySignals, COMMIT_MESSAGES_MAX, README_MAX_CHARS};

/// File paths shown to the scorer (a sample of the truncated list).
pub const PROMPT_FILE_SAMPLE: usize = 50;
/// Per-line bound for free-text fields echoed into the prompt.
pub const PROMPT_LINE_MAX_CHARS: usize = 300;

/// One request for the generative scorer: the fixed rubric as system
/// instruction plus the rendered repository facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub role: Role,
    pub system: &'static str,
    pub user: String,
}

impl EvaluationRequest {
    pub fn len_chars(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }
}

pub fn assemble(role: Role, signals: &RepositorySignals) -> EvaluationRequest {
    let line = |s: &str| truncate_chars(&s.replace(['\r', '\n'], " "), PROMPT_LINE_MAX_CHARS);

    let mut out = String::with_capacity(4096 + signals.readme_text.len());
    out.push_str(&format!(
        "Evaluate this GitHub repository for a {} role.\n",
        role.as_str().replace('-', " ")
    ));
    out.push('\n');

    out.push_str("REPOSITORY DATA:\n");
    out.push_str(&format!("- Name: {}\n", line(&signals.name)));
    out.push_str(&format!("- Description: {}\n", line(&signals.description)));
    out.push_str(&format!("- Primary Language: {}\n", line(&signals.primary_language)));
    out.push_str(&format!("- Stars: {}\n", signals.star_count));
    out.push_str(&format!("- Forks: {}\n", signals.fork_count));
    out.push_str(&format!("- Created: {}\n", line(&signals.created_at)));
    out.push_str(&format!("- Last Updated: {}\n", line(&signals.updated_at)));
    out.push_str(&format!("- Total Commits (last 100): {}\n", signals.commit_count));
    out.push_str(&format!("- Unique Commit Days: {}\n", signals.unique_commit_days));
    out.push_str(&format!("- Has Tests: {}\n", signals.has_tests));
    out.push_str(&format!("- Has Linting Config: {}\n", signals.has_linting));
    out.push_str(&format!("- Has Package Manifest: {}\n", signals.has_package_manifest));
    out.push('\n');

    out.push_str(&format!("ROLE EMPHASIS ({}):\n", role.label()));
    out.push_str(role_emphasis(role));
    out.push_str("\n\n");

    out.push_str("FILE STRUCTURE (sample):\n");
    for path in signals.file_paths.iter().take(PROMPT_FILE_SAMPLE) {
        out.push_str(&line(path));
        out.push('\n');
    }
    out.push('\n');

    out.push_str("RECENT COMMIT MESSAGES:\n");
    for msg in signals.recent_commit_messages.iter().take(COMMIT_MESSAGES_MAX) {
        out.push_str(&line(msg));
        out.push('\n');
    }
    out.push('\n');

    out.push_str("README CONTENT:\n");
    if signals.has_readme() {
        out.push_str(&truncate_chars(&signals.readme_text, README_MAX_CHARS));
    } else {
        out.push_str("NO README FOUND");
    }
    out.push_str("\n\nProvide your evaluation as JSON only.");

    EvaluationRequest {
        role,
        system: SYSTEM_PROMPT,
        user: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::FILE_LIST_MAX;

    fn sample() -> RepositorySignals {
        RepositorySignals {
            name: "demo".into(),
            description: "A demo".into(),
            primary_language: "Rust".into(),
            star_count: 3,
            fork_count: 1,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-02-01T00:00:00Z".into(),
            readme_text: "# Demo\nRun `cargo run`.".into(),
            file_paths: vec!["src/main.rs".into(), "Cargo.toml".into()],
            commit_count: 12,
            unique_commit_days: 5,
            recent_commit_messages: vec!["feat: x".into()],
            has_tests: false,
            has_linting: true,
            has_package_manifest: true,
        }
    }

    #[test]
    fn identical_inputs_render_identically() {
        let s = sample();
        for role in Role::ALL {
            assert_eq!(assemble(role, &s), assemble(role, &s));
        }
    }

    #[test]
    fn renders_role_emphasis_and_facts() {
        let req = assemble(Role::DataMl, &sample());
        assert_eq!(req.system, SYSTEM_PROMPT);
        assert!(req.user.starts_with("Evaluate this GitHub repository for a data ml role."));
        assert!(req.user.contains(role_emphasis(Role::DataMl)));
        assert!(req.user.contains("- Has Tests: false"));
        assert!(req.user.contains("- Unique Commit Days: 5"));
        assert!(req.user.contains("src/main.rs"));
        assert!(req.user.ends_with("Provide your evaluation as JSON only."));
    }

    #[test]
    fn missing_readme_is_stated() {
        let mut s = sample();
        s.readme_text = "   ".into();
        assert!(assemble(Role::Backend, &s).user.contains("NO README FOUND"));
    }

    #[test]
    fn oversized_signals_stay_bounded() {
        let mut s = sample();
        s.readme_text = "r".repeat(100_000);
        s.description = "d".repeat(100_000);
        s.file_paths = (0..10_000).map(|i| format!("f{i}")).collect();
        s.recent_commit_messages = (0..500).map(|i| format!("m{i}\nbody")).collect();
        let req = assemble(Role::Frontend, &s);

        let bound = SYSTEM_PROMPT.chars().count()
            + README_MAX_CHARS
            + (PROMPT_FILE_SAMPLE + COMMIT_MESSAGES_MAX + 12) * (PROMPT_LINE_MAX_CHARS + 40)
            + 1_000;
        assert!(req.len_chars() < bound, "{} >= {}", req.len_chars(), bound);
        assert!(!req.user.contains(&format!("f{}", FILE_LIST_MAX)));
    }
}
