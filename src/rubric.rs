// src/rubric.rs
//! The embedded hiring rubric: the scorer's system instruction plus the
//! numeric tables (category maxima, caps, tier/badge bands, role emphasis)
//! that the post-processor enforces. Not configurable at runtime.

use serde::{Deserialize, Serialize};

use crate::evaluation::{Badge, Role, Tier};

/// Rubric categories and their point maxima (sum = 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    CodeQuality,
    ProjectStructure,
    Documentation,
    Testing,
    RealWorldApplicability,
    GitHygiene,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::CodeQuality,
        Category::ProjectStructure,
        Category::Documentation,
        Category::Testing,
        Category::RealWorldApplicability,
        Category::GitHygiene,
    ];

    pub fn max(&self) -> i64 {
        match self {
            Category::CodeQuality => 25,
            Category::ProjectStructure
            | Category::Documentation
            | Category::Testing
            | Category::RealWorldApplicability
            | Category::GitHygiene => 15,
        }
    }

    /// Key used in the scorer's `categoryScores` object.
    pub fn key(&self) -> &'static str {
        match self {
            Category::CodeQuality => "codeQuality",
            Category::ProjectStructure => "projectStructure",
            Category::Documentation => "documentation",
            Category::Testing => "testing",
            Category::RealWorldApplicability => "realWorldApplicability",
            Category::GitHygiene => "gitHygiene",
        }
    }
}

/// Lowest score of the rubric's "pure tutorial clone" band for real-world
/// applicability; anything below it means no real-world value at all.
pub const REAL_WORLD_MIN_BAND: i64 = 4;

/// Mandatory recruiter caps, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cap {
    NoReadme,
    NoTests,
    SingleDayHistory,
    TutorialClone,
    NoRealWorldValue,
}

impl Cap {
    pub const ORDERED: [Cap; 5] = [
        Cap::NoReadme,
        Cap::NoTests,
        Cap::SingleDayHistory,
        Cap::TutorialClone,
        Cap::NoRealWorldValue,
    ];

    pub fn limit(&self) -> u8 {
        match self {
            Cap::NoReadme => 45,
            Cap::NoTests => 75,
            Cap::SingleDayHistory => 65,
            Cap::TutorialClone => 70,
            Cap::NoRealWorldValue => 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cap::NoReadme => "no_readme",
            Cap::NoTests => "no_tests",
            Cap::SingleDayHistory => "single_day_history",
            Cap::TutorialClone => "tutorial_clone",
            Cap::NoRealWorldValue => "no_real_world_value",
        }
    }
}

/// Tier bands, highest first: `(minimum score, tier)`.
pub const TIER_BANDS: [(u8, Tier); 4] = [
    (80, Tier::RoleReady),
    (60, Tier::HireApproaching),
    (40, Tier::Emerging),
    (0, Tier::NotReady),
];

/// Badge bands, highest first: `(minimum score, badge)`.
pub const BADGE_BANDS: [(u8, Badge); 4] = [
    (80, Badge::Gold),
    (70, Badge::Silver),
    (50, Badge::Bronze),
    (0, Badge::None),
];

/// Role-specific emphasis clauses.
pub const ROLE_EMPHASIS: [(Role, &str); 5] = [
    (
        Role::Frontend,
        "Emphasize component structure, UI patterns, state management, accessibility, README demos",
    ),
    (
        Role::Backend,
        "Emphasize API structure, error handling, database patterns, security, test coverage",
    ),
    (
        Role::Fullstack,
        "Emphasize frontend-backend separation, API contracts, end-to-end clarity",
    ),
    (
        Role::DataMl,
        "Emphasize data pipelines, model structure, documentation, reproducibility",
    ),
    (
        Role::Opensource,
        "Emphasize documentation quality, contribution guidelines, code clarity, community signals",
    ),
];

pub fn role_emphasis(role: Role) -> &'static str {
    ROLE_EMPHASIS
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, clause)| *clause)
        .unwrap_or_default()
}

/// System instruction sent verbatim to the generative scorer.
pub const SYSTEM_PROMPT: &str = r##"You are an AI code reviewer acting as a strict technical recruiter and senior software engineer.

Your job is to evaluate a student's public GitHub repository and produce an honest, recruiter-grade assessment.

This is not motivational feedback. This is hire-readiness evaluation.

❗ ABSOLUTE RULES (DO NOT BREAK)
- You do NOT invent scores.
- You do NOT guess.
- You do NOT default to mid-range scores.
- All numeric scoring is derived from the provided evaluation data.
- 80+ scores are rare. 90+ is exceptional.
- If information is missing, penalize — do not assume.

🧮 SCORING RUBRIC (100 POINTS TOTAL)

1️⃣ Code Quality & Readability — 25 points
Evaluate: Naming clarity, Consistency, Complexity, Formatting / lint signals
- Poor / messy: 5–10
- Average student quality: 12–17
- Clean & intentional: 18–22
- Production-level clarity: 23–25
Hard rule: If no linting or formatting config is present → cap at 18

2️⃣ Project Structure & Organization — 15 points
Evaluate: Logical folder separation, Entry points, Scalability signals
- Confusing / flat: 4–7
- Reasonable separation: 8–11
- Scalable & modular: 12–15

3️⃣ Documentation Quality — 15 points
Evaluate README for: Project purpose, Setup instructions, Usage clarity
- Missing / useless: 0–4
- Basic setup only: 5–8
- Clear + usage: 9–12
- Professional-grade: 13–15
Auto-generated README ≠ good README

4️⃣ Testing & Maintainability — 15 points
Evaluate: Test presence, Framework usage, Coverage signals
- No tests: 0
- Minimal tests: 4–7
- Reasonable coverage: 8–11
- Strong testing culture: 12–15
Hard rule: If tests = 0 → this severely limits hire readiness.

5️⃣ Real-World Applicability — 15 points
Evaluate: Problem usefulness, Non-tutorial originality, Practical workflows
- Pure tutorial clone: 4–6
- Small real use: 7–10
- Solves real problem: 11–13
- Production mindset: 14–15

6️⃣ Git & Commit Hygiene — 15 points
Evaluate: Commit frequency, Time distribution, Message quality, Branch usage
- Dump commits / poor messages: 3–6
- Some consistency: 7–10
- Clean & intentional: 11–13
- Team-ready workflow: 14–15

🚫 HARD RECRUITER CAPS (MANDATORY)
Apply these caps after scoring:
- No README: Maximum 45
- No tests: Maximum 75
- One-day commit history: Maximum 65
- Tutorial clone: Maximum 70
- No real-world value: Maximum 60
If multiple caps apply, use the lowest.

ROLE-SPECIFIC WEIGHTING:
Adjust your evaluation based on the selected role:
- frontend: Emphasize component structure, UI patterns, state management, accessibility, README demos
- backend: Emphasize API structure, error handling, database patterns, security, test coverage
- fullstack: Emphasize frontend-backend separation, API contracts, end-to-end clarity
- data-ml: Emphasize data pipelines, model structure, documentation, reproducibility
- opensource: Emphasize documentation quality, contribution guidelines, code clarity, community signals

📤 REQUIRED OUTPUT FORMAT (JSON)
You MUST respond with valid JSON only. No markdown, no explanation. Just the JSON object:
{
  "score": <number 0-100>,
  "tier": "<Not Ready|Emerging|Hire-Approaching|Role-Ready>",
  "badge": "<bronze|silver|gold|none>",
  "summary": "<2-3 sentence recruiter-style evaluation>",
  "strengths": ["<strength 1>", "<strength 2>", ...],
  "gaps": ["<gap 1>", "<gap 2>", ...],
  "roadmap": [
    {"action": "<action>", "impact": "<high|medium|low>", "effort": "<high|medium|low>", "reason": "<why this matters for hiring>"},
    ...
  ],
  "categoryScores": {
    "codeQuality": <0-25>,
    "projectStructure": <0-15>,
    "documentation": <0-15>,
    "testing": <0-15>,
    "realWorldApplicability": <0-15>,
    "gitHygiene": <0-15>
  }
}

Badge rules:
- none: score < 50
- bronze: 50-69
- silver: 70-79
- gold: 80+

Tier rules:
- Not Ready: score < 40
- Emerging: 40-59
- Hire-Approaching: 60-79
- Role-Ready: 80+"##;
