// src/evaluation/mod.rs
//! Evaluation data model: roles, tiers, badges, the untrusted `RawEvaluation`
//! as parsed from the scorer, and the validated `FinalEvaluation`.

pub mod parser;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use parser::{parse_evaluation, ParseError};
pub use rules::{badge_for, clamp_score, finalize, tier_for};

/// Job role the repository is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "frontend")]
    Frontend,
    #[serde(rename = "backend")]
    Backend,
    #[serde(rename = "fullstack")]
    Fullstack,
    #[serde(rename = "data-ml")]
    DataMl,
    #[serde(rename = "opensource")]
    Opensource,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Frontend,
        Role::Backend,
        Role::Fullstack,
        Role::DataMl,
        Role::Opensource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Frontend => "frontend",
            Role::Backend => "backend",
            Role::Fullstack => "fullstack",
            Role::DataMl => "data-ml",
            Role::Opensource => "opensource",
        }
    }

    /// Human label shown to candidates.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Frontend => "Frontend Developer",
            Role::Backend => "Backend Developer",
            Role::Fullstack => "Full-Stack Developer",
            Role::DataMl => "Data / ML Engineer",
            Role::Opensource => "Open Source / Generalist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == norm)
            .ok_or_else(|| UnknownRole(s.trim().to_string()))
    }
}

/// Coarse hire-readiness classification derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Not Ready")]
    NotReady,
    #[serde(rename = "Emerging")]
    Emerging,
    #[serde(rename = "Hire-Approaching")]
    HireApproaching,
    #[serde(rename = "Role-Ready")]
    RoleReady,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::NotReady => "Not Ready",
            Tier::Emerging => "Emerging",
            Tier::HireApproaching => "Hire-Approaching",
            Tier::RoleReady => "Role-Ready",
        }
    }

    /// Lenient match used on scorer output (case and separator insensitive).
    pub fn parse_loose(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "notready" => Some(Tier::NotReady),
            "emerging" => Some(Tier::Emerging),
            "hireapproaching" => Some(Tier::HireApproaching),
            "roleready" => Some(Tier::RoleReady),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    None,
    Bronze,
    Silver,
    Gold,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::None => "none",
            Badge::Bronze => "bronze",
            Badge::Silver => "silver",
            Badge::Gold => "gold",
        }
    }

    pub fn parse_loose(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "none" => Some(Badge::None),
            "bronze" => Some(Badge::Bronze),
            "silver" => Some(Badge::Silver),
            "gold" => Some(Badge::Gold),
            _ => None,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Impact / effort level of a roadmap item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn parse_loose(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "low" => Some(Level::Low),
            "medium" | "med" => Some(Level::Medium),
            "high" => Some(Level::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub action: String,
    pub impact: Level,
    pub effort: Level,
    pub reason: String,
}

/// Six rubric sub-scores. Values are whatever the scorer claimed until
/// `rules::finalize` clamps them to their maxima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub code_quality: i64,
    pub project_structure: i64,
    pub documentation: i64,
    pub testing: i64,
    pub real_world_applicability: i64,
    pub git_hygiene: i64,
}

/// Candidate result as reported by the generative scorer. Untrusted: the
/// score may be out of range and tier/badge may disagree with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvaluation {
    pub score: i64,
    pub tier: Option<Tier>,
    pub badge: Option<Badge>,
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub roadmap: Vec<RoadmapItem>,
    pub category_scores: CategoryScores,
    /// Categories the scorer did not report as numbers (defaulted to 0).
    pub missing_categories: Vec<crate::rubric::Category>,
    /// Optional self-reported "tutorial clone" judgment.
    pub tutorial_clone: Option<bool>,
}

impl RawEvaluation {
    pub fn reported(&self, category: crate::rubric::Category) -> bool {
        !self.missing_categories.contains(&category)
    }
}

/// Where a cap's triggering condition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapBasis {
    /// Objective repository signals.
    Signals,
    /// The scorer's own (untrusted) judgment.
    ScorerJudgment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCap {
    pub cap: crate::rubric::Cap,
    pub limit: u8,
    pub basis: CapBasis,
}

/// Validated result returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalEvaluation {
    pub score: u8,
    pub tier: Tier,
    pub badge: Badge,
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub roadmap: Vec<RoadmapItem>,
    pub category_scores: CategoryScores,
    #[serde(default)]
    pub applied_caps: Vec<AppliedCap>,
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_round_trips_through_str_and_serde() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let v = serde_json::to_value(role).unwrap();
            assert_eq!(v, json!(role.as_str()));
        }
        assert_eq!(" Data-ML ".parse::<Role>().unwrap(), Role::DataMl);
        assert!("devops".parse::<Role>().is_err());
    }

    #[test]
    fn tier_and_badge_serialize_with_display_labels() {
        assert_eq!(serde_json::to_value(Tier::HireApproaching).unwrap(), json!("Hire-Approaching"));
        assert_eq!(serde_json::to_value(Tier::NotReady).unwrap(), json!("Not Ready"));
        assert_eq!(serde_json::to_value(Badge::None).unwrap(), json!("none"));
    }

    #[test]
    fn loose_parsers_ignore_case_and_separators() {
        assert_eq!(Tier::parse_loose("role ready"), Some(Tier::RoleReady));
        assert_eq!(Tier::parse_loose("NOT_READY"), Some(Tier::NotReady));
        assert_eq!(Badge::parse_loose("Gold"), Some(Badge::Gold));
        assert_eq!(Level::parse_loose("Medium"), Some(Level::Medium));
        assert_eq!(Level::parse_loose("huge"), None);
    }

    #[test]
    fn final_evaluation_uses_camel_case_keys() {
        let fe = FinalEvaluation {
            score: 61,
            tier: Tier::HireApproaching,
            badge: Badge::Bronze,
            summary: "ok".into(),
            strengths: vec![],
            gaps: vec![],
            roadmap: vec![],
            category_scores: CategoryScores::default(),
            applied_caps: vec![],
        };
        let v = serde_json::to_value(&fe).unwrap();
        assert!(v.get("categoryScores").is_some());
        assert!(v["categoryScores"].get("realWorldApplicability").is_some());
        assert!(v.get("appliedCaps").is_some());
    }
}
