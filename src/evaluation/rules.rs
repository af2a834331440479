// src/evaluation/rules.rs
//! Rubric post-processing: clamp, apply mandatory caps, and recompute tier and
//! badge from the final score. The scorer's own tier/badge are never trusted.

use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use super::{AppliedCap, Badge, CapBasis, CategoryScores, FinalEvaluation, RawEvaluation, Tier};
use crate::rubric::{Cap, Category, BADGE_BANDS, REAL_WORLD_MIN_BAND, TIER_BANDS};
use crate::signals::RepositorySignals;

/// Clamp any integer into `[0, 100]`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

pub fn tier_for(score: u8) -> Tier {
    TIER_BANDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, t)| *t)
        .unwrap_or(Tier::NotReady)
}

pub fn badge_for(score: u8) -> Badge {
    BADGE_BANDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, b)| *b)
        .unwrap_or(Badge::None)
}

fn clamp_categories(c: CategoryScores) -> CategoryScores {
    let f = |v: i64, cat: Category| v.clamp(0, cat.max());
    CategoryScores {
        code_quality: f(c.code_quality, Category::CodeQuality),
        project_structure: f(c.project_structure, Category::ProjectStructure),
        documentation: f(c.documentation, Category::Documentation),
        testing: f(c.testing, Category::Testing),
        real_world_applicability: f(c.real_world_applicability, Category::RealWorldApplicability),
        git_hygiene: f(c.git_hygiene, Category::GitHygiene),
    }
}

fn tutorial_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(tutorial clone|clone of (a|an|the) \w+|follows? (a|an|the) (\w+ ){0,3}tutorial|course project|follow[- ]along (project|tutorial|of))\b",
        )
        .expect("tutorial regex")
    })
}

/// Only the summary is consulted; gaps routinely mention tutorials or
/// boilerplate as advice.
fn reads_like_tutorial(raw: &RawEvaluation) -> bool {
    tutorial_re().is_match(&raw.summary)
}

/// Caps whose trigger holds, in `Cap::ORDERED` order. Each cap appears at
/// most once; the first matching basis is recorded.
pub fn applicable_caps(
    signals: &RepositorySignals,
    raw: &RawEvaluation,
    categories: &CategoryScores,
) -> Vec<AppliedCap> {
    Cap::ORDERED
        .into_iter()
        .filter_map(|cap| {
            let basis = match cap {
                Cap::NoReadme => (!signals.has_readme()).then_some(CapBasis::Signals),
                Cap::NoTests => (!signals.has_tests).then_some(CapBasis::Signals),
                Cap::SingleDayHistory => {
                    (signals.unique_commit_days <= 1).then_some(CapBasis::Signals)
                }
                Cap::TutorialClone => (raw.tutorial_clone == Some(true)
                    || reads_like_tutorial(raw))
                .then_some(CapBasis::ScorerJudgment),
                Cap::NoRealWorldValue => {
                    if signals.states_no_purpose() {
                        Some(CapBasis::Signals)
                    } else if raw.reported(Category::RealWorldApplicability)
                        && categories.real_world_applicability < REAL_WORLD_MIN_BAND
                    {
                        Some(CapBasis::ScorerJudgment)
                    } else {
                        None
                    }
                }
            }?;
            Some(AppliedCap {
                cap,
                limit: cap.limit(),
                basis,
            })
        })
        .collect()
}

/// Turn an untrusted scorer result into the final evaluation.
///
/// `score = min(clamp(raw.score), lowest applicable cap)`; tier and badge are
/// then derived from `score` alone. Narrative fields pass through unchanged.
pub fn finalize(raw: RawEvaluation, signals: &RepositorySignals) -> FinalEvaluation {
    let category_scores = clamp_categories(raw.category_scores);
    let applied_caps = applicable_caps(signals, &raw, &category_scores);

    let clamped = clamp_score(raw.score);
    let score = applied_caps
        .iter()
        .map(|c| c.limit)
        .fold(clamped, u8::min);

    for c in &applied_caps {
        counter!("rubric_caps_applied_total", "cap" => c.cap.as_str()).increment(1);
    }
    debug!(
        raw_score = raw.score,
        final_score = score,
        caps = applied_caps.len(),
        "rubric applied"
    );

    FinalEvaluation {
        score,
        tier: tier_for(score),
        badge: badge_for(score),
        summary: raw.summary,
        strengths: raw.strengths,
        gaps: raw.gaps,
        roadmap: raw.roadmap,
        category_scores,
        applied_caps,
    }
}
