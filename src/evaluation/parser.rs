// src/evaluation/parser.rs
//! Response parsing: untrusted scorer text -> `RawEvaluation`.
//!
//! The scorer is asked for bare JSON but routinely wraps it in a fenced code
//! block or surrounds it with prose. We locate one JSON object, parse it
//! strictly, then validate each field on its own so a malformed list does not
//! sink an otherwise usable evaluation. Only a missing object or a missing
//! numeric `score` is fatal.

use once_cell::sync::OnceCell;
use regex::{Captures, Regex};
use std::borrow::Cow;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Badge, CategoryScores, Level, RawEvaluation, RoadmapItem, Tier};
use crate::rubric::Category;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no JSON object found in scorer response")]
    NoJson,
    #[error("invalid JSON in scorer response: {0}")]
    InvalidJson(String),
    #[error("scorer response is not a JSON object")]
    NotAnObject,
    #[error("scorer response has no numeric score")]
    MissingScore,
}

fn fence_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```([A-Za-z0-9_+-]*)\s*(.*?)\s*```").expect("fence regex")
    })
}

/// Pick the candidate JSON text. A `json`-tagged fence holding an object
/// wins, then an untagged one; otherwise the whole response with fences of
/// other languages blanked out.
fn candidate(raw: &str) -> Cow<'_, str> {
    let re = fence_re();
    let fences: Vec<(&str, &str)> = re
        .captures_iter(raw)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect();

    let holds_object = |body: &&str| body.contains('{');
    let tagged = fences
        .iter()
        .filter(|(tag, _)| tag.eq_ignore_ascii_case("json"))
        .map(|(_, body)| *body)
        .find(holds_object);
    let untagged = || {
        fences
            .iter()
            .filter(|(tag, _)| tag.is_empty())
            .map(|(_, body)| *body)
            .find(holds_object)
    };
    if let Some(body) = tagged.or_else(untagged) {
        return Cow::Borrowed(body);
    }

    re.replace_all(raw, |c: &Captures| {
        let tag = &c[1];
        if tag.is_empty() || tag.eq_ignore_ascii_case("json") {
            c[0].to_string()
        } else {
            String::new()
        }
    })
}

fn locate_object(text: &str) -> Result<Value, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJson)?;
    let tail = &text[start..];

    // First complete value starting at the first brace; trailing prose is ignored.
    let mut stream = serde_json::Deserializer::from_str(tail).into_iter::<Value>();
    if let Some(Ok(v)) = stream.next() {
        return Ok(v);
    }

    let end = text.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .map_err(|e| ParseError::InvalidJson(e.to_string()))
}

pub fn parse_evaluation(raw: &str) -> Result<RawEvaluation, ParseError> {
    let value = locate_object(&candidate(raw))?;
    let obj = value.as_object().ok_or(ParseError::NotAnObject)?;

    let score = obj
        .get("score")
        .and_then(rounded)
        .ok_or(ParseError::MissingScore)?;

    let (category_scores, missing_categories) = category_scores(obj.get("categoryScores"));

    Ok(RawEvaluation {
        score,
        tier: obj.get("tier").and_then(Value::as_str).and_then(Tier::parse_loose),
        badge: obj.get("badge").and_then(Value::as_str).and_then(Badge::parse_loose),
        summary: obj
            .get("summary")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        strengths: string_list(obj.get("strengths")),
        gaps: string_list(obj.get("gaps")),
        roadmap: roadmap(obj.get("roadmap")),
        category_scores,
        missing_categories,
        tutorial_clone: obj.get("tutorialClone").and_then(Value::as_bool),
    })
}

fn rounded(v: &Value) -> Option<i64> {
    let f = v.as_f64()?;
    f.is_finite().then(|| f.round() as i64)
}

fn string_list(v: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn roadmap(v: Option<&Value>) -> Vec<RoadmapItem> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(roadmap_item)
        .collect()
}

fn roadmap_item(obj: &Map<String, Value>) -> Option<RoadmapItem> {
    let text = |k: &str| obj.get(k).and_then(Value::as_str).map(str::trim);
    let action = text("action").filter(|s| !s.is_empty())?;
    Some(RoadmapItem {
        action: action.to_string(),
        impact: text("impact").and_then(Level::parse_loose)?,
        effort: text("effort").and_then(Level::parse_loose)?,
        reason: text("reason").unwrap_or_default().to_string(),
    })
}

/// Sub-scores plus the categories that were absent or non-numeric.
fn category_scores(v: Option<&Value>) -> (CategoryScores, Vec<Category>) {
    let obj = match v {
        Some(Value::Object(obj)) => Some(obj),
        _ => None,
    };
    let mut missing = Vec::new();
    let mut get = |cat: Category| match obj.and_then(|o| o.get(cat.key())).and_then(rounded) {
        Some(v) => v,
        None => {
            missing.push(cat);
            0
        }
    };
    let scores = CategoryScores {
        code_quality: get(Category::CodeQuality),
        project_structure: get(Category::ProjectStructure),
        documentation: get(Category::Documentation),
        testing: get(Category::Testing),
        real_world_applicability: get(Category::RealWorldApplicability),
        git_hygiene: get(Category::GitHygiene),
    };
    (scores, missing)
}
