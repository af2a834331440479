// tests/pipeline_e2e.rs
//
// End-to-end: fake GitHub + fake scorer over HTTP, real evaluator.
// Scenario-level checks of caps, tier/badge recomputation and error kinds.

use std::time::{Duration, Instant};

use base64::Engine as _;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repo_readiness::config::{HostConfig, ScorerConfig};
use repo_readiness::evaluation::{Badge, CapBasis, Role, Tier};
use repo_readiness::rubric::Cap;
use repo_readiness::{Evaluator, PipelineError, Stage};

const URL: &str = "https://github.com/acme/demo";
const REPO: &str = "/repos/acme/demo";
const CHAT: &str = "/v1/chat/completions";

struct FakeRepo {
    readme: Option<&'static str>,
    files: Vec<&'static str>,
    commit_dates: Vec<&'static str>,
}

impl Default for FakeRepo {
    fn default() -> Self {
        Self {
            readme: Some("# demo\n\nInventory service used by two shops."),
            files: vec!["Cargo.toml", "src/main.rs", "tests/api.rs"],
            commit_dates: vec![
                "2024-05-03T10:00:00Z",
                "2024-05-02T10:00:00Z",
                "2024-05-01T10:00:00Z",
            ],
        }
    }
}

async fn github(repo: FakeRepo) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "demo",
            "description": "Inventory service",
            "language": "Rust",
            "stargazers_count": 9
        })))
        .mount(&server)
        .await;

    let readme = match repo.readme {
        Some(text) => ResponseTemplate::new(200).set_body_json(json!({
            "content": base64::engine::general_purpose::STANDARD.encode(text),
            "encoding": "base64"
        })),
        None => ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
    };
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/readme")))
        .respond_with(readme)
        .mount(&server)
        .await;

    let tree: Vec<Value> = repo
        .files
        .iter()
        .map(|p| json!({ "path": p, "type": "blob" }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/git/trees/HEAD")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tree": tree })))
        .mount(&server)
        .await;

    let commits: Vec<Value> = repo
        .commit_dates
        .iter()
        .enumerate()
        .map(|(i, d)| json!({ "commit": { "message": format!("commit {i}"), "author": { "date": d } } }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("{REPO}/commits")))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(commits)))
        .mount(&server)
        .await;

    server
}

async fn scorer_replying(content: &str, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        })))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

fn evaluator(gh: &MockServer, ai: &MockServer) -> Evaluator {
    evaluator_with_host_timeout(gh, ai, 5)
}

fn evaluator_with_host_timeout(gh: &MockServer, ai: &MockServer, secs: u64) -> Evaluator {
    let host = HostConfig::default()
        .with_api_url(gh.uri())
        .with_timeout_secs(secs);
    let scorer = ScorerConfig {
        api_url: format!("{}{}", ai.uri(), CHAT),
        api_key: "sk-test".into(),
        timeout_secs: 5,
        ..ScorerConfig::default()
    };
    Evaluator::from_config(&host, &scorer).expect("evaluator")
}

fn reply(score: i64) -> String {
    format!(
        "```json\n{}\n```",
        json!({
            "score": score,
            "tier": "Role-Ready",
            "badge": "gold",
            "summary": "Well organised service with a clear purpose.",
            "strengths": ["Clear module boundaries"],
            "gaps": ["CI is missing"],
            "roadmap": [{ "action": "Add CI", "impact": "high", "effort": "low", "reason": "Shows discipline" }],
            "categoryScores": {
                "codeQuality": 22, "projectStructure": 13, "documentation": 12,
                "testing": 12, "realWorldApplicability": 12, "gitHygiene": 12
            }
        })
    )
}

#[tokio::test]
async fn healthy_repository_keeps_the_scorer_score() {
    let gh = github(FakeRepo::default()).await;
    let ai = scorer_replying(&reply(84), 1).await;

    let out = evaluator(&gh, &ai).run(URL, Role::Backend).await;
    assert_eq!(out.stages.last(), Some(&Stage::Done));
    let a = out.result.expect("assessment");
    assert_eq!(a.evaluation.score, 84);
    assert_eq!(a.evaluation.tier, Tier::RoleReady);
    assert_eq!(a.evaluation.badge, Badge::Gold);
    assert_eq!(a.evaluation.roadmap.len(), 1);
    assert_eq!(a.repo_meta.name, "demo");
    assert_eq!(a.repo_meta.stars, 9);
}

#[tokio::test]
async fn scenario_a_missing_tests_caps_at_75() {
    let gh = github(FakeRepo {
        files: vec!["Cargo.toml", "src/main.rs"],
        ..FakeRepo::default()
    })
    .await;
    let ai = scorer_replying(&reply(88), 1).await;

    let fe = evaluator(&gh, &ai).evaluate(URL, Role::Backend).await.unwrap();
    assert!(fe.score <= 75);
    assert_eq!(fe.score, 75);
    assert_eq!(fe.tier, Tier::HireApproaching);
    assert_eq!(fe.badge, Badge::Silver);
    assert_eq!(fe.applied_caps.len(), 1);
    assert_eq!(fe.applied_caps[0].cap, Cap::NoTests);
    assert_eq!(fe.applied_caps[0].basis, CapBasis::Signals);
}

#[tokio::test]
async fn scenario_b_no_readme_and_single_day_caps_at_45() {
    let gh = github(FakeRepo {
        readme: None,
        commit_dates: vec!["2024-05-01T18:00:00Z", "2024-05-01T09:00:00Z"],
        ..FakeRepo::default()
    })
    .await;
    let ai = scorer_replying(&reply(95), 1).await;

    let fe = evaluator(&gh, &ai).evaluate(URL, Role::Opensource).await.unwrap();
    assert_eq!(fe.score, 45);
    assert_eq!(fe.tier, Tier::Emerging);
    assert_eq!(fe.badge, Badge::None);
    let caps: Vec<Cap> = fe.applied_caps.iter().map(|c| c.cap).collect();
    assert_eq!(caps, vec![Cap::NoReadme, Cap::SingleDayHistory]);
}

#[tokio::test]
async fn scenario_c_malformed_url_touches_nothing() {
    let gh = MockServer::start().await;
    let ai = scorer_replying(&reply(80), 0).await;

    let err = evaluator(&gh, &ai)
        .evaluate("not-a-url", Role::Frontend)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidUrl(_)));
    assert!(gh.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_d_missing_repository_skips_the_scorer() {
    let gh = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&gh)
        .await;
    // `expect(0)` is verified when the server drops.
    let ai = scorer_replying(&reply(80), 0).await;

    let err = evaluator(&gh, &ai)
        .evaluate(URL, Role::Backend)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "repository_not_found");
    assert_eq!(err, PipelineError::RepositoryNotFound("Not Found".into()));
}

#[tokio::test]
async fn scenario_e_prose_reply_is_unparsable() {
    let gh = github(FakeRepo::default()).await;
    let ai = scorer_replying("This repository looks nice overall, good luck!", 1).await;

    let out = evaluator(&gh, &ai).run(URL, Role::DataMl).await;
    let err = out.result.unwrap_err();
    assert!(matches!(err, PipelineError::UnparsableEvaluation(_)));
    assert!(err.is_retryable());
    assert_eq!(out.stages.last(), Some(&Stage::Failed));
}

#[tokio::test]
async fn scorer_rate_limit_is_surfaced_distinctly() {
    let gh = github(FakeRepo::default()).await;
    let ai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&ai)
        .await;

    let err = evaluator(&gh, &ai)
        .evaluate(URL, Role::Fullstack)
        .await
        .unwrap_err();
    assert_eq!(err, PipelineError::ScorerRateLimited);
}

#[tokio::test]
async fn slow_metadata_lookup_is_not_found_and_skips_the_scorer() {
    let gh = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPO))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "demo" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&gh)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&gh)
        .await;
    let ai = scorer_replying(&reply(80), 0).await;

    let t0 = Instant::now();
    let out = evaluator_with_host_timeout(&gh, &ai, 1)
        .run(URL, Role::Backend)
        .await;
    assert!(t0.elapsed() < Duration::from_secs(3));
    assert_eq!(out.stages.last(), Some(&Stage::Failed));
    match out.result.unwrap_err() {
        PipelineError::RepositoryNotFound(msg) => assert!(msg.contains("timed out"), "{msg}"),
        other => panic!("expected RepositoryNotFound, got {other:?}"),
    }
}
