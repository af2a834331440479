//! One-off evaluation from the command line:
//! `evaluate_repo <repository-url> <role>` prints the final evaluation as JSON.

use std::process::ExitCode;

use repo_readiness::{init_tracing, Evaluator, Role};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [url, role] = args.as_slice() else {
        eprintln!("usage: evaluate_repo <repository-url> <frontend|backend|fullstack|data-ml|opensource>");
        return ExitCode::from(2);
    };

    let role: Role = match role.parse() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let evaluator = match Evaluator::from_env() {
        Ok(ev) => ev,
        Err(e) => {
            eprintln!("startup failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match evaluator.evaluate(url, role).await {
        Ok(fe) => match serde_json::to_string_pretty(&fe) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to serialize evaluation: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{}: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}
