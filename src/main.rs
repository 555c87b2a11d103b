//! Demo CLI driving the benchmarking engine end to end: start a
//! session against a problem, run one evaluation action, print the
//! result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use algojudge::{Config, FileProblemLoader, SessionRegistry};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "algojudge", about = "Session-oriented benchmarking engine for heuristic contests")]
struct Cli {
    /// Directory containing one subdirectory per problem_id, each with
    /// its own `problem.json` descriptor.
    #[arg(long, default_value = "./problems")]
    problems_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Judge a submission against the problem's public inputs.
    PublicEval {
        problem_id: String,
        #[arg(long)]
        code: PathBuf,
        #[arg(long)]
        language: String,
        #[arg(long)]
        judge_version: Option<String>,
    },
    /// Judge a submission against the problem's private inputs and
    /// fold it into standings. Finishes the session.
    PrivateEval {
        problem_id: String,
        #[arg(long)]
        code: PathBuf,
        #[arg(long)]
        language: String,
        #[arg(long)]
        judge_version: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "algojudge=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let loader = Arc::new(FileProblemLoader::new(cli.problems_dir));
    let backend: Arc<dyn sisyphus::Backend> = Arc::new(sisyphus::LocalBackend::new(config.backend_config()));
    let registry = SessionRegistry::new(config.max_sessions, loader, backend, config.session_config());

    match cli.command {
        Command::PublicEval { problem_id, code, language, judge_version } => {
            let source = tokio::fs::read_to_string(&code).await?;
            let id = registry
                .start_session(&problem_id, config.lite_version, default_budget())
                .await?;
            let session = registry
                .get(id)
                .await
                .ok_or_else(|| anyhow::anyhow!("session `{id}` vanished right after being registered"))?;
            let result = session.public_eval(source, language, judge_version, false).await?;
            println!("{}", serde_json::to_string_pretty(&result.case_results)?);
            registry.end_session(id).await?;
        }
        Command::PrivateEval { problem_id, code, language, judge_version } => {
            let source = tokio::fs::read_to_string(&code).await?;
            let id = registry
                .start_session(&problem_id, config.lite_version, default_budget())
                .await?;
            let session = registry
                .get(id)
                .await
                .ok_or_else(|| anyhow::anyhow!("session `{id}` vanished right after being registered"))?;
            let (result, rank, performance) = session.private_eval(source, language, judge_version).await?;
            println!(
                "{}",
                serde_json::json!({"cases": result.case_results, "rank": rank, "performance": performance})
            );
            registry.end_session(id).await?;
        }
    }

    Ok(())
}

/// Wide-open resource budget for a one-shot CLI invocation; a long-lived
/// deployment would size this per caller instead (§4.F "Resource budget").
fn default_budget() -> olympus_common::ResourceUsage {
    olympus_common::ResourceUsage {
        num_case_gen: u64::MAX,
        num_case_eval: u64::MAX,
        execution_time_case_eval: f64::MAX,
        num_call_public_eval: u64::MAX,
        num_call_private_eval: u64::MAX,
    }
}

