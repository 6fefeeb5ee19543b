//! `codeops run`: the whole pipeline, one step after another.

use anyhow::{bail, Result};
use codeops::config::AppConfig;
use codeops_pipeline::{Orchestrator, PipelineAction};
use codeops_protocol::ModelChoice;
use std::sync::Arc;

use super::{ensure_legal, output, spawn_log_printer};

/// Last step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Step {
    Analyze,
    Fix,
    Test,
    Measure,
    Record,
    Approve,
    Deploy,
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// GitHub repository URL (https://github.com/<owner>/<repo>)
    pub repo_url: String,

    /// Model for analyze/fix/test/measure: gemini, claude, or a model id
    #[arg(short, long, default_value = "gemini")]
    pub model: ModelChoice,

    /// Stop after this step
    #[arg(long, value_enum, default_value = "approve")]
    pub until: Step,

    /// Print the final pipeline state as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    let orchestrator = Arc::new(codeops::build_orchestrator(&config));
    let printer = spawn_log_printer(orchestrator.subscribe());

    let result = drive(&orchestrator, &args).await;
    let state = orchestrator.snapshot();

    drop(orchestrator);
    let _ = printer.await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    result
}

async fn drive(orchestrator: &Orchestrator, args: &RunArgs) -> Result<()> {
    ensure_legal(orchestrator, PipelineAction::Clone)?;
    let files = orchestrator.clone_repository(&args.repo_url).await?;
    println!("{}", output::files_table(&files));

    // Analysis starts straight away with the files just cloned.
    ensure_legal(orchestrator, PipelineAction::Analyze)?;
    let analysis = orchestrator
        .analyze_code(Some(files), args.model.clone())
        .await?;
    if !analysis.summary.is_empty() {
        println!("{}", analysis.summary);
    }
    if !analysis.issues.is_empty() {
        println!("{}", output::issues_table(&analysis));
    }
    if args.until == Step::Analyze {
        return Ok(());
    }

    ensure_legal(orchestrator, PipelineAction::Fix)?;
    let fix = orchestrator.apply_fixes(args.model.clone()).await?;
    if !fix.fixed_files.is_empty() {
        println!("{}", output::fixes_table(&fix));
        if let Some(analysis) = orchestrator.snapshot().analysis {
            println!("{}", output::issues_table(&analysis));
        }
    }
    if args.until == Step::Fix {
        return Ok(());
    }

    ensure_legal(orchestrator, PipelineAction::Test)?;
    let report = orchestrator.run_tests(args.model.clone()).await?;
    if !report.test_results.is_empty() {
        println!("{}", output::tests_table(&report));
    }
    if args.until == Step::Test {
        return Ok(());
    }

    ensure_legal(orchestrator, PipelineAction::Measure)?;
    let metrics = orchestrator.measure_metrics(args.model.clone()).await?;
    println!("{}", output::metrics_table(&metrics));
    for recommendation in &metrics.recommendations {
        println!("  - {}", recommendation.title());
    }
    if args.until == Step::Measure {
        return Ok(());
    }

    ensure_legal(orchestrator, PipelineAction::Record)?;
    let docs = orchestrator.record_results().await?;
    if !docs.summary.is_empty() {
        println!("{}", docs.summary);
    }
    if !docs.key_components.is_empty() {
        println!("{}", output::documentation_table(&docs));
    }
    if args.until == Step::Record {
        return Ok(());
    }

    ensure_legal(orchestrator, PipelineAction::Approve)?;
    let verdict = orchestrator.request_approval().await?;
    println!("{}", output::verdict_table(&verdict));
    if args.until == Step::Approve {
        return Ok(());
    }

    if !verdict.approved {
        bail!("Deployment skipped: the approval review did not approve this build");
    }
    ensure_legal(orchestrator, PipelineAction::Deploy)?;
    orchestrator.deploy().await;
    Ok(())
}
