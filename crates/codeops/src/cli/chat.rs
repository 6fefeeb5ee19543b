//! `codeops chat`: ask the assistant about a freshly cloned repository.

use anyhow::{anyhow, bail, Result};
use codeops::config::AppConfig;
use codeops_pipeline::{fix_issue_prompt, ChatReply, Orchestrator, PipelineAction};
use codeops_protocol::ModelChoice;
use comfy_table::Cell;
use std::sync::Arc;

use super::{ensure_legal, output, spawn_log_printer};

#[derive(Debug, clap::Args)]
pub struct ChatArgs {
    /// GitHub repository URL (https://github.com/<owner>/<repo>)
    pub repo_url: String,

    /// Message for the assistant
    #[arg(short, long, required_unless_present = "issue")]
    pub message: Option<String>,

    /// Analyze first and ask for a fix of the N-th issue (1-based)
    #[arg(long, conflicts_with = "message")]
    pub issue: Option<usize>,

    /// gemini, claude, or a model id
    #[arg(long, default_value = "gemini")]
    pub model: ModelChoice,

    /// Write code blocks that name a file into the file set
    #[arg(long)]
    pub apply: bool,
}

pub async fn run(args: ChatArgs, config: AppConfig) -> Result<()> {
    let orchestrator = Arc::new(codeops::build_orchestrator(&config));
    let printer = spawn_log_printer(orchestrator.subscribe());

    let result = converse(&orchestrator, &args).await;

    drop(orchestrator);
    let _ = printer.await;

    let reply = result?;
    print_reply(&reply);
    Ok(())
}

async fn converse(orchestrator: &Orchestrator, args: &ChatArgs) -> Result<ChatReply> {
    ensure_legal(orchestrator, PipelineAction::Clone)?;
    let files = orchestrator.clone_repository(&args.repo_url).await?;

    let prompt = match (&args.message, args.issue) {
        (Some(message), _) => message.clone(),
        (None, Some(n)) => {
            ensure_legal(orchestrator, PipelineAction::Analyze)?;
            let analysis = orchestrator
                .analyze_code(Some(files), args.model.clone())
                .await?;
            let issue = n
                .checked_sub(1)
                .and_then(|i| analysis.issues.get(i))
                .ok_or_else(|| {
                    anyhow!(
                        "Issue {} does not exist; the analysis found {} issues",
                        n,
                        analysis.issues.len()
                    )
                })?;
            fix_issue_prompt(issue)
        }
        (None, None) => bail!("Either --message or --issue is required"),
    };

    Ok(orchestrator
        .chat(&prompt, args.model.clone(), args.apply)
        .await?)
}

fn print_reply(reply: &ChatReply) {
    println!();
    println!("{}", reply.text);
    println!();
    println!("(answered by {})", reply.model);

    if !reply.code_blocks.is_empty() {
        let mut table = output::create_table(&["File", "Language", "Lines", "Applied"]);
        for block in &reply.code_blocks {
            let applied = block
                .file
                .as_ref()
                .map(|f| reply.applied.contains(f))
                .unwrap_or(false);
            table.add_row(vec![
                Cell::new(block.file.as_deref().unwrap_or("(unattributed)")),
                Cell::new(block.language.as_deref().unwrap_or("-")),
                Cell::new(block.code.lines().count()),
                Cell::new(if applied { "yes" } else { "no" }),
            ]);
        }
        println!("{}", table);
    }
}
