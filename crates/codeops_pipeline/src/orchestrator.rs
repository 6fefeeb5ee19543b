use chrono::Utc;
use codeops_ai::parse_code_blocks;
use codeops_github::RepoSlug;
use codeops_protocol::{
    Action, ActionFile, ActionRequest, ActionResponse, AnalysisResult, ApprovalVerdict,
    Documentation, FileSet, FixResult, MeasureReport, ModelChoice, RepoFile, Stage, TestReport,
    Upsert,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::chat::{reply_text, ChatReply};
use crate::client::{ActionClient, RepositoryClient};
use crate::error::PipelineError;
use crate::state::PipelineState;

pub const DEFAULT_DEPLOY_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Simulated deployment time.
    pub deploy_delay: Duration,
    /// Files sent by analyze, fix and the review stages.
    pub review_file_cap: usize,
    /// Files sent with a chat message.
    pub chat_file_cap: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            deploy_delay: DEFAULT_DEPLOY_DELAY,
            review_file_cap: 20,
            chat_file_cap: 10,
        }
    }
}

/// Drives one pipeline session.
///
/// State lives in a `watch` channel so presenters can re-render on every
/// change. Every top-level operation bumps a generation counter when it
/// starts; a response is merged only if no reset or newer operation started
/// in between, otherwise it is dropped and the call returns
/// [`PipelineError::Superseded`]. The counter is only touched while the
/// state lock is held, so a merge can never interleave with a reset.
pub struct Orchestrator {
    repos: Arc<dyn RepositoryClient>,
    actions: Arc<dyn ActionClient>,
    state: watch::Sender<PipelineState>,
    generation: AtomicU64,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(repos: Arc<dyn RepositoryClient>, actions: Arc<dyn ActionClient>) -> Self {
        Self {
            repos,
            actions,
            state: watch::Sender::new(PipelineState::default()),
            generation: AtomicU64::new(0),
            settings: OrchestratorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    // ------------------------------------------------------------------
    // Generation bookkeeping
    // ------------------------------------------------------------------

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start an operation: new generation, in-progress stage, info log.
    fn begin(&self, stage: Stage, message: String) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.bump();
            state.set_stage(stage);
            state.logs.info(message);
        });
        generation
    }

    /// Apply `merge` unless the operation started at `generation` is stale.
    fn commit<R>(
        &self,
        generation: u64,
        merge: impl FnOnce(&mut PipelineState) -> R,
    ) -> Result<R, PipelineError> {
        let mut merged = None;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            merged = Some(merge(state));
            true
        });

        merged.ok_or_else(|| {
            tracing::debug!("Discarding stale response from generation {}", generation);
            PipelineError::Superseded
        })
    }

    /// Record a failure of the operation at `generation`.
    fn fail(&self, generation: u64, error: PipelineError) -> PipelineError {
        let message = error.to_string();
        match self.commit(generation, |state| state.fail(message)) {
            Ok(()) => error,
            Err(superseded) => superseded,
        }
    }

    /// Input errors never reach the network and never enter an
    /// in-progress stage.
    fn reject_input(&self, error: PipelineError) -> PipelineError {
        let message = error.to_string();
        self.state.send_modify(|state| {
            self.bump();
            state.fail(message);
        });
        error
    }

    async fn call(
        &self,
        generation: u64,
        request: ActionRequest,
    ) -> Result<ActionResponse, PipelineError> {
        self.actions
            .run_action(request)
            .await
            .map_err(|e| self.fail(generation, e.into()))
    }

    fn request(action: Action, files: Vec<RepoFile>, model: Option<ModelChoice>) -> ActionRequest {
        let mut request = ActionRequest::new(action, files.into_iter().map(ActionFile::from));
        request.model = model;
        request
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Fetch a repository and replace the file set with its files.
    ///
    /// Leaves the stage at `idle` (ready for analysis). Returns the cloned
    /// files so a caller can chain straight into [`Self::analyze_code`].
    pub async fn clone_repository(&self, repo_url: &str) -> Result<Vec<RepoFile>, PipelineError> {
        let repo_url = repo_url.trim();
        if let Err(e) = RepoSlug::parse(repo_url) {
            return Err(self.reject_input(e.into()));
        }

        let generation = self.begin(Stage::Cloning, format!("Cloning repository: {}", repo_url));

        let response = self
            .repos
            .fetch_repository(repo_url)
            .await
            .map_err(|e| self.fail(generation, e.into()))?;

        let files = FileSet::from(response.files);
        let cloned = files.to_vec();
        let message = format!(
            "Cloned {} files from {}",
            response.total_files, response.repository.full_name
        );
        let repository = response.repository;

        self.commit(generation, |state| {
            state.repository = Some(repository);
            state.files = files;
            state.set_stage(Stage::Idle);
            state.logs.success(message);
        })?;

        Ok(cloned)
    }

    /// Analyze `files`, or the current file set when `None`.
    ///
    /// The result replaces any previous analysis. The stage stays at
    /// `analyzing`.
    pub async fn analyze_code(
        &self,
        files: Option<Vec<RepoFile>>,
        model: ModelChoice,
    ) -> Result<AnalysisResult, PipelineError> {
        let files = match files {
            Some(files) => files,
            None => self.state.borrow().files.to_vec(),
        };
        if files.is_empty() {
            return Err(self.reject_input(PipelineError::NoFiles));
        }

        let generation = self.begin(
            Stage::Analyzing,
            format!("Analyzing codebase with {}...", model.label()),
        );

        let selected: Vec<RepoFile> = files
            .into_iter()
            .take(self.settings.review_file_cap)
            .collect();
        let response = self
            .call(generation, Self::request(Action::Analyze, selected, Some(model)))
            .await?;
        let analysis: AnalysisResult = decode(Action::Analyze, response.result);

        let message = format!(
            "Found {} issues ({} critical)",
            analysis.metrics.total_issues, analysis.metrics.critical
        );
        let stored = analysis.clone();
        self.commit(generation, |state| {
            state.analysis = Some(stored);
            state.logs.success(message);
        })?;

        Ok(analysis)
    }

    /// Ask for fixes and write them into the file set.
    ///
    /// Unsolved analysis issues are sent along as the fix instructions.
    pub async fn apply_fixes(&self, model: ModelChoice) -> Result<FixResult, PipelineError> {
        let generation = self.begin(
            Stage::Fixing,
            format!("Applying fixes with {}...", model.label()),
        );

        let (files, issues) = {
            let state = self.state.borrow();
            (
                state.files.head(self.settings.review_file_cap).to_vec(),
                state.analysis.as_ref().map(issue_context).unwrap_or_default(),
            )
        };

        let mut request = Self::request(Action::Fix, files, Some(model));
        if !issues.is_empty() {
            request = request.with_issue_context(issues);
        }
        let response = self.call(generation, request).await?;
        let fix: FixResult = decode(Action::Fix, response.result);

        let now = Utc::now();
        self.commit(generation, |state| {
            let outcome = state.apply_fix_result(fix, now);
            if outcome.fixed_files > 0 {
                state.logs.success(format!(
                    "✓ Fixed {} files, solved {} issues (-{})",
                    outcome.fixed_files, outcome.issues_solved, outcome.issues_solved
                ));
                state.logs.success("✓ Changes auto-applied to codebase");
            } else {
                state.logs.success("Fixed 0 files");
            }
            state.fixes.clone().unwrap_or_default()
        })
    }

    pub async fn run_tests(&self, model: ModelChoice) -> Result<TestReport, PipelineError> {
        let generation = self.begin(
            Stage::Testing,
            format!("Running tests with {}...", model.label()),
        );

        let files = self.review_selection();
        let response = self
            .call(generation, Self::request(Action::Test, files, Some(model)))
            .await?;
        let report: TestReport = decode(Action::Test, response.result);

        let summary = format!(
            "{}/{}",
            report.passed_count(),
            report.test_results.len()
        );
        let passed = report.passed;
        let stored = report.clone();
        self.commit(generation, |state| {
            state.test_results = Some(stored);
            if passed {
                state.logs.success(format!("Tests passed: {}", summary));
            } else {
                state
                    .logs
                    .warning(format!("Tests completed with issues: {}", summary));
            }
        })?;

        Ok(report)
    }

    pub async fn measure_metrics(&self, model: ModelChoice) -> Result<MeasureReport, PipelineError> {
        let generation = self.begin(
            Stage::Measuring,
            format!("Measuring code quality with {}...", model.label()),
        );

        let files = self.review_selection();
        let response = self
            .call(generation, Self::request(Action::Measure, files, Some(model)))
            .await?;
        let report: MeasureReport = decode(Action::Measure, response.result);

        let message = format!("Overall code health score: {}/100", report.overall_score);
        let stored = report.clone();
        self.commit(generation, |state| {
            state.metrics = Some(stored);
            state.logs.success(message);
        })?;

        Ok(report)
    }

    /// Produce documentation. It is returned, not kept in state.
    pub async fn record_results(&self) -> Result<Documentation, PipelineError> {
        let generation = self.begin(
            Stage::Recording,
            "Recording and documenting pipeline results with AI...".to_string(),
        );

        let files = self.review_selection();
        let response = self
            .call(generation, Self::request(Action::Record, files, None))
            .await?;
        let docs: Documentation = decode(Action::Record, response.result);

        let name = if docs.project_name.is_empty() {
            "Project"
        } else {
            docs.project_name.as_str()
        };
        let message = format!(
            "Documentation recorded: {} - Ready: {}",
            name,
            if docs.ready_for_production { "Yes" } else { "No" }
        );
        self.commit(generation, |state| state.logs.success(message))?;

        Ok(docs)
    }

    /// Run the approval review. The stage moves to `approval` whatever the
    /// verdict; deploying is the caller's decision.
    pub async fn request_approval(&self) -> Result<ApprovalVerdict, PipelineError> {
        let generation = self.begin(
            Stage::Approval,
            "Running AI-powered approval review...".to_string(),
        );

        let files = self.review_selection();
        let response = self
            .call(generation, Self::request(Action::Approve, files, None))
            .await?;
        let verdict: ApprovalVerdict = decode(Action::Approve, response.result);

        self.commit(generation, |state| {
            if verdict.approved {
                state.logs.success(format!(
                    "Approved for deployment ({}% confidence) - {}",
                    verdict.confidence, verdict.deployment_recommendation
                ));
            } else {
                let summary = if verdict.review_summary.is_empty() {
                    "Review required"
                } else {
                    verdict.review_summary.as_str()
                };
                state.logs.warning(format!("Not approved: {}", summary));
            }
        })?;

        Ok(verdict)
    }

    /// Simulated deployment: `deploying`, a fixed delay, then `complete`.
    ///
    /// Cannot fail. If the session is reset during the delay, the
    /// completion is dropped and the reset state stands.
    pub async fn deploy(&self) {
        let generation = self.begin(Stage::Deploying, "Deploying to production...".to_string());

        tokio::time::sleep(self.settings.deploy_delay).await;

        let _ = self.commit(generation, |state| {
            state.set_stage(Stage::Complete);
            state.logs.success("Deployment complete! Application is live.");
        });
    }

    /// Back to the initial state. In-flight responses are discarded when
    /// they arrive.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            let generation = self.bump();
            tracing::debug!("Pipeline reset (generation {})", generation);
            *state = PipelineState {
                resets: state.resets + 1,
                ..PipelineState::default()
            };
        });
    }

    /// Replace the file set wholesale. Duplicate paths collapse, last wins.
    pub fn update_files(&self, files: Vec<RepoFile>) {
        let files = FileSet::from(files);
        self.state.send_modify(|state| state.files = files);
    }

    /// Merge one edited buffer into the file set.
    pub fn save_file(&self, path: &str, content: &str) -> Upsert {
        let mut outcome = Upsert::Replaced;
        self.state.send_modify(|state| {
            outcome = state.files.write(path, content);
        });
        outcome
    }

    /// Ask the assistant about the current code.
    ///
    /// With `auto_apply`, every code block attributed to a path is written
    /// into the file set; unattributed blocks are only returned. The stage
    /// never changes and failures are returned without touching state.
    pub async fn chat(
        &self,
        message: &str,
        model: ModelChoice,
        auto_apply: bool,
    ) -> Result<ChatReply, PipelineError> {
        let (generation, files) = {
            let state = self.state.borrow();
            (
                self.generation.load(Ordering::SeqCst),
                state.files.head(self.settings.chat_file_cap).to_vec(),
            )
        };
        if files.is_empty() {
            return Err(PipelineError::NoFiles);
        }

        let mut request = Self::request(Action::Chat, files, Some(model));
        if !message.trim().is_empty() {
            request = request.with_issue_context(message.trim());
        }
        let response = self.actions.run_action(request).await?;

        let text = reply_text(&response);
        let code_blocks = parse_code_blocks(&text);

        let mut applied = Vec::new();
        if auto_apply {
            let targets: Vec<(String, String)> = code_blocks
                .iter()
                .filter_map(|b| b.file.clone().map(|path| (path, b.code.clone())))
                .collect();
            if !targets.is_empty() {
                applied = self.commit(generation, |state| {
                    let count = targets.len();
                    let mut paths = Vec::with_capacity(count);
                    for (path, code) in targets {
                        state.files.write(path.clone(), code);
                        paths.push(path);
                    }
                    state.logs.success(format!(
                        "Auto-applied {} fix{}",
                        count,
                        if count > 1 { "es" } else { "" }
                    ));
                    paths
                })?;
            }
        }

        Ok(ChatReply {
            text,
            model: response.model,
            code_blocks,
            applied,
        })
    }

    fn review_selection(&self) -> Vec<RepoFile> {
        self.state
            .borrow()
            .review_selection(self.settings.review_file_cap)
    }
}

/// One line per unsolved issue, sent as the fix instructions.
fn issue_context(analysis: &AnalysisResult) -> String {
    analysis
        .unsolved()
        .map(|issue| {
            format!(
                "- [{}] {}: {}",
                issue.severity, issue.file, issue.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Missing or mistyped fields decode as "no data"; a result that is not an
/// object at all decodes as an empty result.
fn decode<T: DeserializeOwned + Default>(action: Action, result: Value) -> T {
    serde_json::from_value(result).unwrap_or_else(|e| {
        tracing::warn!("Unexpected {} result shape: {}", action, e);
        T::default()
    })
}
