//! Shared types for the CodeOps pipeline.
//!
//! Everything that crosses a crate or process boundary lives here:
//! repository snapshots, the per-action AI result shapes, pipeline stages,
//! log entries, and the JSON envelopes of the two HTTP services.
//!
//! All types use camelCase field names on the wire so they round-trip with
//! the browser dashboard and the hosted services unchanged.

pub mod actions;
pub mod files;
pub mod http_types;
pub mod types;

pub use actions::{Action, ModelChoice, ParseActionError};
pub use files::{file_name, FileSet, RepoFile, Upsert};
pub use http_types::{
    ActionFile, ActionRequest, ActionResponse, ErrorBody, FetchRepoRequest, FetchRepoResponse,
};
pub use types::{
    AnalysisResult, ApprovalVerdict, CheckOutcome, CodeBlock, CodeIssue, Component, Coverage,
    DeployRecommendation, Documentation, FilesSummary, FixResult, FixedFile, IssueKind,
    IssueMetrics, LogEntry, LogLevel, MeasureReport, Preview, QualityCheck, Recommendation,
    RepositoryInfo, Risk, Score, ScoreBreakdown, Severity, Stage, TechnicalDebt, TestCase,
    TestError, TestReport, TestStatus,
};
