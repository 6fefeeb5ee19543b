//! Pipeline domain types and the per-action AI result shapes.
//!
//! AI results are produced by a language model, so every field carries a
//! serde default and numeric fields accept numbers, floats or numeric strings.
//! A missing, `null` or mistyped field decodes as "no data" instead of failing
//! the whole result, list elements that do not decode are dropped one by one,
//! and labels such as severities match regardless of case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Pipeline stage and log stream
// ============================================================================

/// The pipeline's current phase. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Idle,
    Cloning,
    Analyzing,
    Fixing,
    Testing,
    Measuring,
    Recording,
    Approval,
    Deploying,
    Complete,
    Error,
}

impl Stage {
    /// Linear order of the happy path, as shown by the stage tracker.
    pub const ORDER: [Stage; 10] = [
        Stage::Idle,
        Stage::Cloning,
        Stage::Analyzing,
        Stage::Fixing,
        Stage::Testing,
        Stage::Measuring,
        Stage::Recording,
        Stage::Approval,
        Stage::Deploying,
        Stage::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Cloning => "cloning",
            Stage::Analyzing => "analyzing",
            Stage::Fixing => "fixing",
            Stage::Testing => "testing",
            Stage::Measuring => "measuring",
            Stage::Recording => "recording",
            Stage::Approval => "approval",
            Stage::Deploying => "deploying",
            Stage::Complete => "complete",
            Stage::Error => "error",
        }
    }

    /// Stages during which the dashboard shows a spinner.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Stage::Cloning
                | Stage::Analyzing
                | Stage::Fixing
                | Stage::Testing
                | Stage::Measuring
                | Stage::Recording
                | Stage::Deploying
        )
    }

    /// Position on the happy path; `None` for [`Stage::Error`].
    pub fn position(&self) -> Option<usize> {
        Stage::ORDER.iter().position(|s| s == self)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped, leveled message in the pipeline's log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

// ============================================================================
// Repository metadata
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub default_branch: String,
}

// ============================================================================
// Analyze
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Bug,
    Security,
    Performance,
    #[default]
    Quality,
    Architecture,
    Style,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Bug => "bug",
            IssueKind::Security => "security",
            IssueKind::Performance => "performance",
            IssueKind::Quality => "quality",
            IssueKind::Architecture => "architecture",
            IssueKind::Style => "style",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding reported by the analyze action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeIssue {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub id: Option<String>,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(deserialize_with = "lenient::string")]
    pub file: String,
    #[serde(deserialize_with = "lenient::string")]
    pub line: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::string")]
    pub suggestion: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub solved: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub solved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueMetrics {
    #[serde(deserialize_with = "lenient::count")]
    pub total_issues: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub critical: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub high: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub medium: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub low: u32,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub solved: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::list")]
    pub issues: Vec<CodeIssue>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_list"
    )]
    pub solved_issues: Option<Vec<CodeIssue>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub metrics: IssueMetrics,
    #[serde(deserialize_with = "lenient::list")]
    pub next_steps: Vec<String>,
}

impl AnalysisResult {
    pub fn unsolved(&self) -> impl Iterator<Item = &CodeIssue> {
        self.issues.iter().filter(|i| !i.solved)
    }
}

// ============================================================================
// Fix
// ============================================================================

/// A file whose content was replaced by an AI-proposed patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedFile {
    #[serde(deserialize_with = "lenient::string")]
    pub path: String,
    #[serde(deserialize_with = "lenient::list")]
    pub original_issues: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(deserialize_with = "lenient::list")]
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixResult {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::list")]
    pub fixed_files: Vec<FixedFile>,
    #[serde(deserialize_with = "lenient::list")]
    pub improvements: Vec<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub issues_solved: u32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub applied_to_codebase: bool,
}

// ============================================================================
// Test
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    #[default]
    Warning,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Warning => "warning",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    #[serde(deserialize_with = "lenient::string")]
    pub scenario: String,
    pub status: TestStatus,
    #[serde(deserialize_with = "lenient::string")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestError {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::string")]
    pub file: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub stack_trace: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub fix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coverage {
    #[serde(deserialize_with = "lenient::string")]
    pub estimated: String,
}

/// HTML rendered by the dashboard's preview sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preview {
    #[serde(deserialize_with = "lenient::string")]
    pub html: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestReport {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub passed: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub test_results: Vec<TestCase>,
    #[serde(deserialize_with = "lenient::list")]
    pub errors: Vec<TestError>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub coverage: Coverage,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub preview: Option<Preview>,
}

impl TestReport {
    pub fn passed_count(&self) -> usize {
        self.test_results
            .iter()
            .filter(|t| t.status == TestStatus::Pass)
            .count()
    }
}

// ============================================================================
// Measure
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdown {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub complexity: Option<Score>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub maintainability: Option<Score>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub performance: Option<Score>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub security: Option<Score>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub testability: Option<Score>,
}

impl ScoreBreakdown {
    /// Named scores that are present, in display order.
    pub fn entries(&self) -> Vec<(&'static str, &Score)> {
        [
            ("complexity", &self.complexity),
            ("maintainability", &self.maintainability),
            ("performance", &self.performance),
            ("security", &self.security),
            ("testability", &self.testability),
        ]
        .into_iter()
        .filter_map(|(name, score)| score.as_ref().map(|s| (name, s)))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalDebt {
    #[serde(deserialize_with = "lenient::number")]
    pub hours: f64,
    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<String>,
}

/// Recommendations come back either as plain strings or as titled entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recommendation {
    Text(String),
    Detailed {
        title: String,
        #[serde(default)]
        impact: String,
    },
}

impl Recommendation {
    pub fn title(&self) -> &str {
        match self {
            Recommendation::Text(text) => text,
            Recommendation::Detailed { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureReport {
    #[serde(deserialize_with = "lenient::number")]
    pub overall_score: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub grade: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub metrics: ScoreBreakdown,
    #[serde(deserialize_with = "lenient::or_default")]
    pub technical_debt: TechnicalDebt,
    #[serde(deserialize_with = "lenient::list")]
    pub recommendations: Vec<Recommendation>,
}

// ============================================================================
// Record
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilesSummary {
    #[serde(deserialize_with = "lenient::count")]
    pub total: u32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub by_type: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub purpose: String,
}

/// Documentation produced by the record action. Returned to the caller, not
/// kept in pipeline state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Documentation {
    #[serde(deserialize_with = "lenient::string")]
    pub project_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub files_summary: FilesSummary,
    #[serde(deserialize_with = "lenient::string")]
    pub architecture_overview: String,
    #[serde(deserialize_with = "lenient::list")]
    pub key_components: Vec<Component>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub ready_for_production: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub recommendations: Vec<String>,
}

// ============================================================================
// Approve
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOutcome {
    #[serde(deserialize_with = "lenient::or_default")]
    pub passed: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCheck {
    #[serde(deserialize_with = "lenient::or_default")]
    pub passed: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Risk {
    #[serde(deserialize_with = "lenient::string")]
    pub risk: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployRecommendation {
    Deploy,
    #[default]
    Hold,
    Reject,
}

impl DeployRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployRecommendation::Deploy => "deploy",
            DeployRecommendation::Hold => "hold",
            DeployRecommendation::Reject => "reject",
        }
    }
}

impl fmt::Display for DeployRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalVerdict {
    #[serde(deserialize_with = "lenient::or_default")]
    pub approved: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::string")]
    pub review_summary: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub security_check: CheckOutcome,
    #[serde(deserialize_with = "lenient::or_default")]
    pub quality_check: QualityCheck,
    #[serde(deserialize_with = "lenient::or_default")]
    pub performance_check: CheckOutcome,
    #[serde(deserialize_with = "lenient::list")]
    pub deployment_risks: Vec<Risk>,
    pub deployment_recommendation: DeployRecommendation,
}

// ============================================================================
// Chat
// ============================================================================

/// A fenced code block lifted out of a chat reply.
///
/// `file` is set when the block was preceded by a `FILE: <path>` marker;
/// unattributed blocks are never applied to the file set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub file: Option<String>,
    pub language: Option<String>,
    pub code: String,
}

/// Model-chosen labels match case-insensitively; an unknown label, `null` or
/// a non-string decodes as the enum's default.
macro_rules! keyword_enum {
    ($($ty:ident => [$($variant:ident),+ $(,)?]),+ $(,)?) => {$(
        impl lenient::Keyword for $ty {
            const ALL: &'static [Self] = &[$($ty::$variant),+];

            fn keyword(&self) -> &'static str {
                self.as_str()
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                lenient::keyword(d)
            }
        }
    )+};
}

keyword_enum! {
    Severity => [Critical, High, Medium, Low],
    IssueKind => [Bug, Security, Performance, Quality, Architecture, Style],
    TestStatus => [Pass, Fail, Warning],
    DeployRecommendation => [Deploy, Hold, Reject],
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub trait Keyword: Copy + Default + 'static {
        const ALL: &'static [Self];
        fn keyword(&self) -> &'static str;
    }

    pub fn keyword<'de, D: Deserializer<'de>, T: Keyword>(d: D) -> Result<T, D::Error> {
        let value = Value::deserialize(d)?;
        let word = value.as_str().map(str::trim).unwrap_or_default();
        Ok(T::ALL
            .iter()
            .copied()
            .find(|k| k.keyword().eq_ignore_ascii_case(word))
            .unwrap_or_default())
    }

    /// `null` or a value of the wrong shape decodes as the default.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }

    /// Keeps the elements that decode and drops the rest.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn optional_list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            value => Some(list(value).unwrap_or_default()),
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = number(d)?;
        Ok(if value.is_finite() && value > 0.0 {
            value.round().min(u32::MAX as f64) as u32
        } else {
            0
        })
    }
}
