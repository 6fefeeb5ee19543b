use chrono::{DateTime, SecondsFormat, Utc};
use codeops_protocol::Action;

/// System and user prompt for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const ANALYZE_SYSTEM: &str = r#"You are an expert code analyst. Review the codebase for:
1. Critical bugs and errors
2. Security vulnerabilities
3. Performance issues
4. Best practice violations
5. Suggested improvements

Be concise. Respond with JSON only:
{
  "summary": "2-3 sentence assessment",
  "issues": [{"severity": "critical|high|medium|low", "type": "bug|security|performance|quality|architecture|style", "file": "path", "line": "line", "description": "issue", "suggestion": "fix"}],
  "metrics": {"totalIssues": n, "critical": n, "high": n, "medium": n, "low": n},
  "nextSteps": ["recommended actions"]
}"#;

const FIX_SYSTEM_HEAD: &str =
    "You are an expert code fixer. Produce complete, production-ready fixed code.";

const FIX_SYSTEM_SHAPE: &str = r#"Respond with JSON:
{
  "summary": "What was fixed",
  "fixedFiles": [{"path": "path", "originalIssues": ["issue descriptions this file fixes"], "content": "COMPLETE fixed code", "changes": ["changes"]}],
  "improvements": ["improvements"]
}"#;

const TEST_SYSTEM: &str = r#"You are a test engineer. Simulate running the codebase.

Respond with JSON:
{
  "summary": "Test results",
  "passed": boolean,
  "testResults": [{"scenario": "test", "status": "pass|fail|warning", "details": "result"}],
  "errors": [{"type": "runtime|logic", "file": "path", "description": "error", "fix": "solution"}],
  "coverage": {"estimated": "percentage"},
  "preview": {"html": "<!DOCTYPE html><html><head><style>body{font-family:system-ui;padding:20px;background:#0f172a;color:#e2e8f0;}</style></head><body><h1>Preview</h1><p>Generated preview</p></body></html>", "description": "preview info"}
}"#;

const MEASURE_SYSTEM: &str = r#"You are a code metrics expert. Score the codebase.

Respond with JSON:
{
  "overallScore": number,
  "grade": "A|B|C|D|F",
  "metrics": {
    "complexity": {"score": n, "details": "info"},
    "maintainability": {"score": n, "details": "info"},
    "performance": {"score": n, "details": "info"},
    "security": {"score": n, "details": "info"}
  },
  "technicalDebt": {"hours": n, "items": ["items"]},
  "recommendations": [{"title": "rec", "impact": "high|medium|low"}]
}"#;

const RECORD_SYSTEM_HEAD: &str = "You are a documentation expert. Record the analysis.";

const APPROVE_SYSTEM: &str = r#"You are a senior reviewer. Evaluate deployment readiness.

Respond with JSON:
{
  "approved": boolean,
  "confidence": number,
  "reviewSummary": "summary",
  "securityCheck": {"passed": boolean, "findings": ["findings"]},
  "qualityCheck": {"passed": boolean, "score": n},
  "performanceCheck": {"passed": boolean, "findings": ["findings"]},
  "deploymentRisks": [{"risk": "risk", "severity": "critical|high|medium|low"}],
  "deploymentRecommendation": "deploy|hold|reject"
}"#;

const CHAT_SYSTEM: &str = r#"You are an AI coding assistant. Fix code issues.

Format code fixes as:
FILE: path/to/file.ts
```typescript
// complete fixed code
```"#;

fn record_system(now: DateTime<Utc>) -> String {
    format!(
        r#"{RECORD_SYSTEM_HEAD}

Respond with JSON:
{{
  "projectName": "name",
  "timestamp": "{}",
  "summary": "Executive summary",
  "filesSummary": {{"total": n, "byType": {{"ts": n, "tsx": n, "js": n}}}},
  "architectureOverview": "architecture",
  "keyComponents": [{{"name": "comp", "purpose": "purpose"}}],
  "readyForProduction": boolean,
  "recommendations": ["recs"]
}}"#,
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn fix_system(issue_context: Option<&str>) -> String {
    match issue_context {
        Some(issues) => format!("{FIX_SYSTEM_HEAD}\n\nIssues to fix:\n{issues}\n\n{FIX_SYSTEM_SHAPE}"),
        None => format!("{FIX_SYSTEM_HEAD}\n\n{FIX_SYSTEM_SHAPE}"),
    }
}

/// Render the fixed template of `action` around the file context.
///
/// `issue_context` fills the "Issues to fix" block of `fix` and replaces
/// the opening line of the `chat` user prompt; other actions ignore it.
/// `now` is embedded in the `record` template.
pub fn build_prompts(
    action: Action,
    files_context: &str,
    issue_context: Option<&str>,
    now: DateTime<Utc>,
) -> PromptPair {
    let issue_context = issue_context.map(str::trim).filter(|s| !s.is_empty());

    let (system, user) = match action {
        Action::Analyze => (
            ANALYZE_SYSTEM.to_string(),
            format!("Analyze this codebase:\n\n{files_context}"),
        ),
        Action::Fix => (
            fix_system(issue_context),
            format!("Fix issues in this code:\n\n{files_context}"),
        ),
        Action::Test => (
            TEST_SYSTEM.to_string(),
            format!("Test this codebase:\n\n{files_context}"),
        ),
        Action::Measure => (
            MEASURE_SYSTEM.to_string(),
            format!("Measure this codebase:\n\n{files_context}"),
        ),
        Action::Record => (
            record_system(now),
            format!("Document this codebase:\n\n{files_context}"),
        ),
        Action::Approve => (
            APPROVE_SYSTEM.to_string(),
            format!("Review for deployment:\n\n{files_context}"),
        ),
        Action::Chat => (
            CHAT_SYSTEM.to_string(),
            match issue_context {
                Some(message) => format!("{message}\n\nCode:\n{files_context}"),
                None => format!("Help with this code:\n\n{files_context}"),
            },
        ),
    };

    PromptPair { system, user }
}
