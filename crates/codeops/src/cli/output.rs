//! Terminal rendering for pipeline results.

use codeops_protocol::{
    AnalysisResult, ApprovalVerdict, Documentation, FixResult, LogEntry, LogLevel, MeasureReport,
    RepoFile, Severity, TestReport, TestStatus,
};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

const MAX_CELL_CHARS: usize = 80;

pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// `[12:00:01] success Cloned 12 files from octo/hello`
pub fn format_log_entry(entry: &LogEntry) -> String {
    let marker = match entry.level {
        LogLevel::Info => "·",
        LogLevel::Success => "✓",
        LogLevel::Warning => "!",
        LogLevel::Error => "✗",
    };
    format!("[{}] {} {}", entry.timestamp, marker, entry.message)
}

fn truncate(text: &str, max: usize) -> String {
    let text = text.trim().replace('\n', " ");
    if text.chars().count() <= max {
        return text;
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::DarkYellow,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Grey,
    }
}

pub fn files_table(files: &[RepoFile]) -> Table {
    let mut table = create_table(&["Path", "Chars"]);
    for file in files {
        table.add_row(vec![
            Cell::new(&file.path),
            Cell::new(file.content.chars().count()),
        ]);
    }
    table
}

pub fn issues_table(analysis: &AnalysisResult) -> Table {
    let mut table = create_table(&["#", "Severity", "Type", "Location", "Description", "Status"]);
    for (i, issue) in analysis.issues.iter().enumerate() {
        let location = if issue.line.is_empty() {
            issue.file.clone()
        } else {
            format!("{}:{}", issue.file, issue.line)
        };
        let status = if issue.solved {
            Cell::new("solved").fg(Color::Green)
        } else {
            Cell::new("open")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(issue.severity).fg(severity_color(issue.severity)),
            Cell::new(issue.kind),
            Cell::new(location),
            Cell::new(truncate(&issue.description, MAX_CELL_CHARS)),
            status,
        ]);
    }
    table
}

pub fn fixes_table(fix: &FixResult) -> Table {
    let mut table = create_table(&["File", "Issues addressed", "Changes"]);
    for file in &fix.fixed_files {
        table.add_row(vec![
            Cell::new(&file.path),
            Cell::new(file.original_issues.len()),
            Cell::new(truncate(&file.changes.join("; "), MAX_CELL_CHARS)),
        ]);
    }
    table
}

pub fn tests_table(report: &TestReport) -> Table {
    let mut table = create_table(&["Scenario", "Status", "Details"]);
    for case in &report.test_results {
        let color = match case.status {
            TestStatus::Pass => Color::Green,
            TestStatus::Fail => Color::Red,
            TestStatus::Warning => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(&case.scenario),
            Cell::new(case.status).fg(color),
            Cell::new(truncate(&case.details, MAX_CELL_CHARS)),
        ]);
    }
    table
}

pub fn metrics_table(report: &MeasureReport) -> Table {
    let mut table = create_table(&["Metric", "Score", "Details"]);
    table.add_row(vec![
        Cell::new("overall"),
        Cell::new(format!(
            "{}{}",
            report.overall_score,
            report
                .grade
                .as_deref()
                .map(|g| format!(" ({})", g))
                .unwrap_or_default()
        )),
        Cell::new(format!("{} h technical debt", report.technical_debt.hours)),
    ]);
    for (name, score) in report.metrics.entries() {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(score.score),
            Cell::new(truncate(&score.details, MAX_CELL_CHARS)),
        ]);
    }
    table
}

pub fn documentation_table(docs: &Documentation) -> Table {
    let mut table = create_table(&["Component", "Purpose"]);
    for component in &docs.key_components {
        table.add_row(vec![
            Cell::new(&component.name),
            Cell::new(truncate(&component.purpose, MAX_CELL_CHARS)),
        ]);
    }
    table
}

pub fn verdict_table(verdict: &ApprovalVerdict) -> Table {
    let passed = |ok: bool| {
        if ok {
            Cell::new("passed").fg(Color::Green)
        } else {
            Cell::new("failed").fg(Color::Red)
        }
    };
    let mut table = create_table(&["Check", "Result", "Notes"]);
    table.add_row(vec![
        Cell::new("security"),
        passed(verdict.security_check.passed),
        Cell::new(truncate(&verdict.security_check.findings.join("; "), MAX_CELL_CHARS)),
    ]);
    table.add_row(vec![
        Cell::new("quality"),
        passed(verdict.quality_check.passed),
        Cell::new(format!("score {}", verdict.quality_check.score)),
    ]);
    table.add_row(vec![
        Cell::new("performance"),
        passed(verdict.performance_check.passed),
        Cell::new(truncate(
            &verdict.performance_check.findings.join("; "),
            MAX_CELL_CHARS,
        )),
    ]);
    for risk in &verdict.deployment_risks {
        table.add_row(vec![
            Cell::new("risk"),
            Cell::new(risk.severity).fg(severity_color(risk.severity)),
            Cell::new(truncate(&risk.risk, MAX_CELL_CHARS)),
        ]);
    }
    table
}
