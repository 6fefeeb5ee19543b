use chrono::{DateTime, Utc};
use codeops_protocol::{AnalysisResult, CodeIssue, FixedFile};

/// Characters compared by the description overlap rule.
const OVERLAP_PREFIX: usize = 30;

fn prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Case-insensitive: either text contains the other's first 30 characters.
/// Empty text never overlaps.
fn overlaps(reported: &str, description: &str) -> bool {
    let reported = reported.trim().to_lowercase();
    let description = description.trim().to_lowercase();
    if reported.is_empty() || description.is_empty() {
        return false;
    }
    reported.contains(prefix(&description, OVERLAP_PREFIX))
        || description.contains(prefix(&reported, OVERLAP_PREFIX))
}

fn is_fixed_by(issue: &CodeIssue, fixed_files: &[FixedFile]) -> bool {
    fixed_files.iter().any(|f| !issue.file.is_empty() && f.path == issue.file)
        || fixed_files
            .iter()
            .flat_map(|f| f.original_issues.iter())
            .any(|reported| overlaps(reported, &issue.description))
}

/// Mark the issues a fix resolved and update the analysis counters.
///
/// An issue is solved when a fixed file has the issue's path, or when one of
/// the fix's reported original issues overlaps its description. Already
/// solved issues are left alone, so the returned count is the number of
/// issues newly solved by this fix. `metrics.solved` grows by that count and
/// `metrics.totalIssues` shrinks by it, never below zero; `solvedIssues`
/// lists the newly solved issues.
pub fn mark_solved(
    analysis: &mut AnalysisResult,
    fixed_files: &[FixedFile],
    now: DateTime<Utc>,
) -> u32 {
    let mut newly_solved = Vec::new();

    for issue in analysis.issues.iter_mut().filter(|i| !i.solved) {
        if is_fixed_by(issue, fixed_files) {
            issue.solved = true;
            issue.solved_at = Some(now);
            newly_solved.push(issue.clone());
        }
    }

    let count = u32::try_from(newly_solved.len()).unwrap_or(u32::MAX);
    let metrics = &mut analysis.metrics;
    metrics.solved = Some(metrics.solved.unwrap_or(0).saturating_add(count));
    metrics.total_issues = metrics.total_issues.saturating_sub(count);
    analysis.solved_issues = Some(newly_solved);

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeops_protocol::IssueMetrics;

    fn issue(file: &str, description: &str) -> CodeIssue {
        CodeIssue {
            file: file.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn fixed(path: &str, original: &[&str]) -> FixedFile {
        FixedFile {
            path: path.into(),
            original_issues: original.iter().map(|s| s.to_string()).collect(),
            content: "fixed".into(),
            changes: vec![],
        }
    }

    fn analysis(issues: Vec<CodeIssue>) -> AnalysisResult {
        AnalysisResult {
            metrics: IssueMetrics {
                total_issues: issues.len() as u32,
                ..Default::default()
            },
            issues,
            ..Default::default()
        }
    }

    #[test]
    fn test_path_and_description_match() {
        let now = Utc::now();
        let mut a = analysis(vec![issue("a.ts", "Null pointer deref on line 10")]);

        let solved = mark_solved(
            &mut a,
            &[fixed("a.ts", &["Null pointer deref on line 10"])],
            now,
        );

        assert_eq!(solved, 1);
        assert!(a.issues[0].solved);
        assert_eq!(a.issues[0].solved_at, Some(now));
        assert_eq!(a.metrics.solved, Some(1));
        assert_eq!(a.metrics.total_issues, 0);
        assert_eq!(a.solved_issues.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_description_overlap_alone() {
        let mut a = analysis(vec![
            issue("db.py", "SQL INJECTION via string formatting in query builder"),
            issue("ui.tsx", "Missing key prop"),
        ]);
        let solved = mark_solved(
            &mut a,
            &[fixed(
                "other.py",
                &["Fixed: sql injection via string formatting in query builder and more"],
            )],
            Utc::now(),
        );
        assert_eq!(solved, 1);
        assert!(a.issues[0].solved);
        assert!(!a.issues[1].solved);
    }

    #[test]
    fn test_short_reported_text_inside_description() {
        let mut a = analysis(vec![issue("x.go", "unchecked error returned by os.Open")]);
        mark_solved(&mut a, &[fixed("y.go", &["Unchecked error"])], Utc::now());
        assert!(a.issues[0].solved);
    }

    #[test]
    fn test_empty_text_never_matches() {
        let mut a = analysis(vec![issue("", ""), issue("b.rs", "real issue")]);
        let solved = mark_solved(&mut a, &[fixed("c.rs", &[""])], Utc::now());
        assert_eq!(solved, 0);
        assert_eq!(a.metrics.solved, Some(0));
        assert_eq!(a.metrics.total_issues, 2);
    }

    #[test]
    fn test_counts_only_new_solutions() {
        let mut a = analysis(vec![issue("a.ts", "one"), issue("b.ts", "two")]);
        assert_eq!(mark_solved(&mut a, &[fixed("a.ts", &[])], Utc::now()), 1);
        // A second fix touching the same file does not count it twice.
        assert_eq!(
            mark_solved(&mut a, &[fixed("a.ts", &[]), fixed("b.ts", &[])], Utc::now()),
            1
        );
        assert_eq!(a.metrics.solved, Some(2));
        assert_eq!(a.metrics.total_issues, 0);
    }

    #[test]
    fn test_total_never_negative() {
        let mut a = analysis(vec![issue("a.ts", "x"), issue("a.ts", "y")]);
        a.metrics.total_issues = 1;
        assert_eq!(mark_solved(&mut a, &[fixed("a.ts", &[])], Utc::now()), 2);
        assert_eq!(a.metrics.total_issues, 0);
    }

    #[test]
    fn test_prefix_is_char_based() {
        assert_eq!(prefix("héllo", 2), "hé");
        assert_eq!(prefix("ab", 30), "ab");
    }
}
