//! Chat assistant helpers.

use codeops_protocol::{ActionResponse, CodeBlock, CodeIssue};
use serde_json::Value;

/// A chat answer, with the code blocks lifted out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub model: String,
    pub code_blocks: Vec<CodeBlock>,
    /// Paths written into the file set (auto-apply only).
    pub applied: Vec<String>,
}

/// The readable text of a chat response: the raw reply when the model did
/// not answer JSON, else its `summary`, else the JSON itself.
pub fn reply_text(response: &ActionResponse) -> String {
    if let Some(raw) = response.raw_response() {
        return raw.to_string();
    }
    match response.result.get("summary").and_then(Value::as_str) {
        Some(summary) => summary.to_string(),
        None => response.result.to_string(),
    }
}

/// Prompt asking the assistant to fix one analysis issue and answer with the
/// complete file in `FILE:` form, so the reply can be applied directly.
pub fn fix_issue_prompt(issue: &CodeIssue) -> String {
    let mut prompt = format!(
        "Fix this {} {} issue in the file \"{}\"",
        issue.severity, issue.kind, issue.file
    );
    if !issue.line.trim().is_empty() {
        prompt.push_str(&format!(" at line {}", issue.line.trim()));
    }
    prompt.push_str(&format!(".\n\nIssue: {}\n", issue.description));
    if !issue.suggestion.trim().is_empty() {
        prompt.push_str(&format!("Suggestion: {}\n", issue.suggestion));
    }
    prompt.push_str(&format!(
        "\nIMPORTANT: Return the COMPLETE fixed file content with the exact file path. Format as:\n\
         FILE: {}\n```typescript\n// complete fixed code here\n```",
        issue.file
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeops_protocol::{Action, IssueKind, Severity};
    use serde_json::json;

    #[test]
    fn test_fix_issue_prompt() {
        let issue = CodeIssue {
            severity: Severity::High,
            kind: IssueKind::Security,
            file: "src/db.ts".into(),
            line: "42".into(),
            description: "SQL built by string concatenation".into(),
            suggestion: "Use parameters".into(),
            ..Default::default()
        };
        let prompt = fix_issue_prompt(&issue);
        assert!(prompt.starts_with(
            "Fix this high security issue in the file \"src/db.ts\" at line 42.\n\nIssue: SQL built by string concatenation\nSuggestion: Use parameters\n"
        ));
        assert!(prompt.contains("FILE: src/db.ts\n```typescript"));
    }

    #[test]
    fn test_fix_issue_prompt_without_optional_parts() {
        let issue = CodeIssue {
            file: "a.py".into(),
            description: "Unused import".into(),
            ..Default::default()
        };
        let prompt = fix_issue_prompt(&issue);
        assert!(prompt.starts_with("Fix this low quality issue in the file \"a.py\".\n\nIssue: Unused import\n\nIMPORTANT"));
    }

    #[test]
    fn test_reply_text_sources() {
        let raw = ActionResponse::new(Action::Chat, json!({"rawResponse": "plain"}), "m");
        assert_eq!(reply_text(&raw), "plain");

        let summary = ActionResponse::new(Action::Chat, json!({"summary": "short"}), "m");
        assert_eq!(reply_text(&summary), "short");

        let other = ActionResponse::new(Action::Chat, json!({"answer": 1}), "m");
        assert_eq!(reply_text(&other), "{\"answer\":1}");
    }
}
