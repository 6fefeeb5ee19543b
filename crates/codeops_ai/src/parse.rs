use codeops_protocol::CodeBlock;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());
static FILE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FILE:[ \t]*([^\n]+)\n```(\w+)?\n([\s\S]*?)```").unwrap());
static BARE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n([\s\S]*?)```").unwrap());

/// Parse a model reply as JSON.
///
/// The first fenced block is preferred when present, otherwise the whole
/// reply is parsed. Anything unparseable comes back as
/// `{"rawResponse": <reply>}`.
pub fn extract_json(reply: &str) -> Value {
    let candidate = FENCED_JSON
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(reply);

    serde_json::from_str(candidate).unwrap_or_else(|_| json!({ "rawResponse": reply }))
}

/// Code blocks in a chat reply.
///
/// Blocks preceded by a `FILE: <path>` line are attributed to that path.
/// Only when no attributed block exists are bare fenced blocks returned,
/// with `file` unset.
pub fn parse_code_blocks(reply: &str) -> Vec<CodeBlock> {
    let attributed: Vec<CodeBlock> = FILE_BLOCK
        .captures_iter(reply)
        .map(|caps| CodeBlock {
            file: Some(caps[1].trim().to_string()),
            language: caps.get(2).map(|m| m.as_str().to_string()),
            code: caps[3].trim().to_string(),
        })
        .collect();

    if !attributed.is_empty() {
        return attributed;
    }

    BARE_BLOCK
        .captures_iter(reply)
        .map(|caps| CodeBlock {
            file: None,
            language: caps.get(1).map(|m| m.as_str().to_string()),
            code: caps[2].trim().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json(r#"{"summary": "ok", "issues": []}"#);
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Here you go:\n```json\n{\"approved\": true}\n```\nThanks";
        assert_eq!(extract_json(reply), json!({"approved": true}));

        let bare = "```\n{\"passed\": false}\n```";
        assert_eq!(extract_json(bare), json!({"passed": false}));
    }

    #[test]
    fn test_unparseable_falls_back_to_raw() {
        let reply = "I could not analyze this code.";
        assert_eq!(extract_json(reply), json!({"rawResponse": reply}));

        // A fenced block that is not JSON also falls back, keeping the full reply.
        let fenced = "FILE: a.ts\n```typescript\nconst a = 1;\n```";
        assert_eq!(extract_json(fenced)["rawResponse"], fenced);
    }

    #[test]
    fn test_attributed_blocks() {
        let reply = "Fixed both.\n\nFILE: src/a.ts\n```typescript\nconst a = 1;\n```\n\nFILE:  src/b.py \n```python\nb = 2\n```\n\n```\nstray\n```";
        let blocks = parse_code_blocks(reply);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].file.as_deref(), Some("src/a.ts"));
        assert_eq!(blocks[0].language.as_deref(), Some("typescript"));
        assert_eq!(blocks[0].code, "const a = 1;");
        assert_eq!(blocks[1].file.as_deref(), Some("src/b.py"));
        assert_eq!(blocks[1].code, "b = 2");
    }

    #[test]
    fn test_unattributed_blocks() {
        let reply = "Try this:\n```rust\nfn main() {}\n```\nor\n```\nprintln!();\n```";
        let blocks = parse_code_blocks(reply);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.file.is_none()));
        assert_eq!(blocks[0].language.as_deref(), Some("rust"));
        assert_eq!(blocks[1].language, None);
        assert_eq!(blocks[1].code, "println!();");
    }

    #[test]
    fn test_no_blocks() {
        assert!(parse_code_blocks("Looks fine to me.").is_empty());
    }
}
