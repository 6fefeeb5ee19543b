use codeops_protocol::ActionFile;

/// Files beyond this count are dropped from the prompt.
pub const MAX_FILES: usize = 10;
/// Per-file content budget, in characters.
pub const MAX_CONTENT_CHARS: usize = 1500;
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Render the bounded file subset as prompt context:
/// `--- <path> ---\n<content>` blocks separated by blank lines.
pub fn files_context(files: &[ActionFile]) -> String {
    files
        .iter()
        .take(MAX_FILES)
        .map(|file| format!("--- {} ---\n{}", file.path, clip(&file.content)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn clip(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => format!("{}{}", &content[..idx], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}
