use serde::Deserialize;

/// Extensions kept by default (lowercase, no leading dot).
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "ts", "tsx", "jsx", "py", "java", "cpp", "c", "h", "css", "html", "json", "md", "yaml",
    "yml", "go", "rs", "rb", "php",
];

/// Bounds applied while walking a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchLimits {
    /// Stop descending once this many files are collected.
    pub max_files: usize,
    /// Per-file content cap, in characters.
    pub max_content_chars: usize,
    pub extensions: Vec<String>,
    /// Directory names never descended into, in addition to dot-directories.
    pub skip_dirs: Vec<String>,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_files: 50,
            max_content_chars: 10_000,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            skip_dirs: vec!["node_modules".to_string()],
        }
    }
}

impl FetchLimits {
    /// Whether a file name carries an allow-listed extension, ignoring case.
    pub fn is_eligible(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((_, ext)) => self
                .extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    pub fn should_descend(&self, dir_name: &str) -> bool {
        !dir_name.starts_with('.') && !self.skip_dirs.iter().any(|skip| skip == dir_name)
    }

    /// Truncate to at most `max_content_chars` characters.
    pub fn truncate(&self, mut content: String) -> String {
        if let Some((idx, _)) = content.char_indices().nth(self.max_content_chars) {
            content.truncate(idx);
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_extensions() {
        let limits = FetchLimits::default();
        assert!(limits.is_eligible("main.rs"));
        assert!(limits.is_eligible("App.test.tsx"));
        assert!(limits.is_eligible(".eslintrc.json"));
        assert!(!limits.is_eligible("logo.png"));
        assert!(!limits.is_eligible("Makefile"));
    }

    #[test]
    fn test_extensions_ignore_case() {
        let limits = FetchLimits::default();
        assert!(limits.is_eligible("README.MD"));
        assert!(limits.is_eligible("App.JS"));
        assert!(!limits.is_eligible("Logo.PNG"));
    }

    #[test]
    fn test_descend_rules() {
        let limits = FetchLimits::default();
        assert!(limits.should_descend("src"));
        assert!(!limits.should_descend(".github"));
        assert!(!limits.should_descend("node_modules"));
    }

    #[test]
    fn test_truncate_counts_chars() {
        let limits = FetchLimits {
            max_content_chars: 3,
            ..FetchLimits::default()
        };
        assert_eq!(limits.truncate("héllo".to_string()), "hél");
        assert_eq!(limits.truncate("ab".to_string()), "ab");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let limits: FetchLimits = serde_json::from_str(r#"{"max_files": 5}"#).unwrap();
        assert_eq!(limits.max_files, 5);
        assert_eq!(limits.max_content_chars, 10_000);
        assert!(limits.is_eligible("x.py"));
    }
}
