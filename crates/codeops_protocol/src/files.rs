//! Repository snapshot: path-addressed text blobs.

use serde::{Deserialize, Serialize};

/// One file of a repository snapshot.
///
/// `name` is the final path segment; it is stored redundantly for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl RepoFile {
    /// Create a file, deriving `name` from `path`.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = file_name(&path).to_string();
        Self {
            path,
            name,
            content: content.into(),
        }
    }
}

/// Final segment of a slash-delimited path, or the whole path when that
/// segment is empty.
pub fn file_name(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(last) if !last.is_empty() => last,
        _ => path,
    }
}

/// Outcome of merging a single file into a [`FileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// An entry with the same path existed and its content was replaced.
    Replaced,
    /// The path was new and the file was appended.
    Appended,
}

/// Ordered collection of [`RepoFile`]s, unique by path.
///
/// Insertion order is preserved. Merging a file whose path already exists
/// replaces that entry in place (last write wins), so the set can never hold
/// two entries for one path, including after deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RepoFile>", into = "Vec<RepoFile>")]
pub struct FileSet {
    files: Vec<RepoFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepoFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[RepoFile] {
        &self.files
    }

    pub fn get(&self, path: &str) -> Option<&RepoFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Merge one file: replace by path, append if the path is new.
    pub fn upsert(&mut self, file: RepoFile) -> Upsert {
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => {
                *existing = file;
                Upsert::Replaced
            }
            None => {
                self.files.push(file);
                Upsert::Appended
            }
        }
    }

    /// Replace the content stored at `path`, appending a new file if needed.
    pub fn write(&mut self, path: impl Into<String>, content: impl Into<String>) -> Upsert {
        self.upsert(RepoFile::new(path, content))
    }

    /// The first `n` files, in order. A hard truncation, not a sample.
    pub fn head(&self, n: usize) -> &[RepoFile] {
        &self.files[..n.min(self.files.len())]
    }

    pub fn to_vec(&self) -> Vec<RepoFile> {
        self.files.clone()
    }

    pub fn into_vec(self) -> Vec<RepoFile> {
        self.files
    }
}

impl From<Vec<RepoFile>> for FileSet {
    fn from(files: Vec<RepoFile>) -> Self {
        files.into_iter().collect()
    }
}

impl From<FileSet> for Vec<RepoFile> {
    fn from(set: FileSet) -> Self {
        set.files
    }
}

impl FromIterator<RepoFile> for FileSet {
    fn from_iter<I: IntoIterator<Item = RepoFile>>(iter: I) -> Self {
        let mut set = FileSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<RepoFile> for FileSet {
    fn extend<I: IntoIterator<Item = RepoFile>>(&mut self, iter: I) {
        for file in iter {
            self.upsert(file);
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a RepoFile;
    type IntoIter = std::slice::Iter<'a, RepoFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for FileSet {
    type Item = RepoFile;
    type IntoIter = std::vec::IntoIter<RepoFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_derivation() {
        assert_eq!(file_name("src/lib/a.ts"), "a.ts");
        assert_eq!(file_name("README.md"), "README.md");
        assert_eq!(file_name("src/"), "src/");
        assert_eq!(RepoFile::new("src/main.rs", "").name, "main.rs");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut set: FileSet = vec![
            RepoFile::new("a.ts", "one"),
            RepoFile::new("b.ts", "two"),
        ]
        .into();

        assert_eq!(set.write("a.ts", "uno"), Upsert::Replaced);
        assert_eq!(set.write("c.ts", "three"), Upsert::Appended);

        let paths: Vec<&str> = set.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.ts", "b.ts", "c.ts"]);
        assert_eq!(set.get("a.ts").map(|f| f.content.as_str()), Some("uno"));
    }

    #[test]
    fn test_duplicate_paths_collapse_last_write_wins() {
        let set: FileSet = vec![
            RepoFile::new("a.ts", "first"),
            RepoFile::new("b.ts", "b"),
            RepoFile::new("a.ts", "second"),
        ]
        .into();

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].content, "second");
    }

    #[test]
    fn test_deserialize_enforces_uniqueness() {
        let json = r#"[
            {"path": "x.py", "name": "x.py", "content": "1"},
            {"path": "x.py", "name": "x.py", "content": "2"}
        ]"#;
        let set: FileSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("x.py").unwrap().content, "2");
    }

    #[test]
    fn test_head_is_bounded() {
        let set: FileSet = (0..25)
            .map(|i| RepoFile::new(format!("f{i}.js"), ""))
            .collect();
        assert_eq!(set.head(20).len(), 20);
        assert_eq!(set.head(20)[19].path, "f19.js");
        assert_eq!(set.head(100).len(), 25);
    }
}
