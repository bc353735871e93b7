//! Output sink.
//!
//! Generated content is collected per output file before anything touches the
//! filesystem. A file is a header, a sorted set of `use` imports and a list of
//! code fragments; files render in the order they were first requested.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Opaque handle to a file in an [`OutputRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(usize);

#[derive(Debug, Default)]
struct OutputFile {
    path: PathBuf,
    header: Option<String>,
    imports: BTreeSet<String>,
    fragments: Vec<String>,
}

impl OutputFile {
    fn render(&self) -> String {
        let mut sections = Vec::new();
        if let Some(header) = &self.header {
            sections.push(header.clone());
        }
        if !self.imports.is_empty() {
            sections.push(
                self.imports
                    .iter()
                    .map(|import| format!("use {};\n", import))
                    .collect::<String>()
                    .trim_end()
                    .to_string(),
            );
        }
        sections.extend(self.fragments.iter().cloned());

        let mut content = sections.join("\n\n");
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content
    }
}

#[derive(Debug, Default)]
pub struct OutputRegistry {
    files: Vec<OutputFile>,
    index: HashMap<PathBuf, usize>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the file at `path`, creating it on first use.
    pub fn file(&mut self, path: impl Into<PathBuf>) -> FileHandle {
        let path = path.into();
        if let Some(&i) = self.index.get(&path) {
            return FileHandle(i);
        }
        let i = self.files.len();
        self.index.insert(path.clone(), i);
        self.files.push(OutputFile {
            path,
            ..OutputFile::default()
        });
        FileHandle(i)
    }

    pub fn push(&mut self, file: FileHandle, fragment: impl Into<String>) {
        self.files[file.0].fragments.push(fragment.into());
    }

    /// Record a use-path; duplicates collapse.
    pub fn import(&mut self, file: FileHandle, path: impl Into<String>) {
        self.files[file.0].imports.insert(path.into());
    }

    pub fn set_header(&mut self, file: FileHandle, header: impl Into<String>) {
        self.files[file.0].header = Some(header.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn render(&self, file: FileHandle) -> String {
        self.files[file.0].render()
    }

    /// Every file's relative path and content, in creation order.
    pub fn render_all(&self) -> Vec<(PathBuf, String)> {
        self.files
            .iter()
            .map(|f| (f.path.clone(), f.render()))
            .collect()
    }

    /// Write every file under `out_dir`, creating parent directories.
    pub fn write_all(&self, out_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, content) in self.render_all() {
            let target = out_dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            tracing::debug!(path = %target.display(), "wrote output file");
            written.push(target);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_same_path_yields_same_handle() {
        let mut sink = OutputRegistry::new();
        let a = sink.file("a.rs");
        let b = sink.file("b.rs");
        assert_ne!(a, b);
        assert_eq!(sink.file("a.rs"), a);
        assert_eq!(sink.len(), 2);
    }

    #[rstest]
    fn test_render_layout() {
        let mut sink = OutputRegistry::new();
        let file = sink.file("db.rs");
        sink.push(file, "fn one() {}");
        sink.import(file, "spanner_gen::runtime");
        sink.import(file, "chrono::{DateTime, Utc}");
        sink.import(file, "spanner_gen::runtime");
        sink.set_header(file, "//! Generated.");
        sink.push(file, "fn two() {}");

        assert_eq!(
            sink.render(file),
            "//! Generated.\n\nuse chrono::{DateTime, Utc};\nuse spanner_gen::runtime;\n\nfn one() {}\n\nfn two() {}\n"
        );
    }

    #[rstest]
    fn test_fragments_only() {
        let mut sink = OutputRegistry::new();
        let file = sink.file("ddl.json");
        sink.push(file, "{}");
        assert_eq!(sink.render(file), "{}\n");
    }

    #[rstest]
    fn test_render_all_keeps_creation_order() {
        let mut sink = OutputRegistry::new();
        let z = sink.file("z.json");
        let a = sink.file("a.json");
        sink.push(a, "a");
        sink.push(z, "z");
        let paths: Vec<_> = sink.render_all().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec![PathBuf::from("z.json"), PathBuf::from("a.json")]);
    }

    #[rstest]
    fn test_write_all_creates_directories() {
        let dir = tempdir().unwrap();
        let mut sink = OutputRegistry::new();
        let file = sink.file("nested/out.rs");
        sink.push(file, "fn f() {}");

        let written = sink.write_all(dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("nested/out.rs")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("nested/out.rs")).unwrap(),
            "fn f() {}\n"
        );
    }
}
