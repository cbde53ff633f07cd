use std::path::{Path, PathBuf};

/// Path reference for a stylesheet source or output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    path: PathBuf,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    /// An existing directory (relative paths are looked up under `root`),
    /// or a path without an extension (a folder that has not been created
    /// yet, e.g. `public/css`).
    pub fn is_directory(&self, root: &Path) -> bool {
        root.join(&self.path).is_dir() || self.path.extension().is_none()
    }

    pub fn name_without_extension(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string()
    }

    /// Path relative to `root` with the extension removed, using `/`
    pub fn relative_path_without_extension(&self, root: &Path) -> String {
        let relative = self.path.strip_prefix(root).unwrap_or(&self.path);
        relative
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn join(&self, name: &str) -> FileRef {
        FileRef::new(self.path.join(name))
    }
}

impl From<&str> for FileRef {
    fn from(path: &str) -> Self {
        FileRef::new(path)
    }
}
