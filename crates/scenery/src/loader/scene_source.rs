use std::path::{Path, PathBuf};

use ahash::AHashSet;
use anyhow::{ensure, Context, Result};

/// A flat collection of files a scene is loaded from.
pub trait SceneSource {
    fn name(&self) -> &str;

    fn contains(&self, file_name: &str) -> bool;

    fn read_bytes(&self, file_name: &str) -> Result<Vec<u8>>;

    fn read_to_string(&self, file_name: &str) -> Result<String> {
        let bytes = self.read_bytes(file_name)?;
        String::from_utf8(bytes).with_context(|| format!("'{file_name}' is not valid UTF-8"))
    }
}

/// The regular files directly inside one directory. Subdirectories are not searched.
pub struct DirectorySource {
    root: PathBuf,
    name: String,
    files: AHashSet<String>,
}

impl DirectorySource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = dunce::canonicalize(path)
            .with_context(|| format!("Directory '{}' not found", path.display()))?;
        ensure!(root.is_dir(), "'{}' is not a directory", root.display());

        let mut files = AHashSet::new();
        for entry in std::fs::read_dir(&root)
            .with_context(|| format!("Failed to list '{}'", root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(file_name) = entry.file_name().to_str() {
                    files.insert(file_name.to_string());
                }
            }
        }

        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Ok(Self { root, name, files })
    }
}

impl SceneSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, file_name: &str) -> bool {
        self.files.contains(file_name)
    }

    fn read_bytes(&self, file_name: &str) -> Result<Vec<u8>> {
        ensure!(
            self.contains(file_name),
            "File '{file_name}' not found in directory '{}'",
            self.name
        );
        std::fs::read(self.root.join(file_name))
            .with_context(|| format!("Failed to read '{file_name}'"))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use ahash::AHashMap;
    use anyhow::{Context, Result};

    use super::SceneSource;

    /// Files held in memory, for tests.
    #[derive(Default)]
    pub struct MemorySource {
        files: AHashMap<String, Vec<u8>>,
    }

    impl MemorySource {
        pub fn with_file(mut self, file_name: &str, content: impl Into<Vec<u8>>) -> Self {
            self.files.insert(file_name.to_string(), content.into());
            self
        }
    }

    impl SceneSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        fn contains(&self, file_name: &str) -> bool {
            self.files.contains_key(file_name)
        }

        fn read_bytes(&self, file_name: &str) -> Result<Vec<u8>> {
            self.files
                .get(file_name)
                .cloned()
                .with_context(|| format!("File '{file_name}' not found in directory 'memory'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_source_lists_only_files() {
        let root = std::env::temp_dir().join(format!("scenery-source-{}", std::process::id()));
        std::fs::create_dir_all(root.join("nested")).unwrap();
        std::fs::write(root.join("index.json"), "{}").unwrap();

        let source = DirectorySource::open(&root).unwrap();
        assert!(source.contains("index.json"));
        assert!(!source.contains("nested"));
        assert_eq!(source.read_to_string("index.json").unwrap(), "{}");
        assert!(source.read_bytes("missing.obj").is_err());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(DirectorySource::open("/definitely/not/a/scene/dir").is_err());
    }
}
