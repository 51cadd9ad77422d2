use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use super::{ContentStore, DirEntry, EntryKind, Listing};
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct StoredFile {
    contents: String,
    download_url: Option<String>,
}

/// A content store held entirely in memory. Parent directories are created
/// implicitly when a file is added.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    files: BTreeMap<String, StoredFile>,
    dirs: BTreeSet<String>,
    others: BTreeMap<String, EntryKind>,
    failing: BTreeSet<String>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: impl Into<String>) -> Self {
        self.insert_file(path, contents.into(), None)
    }

    pub fn with_linked_file(self, path: &str, contents: impl Into<String>, download_url: &str) -> Self {
        self.insert_file(path, contents.into(), Some(download_url.to_string()))
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.dirs.insert(path);
        self
    }

    /// Adds a childless entry such as a symlink or submodule.
    pub fn with_entry(mut self, path: &str, kind: EntryKind) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.others.insert(path, kind);
        self
    }

    /// Every request for `path` fails with `StoreError::Unavailable`.
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(normalize(path));
        self
    }

    fn insert_file(mut self, path: &str, contents: String, download_url: Option<String>) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.files.insert(path, StoredFile { contents, download_url });
        self
    }

    fn add_parents(&mut self, path: &str) {
        let mut current = path;
        while let Some((parent, _)) = current.rsplit_once('/') {
            self.dirs.insert(parent.to_string());
            current = parent;
        }
    }

    fn check_failure(&self, path: &str) -> Result<(), StoreError> {
        if self.failing.contains(path) {
            return Err(StoreError::Unavailable(format!("simulated failure for '{}'", path)));
        }
        Ok(())
    }

    fn children(&self, dir: &str) -> Vec<DirEntry> {
        let prefix = format!("{}/", dir);
        let direct_child = |path: &String| -> Option<String> {
            path.strip_prefix(&prefix)
                .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                .map(str::to_string)
        };

        let dirs = self.dirs.iter().filter_map(|path| {
            direct_child(path).map(|name| DirEntry {
                name,
                path: path.clone(),
                kind: EntryKind::Dir,
                size: Some(0),
                download_url: None,
            })
        });
        let files = self.files.iter().filter_map(|(path, file)| {
            direct_child(path).map(|name| DirEntry {
                name,
                path: path.clone(),
                kind: EntryKind::File,
                size: Some(file.contents.len() as u64),
                download_url: file.download_url.clone(),
            })
        });

        let others = self.others.iter().filter_map(|(path, kind)| {
            direct_child(path).map(|name| DirEntry {
                name,
                path: path.clone(),
                kind: *kind,
                size: Some(0),
                download_url: None,
            })
        });

        dirs.chain(files).chain(others).collect()
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_directory(&self, path: &str) -> Result<Listing, StoreError> {
        let path = normalize(path);
        self.check_failure(&path)?;

        if self.files.contains_key(&path) || self.others.contains_key(&path) {
            return Ok(Listing::NotADirectory);
        }
        if !self.dirs.contains(&path) {
            return Err(StoreError::NotFound(path));
        }
        Ok(Listing::Directory(self.children(&path)))
    }

    async fn read_file_raw(&self, path: &str) -> Result<String, StoreError> {
        let path = normalize(path);
        self.check_failure(&path)?;

        self.files
            .get(&path)
            .map(|file| file.contents.clone())
            .ok_or(StoreError::NotFound(path))
    }
}
