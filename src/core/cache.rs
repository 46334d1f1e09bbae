use crate::domain::model::DataTables;
use crate::domain::ports::DataSource;
use crate::utils::error::{DashboardError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identity of a loaded source. A file that changes on disk gets a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Embedded,
    File {
        path: PathBuf,
        modified: Option<SystemTime>,
        len: u64,
    },
    Upload {
        name: String,
        digest: String,
    },
}

impl SourceKey {
    pub fn for_source(source: &DataSource) -> Result<Self> {
        match source {
            DataSource::Embedded => Ok(SourceKey::Embedded),
            DataSource::Path(path) => Self::for_path(path),
            DataSource::Upload { name, bytes } => Ok(SourceKey::Upload {
                name: name.clone(),
                digest: content_digest(bytes),
            }),
        }
    }

    fn for_path(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let metadata = fs::metadata(path).map_err(|e| DashboardError::load(&source_name, e))?;

        if !metadata.is_dir() {
            return Ok(SourceKey::File {
                path: path.to_path_buf(),
                modified: metadata.modified().ok(),
                len: metadata.len(),
            });
        }

        // Directory bundles: newest member mtime and total size
        let mut modified = metadata.modified().ok();
        let mut len = 0;
        for entry in fs::read_dir(path).map_err(|e| DashboardError::load(&source_name, e))? {
            let entry = entry.map_err(|e| DashboardError::load(&source_name, e))?;
            let Ok(member) = entry.metadata() else {
                continue;
            };
            len += member.len();
            if let Ok(member_modified) = member.modified() {
                modified = modified.max(Some(member_modified));
            }
        }

        Ok(SourceKey::File {
            path: path.to_path_buf(),
            modified,
            len,
        })
    }

    fn path(&self) -> Option<&Path> {
        match self {
            SourceKey::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Loaded tables keyed by source identity, owned by one provider.
///
/// Inserting a file key evicts older entries for the same path, so a file that
/// changed on disk never keeps its stale tables around.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<SourceKey, DataTables>,
    hits: usize,
    misses: usize,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &SourceKey) -> Option<&DataTables> {
        match self.entries.get(key) {
            Some(tables) => {
                self.hits += 1;
                Some(tables)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: SourceKey, tables: DataTables) {
        if let Some(path) = key.path() {
            let path = path.to_path_buf();
            self.entries.retain(|existing, _| existing.path() != Some(path.as_path()));
        }
        self.entries.insert(key, tables);
    }

    /// Drop every entry belonging to `source`; returns whether anything was removed.
    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        let before = self.entries.len();
        match source {
            DataSource::Embedded => {
                self.entries.remove(&SourceKey::Embedded);
            }
            DataSource::Path(path) => {
                self.entries
                    .retain(|existing, _| existing.path() != Some(path.as_path()));
            }
            DataSource::Upload { name, bytes } => {
                let digest = content_digest(bytes);
                self.entries.retain(|existing, _| {
                    !matches!(existing, SourceKey::Upload { name: n, digest: d } if *n == *name && *d == digest)
                });
            }
        }
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
