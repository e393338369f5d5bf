//! Last-seen drift report per working directory, so a restarted monitor
//! does not re-announce drift it already reported.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::drift::DriftReport;

const CACHE_DIR_NAME: &str = "tfdrift";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cache directory available on this platform")]
    NoCacheDir,

    #[error("cache I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ReportCache {
    root: PathBuf,
}

impl ReportCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_CACHE_HOME/tfdrift` on Linux, the platform equivalent elsewhere.
    pub fn default_location() -> Result<Self, CacheError> {
        dirs::cache_dir()
            .map(|dir| Self::new(dir.join(CACHE_DIR_NAME)))
            .ok_or(CacheError::NoCacheDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, working_dir: &Path) -> PathBuf {
        let digest = Sha256::digest(working_dir.to_string_lossy().as_bytes());
        self.root.join(format!("{}.json", hex::encode(digest)))
    }

    pub fn load(&self, working_dir: &Path) -> Option<DriftReport> {
        let path = self.path_for(working_dir);
        let raw = std::fs::read_to_string(&path).ok()?;

        match serde_json::from_str(&raw) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cached report");
                None
            }
        }
    }

    pub fn store(&self, report: &DriftReport) -> Result<PathBuf, CacheError> {
        std::fs::create_dir_all(&self.root).map_err(|source| CacheError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        let path = self.path_for(&report.working_dir);
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "cached drift report");
        Ok(path)
    }

    /// Forgets the cached report for `working_dir`; a missing entry is not an error.
    pub fn clear(&self, working_dir: &Path) -> Result<(), CacheError> {
        let path = self.path_for(working_dir);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "cleared cached drift report");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::plan_with_actions;

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path().join("nested"));
        let report = DriftReport::from_plan(&plan_with_actions(&[&["create"]]), "/infra/prod");

        let path = cache.store(&report).unwrap();
        assert!(path.starts_with(cache.root()));

        let loaded = cache.load(Path::new("/infra/prod")).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path());
        assert!(cache.load(Path::new("/infra/none")).is_none());
    }

    #[test]
    fn test_corrupt_entry_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path());
        let working_dir = Path::new("/infra/corrupt");
        std::fs::write(cache.path_for(working_dir), "{not json").unwrap();

        assert!(cache.load(working_dir).is_none());
    }

    #[test]
    fn test_clear_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ReportCache::new(dir.path());
        let report = DriftReport::from_plan(&plan_with_actions(&[&["update"]]), "/infra/prod");
        cache.store(&report).unwrap();

        cache.clear(Path::new("/infra/prod")).unwrap();
        assert!(cache.load(Path::new("/infra/prod")).is_none());
        cache.clear(Path::new("/infra/prod")).unwrap();
    }

    #[test]
    fn test_distinct_dirs_get_distinct_entries() {
        let cache = ReportCache::new("/tmp/cache");
        assert_ne!(
            cache.path_for(Path::new("/infra/a")),
            cache.path_for(Path::new("/infra/b"))
        );
    }

    #[test]
    fn test_no_cache_dir_display() {
        assert_eq!(
            CacheError::NoCacheDir.to_string(),
            "no cache directory available on this platform"
        );
    }
}
