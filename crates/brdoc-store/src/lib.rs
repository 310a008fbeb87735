//! # brdoc-store
//!
//! File-based version store for generated artifacts, independent of any
//! external VCS. Every commit writes the artifact, a timestamped copy
//! under `.versions/`, and a JSON metadata sidecar. Revisions are
//! append-only and never mutated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{info, warn};

use brdoc_core::error::{BrError, BrResult};

/// Metadata sidecar of one revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMeta {
    /// Version tag, `v<YYYYMMDD_HHMMSS>` with an optional `_n` suffix.
    pub hash: String,
    /// ISO timestamp of the commit.
    pub date: String,
    pub message: String,
    pub filename: String,
    /// Hex SHA-256 of the committed content.
    #[serde(default)]
    pub content_sha256: String,
}

/// One history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub date: String,
    pub message: String,
}

/// Append-only version store rooted at a repository directory.
///
/// Commits against the same artifact path are serialised by a per-path
/// mutex; commits against different artifacts may interleave.
pub struct VersionStore {
    root: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl VersionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(
            locks
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn versions_dir_for(&self, file_path: &Path) -> BrResult<PathBuf> {
        let rel = file_path
            .strip_prefix(&self.root)
            .map_err(|_| BrError::store(format!("path {file_path:?} outside store root")))?;
        let parent = rel.parent().unwrap_or_else(|| Path::new(""));
        Ok(self.root.join(".versions").join(parent))
    }

    fn split_name(file_path: &Path) -> (String, String) {
        let stem = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = file_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (stem, suffix)
    }

    /// Write the artifact and commit a revision of it.
    ///
    /// Returns the version tag actually assigned. When two commits land
    /// within the same second, a monotonic `_1`, `_2`, … suffix keeps
    /// sidecars unique; the caller observes the suffixed tag.
    pub async fn commit_file(
        &self,
        file_path: &Path,
        content: &[u8],
        message: &str,
    ) -> BrResult<String> {
        let lock = self.lock_for(file_path).await;
        let _guard = lock.lock().await;

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(file_path, content).await?;

        let versions_dir = self.versions_dir_for(file_path)?;
        tokio::fs::create_dir_all(&versions_dir).await?;

        let (stem, suffix) = Self::split_name(file_path);
        let now = Utc::now();
        let base_tag = format!("v{}", now.format("%Y%m%d_%H%M%S"));

        // Detect a same-second collision and pick the next free suffix.
        let mut tag = base_tag.clone();
        let mut counter = 0u32;
        while tokio::fs::try_exists(versions_dir.join(format!("{stem}_{tag}.meta")))
            .await
            .unwrap_or(false)
        {
            counter += 1;
            tag = format!("{base_tag}_{counter}");
        }

        let version_file = versions_dir.join(format!("{stem}_{tag}{suffix}"));
        tokio::fs::write(&version_file, content).await?;

        let digest = Sha256::digest(content);
        let meta = VersionMeta {
            hash: tag.clone(),
            date: now.to_rfc3339(),
            message: message.to_string(),
            filename: file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            content_sha256: hex::encode(digest),
        };
        let meta_file = versions_dir.join(format!("{stem}_{tag}.meta"));
        tokio::fs::write(&meta_file, serde_json::to_vec(&meta)?).await?;

        info!(file = %file_path.display(), version = %tag, "file version saved");
        Ok(tag)
    }

    /// History of an artifact, newest first, truncated to `limit`.
    /// Never returns duplicates.
    pub async fn history(&self, file_path: &Path, limit: usize) -> BrResult<Vec<VersionEntry>> {
        let versions_dir = self.versions_dir_for(file_path)?;
        if !tokio::fs::try_exists(&versions_dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let (stem, _) = Self::split_name(file_path);
        let prefix = format!("{stem}_v");

        let mut entries: Vec<VersionEntry> = Vec::new();
        let mut dir = tokio::fs::read_dir(&versions_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || !name.ends_with(".meta") {
                continue;
            }
            match tokio::fs::read(entry.path()).await {
                Ok(bytes) => match serde_json::from_slice::<VersionMeta>(&bytes) {
                    Ok(meta) => entries.push(VersionEntry {
                        version: meta.hash,
                        date: meta.date,
                        message: meta.message,
                    }),
                    Err(e) => warn!(file = %name, error = %e, "skipping unreadable sidecar"),
                },
                Err(e) => warn!(file = %name, error = %e, "skipping unreadable sidecar"),
            }
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.version.cmp(&a.version)));
        entries.dedup_by(|a, b| a.version == b.version);
        entries.truncate(limit);
        Ok(entries)
    }

    /// Content of an artifact at a specific version; `None` when the
    /// version does not exist.
    pub async fn read_at(&self, file_path: &Path, version: &str) -> BrResult<Option<Vec<u8>>> {
        let versions_dir = self.versions_dir_for(file_path)?;
        let (stem, suffix) = Self::split_name(file_path);
        let version_file = versions_dir.join(format!("{stem}_{version}{suffix}"));
        match tokio::fs::read(&version_file).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, VersionStore) {
        let dir = TempDir::new().unwrap();
        let store = VersionStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn commit_and_read_round_trip() {
        let (_dir, store) = store();
        let path = store.root().join("p1/BR_SUMMARY_20250601.md");
        let tag = store
            .commit_file(&path, b"# Wersja 1", "pierwsza wersja")
            .await
            .unwrap();
        assert!(tag.starts_with('v'));

        let read = store.read_at(&path, &tag).await.unwrap();
        assert_eq!(read.as_deref(), Some(b"# Wersja 1".as_ref()));
        assert!(store.read_at(&path, "v19990101_000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_second_commits_get_unique_suffixes() {
        let (_dir, store) = store();
        let path = store.root().join("p1/doc.md");

        let t1 = store.commit_file(&path, b"a", "1").await.unwrap();
        let t2 = store.commit_file(&path, b"b", "2").await.unwrap();
        let t3 = store.commit_file(&path, b"c", "3").await.unwrap();

        // Tags are unique even within one second.
        assert_ne!(t1, t2);
        assert_ne!(t2, t3);

        // Every revision is retrievable by its returned tag.
        assert_eq!(store.read_at(&path, &t1).await.unwrap().unwrap(), b"a");
        assert_eq!(store.read_at(&path, &t2).await.unwrap().unwrap(), b"b");
        assert_eq!(store.read_at(&path, &t3).await.unwrap().unwrap(), b"c");
    }

    #[tokio::test]
    async fn history_is_descending_and_bounded() {
        let (_dir, store) = store();
        let path = store.root().join("p1/doc.md");
        let mut tags = Vec::new();
        for i in 0..3 {
            tags.push(
                store
                    .commit_file(&path, format!("rev {i}").as_bytes(), &format!("msg {i}"))
                    .await
                    .unwrap(),
            );
        }

        let history = store.history(&path, 20).await.unwrap();
        assert_eq!(history.len(), 3);
        // Newest first: the last committed tag leads.
        assert_eq!(history[0].version, tags[2]);
        assert_eq!(history[2].version, tags[0]);

        // Fetching the first-listed version yields the latest content.
        let latest = store.read_at(&path, &history[0].version).await.unwrap();
        assert_eq!(latest.unwrap(), b"rev 2");
        let original = store.read_at(&path, &history[2].version).await.unwrap();
        assert_eq!(original.unwrap(), b"rev 0");

        let limited = store.history(&path, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn sidecar_and_content_both_exist_after_commit() {
        let (_dir, store) = store();
        let path = store.root().join("p1/doc.md");
        let tag = store.commit_file(&path, b"tresc", "m").await.unwrap();

        let versions = store.root().join(".versions/p1");
        assert!(versions.join(format!("doc_{tag}.md")).exists());
        let meta_bytes = std::fs::read(versions.join(format!("doc_{tag}.meta"))).unwrap();
        let meta: VersionMeta = serde_json::from_slice(&meta_bytes).unwrap();
        assert_eq!(meta.hash, tag);
        assert_eq!(meta.filename, "doc.md");
        assert_eq!(meta.content_sha256.len(), 64);
    }

    #[tokio::test]
    async fn paths_outside_root_are_rejected() {
        let (_dir, store) = store();
        let err = store
            .commit_file(Path::new("/tmp/elsewhere.md"), b"x", "m")
            .await;
        assert!(err.is_err());
    }
}
