/*!
 * Subtitle file storage.
 *
 * Files are written under `<dir>/<video_id>/<file_id>.<ext>` and indexed in
 * memory by an opaque file id derived from (video, language, format). The
 * directory name is sanitized and may be shared by several video ids; the
 * file name is not, so distinct triples never share a file.
 */

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::errors::StorageError;
use crate::formats::SubtitleFormat;
use crate::subtitle_processor::SubtitleFile;

/// Route prefix for downloads, appended to the public base URL
pub const DOWNLOAD_PATH: &str = "/api/v1/video/subtitles/download";

/// A subtitle file that has been written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubtitle {
    pub file_id: String,
    pub video_id: String,
    pub language: String,
    pub format: SubtitleFormat,
    pub size: usize,
    pub segment_count: usize,
    pub download_url: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Stable id for a (video, language, format) triple
pub fn file_id(video_id: &str, language: &str, format: SubtitleFormat) -> String {
    let digest = Sha256::digest(format!("{}:{}:{}", video_id, language, format.as_str()).as_bytes());
    digest.iter().take(16).map(|b| format!("{:02x}", b)).collect()
}

/// Keep a path component inside its parent directory
fn safe_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "_".to_string() } else { cleaned }
}

/// Disk-backed subtitle store with an in-memory index
#[derive(Clone)]
pub struct SubtitleStorage {
    root: PathBuf,
    public_base_url: String,
    index: Arc<RwLock<HashMap<String, StoredSubtitle>>>,
}

impl SubtitleStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file, replacing any earlier version for the same triple
    pub async fn save(&self, video_id: &str, file: &SubtitleFile) -> Result<StoredSubtitle, StorageError> {
        let id = file_id(video_id, &file.language, file.format);
        let dir = self.root.join(safe_component(video_id));
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.{}", id, file.format.extension()));
        fs::write(&path, file.content.as_bytes()).await?;

        let stored = StoredSubtitle {
            download_url: format!("{}{}/{}", self.public_base_url, DOWNLOAD_PATH, id),
            file_id: id,
            video_id: video_id.to_string(),
            language: file.language.clone(),
            format: file.format,
            size: file.size,
            segment_count: file.segment_count,
            path,
            created_at: Utc::now(),
        };
        self.index.write().insert(stored.file_id.clone(), stored.clone());

        info!(
            "Stored {} {} subtitles for video {} ({} bytes) at {}",
            stored.language,
            stored.format,
            video_id,
            stored.size,
            stored.path.display()
        );
        Ok(stored)
    }

    /// Files stored for a video, sorted by language then format
    pub fn list(&self, video_id: &str) -> Vec<StoredSubtitle> {
        let mut files: Vec<StoredSubtitle> = self
            .index
            .read()
            .values()
            .filter(|stored| stored.video_id == video_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| {
            a.language
                .cmp(&b.language)
                .then_with(|| a.format.as_str().cmp(b.format.as_str()))
        });
        files
    }

    /// Look up a stored file and read its content
    pub async fn load(&self, file_id: &str) -> Result<(StoredSubtitle, String), StorageError> {
        let stored = self
            .index
            .read()
            .get(file_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(file_id.to_string()))?;

        debug!("Loading subtitle file {}", stored.path.display());
        let content = match fs::read_to_string(&stored.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(file_id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok((stored, content))
    }
}
