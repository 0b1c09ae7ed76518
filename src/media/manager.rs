use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::AppError;
use crate::result::Result;
use crate::utils::tmp_path_for;

use super::{MediaItem, MediaKind};

const GALLERY_FILE: &str = "gallery.json";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct Gallery {
    #[serde(default)]
    items: Vec<MediaItem>,
    #[serde(default)]
    last_played_id: Option<String>,
    #[serde(default)]
    last_played_at: Option<i64>,
}

/// On-disk media library: uploaded files under the media root plus a
/// whole-document JSON catalog alongside them.
pub struct Manager {
    root: PathBuf,
    gallery: RwLock<Gallery>,
    write_lock: Mutex<()>,
}

impl Manager {
    pub async fn load(root: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create media root {}", root.display()))?;

        let path = root.join(GALLERY_FILE);
        let existed = tokio::fs::metadata(&path).await.is_ok();
        let gallery = if existed {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse catalog file {}", path.display()))?
        } else {
            Gallery::default()
        };

        let manager = Self {
            root,
            gallery: RwLock::new(gallery),
            write_lock: Mutex::new(()),
        };
        if !existed {
            manager.persist().await?;
        }
        Ok(manager)
    }

    pub fn media_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// All items, newest first.
    pub async fn list(&self) -> Vec<MediaItem> {
        let gallery = self.gallery.read().await;
        let mut items = gallery.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub async fn get(&self, media_id: &str) -> Option<MediaItem> {
        let gallery = self.gallery.read().await;
        gallery.items.iter().find(|item| item.id == media_id).cloned()
    }

    /// Stores the uploaded bytes under a fresh id and appends the item to
    /// the catalog.
    pub async fn add(&self, original_name: &str, content: &[u8]) -> Result<MediaItem> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let media_type = MediaKind::from_filename(original_name).ok_or_else(|| {
            AppError::unsupported_media_type(format!(
                "Extension '.{}' is not supported",
                extension
            ))
        })?;

        let id = Uuid::new_v4().simple().to_string();
        let filename = format!("{}.{}", id, extension);
        tokio::fs::write(self.media_path(&filename), content)
            .await
            .with_context(|| format!("failed to store media file {}", filename))?;

        let item = MediaItem {
            id,
            filename,
            original_name: original_name.to_string(),
            media_type,
            created_at: Utc::now().timestamp_millis(),
        };

        {
            let mut gallery = self.gallery.write().await;
            gallery.items.push(item.clone());
        }
        self.persist().await?;
        Ok(item)
    }

    /// Removes the catalog entry and the stored file. Returns false when the
    /// id is unknown.
    pub async fn delete(&self, media_id: &str) -> Result<bool> {
        let filename = {
            let mut gallery = self.gallery.write().await;
            let Some(index) = gallery.items.iter().position(|item| item.id == media_id) else {
                return Ok(false);
            };
            let removed = gallery.items.remove(index);
            if gallery.last_played_id.as_deref() == Some(media_id) {
                gallery.last_played_id = None;
                gallery.last_played_at = None;
            }
            removed.filename
        };
        self.persist().await?;

        let path = self.media_path(&filename);
        if tokio::fs::metadata(&path).await.is_ok() {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to remove media file {}", path.display()))?;
        }
        Ok(true)
    }

    pub async fn record_last_played(&self, media_id: &str) -> Result<()> {
        {
            let mut gallery = self.gallery.write().await;
            gallery.last_played_id = Some(media_id.to_string());
            gallery.last_played_at = Some(Utc::now().timestamp_millis());
        }
        self.persist().await?;
        Ok(())
    }

    pub async fn last_played(&self) -> Option<MediaItem> {
        let media_id = {
            let gallery = self.gallery.read().await;
            gallery.last_played_id.clone()?
        };
        self.get(&media_id).await
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let gallery = self.gallery.read().await.clone();

        let path = self.root.join(GALLERY_FILE);
        let tmp_path = tmp_path_for(&path);
        let json = serde_json::to_string_pretty(&gallery)?;
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("failed to replace catalog file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn manager() -> (TempDir, Manager) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let manager = Manager::load(tmp.path().to_path_buf()).await.unwrap();
        (tmp, manager)
    }

    #[tokio::test]
    async fn test_add_list_get() {
        let (_tmp, manager) = manager().await;

        let item = manager.add("sunset.jpg", b"not really a jpg").await.unwrap();
        assert_eq!(item.media_type, MediaKind::Image);
        assert_eq!(item.original_name, "sunset.jpg");
        assert!(item.filename.ends_with(".jpg"));

        let stored = tokio::fs::read(manager.media_path(&item.filename))
            .await
            .unwrap();
        assert_eq!(stored, b"not really a jpg");

        let listed = manager.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, item.id);

        assert!(manager.get(&item.id).await.is_some());
        assert!(manager.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_extension() {
        let (_tmp, manager) = manager().await;

        let err = manager.add("malware.exe", b"nope").await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
        assert!(manager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_last_played() {
        let (_tmp, manager) = manager().await;

        let item = manager.add("loop.mp4", b"video bytes").await.unwrap();
        manager.record_last_played(&item.id).await.unwrap();
        assert_eq!(manager.last_played().await.unwrap().id, item.id);

        assert!(manager.delete(&item.id).await.unwrap());
        assert!(manager.last_played().await.is_none());
        assert!(manager.get(&item.id).await.is_none());
        assert!(tokio::fs::metadata(manager.media_path(&item.filename))
            .await
            .is_err());

        assert!(!manager.delete(&item.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_catalog_survives_reload() {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let id = {
            let manager = Manager::load(tmp.path().to_path_buf()).await.unwrap();
            manager.add("a.png", b"a").await.unwrap().id
        };

        let manager = Manager::load(tmp.path().to_path_buf()).await.unwrap();
        assert_eq!(manager.list().await.len(), 1);
        assert!(manager.get(&id).await.is_some());
    }
}
