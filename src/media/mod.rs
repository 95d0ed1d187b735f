//! Media Library
//!
//! Local storage behind the upload endpoint. Files are grouped by
//! category under a root directory and served under a base URL:
//! `<root>/<category>/<stamp>-<name>` is reachable at
//! `<base_url>/<category>/<stamp>-<name>`.

pub mod names;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{MediaError, RemovalError, UploadError};
use crate::observer::RemovalHandler;
use crate::upload::{UploadFile, Uploader};

pub use names::{normalize_category, sanitize_file_name};

/// Category used when an upload names none
pub const DEFAULT_CATEGORY: &str = "general";

/// A stored media file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub category: String,
    pub name: String,
    pub url: String,
    pub size: u64,
    /// Seconds since the Unix epoch
    pub modified: u64,
}

/// Filesystem-backed media library
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
    base_url: String,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn category_dir(&self, category: Option<&str>) -> Result<(String, PathBuf), MediaError> {
        let raw = category.unwrap_or(DEFAULT_CATEGORY);
        let category =
            normalize_category(raw).ok_or_else(|| MediaError::InvalidCategory(raw.to_string()))?;
        let dir = self.root.join(&category);
        Ok((category, dir))
    }

    fn url_for(&self, category: &str, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, category, name)
    }

    /// Store a file and return its URL
    pub async fn store(&self, file: &UploadFile, category: Option<&str>) -> Result<String, MediaError> {
        let (category, dir) = self.category_dir(category)?;
        tokio::fs::create_dir_all(&dir).await?;

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let base = sanitize_file_name(&file.name);

        let mut name = format!("{}-{}", stamp, base);
        let mut attempt = 1;
        while tokio::fs::try_exists(dir.join(&name)).await? {
            attempt += 1;
            name = format!("{}-{}-{}", stamp, attempt, base);
        }

        tokio::fs::write(dir.join(&name), &file.bytes).await?;
        let url = self.url_for(&category, &name);
        log::info!("Stored {} ({} bytes) as {}", file.name, file.size(), url);
        Ok(url)
    }

    /// Browse stored files, newest first. Without a category every
    /// category is listed.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<MediaItem>, MediaError> {
        let categories = match category {
            Some(_) => vec![self.category_dir(category)?.0],
            None => self.categories().await?,
        };

        let mut items = Vec::new();
        for category in categories {
            let dir = self.root.join(&category);
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let metadata = entry.metadata().await?;
                if !metadata.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                let modified = metadata
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                items.push(MediaItem {
                    url: self.url_for(&category, &name),
                    category: category.clone(),
                    name,
                    size: metadata.len(),
                    modified,
                });
            }
        }

        items.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(items)
    }

    /// Category directories present under the root
    pub async fn categories(&self) -> Result<Vec<String>, MediaError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut categories = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if normalize_category(&name).as_deref() == Some(name.as_str()) {
                categories.push(name);
            }
        }
        categories.sort();
        Ok(categories)
    }

    /// Filesystem path a library URL points to
    pub fn path_for_url(&self, url: &str) -> Result<PathBuf, MediaError> {
        let foreign = || MediaError::ForeignUrl(url.to_string());
        let relative = url
            .strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(foreign)?;
        let (category, name) = relative.split_once('/').ok_or_else(foreign)?;

        let category_ok = normalize_category(category).as_deref() == Some(category);
        let name_ok = sanitize_file_name(name) == name;
        if !category_ok || !name_ok {
            return Err(foreign());
        }
        Ok(self.root.join(category).join(name))
    }

    /// Delete the file behind a library URL
    pub async fn delete_url(&self, url: &str) -> Result<(), MediaError> {
        let path = self.path_for_url(url)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                log::info!("Deleted media file {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MediaError::NotFound(path)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Uploader for MediaLibrary {
    async fn upload(&self, file: &UploadFile, category: Option<&str>) -> Result<String, UploadError> {
        Ok(self.store(file, category).await?)
    }
}

#[async_trait]
impl RemovalHandler for MediaLibrary {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError> {
        Ok(self.delete_url(url).await?)
    }
}
