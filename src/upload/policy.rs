//! Client-side upload checks, run before any network call.

use crate::error::UploadError;
use crate::upload::UploadFile;

/// 5 MB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Size ceiling and MIME family an upload must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub mime_prefix: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            mime_prefix: "image/".to_string(),
        }
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    pub fn validate(&self, file: &UploadFile) -> Result<(), UploadError> {
        let mime = file.mime.trim().to_ascii_lowercase();
        if mime.len() <= self.mime_prefix.len() || !mime.starts_with(&self.mime_prefix) {
            return Err(UploadError::UnsupportedType(file.mime.clone()));
        }

        let size = file.size();
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        Ok(())
    }
}
