//! Wire format of the media endpoint.

use serde::{Deserialize, Serialize};

use crate::error::UploadError;

/// Response body of the upload and delete endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MediaResponse {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
        }
    }

    /// Reason given for a failure, or a generic one
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "unknown error".to_string())
    }

    /// URL of a successful upload
    pub fn into_url(self) -> Result<String, UploadError> {
        match (self.success, self.url) {
            (true, Some(url)) if !url.is_empty() => Ok(url),
            (true, _) => Err(UploadError::Rejected(
                "endpoint reported success without a url".to_string(),
            )),
            (false, _) => Err(UploadError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}
