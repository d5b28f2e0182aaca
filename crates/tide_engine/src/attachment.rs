use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tide_logging::{tide_debug, tide_info, tide_warn};
use url::Url;

use crate::persist::{ensure_dir, PersistError};

/// Payload key holding the remote image URL.
pub const IMAGE_KEY: &str = "image";
/// Identifier given to the downloaded image attachment.
pub const ATTACHMENT_IDENTIFIER: &str = "image";

/// A push notification as delivered to the device.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub user_info: Map<String, Value>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub identifier: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("attachment too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct AttachmentSettings {
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub file_suffix: String,
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            max_bytes: 10 * 1024 * 1024,
            file_suffix: ".jpg".to_string(),
        }
    }
}

/// Downloads a notification's image so it can be shown inline.
///
/// Enrichment is best effort: any failure leaves the content exactly as it
/// arrived.
#[derive(Debug, Clone)]
pub struct AttachmentFetcher {
    client: reqwest::Client,
    dir: PathBuf,
    settings: AttachmentSettings,
}

impl AttachmentFetcher {
    pub fn new(dir: PathBuf, settings: AttachmentSettings) -> Result<Self, AttachmentError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            dir,
            settings,
        })
    }

    pub async fn enrich(&self, mut content: NotificationContent) -> NotificationContent {
        let Some(url) = image_url(&content.user_info) else {
            tide_debug!("Notification has no usable image URL");
            return content;
        };
        match self.download(&url).await {
            Ok(path) => {
                tide_info!("Attached notification image {} -> {:?}", url, path);
                content.attachments = vec![Attachment {
                    identifier: ATTACHMENT_IDENTIFIER.to_string(),
                    path,
                }];
            }
            Err(err) => {
                tide_warn!("Notification image {} not attached: {}", url, err);
            }
        }
        content
    }

    /// Like [`enrich`](Self::enrich), but hands back the content unchanged
    /// once `deadline` expires.
    pub async fn enrich_within(
        &self,
        content: NotificationContent,
        deadline: Duration,
    ) -> NotificationContent {
        let best_attempt = content.clone();
        match tokio::time::timeout(deadline, self.enrich(content)).await {
            Ok(enriched) => enriched,
            Err(_) => {
                tide_warn!("Notification enrichment expired after {:?}", deadline);
                best_attempt
            }
        }
    }

    /// Streams the image into a fresh file under the attachment directory.
    pub async fn download(&self, url: &Url) -> Result<PathBuf, AttachmentError> {
        ensure_dir(&self.dir)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttachmentError::HttpStatus(status.as_u16()));
        }
        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(AttachmentError::TooLarge { max_bytes });
        }

        // Dropping the temp file on any error below removes the partial download.
        let mut file = tempfile::Builder::new()
            .prefix("attachment-")
            .suffix(&self.settings.file_suffix)
            .tempfile_in(&self.dir)?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > max_bytes {
                return Err(AttachmentError::TooLarge { max_bytes });
            }
            file.write_all(&chunk)?;
        }
        file.flush()?;

        let (_file, path) = file.keep().map_err(|err| AttachmentError::Io(err.error))?;
        Ok(path)
    }
}

fn image_url(user_info: &Map<String, Value>) -> Option<Url> {
    let raw = user_info.get(IMAGE_KEY)?.as_str()?;
    Url::parse(raw).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn info(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn image_url_requires_a_parseable_string() {
        assert!(image_url(&info(json!({}))).is_none());
        assert!(image_url(&info(json!({ "image": 42 }))).is_none());
        assert!(image_url(&info(json!({ "image": "not a url" }))).is_none());
        assert_eq!(
            image_url(&info(json!({ "image": "https://cdn.test/a.jpg" })))
                .map(|url| url.to_string()),
            Some("https://cdn.test/a.jpg".to_string())
        );
    }

    #[test]
    fn content_deserializes_with_missing_fields() {
        let content: NotificationContent =
            serde_json::from_value(json!({ "title": "Hi" })).unwrap();
        assert_eq!(content.title, "Hi");
        assert!(content.user_info.is_empty());
        assert!(content.attachments.is_empty());
    }
}
