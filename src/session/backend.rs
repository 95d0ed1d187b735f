use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::editor::Editor;
use crate::error::RemovalError;
use crate::media::MediaLibrary;
use crate::observer::RemovalHandler;
use crate::session::protocol::{Event, NoticeLevel};
use crate::upload::{HttpMediaClient, Uploader};

/// State of one editing session
pub struct Session {
    pub editor: Editor,
    /// Local library, when uploads are stored locally
    pub media: Option<Arc<MediaLibrary>>,
    pub events: UnboundedSender<Event>,
}

impl Session {
    /// Build a session whose collaborators come from configuration: the
    /// remote endpoint when one is set, the local media library otherwise
    pub fn new(config: &Config, events: UnboundedSender<Event>) -> Self {
        match &config.upload_endpoint {
            Some(endpoint) => {
                log::info!("Using media endpoint {}", endpoint);
                let client = Arc::new(HttpMediaClient::new(endpoint.clone()));
                Self::with_collaborators(config, client.clone(), client, None, events)
            }
            None => {
                log::info!("Using local media library at {:?}", config.media_dir);
                let library = Arc::new(MediaLibrary::new(
                    config.media_dir.clone(),
                    config.media_base_url.clone(),
                ));
                Self::with_collaborators(
                    config,
                    library.clone(),
                    library.clone(),
                    Some(library),
                    events,
                )
            }
        }
    }

    pub fn with_collaborators(
        config: &Config,
        uploader: Arc<dyn Uploader>,
        removal_handler: Arc<dyn RemovalHandler>,
        media: Option<Arc<MediaLibrary>>,
        events: UnboundedSender<Event>,
    ) -> Self {
        let reporting = Arc::new(ReportingHandler {
            inner: removal_handler,
            events: events.clone(),
        });
        let changes = events.clone();

        let editor = Editor::default()
            .with_uploader(uploader)
            .with_removal_handler(reporting, config.removal_timing())
            .with_policy(config.upload_policy())
            .with_category(config.default_category.clone())
            .on_change(Box::new(move |html| {
                let _ = changes.send(Event::Changed {
                    html: html.to_string(),
                });
            }));

        Self {
            editor,
            media,
            events,
        }
    }

    pub fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            log::warn!("Event dropped, writer is gone");
        }
    }

    /// Wait for outstanding removal callbacks
    pub async fn finish(&mut self) {
        self.editor.flush().await;
    }
}

/// Forwards removal outcomes to the host as events
struct ReportingHandler {
    inner: Arc<dyn RemovalHandler>,
    events: UnboundedSender<Event>,
}

#[async_trait]
impl RemovalHandler for ReportingHandler {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError> {
        let result = self.inner.on_image_removed(url).await;
        let event = match &result {
            Ok(()) => Event::ImageDeleted {
                url: url.to_string(),
            },
            Err(e) => Event::notice(
                NoticeLevel::Warning,
                format!("Could not delete {}: {}", url, e),
            ),
        };
        let _ = self.events.send(event);
        result
    }
}
