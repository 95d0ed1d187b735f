use crate::document::parse_html;
use crate::error::EditorError;
use crate::session::backend::Session;
use crate::session::protocol::{Event, NoticeLevel, Request};
use crate::transaction::Transaction;
use crate::upload::UploadFile;

impl Session {
    /// Carry out one request, reporting the outcome as events
    pub async fn handle(&mut self, request: Request) {
        log::debug!("Handling {:?}", request);
        match request {
            Request::Load { html } => self.editor.load(parse_html(&html)),
            Request::Html => self.send(Event::Html {
                html: self.editor.html(),
            }),
            Request::Render => self.send(Event::View {
                nodes: self.editor.render(),
            }),
            Request::DeleteImage { path } => {
                let result = self.editor.delete_image(&path);
                self.report(result);
            }
            Request::DeleteNode { path } => self.dispatch(Transaction::new().remove(path)),
            Request::Cut { parent, start, end } => {
                self.dispatch(Transaction::new().remove_range(parent, start, end))
            }
            Request::MoveNode { from, to } => self.dispatch(Transaction::new().move_node(from, to)),
            Request::SetAlt { path, alt } => {
                let result = self.editor.set_image_alt(&path, &alt).map(drop);
                self.report(result);
            }
            Request::ReplaceImage { path, file, mime } => {
                let Some(file) = self.read_file(&file, mime).await else {
                    return;
                };
                let result = self.editor.replace_image(&path, &file).await;
                self.report_upload(result);
            }
            Request::InsertImage {
                path,
                file,
                mime,
                alt,
            } => {
                let Some(file) = self.read_file(&file, mime).await else {
                    return;
                };
                let result = self.editor.insert_image(path, &file, &alt).await;
                self.report_upload(result);
            }
            Request::Undo => {
                if !self.editor.undo() {
                    self.send(Event::notice(NoticeLevel::Info, "Nothing to undo"));
                }
            }
            Request::Redo => {
                if !self.editor.redo() {
                    self.send(Event::notice(NoticeLevel::Info, "Nothing to redo"));
                }
            }
            Request::ListMedia { category } => self.list_media(category.as_deref()).await,
        }
    }

    fn dispatch(&mut self, tr: Transaction) {
        let result = self.editor.dispatch(&tr).map(drop);
        self.report(result);
    }

    fn report(&self, result: Result<(), EditorError>) {
        if let Err(e) = result {
            self.send(error_event(e));
        }
    }

    fn report_upload(&self, result: Result<String, EditorError>) {
        match result {
            Ok(url) => self.send(Event::Uploaded { url }),
            Err(e) => self.send(error_event(e)),
        }
    }

    async fn read_file(&self, path: &std::path::Path, mime: Option<String>) -> Option<UploadFile> {
        match UploadFile::from_path(path, mime).await {
            Ok(file) => Some(file),
            Err(e) => {
                self.send(Event::notice(
                    NoticeLevel::Error,
                    format!("Could not read {:?}: {}", path, e),
                ));
                None
            }
        }
    }

    async fn list_media(&self, category: Option<&str>) {
        let Some(media) = &self.media else {
            self.send(Event::error("Media library is not available with a remote endpoint"));
            return;
        };
        match media.list(category).await {
            Ok(items) => self.send(Event::Media { items }),
            Err(e) => self.send(Event::error(e.to_string())),
        }
    }
}

/// Upload problems are user-facing notices; everything else is an error
fn error_event(error: EditorError) -> Event {
    match error {
        EditorError::Upload(e) => {
            log::warn!("Upload failed: {}", e);
            Event::notice(NoticeLevel::Error, e.to_string())
        }
        EditorError::Document(e) => Event::error(e.to_string()),
    }
}
