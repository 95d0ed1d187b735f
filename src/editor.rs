//! Editor
//!
//! Owns a document, its undo history and the image lifecycle around it.
//! Every committed change is serialized to HTML and handed to the change
//! listener; every content change is shown to the removal observer.

use std::sync::Arc;

use crate::document::{to_html, Document, Node, NodePath};
use crate::error::{EditorError, UploadError};
use crate::image::{self, View};
use crate::observer::{RemovalHandler, RemovalObserver, RemovalTiming};
use crate::transaction::{Applied, Entry, History, Transaction};
use crate::upload::{UploadFile, UploadPolicy, Uploader};

/// Receives the serialized document after every change
pub type ChangeListener = Box<dyn Fn(&str) + Send + Sync>;

pub struct Editor {
    doc: Document,
    history: History,
    observer: Option<RemovalObserver>,
    uploader: Option<Arc<dyn Uploader>>,
    policy: UploadPolicy,
    category: Option<String>,
    on_change: Option<ChangeListener>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            history: History::default(),
            observer: None,
            uploader: None,
            policy: UploadPolicy::default(),
            category: None,
            on_change: None,
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Notify `handler` about images that leave the document
    pub fn with_removal_handler(
        mut self,
        handler: Arc<dyn RemovalHandler>,
        timing: RemovalTiming,
    ) -> Self {
        self.observer = Some(RemovalObserver::new(handler, timing));
        self
    }

    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Category sent with uploads
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn on_change(mut self, listener: ChangeListener) -> Self {
        self.on_change = Some(listener);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn html(&self) -> String {
        to_html(&self.doc)
    }

    pub fn render(&self) -> Vec<View> {
        image::render(&self.doc)
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn observer(&self) -> Option<&RemovalObserver> {
        self.observer.as_ref()
    }

    /// Replace the whole document, e.g. when opening another article.
    /// History is reset and nothing counts as removed.
    pub fn load(&mut self, doc: Document) {
        self.doc = doc;
        self.history.clear();
        self.emit_change();
    }

    /// Apply a transaction. Returns whether the document changed.
    pub fn dispatch(&mut self, tr: &Transaction) -> Result<bool, EditorError> {
        let applied = tr.apply(&self.doc)?;
        Ok(self.commit(applied, true))
    }

    fn commit(&mut self, applied: Applied, observe_removals: bool) -> bool {
        if !applied.doc_changed() {
            return false;
        }
        if observe_removals {
            if let Some(observer) = self.observer.as_mut() {
                observer.observe(&applied);
            }
        }
        let Applied { before, after } = applied;
        self.history.record(before, observe_removals);
        self.doc = after;
        self.emit_change();
        true
    }

    /// Restore a snapshot from history. It goes through the observer like
    /// the change it undoes or redoes did.
    fn restore(&mut self, entry: Entry) {
        let before = std::mem::replace(&mut self.doc, entry.doc);
        if entry.observe_removals {
            if let Some(observer) = self.observer.as_mut() {
                observer.observe_change(&before, &self.doc);
            }
        }
        self.emit_change();
    }

    fn emit_change(&self) {
        if let Some(listener) = &self.on_change {
            listener(&to_html(&self.doc));
        }
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.doc) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.doc) {
            Some(entry) => {
                self.restore(entry);
                true
            }
            None => false,
        }
    }

    /// Delete control of an image node
    pub fn delete_image(&mut self, path: &[usize]) -> Result<(), EditorError> {
        let tr = image::delete_transaction(&self.doc, path)?;
        self.dispatch(&tr)?;
        Ok(())
    }

    pub fn set_image_alt(&mut self, path: &[usize], alt: &str) -> Result<bool, EditorError> {
        image::image_at(&self.doc, path)?;
        self.dispatch(&Transaction::new().set_image_alt(path.to_vec(), alt))
    }

    /// Replace control of an image node: upload `file` and point the node
    /// at it. The previous file stays on storage.
    pub async fn replace_image(
        &mut self,
        path: &[usize],
        file: &UploadFile,
    ) -> Result<String, EditorError> {
        image::image_at(&self.doc, path)?;
        let url = self.upload(file).await?;

        let tr = image::replace_transaction(&self.doc, path, &url)?;
        let applied = tr.apply(&self.doc)?;
        // The old source disappears here on purpose; it is not a removal
        self.commit(applied, false);
        Ok(url)
    }

    /// Upload `file` and insert a new image node at `path`
    pub async fn insert_image(
        &mut self,
        path: NodePath,
        file: &UploadFile,
        alt: &str,
    ) -> Result<String, EditorError> {
        let url = self.upload(file).await?;
        self.dispatch(&Transaction::new().insert(path, Node::image(url.clone(), alt)))?;
        Ok(url)
    }

    /// Validate against the policy, then hand the file to the uploader
    async fn upload(&self, file: &UploadFile) -> Result<String, UploadError> {
        self.policy.validate(file)?;
        let uploader = self.uploader.as_ref().ok_or(UploadError::Unavailable)?;
        let url = uploader.upload(file, self.category.as_deref()).await?;
        log::debug!("Uploaded {} as {}", file.name, url);
        Ok(url)
    }

    /// Wait for scheduled removal callbacks
    pub async fn flush(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.flush().await;
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("doc", &self.doc)
            .field("observer", &self.observer)
            .field("policy", &self.policy)
            .field("category", &self.category)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use std::sync::Mutex;

    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph("intro"),
            Node::image("a.png", "A"),
            Node::paragraph("outro"),
        ])
    }

    #[test]
    fn test_change_listener_receives_html() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut editor = Editor::new(Document::default()).on_change(Box::new(move |html| {
            sink.lock().unwrap().push(html.to_string());
        }));

        editor
            .dispatch(&Transaction::new().insert(vec![0], Node::paragraph("hi")))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["<p>hi</p>"]);
    }

    #[test]
    fn test_noop_dispatch_emits_nothing() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let mut editor = Editor::new(sample()).on_change(Box::new(move |_| {
            *counter.lock().unwrap() += 1;
        }));
        assert!(!editor.dispatch(&Transaction::new()).unwrap());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_delete_image_without_observer() {
        let mut editor = Editor::new(sample());
        editor.delete_image(&[1]).unwrap();
        assert_eq!(editor.html(), "<p>intro</p><p>outro</p>");
        assert!(editor.undo());
        assert_eq!(editor.document(), &sample());
        assert!(editor.redo());
        assert_eq!(editor.document().nodes.len(), 2);
    }

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl RemovalHandler for Recorder {
        async fn on_image_removed(&self, url: &str) -> Result<(), crate::error::RemovalError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_delete_image_outside_runtime_keeps_editing() {
        let recorder = Arc::new(Recorder::default());
        let mut editor = Editor::new(sample())
            .with_removal_handler(recorder.clone(), RemovalTiming::default());

        editor.delete_image(&[1]).unwrap();
        assert_eq!(editor.html(), "<p>intro</p><p>outro</p>");
        assert_eq!(editor.observer().map(RemovalObserver::pending), Some(0));
        assert!(recorder.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_delete_non_image_is_rejected() {
        let mut editor = Editor::new(sample());
        let err = editor.delete_image(&[0]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Document(DocumentError::NotAnImage { .. })
        ));
        assert_eq!(editor.document(), &sample());
    }

    #[tokio::test]
    async fn test_replace_without_uploader() {
        let mut editor = Editor::new(sample());
        let file = UploadFile::new("b.png", "image/png", vec![1, 2, 3]);
        let err = editor.replace_image(&[1], &file).await.unwrap_err();
        assert!(matches!(err, EditorError::Upload(UploadError::Unavailable)));
        assert_eq!(editor.document(), &sample());
    }

    #[test]
    fn test_set_alt() {
        let mut editor = Editor::new(sample());
        assert!(editor.set_image_alt(&[1], "Studio floor").unwrap());
        assert_eq!(editor.document().nodes[1], Node::image("a.png", "Studio floor"));
    }

    #[test]
    fn test_load_resets_history() {
        let mut editor = Editor::new(sample());
        editor.delete_image(&[1]).unwrap();
        editor.load(Document::default());
        assert!(!editor.undo());
        assert!(editor.document().is_empty());
    }
}
