//! Removal callbacks across edit sequences: the guard window, undo/redo
//! storms, and removals that do not go through the delete control
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use studio_editor::document::{parse_html, Document, Node};
use studio_editor::error::RemovalError;
use studio_editor::observer::{removed_image_srcs, RemovalHandler, RemovalTiming};
use studio_editor::transaction::Transaction;
use studio_editor::Editor;

#[derive(Default)]
struct Recorder {
    urls: Mutex<Vec<String>>,
}

impl Recorder {
    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    fn count(&self, url: &str) -> usize {
        self.urls().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl RemovalHandler for Recorder {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Always fails; the editor must keep working
struct Broken;

#[async_trait]
impl RemovalHandler for Broken {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError> {
        Err(RemovalError::Rejected(format!("{} is locked", url)))
    }
}

fn gallery() -> Document {
    parse_html(
        r#"<h2>Spring showcase</h2>
<img src="/media/gallery/a.png" alt="Warmup">
<p>Between</p>
<img src="/media/gallery/b.png" alt="Finale">"#,
    )
}

fn observed(recorder: Arc<Recorder>) -> Editor {
    Editor::new(gallery()).with_removal_handler(recorder, RemovalTiming::default())
}

#[tokio::test(start_paused = true)]
async fn undo_redo_storm_fires_once_within_window() {
    let recorder = Arc::new(Recorder::default());
    let mut editor = observed(recorder.clone());

    editor.delete_image(&[1]).unwrap();
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(editor.undo());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(editor.redo());
    }

    editor.flush().await;
    assert_eq!(recorder.urls(), vec!["/media/gallery/a.png"]);
}

#[tokio::test(start_paused = true)]
async fn same_source_fires_again_after_window() {
    let recorder = Arc::new(Recorder::default());
    let mut editor = observed(recorder.clone());

    editor.delete_image(&[1]).unwrap();
    editor.flush().await;
    assert!(editor.undo());

    tokio::time::sleep(Duration::from_secs(6)).await;
    editor.delete_image(&[1]).unwrap();
    editor.flush().await;

    assert_eq!(recorder.count("/media/gallery/a.png"), 2);
}

#[tokio::test(start_paused = true)]
async fn distinct_sources_have_independent_guards() {
    let recorder = Arc::new(Recorder::default());
    let mut editor = observed(recorder.clone());

    editor.delete_image(&[3]).unwrap();
    editor.delete_image(&[1]).unwrap();
    editor.flush().await;

    let mut urls = recorder.urls();
    urls.sort();
    assert_eq!(urls, vec!["/media/gallery/a.png", "/media/gallery/b.png"]);
}

#[tokio::test(start_paused = true)]
async fn selection_cut_counts_as_removal() {
    let recorder = Arc::new(Recorder::default());
    let mut editor = observed(recorder.clone());

    // Cut the first image together with the heading and paragraph
    editor
        .dispatch(&Transaction::new().remove_range(vec![], 0, 3))
        .unwrap();
    editor.flush().await;

    assert_eq!(recorder.urls(), vec!["/media/gallery/a.png"]);
    assert_eq!(editor.document().image_srcs(), vec!["/media/gallery/b.png"]);
}

#[tokio::test(start_paused = true)]
async fn moving_an_image_is_not_a_removal() {
    let recorder = Arc::new(Recorder::default());
    let mut editor = observed(recorder.clone());

    editor
        .dispatch(&Transaction::new().move_node(vec![1], vec![3]))
        .unwrap();
    editor.flush().await;

    assert!(recorder.urls().is_empty());
    assert_eq!(editor.document().nodes.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn duplicate_source_fires_only_when_last_copy_goes() {
    let recorder = Arc::new(Recorder::default());
    let doc = Document::new(vec![
        Node::image("/media/gallery/a.png", "one"),
        Node::image("/media/gallery/a.png", "two"),
    ]);
    let mut editor =
        Editor::new(doc).with_removal_handler(recorder.clone(), RemovalTiming::default());

    editor.delete_image(&[0]).unwrap();
    editor.flush().await;
    assert!(recorder.urls().is_empty());

    editor.delete_image(&[0]).unwrap();
    editor.flush().await;
    assert_eq!(recorder.urls(), vec!["/media/gallery/a.png"]);
}

#[tokio::test(start_paused = true)]
async fn nested_image_removal_is_observed() {
    let recorder = Arc::new(Recorder::default());
    let doc = parse_html(r#"<blockquote><p>Quote</p><img src="q.png"></blockquote>"#);
    let mut editor =
        Editor::new(doc).with_removal_handler(recorder.clone(), RemovalTiming::default());

    editor.dispatch(&Transaction::new().remove(vec![0])).unwrap();
    editor.flush().await;

    assert_eq!(recorder.urls(), vec!["q.png"]);
}

#[tokio::test(start_paused = true)]
async fn custom_timing_is_respected() {
    let recorder = Arc::new(Recorder::default());
    let timing = RemovalTiming {
        removal_delay: Duration::from_millis(10),
        guard_window: Duration::from_millis(100),
    };
    let mut editor = Editor::new(gallery()).with_removal_handler(recorder.clone(), timing);

    editor.delete_image(&[1]).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    editor.flush().await;
    assert_eq!(recorder.urls().len(), 1);

    assert!(editor.undo());
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(editor.redo());
    editor.flush().await;
    assert_eq!(recorder.urls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failing_handler_does_not_break_editing() {
    let mut editor =
        Editor::new(gallery()).with_removal_handler(Arc::new(Broken), RemovalTiming::default());

    editor.delete_image(&[1]).unwrap();
    editor.flush().await;
    editor.delete_image(&[2]).unwrap();
    editor.flush().await;

    assert!(editor.document().image_srcs().is_empty());
    assert_eq!(editor.observer().map(|o| o.pending()), Some(0));
}

#[test]
fn removed_sources_ignore_unchanged_and_empty() {
    let before = Document::new(vec![
        Node::image("", "placeholder"),
        Node::image("keep.png", ""),
        Node::image("gone.png", ""),
    ]);
    let after = Document::new(vec![Node::image("keep.png", "")]);
    assert_eq!(removed_image_srcs(&before, &after), vec!["gone.png"]);
    assert!(removed_image_srcs(&before, &before).is_empty());
}
