//! Image Removal Observer
//!
//! Watches committed transactions for image nodes that disappeared from
//! the document and notifies a removal handler, once per guard window.
//!
//! Algorithm:
//! - collect the image sources of the pre-transaction document
//! - keep those no longer present anywhere in the post-transaction document
//! - for each, ask the debouncer; if it fires, run the handler after the
//!   removal delay on its own task

pub mod debounce;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};

use crate::document::Document;
use crate::error::RemovalError;
use crate::transaction::Applied;

pub use debounce::Debouncer;

/// Delay before the handler runs after a removal
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(200);
/// Window during which the same source does not fire again
pub const DEFAULT_GUARD_WINDOW: Duration = Duration::from_secs(5);

/// Collaborator told about images that left the document
#[async_trait]
pub trait RemovalHandler: Send + Sync {
    async fn on_image_removed(&self, url: &str) -> Result<(), RemovalError>;
}

/// Timing parameters of the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalTiming {
    pub removal_delay: Duration,
    pub guard_window: Duration,
}

impl Default for RemovalTiming {
    fn default() -> Self {
        Self {
            removal_delay: DEFAULT_REMOVAL_DELAY,
            guard_window: DEFAULT_GUARD_WINDOW,
        }
    }
}

/// Image sources present in `before` but nowhere in `after`, deduplicated,
/// in document order
pub fn removed_image_srcs(before: &Document, after: &Document) -> Vec<String> {
    let mut seen = HashSet::new();
    before
        .image_srcs()
        .into_iter()
        .filter(|src| !src.is_empty() && seen.insert(*src))
        .filter(|src| !after.contains_image_src(src))
        .map(str::to_string)
        .collect()
}

/// Turns image removals into debounced handler calls
pub struct RemovalObserver {
    handler: Arc<dyn RemovalHandler>,
    debouncer: Debouncer,
    removal_delay: Duration,
    tasks: JoinSet<()>,
}

impl RemovalObserver {
    pub fn new(handler: Arc<dyn RemovalHandler>, timing: RemovalTiming) -> Self {
        Self {
            handler,
            debouncer: Debouncer::new(timing.guard_window),
            removal_delay: timing.removal_delay,
            tasks: JoinSet::new(),
        }
    }

    /// Inspect a committed transaction; returns the sources scheduled for
    /// the handler. Outside a Tokio runtime nothing is scheduled.
    pub fn observe(&mut self, applied: &Applied) -> Vec<String> {
        if !applied.doc_changed() {
            return Vec::new();
        }
        self.observe_change(&applied.before, &applied.after)
    }

    pub fn observe_change(&mut self, before: &Document, after: &Document) -> Vec<String> {
        self.reap();

        let removed = removed_image_srcs(before, after);
        if removed.is_empty() {
            return Vec::new();
        }
        if tokio::runtime::Handle::try_current().is_err() {
            log::warn!(
                "No async runtime, skipping removal callbacks for {}",
                removed.join(", ")
            );
            return Vec::new();
        }

        let mut scheduled = Vec::new();
        for src in removed {
            if !self.debouncer.should_fire(&src) {
                log::debug!("Removal of {} suppressed by guard", src);
                continue;
            }
            log::debug!("Scheduling removal callback for {}", src);
            self.schedule(src.clone());
            scheduled.push(src);
        }
        scheduled
    }

    fn schedule(&mut self, url: String) {
        let handler = Arc::clone(&self.handler);
        let delay = self.removal_delay;
        self.tasks.spawn(async move {
            sleep(delay).await;
            match handler.on_image_removed(&url).await {
                Ok(()) => log::info!("Removed orphaned image {}", url),
                Err(e) => log::warn!("Failed to remove orphaned image {}: {}", url, e),
            }
        });
    }

    /// Drop bookkeeping for callbacks that already finished
    fn reap(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                log::warn!("Removal callback task failed: {}", e);
            }
        }
    }

    /// Number of callbacks scheduled or running
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every scheduled callback to finish
    pub async fn flush(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                log::warn!("Removal callback task failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for RemovalObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalObserver")
            .field("debouncer", &self.debouncer)
            .field("removal_delay", &self.removal_delay)
            .field("pending", &self.tasks.len())
            .finish()
    }
}
