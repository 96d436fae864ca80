use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, Instant};

use super::buffer::ReviewBuffer;
use super::parser::StructuredExtraction;
use crate::models::AccountSummary;

/// Image a draft was extracted from, kept until the draft is committed.
#[derive(Clone)]
pub struct PendingScreenshot {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PendingScreenshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingScreenshot")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One user's review state between extraction and commit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Draft {
    pub trades: ReviewBuffer,
    pub summary: Option<AccountSummary>,
    pub raw_output: Option<String>,
    #[serde(skip)]
    pub screenshot: Option<PendingScreenshot>,
    pub screenshot_name: Option<String>,
}

impl Draft {
    pub fn from_extraction(extraction: StructuredExtraction, screenshot: PendingScreenshot) -> Self {
        Self {
            trades: ReviewBuffer::from_candidates(extraction.trades),
            summary: extraction.summary,
            raw_output: extraction.raw_output,
            screenshot_name: Some(screenshot.file_name.clone()),
            screenshot: Some(screenshot),
        }
    }
}

/// How often idle drafts are swept.
const SWEEP_INTERVAL_SECS: u64 = 300;

#[derive(Debug)]
struct Entry {
    draft: Draft,
    touched: Instant,
}

impl Entry {
    fn new(draft: Draft) -> Self {
        Self {
            draft,
            touched: Instant::now(),
        }
    }
}

/// In-memory drafts, one per user. Lost on restart, like any unsaved form.
/// Drafts untouched for longer than the idle window are dropped by the sweeper.
#[derive(Debug, Clone, Default)]
pub struct DraftStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    committing: Arc<Mutex<HashSet<String>>>,
}

/// Held while a user's draft is being saved; released on drop, including
/// when the request is cancelled mid-write.
#[derive(Debug)]
pub struct CommitGuard {
    committing: Arc<Mutex<HashSet<String>>>,
    user_id: String,
}

impl Drop for CommitGuard {
    fn drop(&mut self) {
        self.committing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the user's draft (empty if there is none).
    pub async fn get(&self, user_id: &str) -> Draft {
        self.inner
            .read()
            .await
            .get(user_id)
            .map(|e| e.draft.clone())
            .unwrap_or_default()
    }

    pub async fn put(&self, user_id: &str, draft: Draft) {
        self.inner
            .write()
            .await
            .insert(user_id.to_string(), Entry::new(draft));
    }

    /// Mutate the user's draft in place, creating an empty one if needed.
    pub async fn update<F, R>(&self, user_id: &str, f: F) -> R
    where
        F: FnOnce(&mut Draft) -> R,
    {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(user_id.to_string())
            .or_insert_with(|| Entry::new(Draft::default()));
        entry.touched = Instant::now();
        f(&mut entry.draft)
    }

    pub async fn remove(&self, user_id: &str) {
        self.inner.write().await.remove(user_id);
    }

    /// Claim the user's draft for saving. `None` while another save for the
    /// same user is still running.
    pub fn begin_commit(&self, user_id: &str) -> Option<CommitGuard> {
        let claimed = self
            .committing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string());

        claimed.then(|| CommitGuard {
            committing: Arc::clone(&self.committing),
            user_id: user_id.to_string(),
        })
    }

    /// Drop every draft idle for at least `max_idle`. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, e| e.touched.elapsed() < max_idle);
        before - guard.len()
    }

    /// Sweep idle drafts forever.
    pub async fn run_sweeper(self, max_idle: Duration) {
        let mut ticker = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        tracing::info!(idle_secs = max_idle.as_secs(), "Draft sweeper started");

        loop {
            ticker.tick().await;
            let evicted = self.evict_idle(max_idle).await;
            if evicted > 0 {
                tracing::info!(evicted, "Idle drafts dropped");
            }
        }
    }
}
