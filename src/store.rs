//! Retention store for scored headlines.
//!
//! Unique by exact title, bounded by count (`max_items`, keeps the newest)
//! and by age (`max_age`). Kept sorted newest-first by `published_at`, ties
//! broken by `first_seen_at`. Cleared at the first cycle of every local
//! calendar day.
//!
//! Persistence is a single JSON document: `{ "items": [...], "last_reset_date": "YYYY-MM-DD" }`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::analyze::ScoredItem;
use crate::config::RetentionCfg;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedNews {
    #[serde(default)]
    pub items: Vec<ScoredItem>,
    #[serde(default)]
    pub last_reset_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewsStore {
    items: Vec<ScoredItem>,
    max_items: usize,
    max_age: Duration,
    last_reset_date: Option<NaiveDate>,
}

impl NewsStore {
    pub fn new(max_items: usize, max_age: Duration) -> Self {
        Self {
            items: Vec::new(),
            max_items,
            max_age,
            last_reset_date: None,
        }
    }

    pub fn from_cfg(cfg: &RetentionCfg) -> Result<Self> {
        let max_age = i64::try_from(cfg.max_age_hours)
            .ok()
            .and_then(Duration::try_hours)
            .with_context(|| format!("retention.max_age_hours {} is out of range", cfg.max_age_hours))?;
        Ok(Self::new(cfg.max_items, max_age))
    }

    /// Replace contents with a persisted snapshot. Duplicates and overflow
    /// in the document are cleaned up on the way in.
    pub fn restore(&mut self, doc: PersistedNews) {
        self.items.clear();
        self.last_reset_date = doc.last_reset_date;
        for it in doc.items {
            if !self.contains_title(&it.title) {
                self.items.push(it);
            }
        }
        self.sort_and_cap();
    }

    pub fn to_persisted(&self) -> PersistedNews {
        PersistedNews {
            items: self.items.clone(),
            last_reset_date: self.last_reset_date,
        }
    }

    /// Insert items whose title is not retained yet; returns how many were added.
    /// Retained items keep their first `first_seen_at` and score.
    pub fn append<I>(&mut self, items: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = ScoredItem>,
    {
        let horizon = age_horizon(now, self.max_age);
        let mut added = 0;
        for it in items {
            if it.published_at < horizon || self.contains_title(&it.title) {
                continue;
            }
            self.items.push(it);
            added += 1;
        }
        self.items.retain(|it| it.published_at >= horizon);
        self.sort_and_cap();
        added
    }

    /// Newest-first view, at most `limit` items younger than `max_age`.
    pub fn list_recent(&self, limit: usize, max_age: Duration, now: DateTime<Utc>) -> Vec<ScoredItem> {
        let horizon = age_horizon(now, max_age);
        self.items
            .iter()
            .filter(|it| it.published_at >= horizon)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Clears the store when `today` differs from the last reset marker.
    pub fn reset_if_new_day(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == Some(today) {
            return false;
        }
        self.items.clear();
        self.last_reset_date = Some(today);
        true
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.items.iter().any(|it| it.title == title)
    }

    pub fn items(&self) -> &[ScoredItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_reset_date(&self) -> Option<NaiveDate> {
        self.last_reset_date
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn sort_and_cap(&mut self) {
        self.items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.first_seen_at.cmp(&a.first_seen_at))
        });
        self.items.truncate(self.max_items);
    }
}

/// Oldest publish time still inside `max_age`; saturates at the earliest
/// representable instant.
fn age_horizon(now: DateTime<Utc>, max_age: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(max_age).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[async_trait]
pub trait NewsPersistence: Send + Sync {
    async fn load(&self) -> Result<PersistedNews>;
    async fn save(&self, doc: &PersistedNews) -> Result<()>;
}

/// JSON file on disk. A missing or unreadable document loads as empty.
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl NewsPersistence for JsonFilePersistence {
    async fn load(&self) -> Result<PersistedNews> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedNews::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(target: "engine", path = %self.path.display(), error = %e, "corrupt news state, starting empty");
                Ok(PersistedNews::default())
            }
        }
    }

    async fn save(&self, doc: &PersistedNews) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(doc).context("serializing news state")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the document in memory; counts saves.
#[derive(Default)]
pub struct MemoryPersistence {
    doc: Mutex<PersistedNews>,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(doc: PersistedNews) -> Self {
        Self {
            doc: Mutex::new(doc),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> PersistedNews {
        self.doc.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl NewsPersistence for MemoryPersistence {
    async fn load(&self) -> Result<PersistedNews> {
        Ok(self.current())
    }

    async fn save(&self, doc: &PersistedNews) -> Result<()> {
        *self.doc.lock().unwrap_or_else(|p| p.into_inner()) = doc.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
