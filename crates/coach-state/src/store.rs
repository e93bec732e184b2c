//! Durable storage for the three state slots.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use database::{slot, Database};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, StateError};

/// One independently stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Profile,
    Journal,
    Plan,
}

impl Slot {
    /// Every slot.
    pub const ALL: [Slot; 3] = [Slot::Profile, Slot::Journal, Slot::Plan];

    /// Storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Profile => "profile",
            Slot::Journal => "journal",
            Slot::Plan => "plan",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A store holding one JSON document per [`Slot`].
///
/// Absent slots read as `None`. Writes replace whole documents.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a slot's document.
    async fn load(&self, slot: Slot) -> Result<Option<String>>;

    /// Write several slots.
    async fn save(&self, entries: &[(Slot, String)]) -> Result<()>;

    /// Remove every slot.
    async fn clear(&self) -> Result<()>;
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    db: Database,
}

impl SqliteStateStore {
    /// Wrap a connected and migrated database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to `url` and run migrations.
    pub async fn connect(url: &str) -> Result<Self> {
        let db = Database::connect(url).await?;
        db.migrate().await?;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, slot: Slot) -> Result<Option<String>> {
        let stored = slot::get_slot(self.db.pool(), slot.as_str()).await?;
        Ok(stored.map(|s| s.payload))
    }

    async fn save(&self, entries: &[(Slot, String)]) -> Result<()> {
        let rows: Vec<(&str, &str)> = entries
            .iter()
            .map(|(slot, payload)| (slot.as_str(), payload.as_str()))
            .collect();
        slot::upsert_slots(self.db.pool(), &rows).await?;
        debug!("Persisted {} slot(s)", rows.len());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        slot::clear_all(self.db.pool()).await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
///
/// Writes can be made to fail on demand to exercise storage error paths.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<Slot, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save` and `clear` calls fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Put a raw document into a slot, bypassing the reconciler.
    pub async fn insert_raw(&self, slot: Slot, payload: impl Into<String>) {
        self.slots.lock().await.insert(slot, payload.into());
    }

    /// Number of slots currently held.
    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StateError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, slot: Slot) -> Result<Option<String>> {
        Ok(self.slots.lock().await.get(&slot).cloned())
    }

    async fn save(&self, entries: &[(Slot, String)]) -> Result<()> {
        self.check_writable()?;
        let mut slots = self.slots.lock().await;
        for (slot, payload) in entries {
            slots.insert(*slot, payload.clone());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.check_writable()?;
        self.slots.lock().await.clear();
        Ok(())
    }
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self, slot: Slot) -> Result<Option<String>> {
        (**self).load(slot).await
    }

    async fn save(&self, entries: &[(Slot, String)]) -> Result<()> {
        (**self).save(entries).await
    }

    async fn clear(&self) -> Result<()> {
        (**self).clear().await
    }
}
