//! Sled-backed pipeline store: one tree per collection, documents keyed by a
//! big-endian sequence number so iteration follows insertion order.

use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::init_sled_pipeline_db;
use crate::convert::safe_kv;
use crate::convert::safe_vk;
use crate::Document;
use crate::IngestQueue;
use crate::InputRecord;
use crate::InputStore;
use crate::QueuedInput;
use crate::RecordId;
use crate::ResultReader;
use crate::ResultRecord;
use crate::ResultStore;
use crate::StoreConfig;
use crate::StoreResult;

/// Holds the database lock, so it is the only writer: collection sizes are
/// counted once on open and then kept in memory, as `Tree::len` scans the
/// whole tree.
pub struct SledStore {
    db: ::sled::Db,
    incoming: ::sled::Tree,
    results: ::sled::Tree,
    incoming_len: AtomicU64,
    results_len: AtomicU64,
}

impl std::fmt::Debug for SledStore {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("incoming_len", &self.incoming_len.load(Ordering::Acquire))
            .field("results_len", &self.results_len.load(Ordering::Acquire))
            .finish()
    }
}

impl SledStore {
    /// Opens (or creates) the database directly in `root` with the configured trees.
    pub fn open(
        root: impl AsRef<Path> + std::fmt::Debug,
        incoming_tree: &str,
        results_tree: &str,
    ) -> StoreResult<Self> {
        let db = init_sled_pipeline_db(root)?;
        Self::with_db(db, incoming_tree, results_tree)
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.db_path, &config.incoming_tree, &config.results_tree)
    }

    /// Database removed when the store is dropped.
    pub fn temporary(
        incoming_tree: &str,
        results_tree: &str,
    ) -> StoreResult<Self> {
        let db = ::sled::Config::new().temporary(true).open()?;
        Self::with_db(db, incoming_tree, results_tree)
    }

    fn with_db(
        db: ::sled::Db,
        incoming_tree: &str,
        results_tree: &str,
    ) -> StoreResult<Self> {
        let incoming = db.open_tree(incoming_tree)?;
        let results = db.open_tree(results_tree)?;
        let incoming_len = AtomicU64::new(incoming.len() as u64);
        let results_len = AtomicU64::new(results.len() as u64);
        debug!(incoming_tree, results_tree, ?incoming_len, ?results_len, "sled pipeline store opened");
        Ok(Self {
            db,
            incoming,
            results,
            incoming_len,
            results_len,
        })
    }

    fn append<T: Serialize>(
        &self,
        tree: &::sled::Tree,
        body: T,
    ) -> StoreResult<(u64, RecordId)> {
        let seq = self.db.generate_id()?;
        let id = RecordId::generate();
        let doc = Document { id: id.clone(), body };
        tree.insert(safe_kv(seq), bincode::serialize(&doc)?)?;
        Ok((seq, id))
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<Document<T>> {
    Ok(bincode::deserialize(bytes)?)
}

impl Drop for SledStore {
    fn drop(&mut self) {
        if let Err(e) = self.db.flush() {
            warn!("flush on close failed: {:?}", e);
        }
    }
}

#[async_trait]
impl ResultStore for SledStore {
    async fn current_count(&self) -> StoreResult<u64> {
        Ok(self.results_len.load(Ordering::Acquire))
    }
}

#[async_trait]
impl ResultReader for SledStore {
    /// Results are appended as they are processed, so reverse key order is
    /// newest-processed first.
    async fn recent(
        &self,
        limit: usize,
    ) -> StoreResult<Vec<Document<ResultRecord>>> {
        self.results
            .iter()
            .rev()
            .take(limit)
            .map(|entry| {
                let (_, value) = entry?;
                decode(&value)
            })
            .collect()
    }
}

#[async_trait]
impl InputStore for SledStore {
    async fn insert(
        &self,
        record: InputRecord,
    ) -> StoreResult<RecordId> {
        let (seq, id) = self.append(&self.incoming, record)?;
        self.incoming_len.fetch_add(1, Ordering::AcqRel);
        trace!(%id, seq, "insert input");
        Ok(id)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.incoming_len.load(Ordering::Acquire))
    }
}

#[async_trait]
impl IngestQueue for SledStore {
    async fn pending(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> StoreResult<Vec<QueuedInput>> {
        let start = after.map_or(0, |s| s.saturating_add(1));
        self.incoming
            .range(safe_kv(start)..)
            .take(limit)
            .map(|entry| {
                let (key, value) = entry?;
                Ok(QueuedInput {
                    seq: safe_vk(&key)?,
                    doc: decode(&value)?,
                })
            })
            .collect()
    }

    async fn last_seq(&self) -> StoreResult<Option<u64>> {
        match self.incoming.last()? {
            Some((key, _)) => Ok(Some(safe_vk(&key)?)),
            None => Ok(None),
        }
    }

    async fn record_result(
        &self,
        result: ResultRecord,
    ) -> StoreResult<RecordId> {
        let (_, id) = self.append(&self.results, result)?;
        self.results_len.fetch_add(1, Ordering::AcqRel);
        Ok(id)
    }
}
