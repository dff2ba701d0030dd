use log::{debug, info};
use std::collections::{BTreeSet, HashMap};

use crate::cell::Cell;
use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::record::{account_id, build_record, normalize_headers, shard_key};
use crate::store::{Shard, ShardStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_seen: usize,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
    pub flushes: usize,
    pub shards_touched: BTreeSet<String>,
}

/// Buffers records per shard key and merges them into a [`ShardStore`].
///
/// A shard is flushed as soon as its buffer holds `flush_threshold`
/// records, and every remaining buffer is flushed once the input ends.
/// Flushing loads the stored shard, lays the buffer over it and writes it
/// back, so re-running over overlapping input only touches the identifiers
/// it carries.
pub struct ShardAccumulator<S: ShardStore> {
    store: S,
    prefix_len: usize,
    flush_threshold: usize,
    progress_every: usize,
    buffers: HashMap<String, Shard>,
    stats: IngestStats,
}

impl<S: ShardStore> ShardAccumulator<S> {
    pub fn new(store: S, config: &ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            prefix_len: config.prefix_len,
            flush_threshold: config.flush_threshold,
            progress_every: config.progress_every,
            buffers: HashMap::new(),
            stats: IngestStats::default(),
        })
    }

    /// Consumes `rows` under `header` and flushes everything at the end.
    ///
    /// A row error stops the run; shards flushed before it stay on disk,
    /// buffered records are dropped.
    pub fn ingest<I>(&mut self, header: &[Cell], rows: I) -> Result<IngestStats>
    where
        I: IntoIterator<Item = Result<Vec<Cell>>>,
    {
        let labels = normalize_headers(header);

        for row in rows {
            let row = row?;
            self.push(&labels, &row)?;
        }

        self.flush_all()?;
        Ok(self.stats.clone())
    }

    /// Buffers one data row. Returns false if the row had no identifier.
    pub fn push(&mut self, labels: &[String], row: &[Cell]) -> Result<bool> {
        self.stats.rows_seen += 1;

        let id = match row.first().and_then(account_id) {
            Some(id) => id,
            None => {
                self.stats.rows_skipped += 1;
                return Ok(false);
            }
        };

        let record = build_record(labels, row);
        let key = shard_key(&id, self.prefix_len).to_string();

        let buffer = self.buffers.entry(key.clone()).or_default();
        buffer.insert(id, record);
        let full = buffer.len() >= self.flush_threshold;

        self.stats.rows_accepted += 1;
        if full {
            self.flush(&key)?;
        }

        if self.progress_every > 0 && self.stats.rows_accepted % self.progress_every == 0 {
            info!("Processed {} rows...", self.stats.rows_accepted);
        }
        Ok(true)
    }

    /// Merges the buffer for `key` into the store and clears it.
    pub fn flush(&mut self, key: &str) -> Result<()> {
        let buffer = match self.buffers.get_mut(key) {
            Some(b) if !b.is_empty() => std::mem::take(b),
            _ => return Ok(()),
        };

        let added = buffer.len();
        let merged = match self.store.load(key)? {
            Some(mut existing) => {
                existing.extend(buffer);
                existing
            }
            None => buffer,
        };

        self.store.save(key, &merged)?;
        debug!("Flushed {} records into shard {} ({} total)", added, key, merged.len());

        self.stats.flushes += 1;
        self.stats.shards_touched.insert(key.to_string());
        Ok(())
    }

    pub fn flush_all(&mut self) -> Result<()> {
        let mut keys: Vec<String> = self
            .buffers
            .iter()
            .filter(|(_, b)| !b.is_empty())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();

        for key in keys {
            self.flush(&key)?;
        }
        Ok(())
    }

    /// Records waiting in memory for `key`.
    pub fn buffered(&self, key: &str) -> usize {
        self.buffers.get(key).map_or(0, |b| b.len())
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
