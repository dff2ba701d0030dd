pub mod accumulator;
pub mod cell;
pub mod config;
pub mod error;
pub mod lookup;
pub mod manifest;
pub mod record;
pub mod source;
pub mod store;

pub use accumulator::{IngestStats, ShardAccumulator};
pub use cell::Cell;
pub use config::ChunkerConfig;
pub use error::{ChunkError, Result};
pub use manifest::{write_manifest, Manifest};
pub use record::Record;
pub use source::SheetRows;
pub use store::{JsonDirStore, MemoryStore, Shard, ShardStore};

use std::path::Path;

/// Partitions `rows` into `<key>.json` shard files under `output_dir`,
/// merging into shards left by earlier runs.
pub fn ingest<I, P>(header: &[Cell], rows: I, config: &ChunkerConfig, output_dir: P) -> Result<IngestStats>
where
    I: IntoIterator<Item = Result<Vec<Cell>>>,
    P: AsRef<Path>,
{
    let store = JsonDirStore::open(output_dir)?;
    let mut accumulator = ShardAccumulator::new(store, config)?;
    accumulator.ingest(header, rows)
}
