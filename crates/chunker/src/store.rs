use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ChunkError, Result};
use crate::record::Record;

/// Contents of one shard: account identifier to record.
pub type Shard = BTreeMap<String, Record>;

/// Key-value persistence for shards.
pub trait ShardStore {
    /// Loads the shard for `key`, `None` if it was never written.
    fn load(&self, key: &str) -> Result<Option<Shard>>;

    /// Replaces the shard for `key`.
    fn save(&mut self, key: &str, shard: &Shard) -> Result<()>;
}

/// One `<key>.json` file per shard under a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Opens the store, creating `dir` if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens a store over a directory that must already exist.
    pub fn existing<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                ErrorKind::NotFound,
                format!("chunk folder {:?} does not exist", dir),
            )
            .into());
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn shard_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ShardStore for JsonDirStore {
    fn load(&self, key: &str) -> Result<Option<Shard>> {
        let file = match File::open(self.shard_path(key)) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reader = BufReader::new(file);
        let shard: Shard = serde_json::from_reader(reader).map_err(|source| ChunkError::CorruptShard {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(shard))
    }

    fn save(&mut self, key: &str, shard: &Shard) -> Result<()> {
        let path = self.shard_path(key);
        let tmp = path.with_extension("json.tmp");

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, shard)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store, used by tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub shards: BTreeMap<String, Shard>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShardStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Shard>> {
        Ok(self.shards.get(key).cloned())
    }

    fn save(&mut self, key: &str, shard: &Shard) -> Result<()> {
        self.shards.insert(key.to_string(), shard.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use tempfile::tempdir;

    fn shard_with(id: &str, branch: &str) -> Shard {
        let mut rec = Record::new();
        rec.insert("Branch".to_string(), Cell::from(branch));
        let mut shard = Shard::new();
        shard.insert(id.to_string(), rec);
        shard
    }

    #[test]
    fn test_open_creates_dir() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("data").join("chunks");
        let store = JsonDirStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.shard_path("200"), dir.join("200.json"));
    }

    #[test]
    fn test_open_under_regular_file_fails() {
        let tmp = tempdir().unwrap();
        let blocker = tmp.path().join("chunks");
        fs::write(&blocker, "not a folder").unwrap();

        let result = JsonDirStore::open(blocker.join("sub"));
        assert!(matches!(result, Err(ChunkError::Io(_))));
    }

    #[test]
    fn test_existing_does_not_create_dir() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("typo");

        let result = JsonDirStore::existing(&dir);
        assert!(matches!(result, Err(ChunkError::Io(ref e)) if e.kind() == ErrorKind::NotFound));
        assert!(!dir.exists());

        let store = JsonDirStore::existing(tmp.path()).unwrap();
        assert_eq!(store.dir(), tmp.path());
    }

    #[test]
    fn test_load_missing_is_none() {
        let tmp = tempdir().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        assert!(store.load("123").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let mut store = JsonDirStore::open(tmp.path()).unwrap();
        let shard = shard_with("1234", "B1");

        store.save("123", &shard).unwrap();

        assert_eq!(store.load("123").unwrap(), Some(shard));
        assert!(!tmp.path().join("123.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_shard_is_error() {
        let tmp = tempdir().unwrap();
        let store = JsonDirStore::open(tmp.path()).unwrap();
        fs::write(store.shard_path("123"), "[1, 2, 3]").unwrap();

        match store.load("123") {
            Err(ChunkError::CorruptShard { key, .. }) => assert_eq!(key, "123"),
            other => panic!("expected CorruptShard, got {:?}", other),
        }
    }
}
