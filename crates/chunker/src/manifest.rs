use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Index of shard files the web client scans, `{"files": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<String>,
}

impl Manifest {
    /// Lists every `*.json` shard in `dir`, sorted by name.
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && name != MANIFEST_FILE {
                files.push(name);
            }
        }
        files.sort();
        Ok(Self { files })
    }

    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let file = File::create(dir.as_ref().join(MANIFEST_FILE))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let file = File::open(dir.as_ref().join(MANIFEST_FILE))?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Rescans `dir` and rewrites its manifest.
pub fn write_manifest<P: AsRef<Path>>(dir: P) -> Result<Manifest> {
    let manifest = Manifest::scan(&dir)?;
    manifest.save(&dir)?;
    Ok(manifest)
}
