//! JSON snapshot files: `{ "classes": [...], "instances": [...], "roots": [...] }`.

use anyhow::{Context, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::memory::MemoryHeap;
use crate::model::{GcRoot, Instance, JavaClass};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub classes: Vec<JavaClass>,
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub roots: Vec<GcRoot>,
}

impl SnapshotFile {
    pub fn into_heap(self) -> Result<MemoryHeap> {
        Ok(MemoryHeap::from_parts(self.classes, self.instances, self.roots)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let payload = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, payload)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))
    }
}

#[derive(Debug)]
pub struct LoadedSnapshot {
    pub path: PathBuf,
    pub digest: String,
    pub heap: MemoryHeap,
}

pub fn load(path: &Path) -> Result<LoadedSnapshot> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot: {}", path.display()))?;
    // SAFETY: The file is opened read-only and outlives the mapping, which is dropped
    // at the end of this function once parsing has copied everything out.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to mmap snapshot: {}", path.display()))?;

    let digest = hash_content(&mmap);
    let snapshot: SnapshotFile = serde_json::from_slice(&mmap)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
    let heap = snapshot
        .into_heap()
        .with_context(|| format!("Inconsistent snapshot: {}", path.display()))?;

    Ok(LoadedSnapshot {
        path: path.to_path_buf(),
        digest,
        heap,
    })
}

pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
