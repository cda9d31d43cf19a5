// src/watch/hash.rs

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::tasks::TaskKind;

/// Compute a deterministic hash over the contents of the given files.
///
/// Order of `paths` does not matter; they are sorted before hashing. Each
/// path is mixed in alongside its content so renames change the hash.
pub fn compute_hash_for_paths<I, P>(paths: I) -> Result<String>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut hasher = Hasher::new();

    let mut paths_vec: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
    paths_vec.sort();

    for path in paths_vec {
        if !path.is_file() {
            continue;
        }
        hasher.update(path.to_string_lossy().as_bytes());

        let mut file =
            File::open(&path).with_context(|| format!("opening file for hashing: {:?}", path))?;
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
    }

    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, "computed aggregate hash");
    Ok(hash)
}

/// Last seen aggregate hash per task, kept for the life of the watch loop.
#[derive(Debug, Default)]
pub struct HashGate {
    last: HashMap<TaskKind, String>,
}

impl HashGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` for `task` without asking whether it changed.
    pub fn seed(&mut self, task: TaskKind, hash: String) {
        self.last.insert(task, hash);
    }

    /// Record `hash` and report whether it differs from the previous one.
    /// A task never seen before counts as changed.
    pub fn changed(&mut self, task: TaskKind, hash: String) -> bool {
        match self.last.insert(task, hash.clone()) {
            Some(prev) => prev != hash,
            None => true,
        }
    }
}
