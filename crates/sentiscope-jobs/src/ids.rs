//! Sequential id reservation
//!
//! An id is taken by creating the marker file `<dir>/<id>` with
//! `create_new`, which exactly one caller wins whether the competitors are
//! threads or other processes. Markers outlive the records they name, so a
//! deleted id is never handed out again.

use sentiscope_core::Result;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Hands out unique, increasing ids backed by marker files
pub struct IdAllocator {
    dir: PathBuf,
    last: AtomicU64,
}

impl IdAllocator {
    /// Open the marker directory; ids start above `floor` and above every
    /// marker already present
    pub fn open(dir: PathBuf, floor: u64) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        let highest = highest_marker(&dir)?.max(floor);
        Ok(Self {
            dir,
            last: AtomicU64::new(highest),
        })
    }

    /// Reserve the next free id
    pub fn reserve(&self) -> Result<u64> {
        let mut candidate = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(candidate.to_string()))
            {
                Ok(_) => {
                    self.last.fetch_max(candidate, Ordering::SeqCst);
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(id = candidate, dir = ?self.dir, "Id already taken, retrying");
                    candidate = self.last.fetch_add(1, Ordering::SeqCst).max(candidate) + 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn highest_marker(dir: &Path) -> Result<u64> {
    let mut highest = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u64>().ok())
        {
            highest = highest.max(id);
        }
    }
    Ok(highest)
}
