//! Single-writer locking for library mutations.
//!
//! Every mutating operation takes the lock for its target directory, so
//! concurrent ingests, imports, deletions and resets serialize instead of
//! interleaving mid-write. Readers are not locked; a scan always sees a
//! consistent snapshot of whatever the last completed writer left behind.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use parking_lot::Mutex;

static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Lock guarding all mutations of the library rooted at `path`.
pub(crate) fn for_path(path: &Path) -> Arc<Mutex<()>> {
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    registry.lock().entry(path.to_path_buf()).or_default().clone()
}
