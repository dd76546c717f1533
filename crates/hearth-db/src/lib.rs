pub mod board;
pub mod counter;
pub mod diary;

pub use board::BoardStore;
pub use counter::CounterStore;
pub use diary::DiaryStore;

use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Logical name the router uses for the site-wide instance of each store.
pub const GLOBAL: &str = "global";

/// Maps a logical name to a lazily opened store instance; the same name
/// always yields the same instance. Each name gets its own database file, so
/// named instances share no state. Operations within one instance are
/// serialized by the store's own connection lock — one at a time, never
/// concurrently.
pub struct Registry<S> {
    dir: PathBuf,
    prefix: &'static str,
    open: fn(&Path) -> Result<S>,
    instances: Mutex<HashMap<String, Arc<S>>>,
}

impl<S> Registry<S> {
    fn new(dir: &Path, prefix: &'static str, open: fn(&Path) -> Result<S>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix,
            open,
            instances: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<S>> {
        // Names become file names; keep them path-safe.
        if name.is_empty()
            || !name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            bail!("invalid store name: {:?}", name);
        }

        let mut instances = self
            .instances
            .lock()
            .map_err(|e| anyhow::anyhow!("registry lock poisoned: {}", e))?;

        if let Some(store) = instances.get(name) {
            return Ok(store.clone());
        }

        let path = self.dir.join(format!("{}-{}.db", self.prefix, name));
        let store = Arc::new((self.open)(&path)?);
        instances.insert(name.to_string(), store.clone());
        Ok(store)
    }
}

/// The three feature stores. Fully independent of each other: no shared
/// tables, no cross-store references, no ordering guarantees between them.
pub struct Stores {
    pub counters: Registry<CounterStore>,
    pub boards: Registry<BoardStore>,
    pub diaries: Registry<DiaryStore>,
}

impl Stores {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            counters: Registry::new(dir, "counter", CounterStore::open),
            boards: Registry::new(dir, "board", BoardStore::open),
            diaries: Registry::new(dir, "diary", DiaryStore::open),
        })
    }
}
