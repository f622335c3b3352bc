//! The known-hostname set: the only mutable state shared across cycles and
//! between the full and single-hostname reconciliation paths (`spec.md`
//! §5/§9). Guarded by a reader/writer lock: cycles take the write lock only
//! at the end to swap the whole map; `reconcile_hostname`/`remove_hostname`
//! take it only to add/remove one entry; reads take the read lock.

use std::collections::HashSet;

use tokio::sync::RwLock;

#[derive(Default)]
pub struct KnownHostnames {
    inner: RwLock<HashSet<String>>,
}

impl KnownHostnames {
    pub fn new(initial: HashSet<String>) -> Self {
        KnownHostnames {
            inner: RwLock::new(initial),
        }
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.inner.read().await.clone()
    }

    pub async fn contains(&self, hostname: &str) -> bool {
        self.inner.read().await.contains(hostname)
    }

    /// Replace the entire set, e.g. at the end of a full cycle.
    pub async fn replace(&self, new: HashSet<String>) {
        let mut guard = self.inner.write().await;
        *guard = new;
    }

    pub async fn insert(&self, hostname: String) {
        self.inner.write().await.insert(hostname);
    }

    pub async fn remove(&self, hostname: &str) {
        self.inner.write().await.remove(hostname);
    }
}
