//! Hot-swappable owner of the current graph snapshot.
//!
//! Reloads build the new snapshot entirely outside the handle lock (load
//! may block on file I/O and centrality), then swap the `Arc` in one
//! write. Selections already in flight keep the handle they cloned at
//! turn start, so a reload never tears an in-progress read. Concurrent
//! reloads serialize on a dedicated mutex; last writer wins.

use crate::snapshot::GraphSnapshot;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use weft_core::error::Result;

pub struct GraphStore {
    current: RwLock<Arc<GraphSnapshot>>,
    /// Serializes reloads with each other, never with readers.
    reload_lock: Mutex<()>,
    /// Where the graph is (re)loaded from.
    source: RwLock<PathBuf>,
    /// Whether any load has succeeded yet ("graph not yet built" flag).
    ready: AtomicBool,
}

impl GraphStore {
    /// Open a store over `source`. A missing or malformed source is the
    /// normal pre-ingestion state: start on an empty graph and report
    /// not-ready rather than fail.
    pub fn open(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let store = Self {
            current: RwLock::new(Arc::new(GraphSnapshot::empty())),
            reload_lock: Mutex::new(()),
            source: RwLock::new(source),
            ready: AtomicBool::new(false),
        };
        if let Err(e) = store.reload() {
            warn!("graph not yet built: {}", e);
        }
        store
    }

    /// A store with no backing file, permanently empty until
    /// `reload_from` points it somewhere.
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphSnapshot::empty())),
            reload_lock: Mutex::new(()),
            source: RwLock::new(PathBuf::new()),
            ready: AtomicBool::new(false),
        }
    }

    /// The latest snapshot. Never blocks longer than the swap itself;
    /// callers clone the handle once per turn and read it to completion.
    pub fn current(&self) -> Arc<GraphSnapshot> {
        self.current.read().clone()
    }

    /// Whether a graph has been successfully loaded at least once.
    pub fn graph_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn source(&self) -> PathBuf {
        self.source.read().clone()
    }

    /// Re-read the current source and atomically swap the snapshot in.
    /// On failure the previously active snapshot stays untouched.
    pub fn reload(&self) -> Result<()> {
        let _serialize = self.reload_lock.lock();
        let path = self.source.read().clone();
        self.load_and_swap(&path)
    }

    /// Point the store at a new source (the ingestion-completed trigger
    /// carries the location) and load it.
    pub fn reload_from(&self, source: impl Into<PathBuf>) -> Result<()> {
        let _serialize = self.reload_lock.lock();
        let path = source.into();
        self.load_and_swap(&path)?;
        *self.source.write() = path;
        Ok(())
    }

    fn load_and_swap(&self, path: &Path) -> Result<()> {
        // No lock held across the (potentially slow) load.
        let snapshot = GraphSnapshot::load(path)?;
        info!(
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            source = %path.display(),
            "loaded knowledge graph"
        );
        *self.current.write() = Arc::new(snapshot);
        self.ready.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use weft_core::error::WeftError;

    fn write_graph(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const SMALL: &str = r#"{
        "nodes": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
        "edges": [{"source": "a", "target": "b", "relationship": "knows"}]
    }"#;

    const OTHER: &str = r#"{
        "nodes": [{"id": "x", "label": "X"}],
        "edges": []
    }"#;

    #[test]
    fn missing_source_starts_empty_and_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::open(dir.path().join("graph.json"));
        assert!(!store.graph_ready());
        assert!(store.current().is_empty());
    }

    #[test]
    fn open_loads_an_existing_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_graph(&dir, "graph.json", SMALL);
        let store = GraphStore::open(path);
        assert!(store.graph_ready());
        assert_eq!(store.current().node_count(), 2);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_graph(&dir, "good.json", SMALL);
        let bad = write_graph(
            &dir,
            "bad.json",
            r#"{"nodes": [{"id": "a"}], "edges": [{"source": "a", "target": "ghost"}]}"#,
        );

        let store = GraphStore::open(good);
        assert_eq!(store.current().node_count(), 2);

        let err = store.reload_from(&bad).unwrap_err();
        assert!(matches!(err, WeftError::InconsistentSnapshot(_)));
        assert_eq!(store.current().node_count(), 2);
    }

    #[test]
    fn reload_from_repoints_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_graph(&dir, "first.json", SMALL);
        let second = write_graph(&dir, "second.json", OTHER);

        let store = GraphStore::open(&first);
        assert_eq!(store.source(), first);

        store.reload_from(&second).unwrap();
        assert_eq!(store.source(), second);

        // A plain reload now reads the new location.
        store.reload().unwrap();
        assert_eq!(store.current().node_count(), 1);
    }

    #[test]
    fn inflight_handle_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_graph(&dir, "first.json", SMALL);
        let second = write_graph(&dir, "second.json", OTHER);

        let store = GraphStore::open(first);
        let held = store.current();

        store.reload_from(&second).unwrap();

        // The pre-swap snapshot is still fully readable.
        assert_eq!(held.node_count(), 2);
        assert_eq!(store.current().node_count(), 1);
    }
}
