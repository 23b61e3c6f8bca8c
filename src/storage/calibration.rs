//! Calibration store: one GPS reading per point of interest
//!
//! The store is the only writer of calibration pairs. Every `put` is
//! persisted before it becomes visible in memory, so a failed write leaves
//! the previous set untouched and a successful one survives restarts.

use tracing::{debug, info, warn};

use crate::core::{CalibrationPair, GpsCoordinate, CALIBRATION_STORAGE_KEY};
use crate::storage::backend::KeyValueStore;
use crate::validation::error::{Result, VenueMapError};

pub struct CalibrationStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
    pairs: Vec<CalibrationPair>,
    revision: u64,
    /// Last `load` actually read the backend; writes are refused until it has
    loaded: bool,
}

impl std::fmt::Debug for CalibrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationStore")
            .field("key", &self.key)
            .field("pairs", &self.pairs)
            .field("revision", &self.revision)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl CalibrationStore {
    /// Open the store under the default key and restore persisted pairs
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        Self::open_with_key(backend, CALIBRATION_STORAGE_KEY)
    }

    pub fn open_with_key(backend: Box<dyn KeyValueStore>, key: &str) -> Self {
        let mut store = Self {
            backend,
            key: key.to_string(),
            pairs: Vec::new(),
            revision: 0,
            loaded: false,
        };
        store.load();
        store
    }

    /// Restore pairs from the backend.
    ///
    /// Missing, empty or corrupt data leaves the store empty; calibration is
    /// optional, so the failure is logged and swallowed. A backend that
    /// cannot be read also leaves the store empty, but marks it unloaded so
    /// the next `put` cannot overwrite pairs it never saw. Returns how many
    /// pairs were restored.
    pub fn load(&mut self) -> usize {
        self.revision += 1;
        let bytes = match self.backend.read(&self.key) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(key = %self.key, %error, "calibration storage unreadable");
                self.pairs = Vec::new();
                self.loaded = false;
                return 0;
            }
        };

        self.loaded = true;
        self.pairs = match decode_pairs(bytes) {
            Ok(pairs) => pairs,
            Err(error) => {
                warn!(key = %self.key, %error, "discarding stored calibrations");
                Vec::new()
            }
        };
        debug!(key = %self.key, count = self.pairs.len(), "calibrations loaded");
        self.pairs.len()
    }

    /// Whether the last `load` read the backend successfully
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current calibration pairs in store order
    pub fn get(&self) -> &[CalibrationPair] {
        &self.pairs
    }

    /// Pair recorded for one point
    pub fn get_pair(&self, point_id: &str) -> Option<&CalibrationPair> {
        self.pairs.iter().find(|p| p.point_id == point_id)
    }

    /// Insert or replace the pair for `point_id`.
    ///
    /// A replaced pair moves to the end of the store order, as a fresh
    /// recording would.
    ///
    /// If the backend could not be read at load time the load is retried
    /// first; while it keeps failing the put is refused with
    /// `PersistenceWrite` and nothing is written.
    pub fn put(&mut self, point_id: &str, gps: GpsCoordinate) -> Result<()> {
        if !self.loaded {
            self.load();
            if !self.loaded {
                return Err(VenueMapError::PersistenceWrite {
                    reason: format!("stored calibrations under '{}' could not be read", self.key),
                });
            }
        }

        let mut updated: Vec<CalibrationPair> =
            self.pairs.iter().filter(|p| p.point_id != point_id).cloned().collect();
        let replaced = updated.len() != self.pairs.len();
        updated.push(CalibrationPair::new(point_id, gps));

        self.persist(&updated)?;
        self.pairs = updated;
        self.revision += 1;

        info!(point_id, %gps, replaced, "calibration recorded");
        Ok(())
    }

    fn persist(&self, pairs: &[CalibrationPair]) -> Result<()> {
        let payload =
            serde_json::to_vec(pairs).map_err(|e| VenueMapError::PersistenceWrite { reason: e.to_string() })?;
        self.backend
            .write(&self.key, &payload)
            .map_err(|e| VenueMapError::PersistenceWrite { reason: e.to_string() })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Bumped whenever the pair set changes; derived transforms keyed on it
    /// must be recomputed when it moves
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

fn decode_pairs(bytes: Option<Vec<u8>>) -> Result<Vec<CalibrationPair>> {
    let bytes = match bytes {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
        _ => return Ok(Vec::new()),
    };

    let stored: Vec<CalibrationPair> =
        serde_json::from_slice(&bytes).map_err(|e| VenueMapError::PersistenceCorrupt { reason: e.to_string() })?;

    // hand-edited payloads may repeat an id; the later entry wins
    let mut pairs: Vec<CalibrationPair> = Vec::with_capacity(stored.len());
    for pair in stored {
        if !pair.gps.is_finite() {
            return Err(VenueMapError::PersistenceCorrupt {
                reason: format!("non-finite coordinate for '{}'", pair.point_id),
            });
        }
        pairs.retain(|p| p.point_id != pair.point_id);
        pairs.push(pair);
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::{FileStore, MemoryStore};
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingStore;

    /// Reads fine, never accepts a write
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> io::Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    /// Wraps a memory store whose first `failing_reads` reads are interrupted
    struct FlakyStore {
        inner: MemoryStore,
        failing_reads: AtomicU32,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore, failing_reads: u32) -> Self {
            Self {
                inner,
                failing_reads: AtomicU32::new(failing_reads),
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
            let remaining = self.failing_reads.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_reads.store(remaining - 1, Ordering::SeqCst);
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &[u8]) -> io::Result<()> {
            self.inner.write(key, value)
        }
    }

    fn seeded_backend() -> MemoryStore {
        let backend = MemoryStore::new();
        let mut store = CalibrationStore::open(Box::new(backend.clone()));
        store.put("food", GpsCoordinate::new(12.9875, 77.587)).unwrap();
        store.put("stage", GpsCoordinate::new(12.99, 77.589)).unwrap();
        store.put("hall2", GpsCoordinate::new(12.989, 77.5935)).unwrap();
        backend
    }

    impl KeyValueStore for FailingStore {
        fn read(&self, _key: &str) -> io::Result<Option<Vec<u8>>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }

        fn write(&self, _key: &str, _value: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_put_replaces_existing_pair() {
        let mut store = CalibrationStore::open(Box::new(MemoryStore::new()));
        store.put("stage", GpsCoordinate::new(1.0, 1.0)).unwrap();
        store.put("cafe", GpsCoordinate::new(2.0, 2.0)).unwrap();
        store.put("stage", GpsCoordinate::new(3.0, 3.0)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_pair("stage").map(|p| p.gps), Some(GpsCoordinate::new(3.0, 3.0)));
        let order: Vec<&str> = store.get().iter().map(|p| p.point_id.as_str()).collect();
        assert_eq!(order, vec!["cafe", "stage"]);
    }

    #[test]
    fn test_put_is_visible_after_reopen() {
        let backend = MemoryStore::new();
        let mut store = CalibrationStore::open(Box::new(backend.clone()));
        store.put("entrance", GpsCoordinate::new(12.985, 77.59)).unwrap();

        let reopened = CalibrationStore::open(Box::new(backend));
        assert_eq!(reopened.get(), store.get());
    }

    #[test]
    fn test_file_backed_persistence() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        {
            let mut store = CalibrationStore::open(Box::new(FileStore::new(temp_dir.path())));
            store.put("merch", GpsCoordinate::new(12.9925, 77.5875)).unwrap();
        }
        let store = CalibrationStore::open(Box::new(FileStore::new(temp_dir.path())));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get()[0].point_id, "merch");
    }

    #[test]
    fn test_corrupt_payload_loads_empty() {
        let backend = MemoryStore::new();
        backend.insert_raw(CALIBRATION_STORAGE_KEY, b"{not json");
        let store = CalibrationStore::open(Box::new(backend.clone()));
        assert!(store.is_empty());

        backend.insert_raw(CALIBRATION_STORAGE_KEY, b"   ");
        assert!(CalibrationStore::open(Box::new(backend)).is_empty());
    }

    #[test]
    fn test_unreadable_backend_loads_empty() {
        let store = CalibrationStore::open(Box::new(FailingStore));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let mut store = CalibrationStore::open(Box::new(ReadOnlyStore));
        assert!(store.is_loaded());
        let result = store.put("stage", GpsCoordinate::new(1.0, 1.0));
        assert!(matches!(result, Err(VenueMapError::PersistenceWrite { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_transient_read_error_does_not_erase_persisted_pairs() {
        let backend = seeded_backend();
        let mut store = CalibrationStore::open(Box::new(FlakyStore::new(backend.clone(), 1)));
        assert!(store.is_empty());
        assert!(!store.is_loaded());

        store.put("cafe", GpsCoordinate::new(12.992, 77.5938)).unwrap();
        assert!(store.is_loaded());

        let reopened = CalibrationStore::open(Box::new(backend));
        let order: Vec<&str> = reopened.get().iter().map(|p| p.point_id.as_str()).collect();
        assert_eq!(order, vec!["food", "stage", "hall2", "cafe"]);
        assert_eq!(reopened.get(), store.get());
    }

    #[test]
    fn test_put_refused_while_backend_unreadable() {
        let backend = seeded_backend();
        let before = backend.get_raw(CALIBRATION_STORAGE_KEY);
        let mut store = CalibrationStore::open(Box::new(FlakyStore::new(backend.clone(), 2)));

        let result = store.put("cafe", GpsCoordinate::new(12.992, 77.5938));
        assert!(matches!(result, Err(VenueMapError::PersistenceWrite { .. })));
        assert!(store.is_empty());
        assert_eq!(backend.get_raw(CALIBRATION_STORAGE_KEY), before);

        // third read succeeds
        store.put("cafe", GpsCoordinate::new(12.992, 77.5938)).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_corrupt_payload_still_accepts_writes() {
        let backend = MemoryStore::new();
        backend.insert_raw(CALIBRATION_STORAGE_KEY, b"{not json");
        let mut store = CalibrationStore::open(Box::new(backend.clone()));
        assert!(store.is_loaded());

        store.put("stage", GpsCoordinate::new(1.0, 1.0)).unwrap();
        assert_eq!(CalibrationStore::open(Box::new(backend)).len(), 1);
    }

    #[test]
    fn test_legacy_payload_with_duplicates() {
        let backend = MemoryStore::new();
        backend.insert_raw(
            CALIBRATION_STORAGE_KEY,
            br#"[{"pinId":"stage","gps":{"latitude":1.0,"longitude":1.0}},
                 {"pinId":"stage","gps":{"latitude":2.0,"longitude":2.0}}]"#,
        );
        let store = CalibrationStore::open(Box::new(backend));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get()[0].gps, GpsCoordinate::new(2.0, 2.0));
    }

    #[test]
    fn test_revision_moves_on_change() {
        let mut store = CalibrationStore::open(Box::new(MemoryStore::new()));
        let before = store.revision();
        store.put("stage", GpsCoordinate::new(1.0, 1.0)).unwrap();
        assert!(store.revision() > before);
    }
}
