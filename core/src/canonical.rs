//! Weak hash-consing tables.
//!
//! A [`CanonicalTable`] guarantees that at most one live representative
//! exists per structurally-equal value: `get` either returns the canonical
//! instance that is already interned, or installs the candidate as the new
//! canonical instance. Everything downstream (the type lattice, the value
//! layer, relation sets) relies on this to replace deep structural equality
//! with pointer comparison.
//!
//! The table observes its entries through [`Weak`] handles, so it never
//! keeps a value alive by itself. Slots whose value has been dropped are
//! drained by a single process-wide cleanup thread shared by all tables;
//! the tables register themselves weakly with that thread, so an abandoned
//! table is itself reclaimable.

use std::hash::{BuildHasher, Hash};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::thread;
use std::time::Duration;

use hashbrown::hash_table::HashTable;
use hashbrown::DefaultHashBuilder;
use once_cell::sync::Lazy;

/// How often the shared cleanup thread wakes to drain reclaimed slots.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// One interned entry: the structural hash is computed once, at intern
/// time, and the value itself is held non-owningly.
struct Slot<T> {
    hash: u64,
    weak: Weak<T>,
}

/// A concurrent weak interning map.
///
/// Reads (the common case) run under a shared lock and never block each
/// other; insertion, the resurrection of a reclaimed slot, and cleanup are
/// all serialized by the same exclusive lock, which is what resolves the
/// race where two threads intern "the same new value" simultaneously:
/// exactly one installs its candidate, and the loser observes the winner.
pub struct CanonicalTable<T> {
    hasher: DefaultHashBuilder,
    slots: RwLock<HashTable<Slot<T>>>,
}

impl<T> CanonicalTable<T>
where
    T: Eq + Hash + Send + Sync + 'static,
{
    /// Create a table and register it with the shared cleanup thread.
    pub fn new() -> Arc<Self> {
        let table = Arc::new(CanonicalTable {
            hasher: DefaultHashBuilder::default(),
            slots: RwLock::new(HashTable::new()),
        });
        let sweep: Arc<dyn Sweep> = table.clone();
        let handle: Weak<dyn Sweep> = Arc::downgrade(&sweep);
        cleanup_registry().register(handle);
        table
    }

    /// Return the canonical representative structurally equal to
    /// `candidate`, installing `candidate` itself if none exists.
    ///
    /// For any two calls whose arguments are structurally equal, if both
    /// results are still reachable, the results are pointer-identical.
    pub fn get(&self, candidate: T) -> Arc<T> {
        let hash = self.hasher.hash_one(&candidate);

        // Fast path: shared probe. A reclaimed slot under this hash is
        // indistinguishable from a miss here and falls through.
        if let Some(found) = probe(&self.read_slots(), hash, &candidate) {
            return found;
        }

        // Slow path: re-probe under the exclusive lock, since a concurrent
        // writer may have installed an equal entry after our shared probe.
        let mut slots = self.write_slots();
        if let Some(found) = probe(&slots, hash, &candidate) {
            return found;
        }
        tracing::trace!(hash, "installing canonical entry");
        let canonical = Arc::new(candidate);
        slots.insert_unique(
            hash,
            Slot {
                hash,
                weak: Arc::downgrade(&canonical),
            },
            |slot| slot.hash,
        );
        canonical
    }

    /// Drop every slot whose value has been reclaimed. Runs under the same
    /// exclusive lock as the insert slow path; callers never race a
    /// half-removed entry.
    pub fn sweep(&self) {
        let mut slots = self.write_slots();
        let before = slots.len();
        slots.retain(|slot| slot.weak.strong_count() > 0);
        let removed = before - slots.len();
        if removed > 0 {
            tracing::trace!(removed, remaining = slots.len(), "swept canonical table");
        }
    }

    /// Number of slots currently held, including not-yet-swept reclaimed
    /// ones.
    pub fn len(&self) -> usize {
        self.read_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_slots(&self) -> RwLockReadGuard<'_, HashTable<Slot<T>>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, HashTable<Slot<T>>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn probe<T: Eq>(slots: &HashTable<Slot<T>>, hash: u64, candidate: &T) -> Option<Arc<T>> {
    let slot = slots.find(hash, |slot| {
        slot.hash == hash
            && slot
                .weak
                .upgrade()
                .is_some_and(|held| *held == *candidate)
    })?;
    // The value can be dropped between the find above and this upgrade;
    // that is reported as a miss and the caller's slow path handles it.
    slot.weak.upgrade()
}

/// Type-erased handle the cleanup thread uses to reach a table.
trait Sweep: Send + Sync {
    fn sweep_stale(&self);
}

impl<T> Sweep for CanonicalTable<T>
where
    T: Eq + Hash + Send + Sync + 'static,
{
    fn sweep_stale(&self) {
        self.sweep();
    }
}

struct CleanupRegistry {
    tables: Mutex<Vec<Weak<dyn Sweep>>>,
}

impl CleanupRegistry {
    fn register(&self, table: Weak<dyn Sweep>) {
        self.tables
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(table);
    }

    fn sweep_all(&self) {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.retain(|weak| match weak.upgrade() {
            Some(table) => {
                table.sweep_stale();
                true
            }
            None => false,
        });
    }
}

/// One registry and one cleanup thread per process, shared by every table
/// instance; started the first time any table is created.
fn cleanup_registry() -> &'static CleanupRegistry {
    static REGISTRY: Lazy<CleanupRegistry> = Lazy::new(|| {
        thread::Builder::new()
            .name("tern-canonical-cleanup".into())
            .spawn(|| loop {
                thread::sleep(CLEANUP_INTERVAL);
                cleanup_registry().sweep_all();
            })
            .expect("failed to spawn canonical cleanup thread");
        CleanupRegistry {
            tables: Mutex::new(Vec::new()),
        }
    });
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_candidates_share_one_representative() {
        let table: Arc<CanonicalTable<String>> = CanonicalTable::new();

        let a = table.get("canonical".to_string());
        let b = table.get("canonical".to_string());
        let c = table.get("different".to_string());

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn racing_writers_agree_on_one_winner() {
        let table: Arc<CanonicalTable<Vec<u32>>> = CanonicalTable::new();

        let results: Vec<Arc<Vec<u32>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let table = Arc::clone(&table);
                    scope.spawn(move || {
                        (0..100)
                            .map(|i| table.get(vec![i, i + 1, i + 2]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().expect("intern thread panicked"))
                .collect()
        });

        // All threads interned the same 100 values; every value has exactly
        // one canonical instance observed by everyone.
        assert_eq!(table.len(), 100);
        for chunk_start in 0..100 {
            let witnesses: Vec<_> = results
                .iter()
                .filter(|arc| arc[0] == chunk_start)
                .collect();
            assert_eq!(witnesses.len(), 8);
            for w in &witnesses {
                assert!(Arc::ptr_eq(*w, witnesses[0]));
            }
        }
    }

    #[test]
    fn sweep_removes_reclaimed_slots() {
        crate::test_utils::init_test_logging();
        let table: Arc<CanonicalTable<String>> = CanonicalTable::new();

        let kept = table.get("kept".to_string());
        let dropped = table.get("dropped".to_string());
        assert_eq!(table.len(), 2);

        drop(dropped);
        table.sweep();
        assert_eq!(table.len(), 1);

        // Re-interning an equal key installs a fresh canonical instance.
        let resurrected = table.get("dropped".to_string());
        assert_eq!(*resurrected, "dropped");
        assert_eq!(table.len(), 2);
        drop(kept);
    }

    #[test]
    fn background_thread_sweeps_on_interval() {
        let table: Arc<CanonicalTable<String>> = CanonicalTable::new();

        let value = table.get("transient".to_string());
        assert_eq!(table.len(), 1);
        drop(value);

        // The shared cleanup thread wakes every CLEANUP_INTERVAL; give it
        // two intervals of slack.
        let deadline = std::time::Instant::now() + 2 * CLEANUP_INTERVAL + Duration::from_millis(500);
        while table.len() > 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(50));
        }
        assert_eq!(table.len(), 0);
    }
}
