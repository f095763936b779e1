//! Property-based tests for Progress Store persistence.
//!
//! These tests verify that a written record reads back unchanged, that
//! series never interfere with each other, and that the last write wins.

use std::sync::Arc;

use mangahub::managers::progress_store::{ProgressStore, ProgressStoreTrait};
use mangahub::services::storage::{KeyValueStorage, MemoryStorage};
use proptest::prelude::*;

fn arb_id() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,16}"
}

proptest! {
    #[test]
    fn prop_set_then_get_round_trips(series in arb_id(), chapter in arb_id(), page in 0usize..2000) {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let mut store = ProgressStore::new(storage.clone());
        store.set(&series, &chapter, page);

        let record = store.get(&series).unwrap();
        prop_assert_eq!(&record.last_chapter, &chapter);
        prop_assert_eq!(record.last_page, page);

        // Survives a reload from storage.
        let reloaded = ProgressStore::new(storage);
        prop_assert_eq!(reloaded.get(&series), Some(record));
    }

    #[test]
    fn prop_series_are_isolated(
        a in arb_id(),
        b in arb_id(),
        chapter_a in arb_id(),
        chapter_b in arb_id(),
        page_a in 0usize..500,
        page_b in 0usize..500,
    ) {
        prop_assume!(a != b);
        let mut store = ProgressStore::new(Arc::new(MemoryStorage::new()));
        store.set(&a, &chapter_a, page_a);
        let before = store.get(&a);
        store.set(&b, &chapter_b, page_b);

        prop_assert_eq!(store.get(&a), before);
        prop_assert_eq!(store.get(&b).map(|r| r.last_page), Some(page_b));
    }

    #[test]
    fn prop_last_write_wins(series in arb_id(), pages in prop::collection::vec(0usize..100, 1..20)) {
        let mut store = ProgressStore::new(Arc::new(MemoryStorage::new()));
        let mut last_timestamp = 0;
        for &page in &pages {
            store.set(&series, "c1", page);
            let record = store.get(&series).unwrap();
            prop_assert!(record.timestamp >= last_timestamp);
            last_timestamp = record.timestamp;
        }
        prop_assert_eq!(store.get(&series).map(|r| r.last_page), pages.last().copied());
    }
}
