mod common;

use common::FlakyKv;
use travel_diary_core::{
    EntryId, EntryListView, EntryStore, KvEntryStore, MemoryKvStore, StoreError, TravelEntry,
};

fn entry(id: &str) -> TravelEntry {
    TravelEntry::with_id(
        EntryId::from(id),
        format!("file:///photos/{id}.jpg"),
        format!("Place {id}, City, Region"),
    )
    .unwrap()
}

#[test]
fn activate_reflects_entries_added_elsewhere() {
    let store = KvEntryStore::new(MemoryKvStore::new());
    let mut view = EntryListView::new(&store);
    assert!(view.activate().is_empty());
    assert!(view.is_empty());

    store.append(&entry("1")).unwrap();
    store.append(&entry("2")).unwrap();
    assert!(view.entries().is_empty());

    let ids: Vec<_> = view
        .activate()
        .iter()
        .map(|entry| entry.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["2", "1"]);
}

#[test]
fn remove_updates_view_and_store() {
    let store = KvEntryStore::new(MemoryKvStore::new());
    for id in ["1", "2", "3"] {
        store.append(&entry(id)).unwrap();
    }
    let mut view = EntryListView::new(&store);
    view.activate();

    view.remove(&EntryId::from("2")).unwrap();
    assert_eq!(view.entries(), store.list().as_slice());
    assert_eq!(view.entries().len(), 2);
}

#[test]
fn failed_remove_is_optimistic_until_reload() {
    let kv = FlakyKv::default();
    let store = KvEntryStore::new(&kv);
    store.append(&entry("1")).unwrap();
    store.append(&entry("2")).unwrap();
    let mut view = EntryListView::new(&store);
    view.activate();

    kv.fail_writes.set(true);
    let err = view.remove(&EntryId::from("1")).unwrap_err();
    assert!(matches!(err, StoreError::Kv(_)));
    assert_eq!(view.entries().len(), 1);

    view.activate();
    assert_eq!(view.entries().len(), 2);
}
