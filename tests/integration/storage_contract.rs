//! Contract checks shared by every `RecordStorage` backend.

use std::collections::HashSet;

use tempfile::TempDir;
use vault_records::{
    FieldValue, FsRecordStorage, MemoryRecordStorage, Record, RecordError, RecordStorage,
};

fn sample(k1: &str, k2: &str, body: &str) -> Record {
    let mut record = Record::default().with_field("k1", k1).with_field("k2", k2);
    record.body = body.to_string();
    record
}

fn check_round_trip(store: &dyn RecordStorage) {
    let record = sample("v1", "v2", "first line\nsecond line\n\n")
        .with_field("count", 7)
        .with_field("tags", vec!["x", "y"]);
    let key = store.create_record("rt", &record).unwrap();
    assert_eq!(key, "rt");

    let (key, fetched) = store.read_record("rt").unwrap();
    assert_eq!(key, "rt");
    assert_eq!(fetched, record);
}

fn check_overwrite(store: &dyn RecordStorage) {
    store.update_record("ow", &sample("a", "b", "one")).unwrap();
    let second = Record::default().with_field("only", true);
    store.update_record("ow", &second).unwrap();

    let (_, fetched) = store.read_record("ow").unwrap();
    assert_eq!(fetched, second);
    assert!(fetched.get("k1").is_none());
}

fn check_delete(store: &dyn RecordStorage) {
    store.create_record("gone", &sample("a", "b", "c")).unwrap();
    assert_eq!(store.delete_record("gone").unwrap(), "gone");

    let err = store.read_record("gone").unwrap_err();
    assert!(err.is_not_found());
    assert!(!store.record_keys().unwrap().contains(&"gone".to_string()));
}

fn check_missing(store: &dyn RecordStorage) {
    let before: HashSet<String> = store.record_keys().unwrap().into_iter().collect();

    assert!(matches!(
        store.read_record("missing"),
        Err(RecordError::NotFound { ref key, .. }) if key == "missing"
    ));
    assert!(matches!(
        store.delete_record("missing"),
        Err(RecordError::NotFound { ref key, .. }) if key == "missing"
    ));

    let after: HashSet<String> = store.record_keys().unwrap().into_iter().collect();
    assert_eq!(before, after);
}

fn check_listing(store: &dyn RecordStorage) {
    for key in ["a", "b", "c"] {
        store.create_record(key, &sample(key, key, key)).unwrap();
    }
    let keys: HashSet<String> = store.record_keys().unwrap().into_iter().collect();
    let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(keys, expected);
}

fn check_loose_values(store: &dyn RecordStorage) {
    let value: serde_yaml::Value =
        serde_yaml::from_str("frontmatter:\n  title: loose\nbody: from a value\n").unwrap();
    store.create_record_from_value("loose", value).unwrap();
    let (_, fetched) = store.read_record("loose").unwrap();
    assert_eq!(fetched.get("title"), Some(&FieldValue::from("loose")));
    assert_eq!(fetched.body, "from a value");

    let missing_body: serde_yaml::Value = serde_yaml::from_str("frontmatter: {}\n").unwrap();
    let err = store
        .update_record_from_value("loose", missing_body)
        .unwrap_err();
    assert!(matches!(err, RecordError::Validation { .. }));
    assert_eq!(err.key(), Some("loose"));

    let (_, still) = store.read_record("loose").unwrap();
    assert_eq!(still.body, "from a value");
    store.delete_record("loose").unwrap();
}

fn run_contract(store: &dyn RecordStorage) {
    store.connect().unwrap();
    check_listing(store);
    check_round_trip(store);
    check_overwrite(store);
    check_delete(store);
    check_missing(store);
    check_loose_values(store);
    store.close().unwrap();
}

#[test]
fn fs_storage_satisfies_contract() {
    let temp = TempDir::new().unwrap();
    let store = FsRecordStorage::new(temp.path());
    run_contract(&store);
}

#[test]
fn memory_storage_satisfies_contract() {
    let store = MemoryRecordStorage::new();
    run_contract(&store);
}

#[test]
fn backends_are_interchangeable_behind_a_box() {
    let temp = TempDir::new().unwrap();
    let backends: Vec<Box<dyn RecordStorage>> = vec![
        Box::new(FsRecordStorage::new(temp.path())),
        Box::new(MemoryRecordStorage::new()),
    ];

    for store in &backends {
        store.connect().unwrap();
        store.create_record("shared", &sample("v1", "v2", "test")).unwrap();
        let (_, record) = store.read_record("shared").unwrap();
        assert_eq!(record.body, "test");
    }
}
