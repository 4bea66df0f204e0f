use std::path::Path;

use tempfile::TempDir;
use vault_records::config::StoreConfig;
use vault_records::{FieldValue, FsRecordStorage, Record, RecordStorage, StoreLayout, WriteMode};

fn connected(root: &Path) -> FsRecordStorage {
    let store = FsRecordStorage::new(root);
    store.connect().unwrap();
    store
}

fn k1_k2(k1: &str, k2: &str, body: &str) -> Record {
    let mut record = Record::default().with_field("k1", k1).with_field("k2", k2);
    record.body = body.to_string();
    record
}

#[test]
fn create_places_file_under_vault() {
    let temp = TempDir::new().unwrap();
    let store = connected(temp.path());

    let key = store.create_record("1", &k1_k2("v1", "v2", "test")).unwrap();
    assert_eq!(key, "1");
    assert!(temp.path().join("vault").join("1.md").is_file());
}

#[test]
fn update_replaces_previous_content() {
    let temp = TempDir::new().unwrap();
    let store = connected(temp.path());

    store.create_record("3", &k1_k2("v1", "v2", "test")).unwrap();
    let (_, mut record) = store.read_record("3").unwrap();
    record
        .frontmatter
        .insert("k1".to_string(), FieldValue::from("v3"));
    record
        .frontmatter
        .insert("k2".to_string(), FieldValue::from("v4"));
    record.body = "test-update".to_string();
    store.update_record("3", &record).unwrap();

    let (key, fetched) = store.read_record("3").unwrap();
    assert_eq!(key, "3");
    assert_eq!(fetched.get("k1"), Some(&FieldValue::from("v3")));
    assert_eq!(fetched.get("k2"), Some(&FieldValue::from("v4")));
    assert_eq!(fetched.body, "test-update");

    let content = std::fs::read_to_string(temp.path().join("vault/3.md")).unwrap();
    assert!(!content.contains("v1"));
    assert!(!content.contains("v2"));
}

#[test]
fn delete_unlinks_file() {
    let temp = TempDir::new().unwrap();
    let store = connected(temp.path());

    store.create_record("4", &k1_k2("v1", "v2", "test")).unwrap();
    assert_eq!(store.delete_record("4").unwrap(), "4");
    assert!(!temp.path().join("vault/4.md").exists());
}

#[test]
fn reads_files_written_by_other_tools() {
    let temp = TempDir::new().unwrap();
    let store = connected(temp.path());

    // Blank line before the closing delimiter and a trailing newline after the body.
    std::fs::write(
        temp.path().join("vault/external.md"),
        "---\nk1: v1\nk2: v2\n\n---\ntest\n",
    )
    .unwrap();
    // Hand-edited with CRLF line endings.
    std::fs::write(
        temp.path().join("vault/windows.md"),
        "---\r\ntitle: edited\r\n---\r\nbody\r\n",
    )
    .unwrap();

    let (_, external) = store.read_record("external").unwrap();
    assert_eq!(external.get("k1"), Some(&FieldValue::from("v1")));
    assert_eq!(external.body, "test\n");

    let (_, windows) = store.read_record("windows").unwrap();
    assert_eq!(windows.get("title"), Some(&FieldValue::from("edited")));
    assert_eq!(windows.body, "body\r\n");
}

#[test]
fn stores_sharing_a_root_see_each_others_writes() {
    let temp = TempDir::new().unwrap();
    let writer = connected(temp.path());
    let reader = connected(temp.path());

    writer.create_record("shared", &k1_k2("a", "b", "c")).unwrap();
    assert_eq!(reader.read_record("shared").unwrap().1.body, "c");

    writer.update_record("shared", &k1_k2("a", "b", "d")).unwrap();
    assert_eq!(reader.read_record("shared").unwrap().1.body, "d");
}

#[test]
fn store_built_from_config_uses_configured_layout() {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig {
        root: temp.path().to_path_buf(),
        layout: StoreLayout::new("entries", "markdown"),
        write_mode: WriteMode::Exclusive,
        ..StoreConfig::default()
    };

    let store = config.build_storage();
    store.connect().unwrap();
    store.create_record("cfg", &k1_k2("a", "b", "c")).unwrap();

    assert!(temp.path().join("entries/cfg.markdown").is_file());
    assert!(store.create_record("cfg", &k1_k2("a", "b", "c")).is_err());
    assert_eq!(store.record_keys().unwrap(), vec!["cfg".to_string()]);
}
