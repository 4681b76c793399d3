use memos::{MemoDate, MemoError, MemoStore};
use std::collections::BTreeSet;
use std::fs;

fn date(s: &str) -> MemoDate {
    MemoDate::parse(s).unwrap()
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

fn two_memo_store() -> MemoStore {
    let mut store = MemoStore::new();

    let first = store.create_memo();
    store.set_title(&first, "First").unwrap();
    store.set_date(&first, date("2024/01/01")).unwrap();
    store.set_content(&first, "Alpha").unwrap();
    store.set_tags(&first, ["a", "b"]).unwrap();

    let second = store.create_memo();
    store.set_title(&second, "Second").unwrap();
    store.set_date(&second, date("2024/02/02")).unwrap();
    store.set_content(&second, "Beta").unwrap();
    store.set_tags(&second, ["c"]).unwrap();

    store
}

#[test]
fn save_then_load_preserves_fields_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.xml");

    let mut store = two_memo_store();
    store.save(&path).unwrap();
    assert_eq!(store.current_file(), Some(path.as_path()));

    let mut loaded = MemoStore::new();
    loaded.load(&path).unwrap();
    assert_eq!(loaded.current_file(), Some(path.as_path()));
    assert_eq!(loaded.ids(), vec!["0", "1"]);

    let first = loaded.get("0").unwrap();
    assert_eq!(first.title(), "First");
    assert_eq!(first.date().as_str(), "2024/01/01");
    assert_eq!(first.content(), "Alpha");
    assert_eq!(first.tags(), &tag_set(&["a", "b"]));

    let second = loaded.get("1").unwrap();
    assert_eq!(second.title(), "Second");
    assert_eq!(second.date().as_str(), "2024/02/02");
    assert_eq!(second.content(), "Beta");
    assert_eq!(second.tags(), &tag_set(&["c"]));
}

#[test]
fn load_reassigns_ids_after_deletions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.xml");

    let mut store = MemoStore::new();
    for title in ["zero", "one", "two", "three"] {
        let id = store.create_memo();
        store.set_title(&id, title).unwrap();
    }
    store.delete_memo("0");
    store.delete_memo("2");
    store.save(&path).unwrap();

    store.load(&path).unwrap();
    assert_eq!(store.ids(), vec!["0", "1"]);
    assert_eq!(store.get("0").unwrap().title(), "one");
    assert_eq!(store.get("1").unwrap().title(), "three");
    assert_eq!(store.create_memo(), "2");
}

#[test]
fn saved_file_is_indented_xml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.xml");

    two_memo_store().save(&path).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.starts_with("<?xml"));
    assert!(text.contains("\n<memos>\n    <memo>\n        <name>First</name>\n"));
    assert!(text.contains("        <tags>a,b</tags>\n"));
    assert!(text.ends_with("</memos>\n"));
}

#[test]
fn failed_load_keeps_store_and_current_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.xml");
    let bad = dir.path().join("bad.xml");
    fs::write(&bad, "<memos><memo><name>half").unwrap();

    let mut store = two_memo_store();
    store.save(&good).unwrap();

    let err = store.load(&bad).unwrap_err();
    assert!(matches!(err, MemoError::MalformedDocument(_)));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("1").unwrap().title(), "Second");
    assert_eq!(store.current_file(), Some(good.as_path()));

    let err = store.load(dir.path().join("missing.xml")).unwrap_err();
    assert!(matches!(err, MemoError::Io { .. }));
    assert_eq!(store.len(), 2);
}

#[test]
fn save_to_unwritable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no").join("such").join("dir.xml");

    let mut store = two_memo_store();
    let err = store.save(&path).unwrap_err();
    assert!(matches!(err, MemoError::Io { .. }));
    assert!(store.current_file().is_none());
}

#[test]
fn load_fills_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.xml");
    fs::write(
        &path,
        "<memos>\n  <memo>\n    <content>body</content>\n  </memo>\n</memos>\n",
    )
    .unwrap();

    let mut store = MemoStore::with_default_title("新規メモ");
    store.load(&path).unwrap();

    let memo = store.get("0").unwrap();
    assert_eq!(memo.title(), "新規メモ");
    assert_eq!(memo.date(), &MemoDate::today());
    assert_eq!(memo.content(), "body");
    assert!(memo.tags().is_empty());
}

#[test]
fn export_writes_selected_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.txt");

    let store = two_memo_store();
    store.export(&path, Some(&["1", "42"][..])).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "Title: Second\nDate: 2024/02/02\nTags: c\nContent:\nBeta\n"
    );

    store.export(&path, None).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let rule = "-".repeat(50);
    assert_eq!(
        text,
        format!(
            "Title: First\nDate: 2024/01/01\nTags: a, b\nContent:\nAlpha\n{}\n\
             Title: Second\nDate: 2024/02/02\nTags: c\nContent:\nBeta\n",
            rule
        )
    );
    assert!(store.current_file().is_none());
}

#[test]
fn filter_by_date_is_inclusive() {
    let mut store = MemoStore::new();
    let a = store.create_memo_on(date("2023/09/01"));
    let b = store.create_memo_on(date("2023/09/15"));
    let c = store.create_memo_on(date("2023/09/20"));

    let ids = store.filter_by_date("2023/09/10", "2023/09/20");
    assert_eq!(ids, vec![b, c]);
    assert!(!ids.contains(&a));
}

#[test]
fn search_reports_field_and_offsets() {
    let mut store = MemoStore::new();
    let shop = store.create_memo();
    store.set_title(&shop, "Shopping list").unwrap();
    store.set_content(&shop, "Buy milk and eggs").unwrap();
    let work = store.create_memo();
    store.set_title(&work, "Work notes").unwrap();
    store.set_content(&work, "Finish the report").unwrap();

    let hits = store.search("shop", false);
    assert!(hits.iter().any(|h| h.id == shop && h.in_title && h.start == 0 && h.end == 4));

    let hits = store.search("report", false);
    assert!(hits.iter().any(|h| h.id == work && !h.in_title));

    let hits = store.search("milk", false);
    assert!(hits.iter().any(|h| h.id == shop && !h.in_title && h.start == 4 && h.end == 8));
}

#[test]
fn round_trip_through_file_keeps_unicode_and_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memos.xml");

    let mut store = MemoStore::new();
    let id = store.create_memo_on(date("2025/12/31"));
    store.set_title(&id, "  買い物 & <todo>  ").unwrap();
    store.set_content(&id, "line 1\n\tline 2\n\n").unwrap();
    store.set_tags(&id, ["日本語", "x\"y"]).unwrap();
    store.save(&path).unwrap();

    let mut loaded = MemoStore::new();
    loaded.load(&path).unwrap();
    let original = store.get(&id).unwrap();
    assert_eq!(loaded.get("0").unwrap(), original);
}

#[test]
fn import_from_file_appends_and_keeps_current_file() {
    let dir = tempfile::tempdir().unwrap();
    let own = dir.path().join("own.xml");
    let other = dir.path().join("other.xml");

    two_memo_store().save(&other).unwrap();

    let mut store = two_memo_store();
    assert!(store.delete_memo("0"));
    store.save(&own).unwrap();

    let imported = store.import(&other).unwrap();
    assert_eq!(imported, vec!["2", "3"]);
    assert_eq!(store.ids(), vec!["1", "2", "3"]);
    assert_eq!(store.get("2").unwrap().title(), "First");
    assert_eq!(store.get("3").unwrap().tags(), &tag_set(&["c"]));
    assert_eq!(store.current_file(), Some(own.as_path()));

    let missing = dir.path().join("missing.xml");
    assert!(matches!(store.import(&missing), Err(MemoError::Io { .. })));
    assert_eq!(store.len(), 3);
}
