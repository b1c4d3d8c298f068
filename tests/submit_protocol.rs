use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use dropboard::document::{Document, Entry, EntryId, Step};
use dropboard::editor::{Draft, Placement, Submission};
use dropboard::store::{DocumentStore, MemoryContents, StoreError};

fn at(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, secs).unwrap()
}

fn entry(title: &str, id: &str) -> Entry {
    Entry {
        title: title.to_string(),
        steps: vec![Step::new("Join Discord", "https://discord.gg/x")],
        info: String::new(),
        created_at: EntryId::new(id),
    }
}

fn document(entries: Vec<Entry>) -> Document {
    Document {
        items: entries,
        ..Document::empty()
    }
}

fn draft(title: &str, steps: &[(&str, &str)]) -> Draft {
    let mut draft = Draft::new();
    draft.title.set(title);
    for (i, (text, link)) in steps.iter().enumerate() {
        if i > 0 {
            draft.add_step();
        }
        draft.set_step(i, text, link).unwrap();
    }
    draft
}

fn submit(
    store: &DocumentStore<Arc<MemoryContents>>,
    submission: &Submission,
) -> Result<(), StoreError> {
    store.save(|current| submission.apply(current), &submission.commit_message())
}

#[test]
fn test_submit_applies_to_latest_remote_state() {
    let remote = Arc::new(MemoryContents::with_document(&document(vec![entry(
        "Alpha",
        "2024-04-01T00:00:00.000Z",
    )])));
    let store = DocumentStore::new(Arc::clone(&remote));

    // Client A loads, then client B appends before A submits.
    let seen = store.load();
    assert_eq!(seen.document.len(), 1);
    remote.replace_externally(&document(vec![
        entry("Alpha", "2024-04-01T00:00:00.000Z"),
        entry("Beta", "2024-04-02T00:00:00.000Z"),
    ]));

    let submission = Submission::prepare(&draft("Gamma", &[("Bridge", "")]), at(0)).unwrap();
    submit(&store, &submission).unwrap();

    let stored = remote.document().unwrap();
    let titles: Vec<_> = stored.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Alpha", "Beta", "Gamma"]);
    assert_eq!(stored.items[2].created_at.as_str(), "2024-05-01T10:00:00.000Z");

    let writes = remote.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].message, "Add new item: Gamma...");
    assert!(writes[0].version.is_some());
}

#[test]
fn test_edit_keeps_created_at_and_moves_to_end() {
    let remote = Arc::new(MemoryContents::with_document(&document(vec![
        entry("Alpha", "a"),
        entry("Beta", "b"),
        entry("Gamma", "c"),
    ])));
    let store = DocumentStore::new(Arc::clone(&remote));

    let loaded = store.load().document;
    let mut edit = Draft::from_entry(&loaded.items[0]);
    edit.title.set("Alpha v2");
    let submission = Submission::prepare(&edit, at(30)).unwrap();
    submit(&store, &submission).unwrap();

    let stored = remote.document().unwrap();
    let ids: Vec<_> = stored.items.iter().map(|e| e.created_at.as_str()).collect();
    assert_eq!(ids, ["b", "c", "a"]);
    assert_eq!(stored.items[2].title, "Alpha v2");
    assert_eq!(remote.writes()[0].message, "Update item: Alpha v2...");
}

#[test]
fn test_edit_in_place_keeps_position() {
    let remote = Arc::new(MemoryContents::with_document(&document(vec![
        entry("Alpha", "a"),
        entry("Beta", "b"),
    ])));
    let store = DocumentStore::new(Arc::clone(&remote));

    let mut edit = Draft::from_entry(&store.load().document.items[0]);
    edit.info.set("Snapshot taken");
    let submission = Submission::prepare(&edit, at(30))
        .unwrap()
        .with_placement(Placement::InPlace);
    submit(&store, &submission).unwrap();

    let stored = remote.document().unwrap();
    assert_eq!(stored.items[0].created_at.as_str(), "a");
    assert_eq!(stored.items[0].info, "Snapshot taken");
    assert_eq!(stored.items.len(), 2);
}

#[test]
fn test_concurrent_write_is_a_conflict_and_nothing_is_retried() {
    let remote = Arc::new(MemoryContents::with_document(&document(vec![entry(
        "Alpha", "a",
    )])));
    let store = DocumentStore::new(Arc::clone(&remote));
    remote.interleave_external_write(&document(vec![entry("Other", "z")]));

    let form = draft("Gamma", &[("Step one", "")]);
    let submission = Submission::prepare(&form, at(0)).unwrap();
    let err = submit(&store, &submission).unwrap_err();

    assert!(err.is_conflict());
    assert!(remote.writes().is_empty());
    assert_eq!(remote.reads(), 1);
    assert_eq!(remote.document().unwrap().items[0].title, "Other");
    // The caller still holds the unchanged form.
    assert_eq!(form.title.text(), "Gamma");
    assert_eq!(form.steps()[0].text.text(), "Step one");
}

#[test]
fn test_missing_document_is_created_only_when_enabled() {
    let submission = Submission::prepare(&draft("First", &[]), at(0)).unwrap();

    let remote = Arc::new(MemoryContents::missing());
    let strict = DocumentStore::new(Arc::clone(&remote));
    assert!(submit(&strict, &submission).unwrap_err().is_not_found());
    assert!(remote.text().is_none());

    let creating = DocumentStore::new(Arc::clone(&remote)).with_create_missing(true);
    submit(&creating, &submission).unwrap();
    let writes = remote.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].version, None);
    assert_eq!(remote.document().unwrap().items[0].title, "First");
}

#[test]
fn test_unknown_top_level_keys_survive_a_submit() {
    let remote = Arc::new(MemoryContents::with_text(
        r#"{"items": [], "schema": 2, "owner": {"name": "alvin"}}"#,
    ));
    let store = DocumentStore::new(Arc::clone(&remote));

    let submission = Submission::prepare(&draft("Gamma", &[]), at(0)).unwrap();
    submit(&store, &submission).unwrap();

    let value: serde_json::Value = serde_json::from_str(&remote.text().unwrap()).unwrap();
    assert_eq!(value["schema"], 2);
    assert_eq!(value["owner"]["name"], "alvin");
    assert_eq!(value["items"][0]["title"], "Gamma");
}

#[test]
fn test_same_millisecond_submissions_get_distinct_ids() {
    let remote = Arc::new(MemoryContents::with_document(&Document::empty()));
    let store = DocumentStore::new(Arc::clone(&remote));

    for title in ["One", "Two"] {
        let submission = Submission::prepare(&draft(title, &[]), at(0)).unwrap();
        submit(&store, &submission).unwrap();
    }

    let stored = remote.document().unwrap();
    assert_eq!(stored.items[0].created_at.as_str(), "2024-05-01T10:00:00.000Z");
    assert_eq!(stored.items[1].created_at.as_str(), "2024-05-01T10:00:00.001Z");
}

#[test]
fn test_submit_succeeds_against_null_items() {
    let remote = Arc::new(MemoryContents::with_text(r#"{"items": null}"#));
    let store = DocumentStore::new(Arc::clone(&remote));

    let loaded = store.load();
    assert!(loaded.failure.is_none());
    assert!(loaded.document.is_empty());

    let submission = Submission::prepare(&draft("Gamma", &[]), at(0)).unwrap();
    submit(&store, &submission).unwrap();
    assert_eq!(remote.document().unwrap().items[0].title, "Gamma");
}

#[test]
fn test_entry_without_created_at_does_not_block_submits() {
    let remote = Arc::new(MemoryContents::with_text(
        r#"{"items": [{"title": "Hand written"}, {"title": "Alpha", "createdAt": "a"}]}"#,
    ));
    let store = DocumentStore::new(Arc::clone(&remote));
    assert_eq!(store.load().document.len(), 2);

    let submission = Submission::prepare(&draft("Gamma", &[]), at(0)).unwrap();
    submit(&store, &submission).unwrap();

    let value: serde_json::Value = serde_json::from_str(&remote.text().unwrap()).unwrap();
    assert_eq!(value["items"][0]["title"], "Hand written");
    assert!(value["items"][0].get("createdAt").is_none());
    assert_eq!(value["items"][2]["title"], "Gamma");
}
