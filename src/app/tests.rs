use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::document::{Document, Entry, EntryId, Step};
use crate::editor::{Direction, Draft, Placement};
use crate::store::{ContentApi, DocumentStore, Loaded, MemoryContents, StoreError};
use crate::worker::{Mode, StoreWorker};

use super::{App, Busy, Command, Focus, Message, Model, ToastLevel, update};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

fn create_test_model() -> Model {
    Model::new("alvin/airdrops:data.json@main", (80, 24))
}

fn entry(title: &str, id: &str) -> Entry {
    Entry {
        title: title.to_string(),
        steps: vec![Step::new("step", "")],
        info: String::new(),
        created_at: EntryId::new(id),
    }
}

fn loaded(items: Vec<Entry>) -> Loaded {
    let mut document = Document::empty();
    document.items = items;
    Loaded {
        document,
        failure: None,
    }
}

fn type_text(mut model: Model, text: &str) -> Model {
    for ch in text.chars() {
        model = update(model, Message::InsertChar(ch));
    }
    model
}

fn create_test_app(api: &Arc<MemoryContents>) -> App {
    let api: Arc<dyn ContentApi> = Arc::clone(api) as Arc<dyn ContentApi>;
    let worker = StoreWorker::new(Arc::new(DocumentStore::new(api)), Mode::Inline);
    App::new(worker, "memory")
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl(ch: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
}

// ==================== busy state ====================

#[test]
fn test_reload_enters_loading_and_queues_load() {
    let mut model = update(create_test_model(), Message::Reload);
    assert_eq!(model.busy, Busy::Loading);
    assert_eq!(model.take_commands(), vec![Command::Load { seq: 1 }]);
}

#[test]
fn test_load_finished_returns_to_idle_with_items() {
    let model = update(create_test_model(), Message::Reload);
    let model = update(
        model,
        Message::LoadFinished {
            seq: 1,
            loaded: loaded(vec![entry("a", "1"), entry("b", "2")]),
        },
    );
    assert_eq!(model.busy, Busy::Idle);
    let titles: Vec<_> = model.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["a", "b"]);
    assert_eq!(model.selected, Some(0));
}

#[test]
fn test_stale_load_is_discarded() {
    let model = update(create_test_model(), Message::Reload);
    let model = update(model, Message::Reload);
    let model = update(
        model,
        Message::LoadFinished {
            seq: 1,
            loaded: loaded(vec![entry("old", "1")]),
        },
    );
    assert!(model.items.is_empty());
    assert_eq!(model.busy, Busy::Loading);

    let model = update(
        model,
        Message::LoadFinished {
            seq: 2,
            loaded: loaded(vec![entry("new", "2")]),
        },
    );
    assert_eq!(model.items[0].title, "new");
    assert_eq!(model.busy, Busy::Idle);
}

#[test]
fn test_load_not_found_shows_warning_and_empty_list() {
    let mut model = create_test_model();
    model.items = vec![entry("a", "1")];
    let model = update(model, Message::Reload);
    let model = update(
        model,
        Message::LoadFinished {
            seq: 1,
            loaded: Loaded {
                document: Document::empty(),
                failure: Some(StoreError::NotFound),
            },
        },
    );
    assert!(model.items.is_empty());
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert!(text.contains("No document yet"));
}

#[test]
fn test_load_auth_failure_shows_class() {
    let model = update(create_test_model(), Message::Reload);
    let model = update(
        model,
        Message::LoadFinished {
            seq: 1,
            loaded: Loaded {
                document: Document::empty(),
                failure: Some(StoreError::Unauthorized("Bad credentials".to_string())),
            },
        },
    );
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(text.contains("Unauthorized"));
    assert!(text.contains("Bad credentials"));
}

// ==================== submit ====================

#[test]
fn test_submit_with_blank_title_queues_nothing() {
    let mut model = type_text(create_test_model(), "   ");
    model = update(model, Message::Submit(now()));
    assert_eq!(model.busy, Busy::Idle);
    assert!(model.take_commands().is_empty());
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert_eq!(text, "Title is required");
}

#[test]
fn test_submit_enters_submitting_with_commit_message() {
    let mut model = type_text(create_test_model(), "Zeta Drop");
    model = update(model, Message::Submit(now()));
    assert_eq!(model.busy, Busy::Submitting);
    let commands = model.take_commands();
    let [Command::Submit { seq, submission }] = commands.as_slice() else {
        panic!("expected one submit, got {commands:?}");
    };
    assert_eq!(*seq, 1);
    assert_eq!(submission.commit_message(), "Add new item: Zeta Drop...");
}

#[test]
fn test_submit_is_ignored_while_busy() {
    let mut model = type_text(create_test_model(), "x");
    model = update(model, Message::Reload);
    model.take_commands();
    model = update(model, Message::Submit(now()));
    assert_eq!(model.busy, Busy::Loading);
    assert!(model.take_commands().is_empty());
}

#[test]
fn test_draft_is_frozen_while_submitting() {
    let mut model = type_text(create_test_model(), "x");
    model = update(model, Message::Submit(now()));
    model = update(model, Message::InsertChar('y'));
    assert_eq!(model.draft.title.text(), "x");
}

#[test]
fn test_submit_success_clears_draft_and_reloads() {
    let mut model = type_text(create_test_model(), "Zeta Drop");
    model = update(model, Message::Submit(now()));
    model.take_commands();
    model = update(
        model,
        Message::SubmitFinished {
            seq: 1,
            result: Ok(()),
        },
    );
    assert_eq!(model.draft, Draft::new());
    assert_eq!(model.busy, Busy::Loading);
    assert_eq!(model.take_commands(), vec![Command::Load { seq: 2 }]);
    assert!(model.active_toast().unwrap().0.contains("Saved Zeta Drop"));
}

#[test]
fn test_submit_conflict_keeps_draft_and_list() {
    let mut model = create_test_model();
    model.items = vec![entry("shown", "1")];
    model = type_text(model, "Zeta Drop");
    model = update(model, Message::Submit(now()));
    model = update(
        model,
        Message::SubmitFinished {
            seq: 1,
            result: Err(StoreError::Conflict("data.json does not match".to_string())),
        },
    );
    assert_eq!(model.busy, Busy::Idle);
    assert_eq!(model.draft.title.text(), "Zeta Drop");
    assert_eq!(model.items[0].title, "shown");
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(text.contains("Conflict"));
    assert!(model.take_commands().iter().all(|c| !matches!(c, Command::Load { .. })));
}

#[test]
fn test_unknown_submit_completion_is_ignored() {
    let mut model = type_text(create_test_model(), "x");
    model = update(model, Message::Submit(now()));
    model = update(
        model,
        Message::SubmitFinished {
            seq: 42,
            result: Ok(()),
        },
    );
    assert_eq!(model.busy, Busy::Submitting);
    assert_eq!(model.draft.title.text(), "x");
}

// ==================== draft editing ====================

#[test]
fn test_edit_selected_loads_entry_into_form() {
    let mut model = create_test_model();
    model.items = vec![entry("a", "1"), entry("b", "2")];
    model = update(model, Message::FocusList);
    model = update(model, Message::SelectNext);
    model = update(model, Message::EditSelected);
    assert_eq!(model.draft.title.text(), "b");
    assert_eq!(model.draft.editing_id(), Some(&EntryId::new("2")));
    assert_eq!(model.focus, Focus::Title);
    assert_eq!(model.editing_title(), Some("b"));
}

#[test]
fn test_cancel_resets_draft_without_requests() {
    let mut model = create_test_model();
    model.items = vec![entry("a", "1")];
    model = update(model, Message::FocusList);
    model = update(model, Message::EditSelected);
    model = update(model, Message::Cancel);
    assert_eq!(model.draft, Draft::new());
    assert!(model.take_commands().is_empty());
    assert_eq!(model.items.len(), 1);
}

#[test]
fn test_add_and_remove_step_moves_focus() {
    let mut model = update(create_test_model(), Message::AddStep);
    assert_eq!(model.draft.steps().len(), 2);
    assert_eq!(model.focus, Focus::StepText(1));
    model = update(model, Message::RemoveStep);
    assert_eq!(model.draft.steps().len(), 1);
    assert_eq!(model.focus, Focus::StepText(0));
}

#[test]
fn test_remove_last_step_warns() {
    let mut model = create_test_model();
    model.focus = Focus::StepLink(0);
    model = update(model, Message::RemoveStep);
    assert_eq!(model.draft.steps().len(), 1);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_focus_cycles_through_step_fields() {
    let mut model = create_test_model();
    let expected = [
        Focus::StepText(0),
        Focus::StepLink(0),
        Focus::Info,
        Focus::List,
        Focus::Title,
    ];
    for focus in expected {
        model = update(model, Message::FocusNext);
        assert_eq!(model.focus, focus);
    }
    model = update(model, Message::FocusPrev);
    assert_eq!(model.focus, Focus::List);
}

#[test]
fn test_typing_goes_to_focused_field() {
    let mut model = create_test_model();
    model.focus = Focus::StepLink(0);
    model = type_text(model, "https://x");
    model = update(model, Message::MoveCursor(Direction::Left));
    model = update(model, Message::DeleteBack);
    assert_eq!(model.draft.steps()[0].link.text(), "https:/x");
    assert!(model.draft.title.is_empty());
}

#[test]
fn test_enter_adds_line_in_notes_only() {
    let mut model = create_test_model();
    model = update(model, Message::Newline);
    assert_eq!(model.focus, Focus::StepText(0));
    model.focus = Focus::Info;
    model = type_text(model, "a");
    model = update(model, Message::Newline);
    model = type_text(model, "b");
    assert_eq!(model.draft.info.text(), "a\nb");
}

#[test]
fn test_quit_with_dirty_draft_needs_confirmation() {
    let mut model = type_text(create_test_model(), "x");
    model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert!(model.quit_confirmed);
    model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_confirmation_resets_on_other_input() {
    let mut model = type_text(create_test_model(), "x");
    model = update(model, Message::Quit);
    model = update(model, Message::FocusNext);
    model = update(model, Message::Quit);
    assert!(!model.should_quit);
}

#[test]
fn test_quit_while_saving_warns_about_the_request() {
    let mut model = type_text(create_test_model(), "Zeta Drop");
    model = update(model, Message::Submit(now()));
    assert_eq!(model.busy, Busy::Submitting);

    model = update(model, Message::Quit);
    assert!(!model.should_quit);
    let (text, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert!(text.contains("save is still in flight"));

    model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_with_clean_draft_is_immediate() {
    let model = update(create_test_model(), Message::Quit);
    assert!(model.should_quit);
}

// ==================== input mapping ====================

#[test]
fn test_ctrl_s_maps_to_submit() {
    let model = create_test_model();
    assert!(matches!(
        App::handle_event(&ctrl('s'), &model),
        Some(Message::Submit(_))
    ));
}

#[test]
fn test_chars_type_in_form_and_navigate_in_list() {
    let mut model = create_test_model();
    assert_eq!(
        App::handle_event(&key(KeyCode::Char('j')), &model),
        Some(Message::InsertChar('j'))
    );
    model.focus = Focus::List;
    assert_eq!(
        App::handle_event(&key(KeyCode::Char('j')), &model),
        Some(Message::SelectNext)
    );
    assert_eq!(
        App::handle_event(&key(KeyCode::Enter), &model),
        Some(Message::EditSelected)
    );
}

#[test]
fn test_up_down_move_lines_only_in_notes() {
    let mut model = create_test_model();
    assert_eq!(
        App::handle_event(&key(KeyCode::Down), &model),
        Some(Message::FocusNext)
    );
    model.focus = Focus::Info;
    assert_eq!(
        App::handle_event(&key(KeyCode::Down), &model),
        Some(Message::MoveCursor(Direction::Down))
    );
}

#[test]
fn test_esc_cancels_only_while_editing() {
    let mut model = create_test_model();
    assert_eq!(
        App::handle_event(&key(KeyCode::Esc), &model),
        Some(Message::FocusList)
    );
    model.draft.begin_edit(&entry("a", "1"));
    assert_eq!(
        App::handle_event(&key(KeyCode::Esc), &model),
        Some(Message::Cancel)
    );
}

#[test]
fn test_help_swallows_keys() {
    let mut model = create_test_model();
    model.help_visible = true;
    assert_eq!(App::handle_event(&key(KeyCode::Char('x')), &model), None);
    assert_eq!(
        App::handle_event(&key(KeyCode::Esc), &model),
        Some(Message::HideHelp)
    );
}

// ==================== app with an in-memory store ====================

#[test]
fn test_start_loads_document() {
    let mut document = Document::empty();
    document.items.push(entry("a", "1"));
    let api = Arc::new(MemoryContents::with_document(&document));
    let app = create_test_app(&api);
    let model = app.start((80, 24));
    assert_eq!(model.busy, Busy::Idle);
    assert_eq!(model.items.len(), 1);
}

#[test]
fn test_dispatch_submit_commits_and_reloads() {
    let api = Arc::new(MemoryContents::with_document(&Document::empty()));
    let app = create_test_app(&api);
    let model = app.start((80, 24));
    let model = type_text(model, "Zeta Drop");
    let model = app.dispatch(model, Message::Submit(now()));

    assert_eq!(model.busy, Busy::Idle);
    assert_eq!(model.items.len(), 1);
    assert_eq!(model.items[0].created_at.as_str(), "2024-05-01T10:00:00.000Z");
    assert_eq!(model.draft, Draft::new());
    assert_eq!(api.writes().len(), 1);
    assert_eq!(api.reads(), 3);
}

#[test]
fn test_dispatch_edit_in_place_placement() {
    let mut document = Document::empty();
    for (title, id) in [("a", "1"), ("b", "2"), ("c", "3")] {
        document.items.push(entry(title, id));
    }
    let api = Arc::new(MemoryContents::with_document(&document));
    let app = create_test_app(&api).with_placement(Placement::InPlace);
    let mut model = app.start((80, 24));
    model = app.dispatch(model, Message::FocusList);
    model = app.dispatch(model, Message::SelectNext);
    model = app.dispatch(model, Message::EditSelected);
    model = app.dispatch(model, Message::MoveEnd);
    model = app.dispatch(model, Message::InsertChar('2'));
    model = app.dispatch(model, Message::Submit(now()));

    let titles: Vec<_> = model.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["a", "b2", "c"]);
    assert_eq!(api.writes()[0].message, "Update item: b2...");
}

#[test]
fn test_dispatch_conflict_preserves_draft() {
    let mut shown = Document::empty();
    shown.items.push(entry("shown", "1"));
    let api = Arc::new(MemoryContents::with_document(&shown));
    let app = create_test_app(&api);
    let model = app.start((80, 24));

    let mut external = shown.clone();
    external.items.push(entry("external", "2"));
    api.interleave_external_write(&external);

    let model = type_text(model, "Zeta Drop");
    let model = app.dispatch(model, Message::Submit(now()));

    assert_eq!(model.draft.title.text(), "Zeta Drop");
    let titles: Vec<_> = model.items.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["shown"]);
    assert!(model.active_toast().unwrap().0.contains("Conflict"));
    assert!(api.writes().is_empty());
}
