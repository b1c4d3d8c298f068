use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus, Message, Model};
use crate::editor::{Direction, FieldKind};

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Paste(text) if model.focused_field().is_some() && !model.help_visible => {
                Some(Message::Paste(text.clone()))
            }
            Event::Resize(width, height) => Some(Message::Resize(*width, *height)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?' | 'q') => Some(Message::HideHelp),
                KeyCode::Up | KeyCode::Char('k') => Some(Message::HelpScrollUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::HelpScrollDown),
                _ => None,
            };
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c' | 'q') => Some(Message::Quit),
                KeyCode::Char('s') => Some(Message::Submit(Utc::now())),
                KeyCode::Char('r') => Some(Message::Reload),
                KeyCode::Char('n') => Some(Message::AddStep),
                KeyCode::Char('d') => Some(Message::RemoveStep),
                KeyCode::Char('l') => Some(Message::FocusList),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Tab => return Some(Message::FocusNext),
            KeyCode::BackTab => return Some(Message::FocusPrev),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(5) => return Some(Message::Reload),
            _ => {}
        }

        if model.focus == Focus::List {
            Self::handle_list_key(key)
        } else {
            Self::handle_form_key(key, model)
        }
    }

    fn handle_list_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Message::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::SelectNext),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::SelectFirst),
            KeyCode::End | KeyCode::Char('G') => Some(Message::SelectLast),
            KeyCode::Enter | KeyCode::Char('e') => Some(Message::EditSelected),
            KeyCode::Esc | KeyCode::Char('n' | 'i') => Some(Message::FocusForm),
            KeyCode::Char('r') => Some(Message::Reload),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }

    fn handle_form_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let multi_line = model
            .focused_field()
            .is_some_and(|field| field.kind() == FieldKind::MultiLine);
        match key.code {
            KeyCode::Char(ch) => Some(Message::InsertChar(ch)),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up if multi_line => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down if multi_line => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Up => Some(Message::FocusPrev),
            KeyCode::Down => Some(Message::FocusNext),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::Enter => Some(Message::Newline),
            KeyCode::Esc if model.draft.is_editing() => Some(Message::Cancel),
            KeyCode::Esc => Some(Message::FocusList),
            _ => None,
        }
    }
}
