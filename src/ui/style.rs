//! Colors and emphasis shared by the form, the list, and the bars.
//!
//! Uses ANSI colors so the terminal's palette decides the final look.

use ratatui::style::{Color, Modifier, Style};

use crate::app::ToastLevel;

const DIM: Color = Color::Indexed(245);

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub fn label_style(focused: bool) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    if focused {
        style.fg(Color::Yellow)
    } else {
        style
    }
}

pub fn section_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn entry_title_style(selected: bool) -> Style {
    let style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    if selected {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

pub fn link_style() -> Style {
    Style::default()
        .fg(Color::Blue)
        .add_modifier(Modifier::UNDERLINED)
}

pub fn dim_style() -> Style {
    Style::default().fg(DIM)
}

pub fn status_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Bar style and prefix for a toast.
pub fn toast_style(level: ToastLevel) -> (&'static str, Style) {
    match level {
        ToastLevel::Info => ("[info]", status_style()),
        ToastLevel::Warning => ("[warn]", Style::default().bg(Color::Yellow).fg(Color::Black)),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    }
}
