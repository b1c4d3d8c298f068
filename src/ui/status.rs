use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::style;
use crate::app::{Busy, Model};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let busy = match model.busy {
        Busy::Idle => String::new(),
        other => format!("  [{}]", other.label()),
    };
    let count = match model.items.len() {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    };
    let mode = if model.draft.is_editing() {
        "  [editing]"
    } else {
        ""
    };
    let status = format!(" {}  {count}{busy}{mode}  F1:help", model.location);
    frame.render_widget(Paragraph::new(status).style(style::status_style()), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, bar_style) = style::toast_style(level);
    let toast = Paragraph::new(format!("{prefix} {message}")).style(bar_style);
    frame.render_widget(toast, area);
}
