use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{Busy, Focus, Model};
use crate::editor::TextField;

use super::{FORM_WIDTH_PERCENT, LIST_WIDTH_PERCENT, overlays, status, style};

/// Columns a field's text starts at, relative to the form's inner area.
const FIELD_INDENT: u16 = 2;
const STEP_INDENT: u16 = 5;
const LINK_LABEL: &str = "link: ";

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(FORM_WIDTH_PERCENT),
            Constraint::Percentage(LIST_WIDTH_PERCENT),
        ])
        .split(area)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);

    let main_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    let chunks = split_main_columns(main_area);
    render_form(model, frame, chunks[0]);
    render_entry_list(model, frame, chunks[1]);

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

/// Form lines plus the cursor position `(row, column)` of the focused field.
struct FormLayout {
    lines: Vec<Line<'static>>,
    cursor: Option<(usize, u16)>,
}

impl FormLayout {
    fn push_field(&mut self, field: &TextField, focused: bool, indent: u16, prefix: Option<&str>) {
        let prefix_width = prefix.map_or(0, |p| u16::try_from(p.len()).unwrap_or(u16::MAX));
        if focused {
            let (line, col) = field.display_cursor();
            let col = u16::try_from(col).unwrap_or(u16::MAX);
            self.cursor = Some((self.lines.len() + line, indent + prefix_width + col));
        }
        for (i, text) in field.lines().into_iter().enumerate() {
            let mut spans = vec![Span::raw(" ".repeat(usize::from(indent)))];
            if let Some(prefix) = prefix {
                let label = if i == 0 {
                    prefix.to_string()
                } else {
                    " ".repeat(prefix.len())
                };
                spans.push(Span::styled(label, style::dim_style()));
            }
            spans.push(Span::raw(text));
            self.lines.push(Line::from(spans));
        }
    }

    fn push_label(&mut self, label: &str, focused: bool) {
        self.lines
            .push(Line::styled(label.to_string(), style::label_style(focused)));
    }
}

fn build_form(model: &Model) -> FormLayout {
    let draft = &model.draft;
    let mut form = FormLayout {
        lines: Vec::new(),
        cursor: None,
    };

    let title_focused = model.focus == Focus::Title;
    form.push_label("Title", title_focused);
    form.push_field(&draft.title, title_focused, FIELD_INDENT, None);
    form.lines.push(Line::raw(""));

    let steps_focused = matches!(model.focus, Focus::StepText(_) | Focus::StepLink(_));
    form.push_label("Steps", steps_focused);
    for (i, row) in draft.steps().iter().enumerate() {
        let number = format!("{:>3}. ", i + 1);
        let text_focused = model.focus == Focus::StepText(i);
        form.push_field(&row.text, text_focused, 0, Some(&number));
        let link_focused = model.focus == Focus::StepLink(i);
        form.push_field(&row.link, link_focused, STEP_INDENT, Some(LINK_LABEL));
    }
    form.lines.push(Line::raw(""));

    let info_focused = model.focus == Focus::Info;
    form.push_label("Notes", info_focused);
    form.push_field(&draft.info, info_focused, FIELD_INDENT, None);
    form.lines.push(Line::raw(""));

    let mut hints = vec!["Ctrl-s submit", "Ctrl-n add step", "Ctrl-d remove step"];
    if draft.is_editing() {
        hints.push("Esc cancel edit");
    }
    form.lines
        .push(Line::styled(hints.join(" · "), style::dim_style()));
    form
}

fn render_form(model: &Model, frame: &mut Frame, area: Rect) {
    let title = model.editing_title().map_or_else(
        || "New airdrop".to_string(),
        |title| format!("Editing {title}"),
    );
    let focused = model.focus != Focus::List;
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style::border_style(focused));
    let inner = block.inner(area);
    let form = build_form(model);

    // Keep the cursor row on screen.
    let visible = usize::from(inner.height);
    let scroll = match form.cursor {
        Some((row, _)) if visible > 0 && row >= visible => row + 1 - visible,
        _ => 0,
    };
    let scroll_u16 = u16::try_from(scroll).unwrap_or(u16::MAX);

    frame.render_widget(
        Paragraph::new(form.lines)
            .block(block)
            .scroll((scroll_u16, 0)),
        area,
    );

    if !model.help_visible
        && let Some((row, col)) = form.cursor
        && inner.width > 0
    {
        let y = inner.y + u16::try_from(row - scroll).unwrap_or(u16::MAX);
        let x = inner.x + col.min(inner.width - 1);
        if y < inner.y + inner.height {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Lines of the entry list and the row range each entry occupies.
fn build_entry_list(model: &Model) -> (Vec<Line<'static>>, Vec<(usize, usize)>) {
    let mut lines = Vec::new();
    let mut spans = Vec::new();
    for (i, entry) in model.items.iter().enumerate() {
        let start = lines.len();
        let selected = model.selected == Some(i) && model.focus == Focus::List;
        let marker = if model.selected == Some(i) { ">" } else { " " };
        lines.push(Line::styled(
            format!("{marker} {}", entry.title),
            style::entry_title_style(selected),
        ));
        for (n, step) in entry.steps.iter().enumerate() {
            let mut parts = vec![Span::raw(format!("   {}. {}", n + 1, step.text))];
            if !step.link.is_empty() {
                parts.push(Span::raw("  "));
                parts.push(Span::styled(step.link.clone(), style::link_style()));
            }
            lines.push(Line::from(parts));
        }
        for info in entry.info.lines().filter(|l| !l.trim().is_empty()) {
            lines.push(Line::raw(format!("   {info}")));
        }
        lines.push(Line::styled(
            format!("   {}", entry.created_at),
            style::dim_style(),
        ));
        spans.push((start, lines.len()));
        lines.push(Line::raw(""));
    }
    (lines, spans)
}

fn render_entry_list(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!("Airdrops ({})", model.items.len()))
        .borders(Borders::ALL)
        .border_style(style::border_style(model.focus == Focus::List));

    if model.items.is_empty() {
        let text = if model.busy == Busy::Loading {
            "Loading…"
        } else {
            "No airdrops yet"
        };
        frame.render_widget(
            Paragraph::new(Line::styled(text, style::dim_style())).block(block),
            area,
        );
        return;
    }

    let visible = usize::from(block.inner(area).height);
    let (lines, spans) = build_entry_list(model);
    let scroll = model
        .selected
        .and_then(|i| spans.get(i))
        .map_or(0, |&(start, end)| {
            if end > visible {
                start.min(end - visible)
            } else {
                0
            }
        });
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
