use std::path::Path;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use super::style;
use crate::app::Model;

const KEY_COLUMN: usize = 20;

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Form",
        &[
            ("Tab / Shift-Tab", "Next / previous field"),
            ("Up/Down", "Move between fields (lines in notes)"),
            ("Enter", "Next field (new line in notes)"),
            ("Ctrl-s", "Submit entry"),
            ("Esc", "Cancel edit / go to list"),
        ],
    ),
    (
        "Steps",
        &[
            ("Ctrl-n", "Add step"),
            ("Ctrl-d", "Remove focused step"),
            ("", "Steps without text are not saved"),
        ],
    ),
    (
        "List",
        &[
            ("Ctrl-l", "Focus list"),
            ("j/k or Up/Down", "Select entry"),
            ("g / G", "First / last"),
            ("Enter / e", "Edit selected entry"),
            ("n / i / Esc", "Back to form"),
        ],
    ),
    (
        "Other",
        &[
            ("Ctrl-r / F5 / r", "Reload from repository"),
            ("q / Ctrl-c / Ctrl-q", "Quit"),
            ("? / F1", "Toggle help"),
        ],
    ),
];

fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (title, keys) in HELP_SECTIONS {
        lines.push(Line::styled(*title, style::section_style()));
        for (key, action) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<KEY_COLUMN$}"), style::dim_style()),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::raw(""));
    }

    let show = |path: Option<&Path>, missing: &str| {
        path.map_or_else(|| missing.to_string(), |p| p.display().to_string())
    };
    lines.push(Line::styled("Config", style::section_style()));
    lines.push(Line::raw(format!("  Document: {}", model.location)));
    lines.push(Line::raw(format!(
        "  Global: {}",
        show(model.config_global_path.as_deref(), "<unknown>")
    )));
    lines.push(Line::raw(format!(
        "  Local override: {}",
        show(model.config_local_path.as_deref(), "<none>")
    )));
    lines
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(
        area.width.saturating_sub(12).max(48),
        area.height.saturating_sub(6).max(12),
        area,
    );
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);
    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Last row holds the footer.
    let [body, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let lines = help_lines(model);
    let max_scroll = lines.len().saturating_sub(usize::from(body.height));
    let scroll = u16::try_from(model.help_scroll_offset.min(max_scroll)).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), body);
    frame.render_widget(
        Paragraph::new(Line::styled(
            "j/k scroll \u{2502} Esc closes",
            style::dim_style(),
        )),
        footer,
    );
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
