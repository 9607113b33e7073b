//! Modal dialog rendering
//!
//! This module contains rendering functions for modal dialogs:
//! - Workflow create/edit form
//! - Execute panel (parameters, computed headers, request/response trace)
//! - Confirmation prompt for delete/share/hide

use super::styling::{self, centered_rect, get_method_color, label_style, status_color, SPINNER};
use crate::editor::TextEditor;
use crate::form::{FormField, WorkflowForm};
use crate::relay::{redact_authorization, ExecutionPanel};
use crate::state::PendingAction;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

/// Render the workflow form
pub fn render_form_modal(frame: &mut Frame, form: &WorkflowForm) {
    let area = frame.area();
    let height = (area.height as f32 * 0.9) as u16;
    let modal_area = centered_rect(area, 0.8, 100, height);

    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(form.title())
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .style(styling::modal_style());

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Fields
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let mut lines = Vec::new();
    let mut focused_line = 0;
    for field in FormField::ALL {
        let active = field == form.focus;
        if active {
            focused_line = lines.len();
        }

        let marker = if active { "► " } else { "  " };
        let mut label = vec![Span::styled(
            format!("{marker}{}", field.label()),
            label_style(active),
        )];
        if let Some(error) = form.errors.get(field) {
            label.push(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::from(label));

        if let Some(choice) = form.choice(field) {
            let text = if active {
                format!("    ◀ {choice} ▶")
            } else {
                format!("    {choice}")
            };
            lines.push(Line::from(Span::styled(text, value_style(active))));
        } else if let Some(editor) = form.editor(field) {
            let masked = field == FormField::BearerToken && !active;
            lines.extend(editor_lines(editor, active, masked));
        }
    }

    let visible = chunks[0].height as usize;
    let scroll = focused_line.saturating_sub(visible / 2) as u16;
    let fields = Paragraph::new(lines).scroll((scroll, 0));
    frame.render_widget(fields, chunks[0]);

    let status = if form.saving {
        Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &form.submit_error {
        Line::from(Span::styled(
            format!("✖ {error}"),
            Style::default().fg(Color::Red),
        ))
    } else if !form.errors.is_empty() {
        let labels: Vec<&str> = form
            .errors
            .fields()
            .into_iter()
            .map(|field| field.label().trim_end_matches(" *"))
            .collect();
        Line::from(Span::styled(
            format!("Please fix: {}", labels.join(", ")),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), chunks[1]);

    let help = Paragraph::new(
        "Tab/↑/↓: Field  |  ←/→/Space: Change option  |  Ctrl+S: Save  |  Ctrl+L: Clear  |  Esc: Cancel",
    )
    .style(styling::help_style())
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[2]);
}

fn value_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Editor content as indented lines, with a cursor marker when focused
fn editor_lines(editor: &TextEditor, active: bool, masked: bool) -> Vec<Line<'static>> {
    let text = if masked {
        editor.masked()
    } else if active {
        let (before, after) = editor.split_at_cursor();
        format!("{before}│{after}")
    } else {
        editor.content().to_string()
    };

    let style = value_style(active);
    let mut lines: Vec<Line> = text
        .split('\n')
        .map(|l| Line::from(Span::styled(format!("    {l}"), style)))
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

/// Render the execute panel
pub fn render_execute_modal(frame: &mut Frame, panel: &ExecutionPanel, spinner_index: usize) {
    let area = frame.area();
    let height = (area.height as f32 * 0.9) as u16;
    let modal_area = centered_rect(area, 0.9, 160, height);

    frame.render_widget(Clear, modal_area);

    let workflow = &panel.workflow;
    let block = Block::default()
        .title(format!(" Execute: {} ", workflow.workflow_name))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .style(styling::modal_style());

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Target
            Constraint::Length(1), // Trigger / error
            Constraint::Min(5),    // Editor + result
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let target = Line::from(vec![
        Span::styled(
            format!("{} ", workflow.http_method.as_str()),
            Style::default()
                .fg(get_method_color(workflow.http_method))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(workflow.base_url.clone()),
        Span::styled(
            format!("  ({} · {})", workflow.source.as_str(), workflow.template_name.as_str()),
            Style::default().fg(Color::Magenta),
        ),
    ]);
    frame.render_widget(Paragraph::new(target), rows[0]);

    let trigger = if panel.in_flight() {
        Line::from(Span::styled(
            format!("{} Executing...", SPINNER[spinner_index % SPINNER.len()]),
            Style::default().fg(Color::DarkGray),
        ))
    } else if let Some(error) = &panel.error {
        Line::from(Span::styled(
            format!("✖ {error}"),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from(Span::styled(
            "[ Ctrl+E: Execute ]",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ))
    };
    frame.render_widget(Paragraph::new(trigger), rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[2]);

    render_request_editor(frame, columns[0], panel);
    render_result(frame, columns[1], panel);

    let help = Paragraph::new(
        "Ctrl+E: Execute  |  Ctrl+F: Format  |  Ctrl+R: Reset  |  Ctrl+T/Ctrl+Y: Copy request/response  |  PgUp/PgDn: Scroll  |  Esc: Close",
    )
    .style(styling::help_style())
    .alignment(Alignment::Center);
    frame.render_widget(help, rows[3]);
}

fn render_request_editor(frame: &mut Frame, area: Rect, panel: &ExecutionPanel) {
    let headers = panel.headers();
    let header_height = headers.len() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(header_height)])
        .split(area);

    let title = if panel.parameters.is_dirty() {
        " Parameters (JSON, edited) "
    } else {
        " Parameters (JSON) "
    };
    let parameters = Paragraph::new(editor_lines(&panel.parameters, true, false))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(parameters, chunks[0]);

    let header_lines: Vec<Line> = headers
        .iter()
        .map(|(key, value)| {
            let value = if key.eq_ignore_ascii_case("authorization") {
                redact_authorization(value)
            } else {
                value.clone()
            };
            Line::from(vec![
                Span::styled(format!("{key}: "), Style::default().fg(Color::Cyan)),
                Span::raw(value),
            ])
        })
        .collect();

    let headers = Paragraph::new(header_lines).block(
        Block::default()
            .title(" Headers (computed) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(headers, chunks[1]);
}

fn render_result(frame: &mut Frame, area: Rect, panel: &ExecutionPanel) {
    let block = Block::default()
        .title(" Result ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(result) = &panel.result else {
        let empty = Paragraph::new("Press Ctrl+E to execute the workflow")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let section = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let response = &result.response;

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{} {}", response.status, response.status_text),
                Style::default()
                    .fg(status_color(response))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("Request", section)),
        Line::from(format!("{} {}", result.request.method, result.request.url)),
    ];
    for (key, value) in &result.request.headers {
        lines.push(Line::from(vec![
            Span::styled(format!("{key}: "), Style::default().fg(Color::DarkGray)),
            Span::raw(value.clone()),
        ]));
    }
    lines.extend(json_lines(&result.request.body));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Response", section)));
    lines.extend(json_lines(&response.body));

    let content = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((panel.scroll, 0));
    frame.render_widget(content, area);
}

fn json_lines(body: &Value) -> Vec<Line<'static>> {
    let text = match body {
        Value::Null => return Vec::new(),
        Value::String(s) => try_format_json(s),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    text.lines().map(|l| Line::from(l.to_string())).collect()
}

/// Pretty-print text that happens to be JSON; anything else is returned as-is
pub fn try_format_json(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}

/// Render the confirmation prompt for an admin action
pub fn render_confirm_modal(frame: &mut Frame, pending: &PendingAction) {
    let modal_area = centered_rect(frame.area(), 0.5, 70, 7);

    frame.render_widget(Clear, modal_area);

    let (title, color) = match pending {
        PendingAction::Delete { .. } => (" Delete Workflow? ", Color::Red),
        PendingAction::Share { .. } => (" Change Sharing? ", Color::Yellow),
        PendingAction::Hide { .. } => (" Change Visibility? ", Color::Yellow),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .style(styling::modal_style());

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new(pending.prompt())
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(message, chunks[0]);

    let actions = Paragraph::new("[Y] Yes  |  [N] Cancel")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(actions, chunks[2]);
}
