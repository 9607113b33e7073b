//! Main panel rendering
//!
//! This module contains rendering functions for the two main panels:
//! - Workflows panel (left side) - one card per workflow
//! - Details panel (right side) - the selected workflow's configuration

use super::components::{render_empty_message, render_loading_spinner};
use super::styling::get_method_color;
use crate::relay::redact_authorization;
use crate::state::AppState;
use crate::types::{LoadingState, Workflow};
use crate::utils::mask_token;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the left panel with the workflow cards of the selected project
pub fn render_workflows_panel(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    spinner_index: usize,
) {
    let title = format!("Workflows ({})", state.workflows.len());

    if state.loading_state == LoadingState::Fetching && state.workflows.is_empty() {
        render_loading_spinner(frame, area, &title, spinner_index);
        return;
    }

    if state.workflows.is_empty() {
        if state.current_project().is_some() {
            render_empty_message(frame, area, &title, state.can_manage());
        } else {
            let empty = Paragraph::new("Select a project to see its workflows")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, area);
        }
        return;
    }

    let items: Vec<ListItem> = state.workflows.iter().map(workflow_card).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_index));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn workflow_card(workflow: &Workflow) -> ListItem<'_> {
    let mut title = vec![
        Span::styled(
            format!("{:5}", workflow.http_method.as_str()),
            Style::default()
                .fg(get_method_color(workflow.http_method))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            workflow.workflow_name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if workflow.is_shared {
        title.push(Span::styled(" [shared]", Style::default().fg(Color::Green)));
    }
    if workflow.is_hidden {
        title.push(Span::styled(" [hidden]", Style::default().fg(Color::DarkGray)));
    }

    let subtitle = Line::from(vec![
        Span::styled(
            format!(
                "      {} · {} ",
                workflow.source.as_str(),
                workflow.template_name.as_str()
            ),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            workflow.description.as_str(),
            Style::default().fg(Color::Gray),
        ),
    ]);

    ListItem::new(vec![Line::from(title), subtitle])
}

/// Render the right panel with the selected workflow's details
pub fn render_details_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(workflow) = state.selected_workflow() else {
        let empty = Paragraph::new("No workflow selected")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let label = Style::default().fg(Color::Cyan);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<14}"), label), Span::raw(value)])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            workflow.workflow_name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            workflow.description.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        field("Source", workflow.source.as_str().to_string()),
        field("Template", workflow.template_name.as_str().to_string()),
        field("Method", workflow.http_method.as_str().to_string()),
        field("Base URL", workflow.base_url.clone()),
        field("External ID", workflow.external_workflow_id.clone()),
        field("Bearer token", mask_token(&workflow.bearer_token)),
        field("Shared", yes_no(workflow.is_shared)),
        field("Hidden", yes_no(workflow.is_hidden)),
    ];

    if let Some(created) = &workflow.created_at {
        lines.push(field("Created", created.clone()));
    }
    if let Some(updated) = &workflow.updated_at {
        lines.push(field("Updated", updated.clone()));
    }
    if let Some(creator) = &workflow.creator_did {
        lines.push(field("Creator", creator.clone()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Parameters", label)));
    let parameters = serde_json::to_string_pretty(&workflow.parameters).unwrap_or_default();
    lines.extend(parameters.lines().map(|l| Line::from(l.to_string())));

    if !workflow.headers.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Headers", label)));
        for (key, value) in &workflow.headers {
            let value = if key.eq_ignore_ascii_case("authorization") {
                redact_authorization(value)
            } else {
                value.clone()
            };
            lines.push(Line::from(format!("{key}: {value}")));
        }
    }

    let details = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(details, area);
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}
