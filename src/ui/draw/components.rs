//! Reusable UI components
//!
//! This module contains shared UI components used throughout the application:
//! - Header (project switcher, role, session)
//! - Banner (dismissible info/error message)
//! - Footer (command help, role-aware)
//! - Loading spinner and empty state

use super::styling::{self, SPINNER};
use crate::session::SessionStatus;
use crate::state::{AppState, Banner, BannerKind};
use crate::types::LoadingState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub const EMPTY_WORKFLOWS: &str = "No workflows found. Create your first workflow!";

/// Render the application header: project tabs, role and session status
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, spinner_index: usize) {
    let mut spans = vec![Span::styled(
        "workflow console ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    match state.projects_state {
        LoadingState::Fetching => spans.push(Span::styled(
            format!("{} loading projects", SPINNER[spinner_index % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )),
        _ if state.projects.is_empty() => {
            spans.push(Span::styled("no projects", Style::default().fg(Color::DarkGray)))
        }
        _ => {
            for (i, project) in state.projects.iter().enumerate() {
                let style = if Some(i) == state.selected_project {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(format!(" {} ", project.project_name), style));
                spans.push(Span::raw(" "));
            }
        }
    }

    if state.current_project().is_some() {
        let role = state.role();
        let role_color = if role.can_manage() {
            Color::Magenta
        } else {
            Color::Gray
        };
        spans.push(Span::raw("| "));
        spans.push(Span::styled(role.as_str(), Style::default().fg(role_color)));
    }

    let session = match state.auth {
        SessionStatus::Authenticated => "🔒 signed in",
        SessionStatus::NoToken => "🔓 signed out",
    };
    spans.push(Span::raw(" | "));
    spans.push(Span::raw(session));

    let title = state
        .location
        .as_deref()
        .map(|l| format!(" {l} "))
        .unwrap_or_default();

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(header, area);
}

pub fn render_banner(frame: &mut Frame, area: Rect, banner: &Banner) {
    let (color, icon) = match banner.kind {
        BannerKind::Info => (Color::Green, "✔"),
        BannerKind::Error => (Color::Red, "✖"),
    };

    let line = Line::from(vec![
        Span::styled(format!("{icon} {}", banner.message), Style::default().fg(color)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the footer with command help
pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let footer_text = if state.can_manage() {
        "j/k:Nav Tab:Project Enter:Execute | n:New e:Edit s:Share h:Hide d:Delete | r:Refresh q:Quit"
    } else {
        "j/k:Nav Tab:Project Enter:Execute | r:Refresh q:Quit"
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Commands"));

    frame.render_widget(footer, area);
}

/// Render loading spinner animation
pub fn render_loading_spinner(frame: &mut Frame, area: Rect, title: &str, spinner_index: usize) {
    let loading_text = format!(
        "{} Loading workflows\n\nPlease wait...",
        SPINNER[spinner_index % SPINNER.len()]
    );

    let loading = Paragraph::new(loading_text)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));

    frame.render_widget(loading, area);
}

/// Render empty state message
pub fn render_empty_message(frame: &mut Frame, area: Rect, title: &str, can_manage: bool) {
    let hint = if can_manage {
        "\n\nPress [n] to create one, [r] to refresh"
    } else {
        "\n\nPress [r] to refresh"
    };

    let empty = Paragraph::new(format!("{EMPTY_WORKFLOWS}{hint}"))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));

    frame.render_widget(empty, area);
}

/// Notice shown while waiting to hand off to the login page
pub fn render_redirect_notice(frame: &mut Frame, message: &str, login_url: &str) {
    let modal_area = styling::centered_rect(frame.area(), 0.6, 80, 8);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(" Sign in required ")
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .style(styling::modal_style());

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            login_url.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled("q: Quit now", styling::help_style())),
    ];

    let notice = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(notice, modal_area);
}
