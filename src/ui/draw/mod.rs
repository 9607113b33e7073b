//! UI drawing module
//!
//! This module is organized into focused submodules:
//! - `components`: Reusable UI components (header, banner, footer, spinners, redirect notice)
//! - `modals`: Modal dialogs (workflow form, execute panel, confirmation)
//! - `panels`: Main panels (workflow cards, details panel)
//! - `styling`: Color schemes and style constants

mod components;
mod modals;
mod panels;
mod styling;

use crate::state::{AppState, Modal};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub use styling::SPINNER;

/// Draw the whole screen for the current state
pub fn render_app(frame: &mut Frame, state: &AppState, spinner_index: usize) {
    let banner_height = if state.banner.is_some() { 1 } else { 0 };

    // Header, Banner, Body, Footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[2]);

    components::render_header(frame, main_chunks[0], state, spinner_index);
    if let Some(banner) = &state.banner {
        components::render_banner(frame, main_chunks[1], banner);
    }
    panels::render_workflows_panel(frame, body_chunks[0], state, spinner_index);
    panels::render_details_panel(frame, body_chunks[1], state);
    components::render_footer(frame, main_chunks[3], state);

    // Modals go last so they sit on top
    match &state.modal {
        Modal::Form(form) => modals::render_form_modal(frame, form),
        Modal::Execute(panel) => modals::render_execute_modal(frame, panel, spinner_index),
        Modal::Confirm(pending) => modals::render_confirm_modal(frame, pending),
        Modal::None => {}
    }

    if let Some(message) = &state.redirect_notice {
        components::render_redirect_notice(frame, message, &state.login_url);
    }
}
