//! Styling utilities and color schemes
//!
//! This module contains color helpers and style constants used throughout the UI.

use crate::types::{HttpMethod, ResponseTrace};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

/// Get the color for an HTTP method
pub fn get_method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::Get => Color::Green,
        HttpMethod::Post => Color::Blue,
        HttpMethod::Put => Color::Yellow,
    }
}

/// Green for success, red for client/server errors
pub fn status_color(response: &ResponseTrace) -> Color {
    if response.is_success() {
        Color::Green
    } else {
        Color::Red
    }
}

pub fn modal_style() -> Style {
    Style::default().bg(Color::Rgb(30, 30, 30)).fg(Color::White)
}

pub fn help_style() -> Style {
    Style::default().fg(Color::Rgb(150, 150, 150))
}

pub fn label_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::LightCyan)
    }
}

/// Rectangle of `percent_x` of the width (capped at `max_width`) and a fixed
/// height, centered in `area`
pub fn centered_rect(area: Rect, percent_x: f32, max_width: u16, height: u16) -> Rect {
    let width = ((area.width as f32 * percent_x) as u16).min(max_width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Spinner frames for loading indicators
pub const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
