//! Layout helpers for the screen regions.

use ratatui::prelude::*;

/// Main screen regions (body + help + status).
pub struct MainLayout {
    pub body: Rect,
    pub help_bar: Rect,
    pub status_bar: Rect,
}

/// Wizard screen regions: like the main layout with a step bar on top.
pub struct WizardLayout {
    pub step_bar: Rect,
    pub body: Rect,
    pub help_bar: Rect,
    pub status_bar: Rect,
}

/// Body split for the document picker (table + info panel).
pub struct BodyLayout {
    pub table: Rect,
    pub info_panel: Rect,
}

/// Split the whole frame into body, HELP and STATUS bars.
pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    MainLayout {
        body: chunks[0],
        help_bar: chunks[1],
        status_bar: chunks[2],
    }
}

/// Wizard screens carry the step status bar above the body.
pub fn create_wizard_layout(area: Rect) -> WizardLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(area);

    WizardLayout {
        step_bar: chunks[0],
        body: chunks[1],
        help_bar: chunks[2],
        status_bar: chunks[3],
    }
}

/// Split a body area into the list table (70%) and the info panel (30%).
pub fn create_body_layout(area: Rect) -> BodyLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    BodyLayout {
        table: chunks[0],
        info_panel: chunks[1],
    }
}
