//! Single-line input overlay used by the form and settings screens.

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// State of the input overlay while it is open.
#[derive(Clone, Debug)]
pub struct InputBoxState {
    /// Prompt shown above the field.
    pub prompt: String,
    /// Current value being edited.
    pub value: String,
    /// Cursor position in characters.
    pub cursor: usize,
    /// Where the confirmed value goes.
    pub callback_id: InputCallbackId,
}

/// Destination of a confirmed input value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCallbackId {
    // Settings screen
    SettingsBaseUrl,
    SettingsInputDir,
    SettingsOrigem,
    SettingsTipoProcesso,

    // Order-data form, by field index
    FormField(usize),
}

impl InputBoxState {
    /// Open an editor seeded with the current value, cursor at the end.
    pub fn open(prompt: &str, value: String, callback_id: InputCallbackId) -> Self {
        let cursor = value.chars().count();
        Self {
            prompt: prompt.to_string(),
            value,
            cursor,
            callback_id,
        }
    }

    /// Byte offset of the character cursor.
    fn byte_cursor(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_cursor();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Remove the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_cursor();
            self.value.remove(at);
        }
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_cursor();
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// Draw the input overlay as a centered popup.
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    let popup_area = centered_popup(f.area(), 70, 7);

    // Erase whatever is underneath before drawing the popup.
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Entrada")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // prompt
            Constraint::Length(1), // value
            Constraint::Length(1),
            Constraint::Length(1), // help
        ])
        .split(popup_area);

    let prompt_widget = Paragraph::new(state.prompt.clone()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt_widget, inner_layout[0]);

    // Horizontal scroll so the cursor stays visible in narrow terminals.
    let display_width = inner_layout[1].width as usize;
    let scroll_offset = state.cursor.saturating_sub(display_width.saturating_sub(2));

    let chars: Vec<char> = state.value.chars().collect();
    let visible: Vec<char> = chars
        .iter()
        .skip(scroll_offset)
        .take(display_width)
        .copied()
        .collect();

    // Mark the cursor position with a bar character.
    let cursor_in_visible = (state.cursor - scroll_offset).min(visible.len());
    let before: String = visible[..cursor_in_visible].iter().collect();
    let after: String = visible[cursor_in_visible..].iter().collect();
    let line = format!("{before}|{after}");

    let input_widget = Paragraph::new(line).style(Style::default().fg(Color::Green));
    f.render_widget(input_widget, inner_layout[1]);

    let help = Paragraph::new("Enter=confirmar | ESC=cancelar | Ctrl+U=limpar")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner_layout[3]);
}

/// Compute a centered popup area.
pub fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_keeps_cursor_consistent() {
        let mut s = InputBoxState::open("CNPJ:", "112".into(), InputCallbackId::FormField(4));
        assert_eq!(s.cursor, 3);
        s.insert_char('4');
        assert_eq!(s.value, "1124");
        s.move_left();
        s.move_left();
        s.backspace();
        assert_eq!(s.value, "124");
        assert_eq!(s.cursor, 1);
        s.delete();
        assert_eq!(s.value, "14");
        s.clear_line();
        assert_eq!(s.value, "");
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn multibyte_input_is_edited_by_characters() {
        let mut s = InputBoxState::open("Justificativa:", "ação".into(), InputCallbackId::FormField(13));
        assert_eq!(s.cursor, 4);
        s.backspace();
        assert_eq!(s.value, "açã");
        s.move_home();
        s.delete();
        assert_eq!(s.value, "çã");
    }
}
