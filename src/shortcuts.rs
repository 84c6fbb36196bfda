//! Keybinding configuration (`shortcut.toml`).

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All keybindings, grouped per screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcuts {
    pub documentos: DocumentosShortcuts,
    pub settings: SettingsShortcuts,
    pub dados_xml: DadosXmlShortcuts,
    pub dados_pedido: DadosPedidoShortcuts,
    pub resultado: ResultadoShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// Document picker screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentosShortcuts {
    pub quit: Vec<String>,
    pub settings: Vec<String>,
    pub refresh: Vec<String>,
    pub open: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
}

/// Settings editor screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsShortcuts {
    pub cancel: Vec<String>,
    pub save: Vec<String>,
    pub base_url: Vec<String>,
    pub input_dir: Vec<String>,
    pub origem: Vec<String>,
    pub tipo_processo: Vec<String>,
}

/// Extracted-document review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DadosXmlShortcuts {
    pub proceed: Vec<String>,
    pub back: Vec<String>,
}

/// Order-data form screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DadosPedidoShortcuts {
    pub cancel: Vec<String>,
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
    pub edit_field: Vec<String>,
    pub validar: Vec<String>,
}

/// Result/consulta screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultadoShortcuts {
    pub consultar: Vec<String>,
    pub recomecar: Vec<String>,
}

/// Input overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
}

impl Shortcuts {
    /// Load from TOML, falling back to defaults when the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let shortcuts: Shortcuts = toml::from_str(&content)?;
            Ok(shortcuts)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist as pretty TOML.
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            documentos: DocumentosShortcuts {
                quit: vec!["q".into()],
                settings: vec!["t".into()],
                refresh: vec!["r".into()],
                open: vec!["Enter".into()],
                down: vec!["Down".into(), "j".into()],
                up: vec!["Up".into(), "k".into()],
            },
            settings: SettingsShortcuts {
                cancel: vec!["Esc".into()],
                save: vec!["Enter".into()],
                base_url: vec!["b".into()],
                input_dir: vec!["i".into()],
                origem: vec!["o".into()],
                tipo_processo: vec!["p".into()],
            },
            dados_xml: DadosXmlShortcuts {
                proceed: vec!["Enter".into()],
                back: vec!["Esc".into()],
            },
            dados_pedido: DadosPedidoShortcuts {
                cancel: vec!["Esc".into()],
                next_field: vec!["Tab".into(), "Down".into()],
                prev_field: vec!["Up".into()],
                edit_field: vec!["e".into(), "Enter".into()],
                validar: vec!["v".into()],
            },
            resultado: ResultadoShortcuts {
                consultar: vec!["Enter".into(), "c".into()],
                recomecar: vec!["n".into()],
            },
            input_box: InputBoxShortcuts {
                confirm: vec!["Enter".into()],
                cancel: vec!["Esc".into()],
                backspace: vec!["Backspace".into()],
                delete: vec!["Delete".into()],
                left: vec!["Left".into()],
                right: vec!["Right".into()],
                home: vec!["Home".into()],
                end: vec!["End".into()],
                clear_line: vec!["Ctrl+u".into()],
            },
        }
    }
}

/// True when the key event matches any of the shortcut strings.
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// Match one shortcut string like `"a"`, `"Enter"` or `"Ctrl+u"`.
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    let parts: Vec<&str> = shortcut.split('+').collect();

    let (modifiers_str, key_str) = if parts.len() > 1 {
        (&parts[0..parts.len() - 1], parts[parts.len() - 1])
    } else {
        (&[][..], parts[0])
    };

    let mut expected_modifiers = KeyModifiers::empty();
    for modifier in modifiers_str {
        match *modifier {
            "Ctrl" | "ctrl" => expected_modifiers |= KeyModifiers::CONTROL,
            "Alt" | "alt" => expected_modifiers |= KeyModifiers::ALT,
            "Shift" | "shift" => expected_modifiers |= KeyModifiers::SHIFT,
            _ => return false,
        }
    }

    if key.modifiers != expected_modifiers {
        return false;
    }

    match key_str {
        "Enter" | "enter" => key.code == KeyCode::Enter,
        "Esc" | "esc" => key.code == KeyCode::Esc,
        "Tab" | "tab" => key.code == KeyCode::Tab,
        "Backspace" | "backspace" => key.code == KeyCode::Backspace,
        "Delete" | "delete" => key.code == KeyCode::Delete,
        "Up" | "up" => key.code == KeyCode::Up,
        "Down" | "down" => key.code == KeyCode::Down,
        "Left" | "left" => key.code == KeyCode::Left,
        "Right" | "right" => key.code == KeyCode::Right,
        "Home" | "home" => key.code == KeyCode::Home,
        "End" | "end" => key.code == KeyCode::End,
        s if s.len() == 1 => {
            if let Some(c) = s.chars().next() {
                key.code == KeyCode::Char(c)
            } else {
                false
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_simple_char() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("q")]));
        assert!(!matches_shortcut(&key, &[String::from("w")]));
    }

    #[test]
    fn matches_special_key() {
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Enter")]));
        assert!(!matches_shortcut(&key, &[String::from("Esc")]));
    }

    #[test]
    fn matches_with_modifier() {
        let key = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(matches_shortcut(&key, &[String::from("Ctrl+u")]));
        assert!(!matches_shortcut(&key, &[String::from("u")]));
    }

    #[test]
    fn matches_any_of_multiple_bindings() {
        let key_up = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        let key_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::empty());
        let shortcuts = vec![String::from("Up"), String::from("k")];

        assert!(matches_shortcut(&key_up, &shortcuts));
        assert!(matches_shortcut(&key_k, &shortcuts));

        let key_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::empty());
        assert!(!matches_shortcut(&key_j, &shortcuts));
    }
}
