use crate::config::Difficulty;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key as the typing session sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    /// printable character without Ctrl/Meta
    Char(char),
    Backspace,
    /// Tab or Escape
    Restart,
    /// anything else; never changes session state
    Other,
}

/// What the host should do with a terminal key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    SetDifficulty(Difficulty),
    ToggleMode,
    Type(Keystroke),
}

impl From<KeyEvent> for Keystroke {
    fn from(key: KeyEvent) -> Self {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Esc => Keystroke::Restart,
            KeyCode::Backspace => Keystroke::Backspace,
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META) =>
            {
                Keystroke::Char(c)
            }
            _ => Keystroke::Other,
        }
    }
}

/// Maps a terminal key event; key releases yield None
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::F(1) => Command::SetDifficulty(Difficulty::Easy),
        KeyCode::F(2) => Command::SetDifficulty(Difficulty::Medium),
        KeyCode::F(3) => Command::SetDifficulty(Difficulty::Hard),
        KeyCode::F(4) => Command::ToggleMode,
        _ => Command::Type(Keystroke::from(key)),
    };
    Some(command)
}
