//! Key mapping from terminal events to host commands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{NavAction, MAZE_SIZE_PRESETS};

/// What a key press asks the terminal host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Forward to the session.
    Action(NavAction),
    /// Start a new maze of the given size.
    NewMaze(usize),
    /// New maze with the current size and a fresh seed.
    Regenerate,
    Quit,
}

/// Map keyboard input to a host command.
pub fn handle_key_event(key: KeyEvent) -> Option<InputCommand> {
    if should_quit(key) {
        return Some(InputCommand::Quit);
    }

    let action = |a| Some(InputCommand::Action(a));
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('k') => {
            action(NavAction::StepForward)
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char('j') => {
            action(NavAction::StepBackward)
        }
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('h') => {
            action(NavAction::TurnLeft)
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('l') => {
            action(NavAction::TurnRight)
        }
        KeyCode::Tab | KeyCode::Char('m') | KeyCode::Char('M') => action(NavAction::ToggleView),

        KeyCode::Char('1') => Some(InputCommand::NewMaze(MAZE_SIZE_PRESETS[0])),
        KeyCode::Char('2') => Some(InputCommand::NewMaze(MAZE_SIZE_PRESETS[1])),
        KeyCode::Char('3') => Some(InputCommand::NewMaze(MAZE_SIZE_PRESETS[2])),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(InputCommand::Regenerate),

        _ => None,
    }
}

/// Check if key should quit the host.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
