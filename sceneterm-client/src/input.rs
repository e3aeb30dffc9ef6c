//! Key handling for the inspector
//!
//! Translates crossterm key events into inspector actions. The tree has
//! focus by default; the search and clone prompts capture text until they
//! are submitted or cancelled.

use std::f64::consts::PI;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use sceneterm_protocol::{DebugLayer, MoveDirection, Vec3};

/// Distance moved per key press
pub const MOVE_STEP: f64 = 1.0;

/// Rotation per key press (15 degrees)
pub const ROTATE_STEP: f64 = PI / 12.0;

/// Which widget receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Tree,
    Search,
    Clone,
}

impl InputMode {
    /// Prompt label for text modes
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Tree => "",
            Self::Search => "Search Node: ",
            Self::Clone => "Clone Node: ",
        }
    }
}

/// Cursor movement within the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigate {
    Up,
    Down,
    Parent,
    FirstChild,
}

/// What a key press means while the tree has focus
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    Navigate(Navigate),
    ToggleExpand,
    Move(Vec3),
    Rotate { axis: Vec3, angle: f64 },
    Reset,
    Follow,
    OpenPrompt(InputMode),
    Duplicate,
    Delete,
    MoveInTree(MoveDirection),
    ToggleDebug(DebugLayer),
}

/// What a key press means while a prompt has focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    None,
    Insert(char),
    Backspace,
    Complete,
    Submit,
    Cancel,
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Map a key pressed with the tree focused
pub fn tree_action(key: &KeyEvent) -> Action {
    if is_quit(key) || key.code == KeyCode::Esc {
        return Action::Quit;
    }

    if key.modifiers.contains(KeyModifiers::SHIFT) {
        let dir = match key.code {
            KeyCode::Up => Some(MoveDirection::MoveUp),
            KeyCode::Down => Some(MoveDirection::MoveDown),
            KeyCode::Right => Some(MoveDirection::Indent),
            KeyCode::Left => Some(MoveDirection::DeIndent),
            _ => None,
        };
        if let Some(dir) = dir {
            return Action::MoveInTree(dir);
        }
    }

    let rotate = |x, y, z, sign: f64| Action::Rotate {
        axis: Vec3::new(x, y, z),
        angle: sign * ROTATE_STEP,
    };

    match key.code {
        KeyCode::Up => Action::Navigate(Navigate::Up),
        KeyCode::Down => Action::Navigate(Navigate::Down),
        KeyCode::Left => Action::Navigate(Navigate::Parent),
        KeyCode::Right => Action::Navigate(Navigate::FirstChild),
        KeyCode::Enter | KeyCode::Char(' ') => Action::ToggleExpand,

        KeyCode::Char('w') => Action::Move(Vec3::new(0.0, 0.0, -MOVE_STEP)),
        KeyCode::Char('s') => Action::Move(Vec3::new(0.0, 0.0, MOVE_STEP)),
        KeyCode::Char('a') => Action::Move(Vec3::new(-MOVE_STEP, 0.0, 0.0)),
        KeyCode::Char('d') => Action::Move(Vec3::new(MOVE_STEP, 0.0, 0.0)),
        KeyCode::Char('q') => Action::Move(Vec3::new(0.0, -MOVE_STEP, 0.0)),
        KeyCode::Char('e') => Action::Move(Vec3::new(0.0, MOVE_STEP, 0.0)),

        KeyCode::Char('t') => rotate(1.0, 0.0, 0.0, 1.0),
        KeyCode::Char('T') => rotate(1.0, 0.0, 0.0, -1.0),
        KeyCode::Char('y') => rotate(0.0, 1.0, 0.0, 1.0),
        KeyCode::Char('Y') => rotate(0.0, 1.0, 0.0, -1.0),
        KeyCode::Char('g') => rotate(0.0, 0.0, 1.0, 1.0),
        KeyCode::Char('G') => rotate(0.0, 0.0, 1.0, -1.0),

        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('f') => Action::Follow,
        KeyCode::Char('F') | KeyCode::Char('/') | KeyCode::F(2) => Action::OpenPrompt(InputMode::Search),
        KeyCode::Char('C') => Action::OpenPrompt(InputMode::Clone),
        KeyCode::Char('D') => Action::Duplicate,
        KeyCode::Char('X') => Action::Delete,

        KeyCode::Char('1') => Action::ToggleDebug(DebugLayer::Hierarchy),
        KeyCode::Char('2') => Action::ToggleDebug(DebugLayer::Wireframe),
        KeyCode::Char('3') => Action::ToggleDebug(DebugLayer::Bounds),

        _ => Action::None,
    }
}

/// Map a key pressed with a prompt focused
pub fn prompt_action(key: &KeyEvent) -> PromptAction {
    if is_quit(key) {
        return PromptAction::Cancel;
    }
    match key.code {
        KeyCode::Esc => PromptAction::Cancel,
        KeyCode::Enter => PromptAction::Submit,
        KeyCode::Tab => PromptAction::Complete,
        KeyCode::Backspace => PromptAction::Backspace,
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => PromptAction::Insert(c),
        _ => PromptAction::None,
    }
}

/// First candidate starting with `prefix`, ignoring case
pub fn complete<'a>(prefix: &str, candidates: &'a [String]) -> Option<&'a str> {
    let prefix = prefix.to_lowercase();
    candidates
        .iter()
        .find(|c| c.to_lowercase().starts_with(&prefix))
        .map(String::as_str)
}

/// Help text for the keys panel
pub const HELP_TEXT: &str = "\
Arrows: Select Node
Enter/Space: Expand / Collapse
wasd, qe: Move Node
t/T y/Y g/G: Rotate X / Y / Z
r: Reset Node Position / Parent

f: Follow Node with Camera
F or /: Search
C: Clone Node

Shift+Arrows: Change Index / Parenting

D: Duplicate Node
X: Delete Node

1/2/3: Hierarchy / Wireframe / Bounds
Esc: Quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(tree_action(&key(KeyCode::Up)), Action::Navigate(Navigate::Up));
        assert_eq!(tree_action(&key(KeyCode::Left)), Action::Navigate(Navigate::Parent));
        assert_eq!(tree_action(&key(KeyCode::Enter)), Action::ToggleExpand);
    }

    #[test]
    fn test_shift_arrows_move_in_tree() {
        assert_eq!(
            tree_action(&shift(KeyCode::Up)),
            Action::MoveInTree(MoveDirection::MoveUp)
        );
        assert_eq!(
            tree_action(&shift(KeyCode::Right)),
            Action::MoveInTree(MoveDirection::Indent)
        );
        assert_eq!(
            tree_action(&shift(KeyCode::Left)),
            Action::MoveInTree(MoveDirection::DeIndent)
        );
    }

    #[test]
    fn test_uppercase_commands_with_shift_modifier() {
        // Terminals report uppercase letters with SHIFT set
        assert_eq!(tree_action(&shift(KeyCode::Char('X'))), Action::Delete);
        assert_eq!(tree_action(&shift(KeyCode::Char('D'))), Action::Duplicate);
        assert_eq!(
            tree_action(&shift(KeyCode::Char('F'))),
            Action::OpenPrompt(InputMode::Search)
        );
    }

    #[test]
    fn test_move_and_rotate() {
        assert_eq!(
            tree_action(&key(KeyCode::Char('w'))),
            Action::Move(Vec3::new(0.0, 0.0, -1.0))
        );
        match tree_action(&shift(KeyCode::Char('G'))) {
            Action::Rotate { axis, angle } => {
                assert_eq!(axis, Vec3::new(0.0, 0.0, 1.0));
                assert!((angle + PI / 12.0).abs() < 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(tree_action(&key(KeyCode::Esc)), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(tree_action(&ctrl_c), Action::Quit);
        assert_eq!(prompt_action(&ctrl_c), PromptAction::Cancel);
    }

    #[test]
    fn test_prompt_keys() {
        assert_eq!(prompt_action(&key(KeyCode::Char('w'))), PromptAction::Insert('w'));
        assert_eq!(prompt_action(&key(KeyCode::Tab)), PromptAction::Complete);
        assert_eq!(prompt_action(&key(KeyCode::Enter)), PromptAction::Submit);
    }

    #[test]
    fn test_complete() {
        let names = vec!["Crate".to_string(), "Barrel".to_string(), "BarrelLid".to_string()];
        assert_eq!(complete("bar", &names), Some("Barrel"));
        assert_eq!(complete("c", &names), Some("Crate"));
        assert_eq!(complete("z", &names), None);
    }
}
