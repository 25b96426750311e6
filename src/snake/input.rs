// Keyboard / button adaptation for the Snake widget.
// Arrow keys and WASD both steer; the core only ever sees `Command`s.

use super::game::Command;
use super::types::{Direction, Lifecycle};

/// Map a DOM `KeyboardEvent.key` value to a command for the current phase.
pub fn command_for_key(key: &str, lifecycle: Lifecycle) -> Option<Command> {
    match lifecycle {
        Lifecycle::NotStarted | Lifecycle::Over(_) => match key {
            " " | "Enter" => Some(Command::Start),
            _ => None,
        },
        Lifecycle::Running | Lifecycle::Paused => {
            if key == " " || key.eq_ignore_ascii_case("p") {
                return Some(Command::TogglePause);
            }
            direction_for_key(key).map(Command::Turn)
        }
    }
}

pub fn direction_for_key(key: &str) -> Option<Direction> {
    let dir = match key {
        "ArrowUp" => Direction::Up,
        "ArrowDown" => Direction::Down,
        "ArrowLeft" => Direction::Left,
        "ArrowRight" => Direction::Right,
        k if k.eq_ignore_ascii_case("w") => Direction::Up,
        k if k.eq_ignore_ascii_case("s") => Direction::Down,
        k if k.eq_ignore_ascii_case("a") => Direction::Left,
        k if k.eq_ignore_ascii_case("d") => Direction::Right,
        _ => return None,
    };
    Some(dir)
}

/// Whether the browser's default action (page scroll) should be suppressed.
pub fn is_game_key(key: &str) -> bool {
    matches!(key, " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::types::GameOutcome;

    #[test]
    fn test_start_keys_before_first_game() {
        assert_eq!(command_for_key(" ", Lifecycle::NotStarted), Some(Command::Start));
        assert_eq!(command_for_key("Enter", Lifecycle::NotStarted), Some(Command::Start));
        assert_eq!(command_for_key("ArrowUp", Lifecycle::NotStarted), None);
        assert_eq!(command_for_key("p", Lifecycle::NotStarted), None);
    }

    #[test]
    fn test_restart_after_over() {
        let over = Lifecycle::Over(GameOutcome::SelfCollision);
        assert_eq!(command_for_key("Enter", over), Some(Command::Start));
        assert_eq!(command_for_key("w", over), None);
    }

    #[test]
    fn test_pause_keys() {
        for key in [" ", "p", "P"] {
            assert_eq!(command_for_key(key, Lifecycle::Running), Some(Command::TogglePause));
            assert_eq!(command_for_key(key, Lifecycle::Paused), Some(Command::TogglePause));
        }
    }

    #[test]
    fn test_both_layouts_steer() {
        let pairs = [
            ("ArrowUp", "W", Direction::Up),
            ("ArrowDown", "s", Direction::Down),
            ("ArrowLeft", "a", Direction::Left),
            ("ArrowRight", "D", Direction::Right),
        ];
        for (arrow, letter, dir) in pairs {
            assert_eq!(command_for_key(arrow, Lifecycle::Running), Some(Command::Turn(dir)));
            assert_eq!(command_for_key(letter, Lifecycle::Running), Some(Command::Turn(dir)));
        }
        assert_eq!(command_for_key("x", Lifecycle::Running), None);
    }

    #[test]
    fn test_scroll_keys() {
        assert!(is_game_key("ArrowDown"));
        assert!(is_game_key(" "));
        assert!(!is_game_key("w"));
    }
}
