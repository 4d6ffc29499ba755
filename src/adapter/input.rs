use serde::{Deserialize, Serialize};

use crate::game::GridSize;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum KeyAction {
    Activate,
    Navigate { direction: Direction },
}

impl KeyAction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Enter" | " " => Some(KeyAction::Activate),
            _ => Direction::from_key(key).map(|direction| KeyAction::Navigate { direction }),
        }
    }
}

/// 方向键移动一格，到边缘时在同一行/列内回绕。
pub fn navigate(index: usize, direction: Direction, grid_size: GridSize) -> usize {
    let side = grid_size.side();
    let (row, col) = (index / side, index % side);
    let (row, col) = match direction {
        Direction::Up => ((row + side - 1) % side, col),
        Direction::Down => ((row + 1) % side, col),
        Direction::Left => (row, (col + side - 1) % side),
        Direction::Right => (row, (col + 1) % side),
    };
    row * side + col
}

/// Ctrl+R / Cmd+R。
pub fn is_restart_shortcut(ctrl: bool, meta: bool, key: &str) -> bool {
    (ctrl || meta) && key == "r"
}
