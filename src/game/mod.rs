//! 游戏核心逻辑模块（棋盘状态、胜利条件、规则引擎）。

pub mod conditions;
pub mod rules;
pub mod state;

pub use conditions::{condition_count, generate, win_conditions, LineDirection, WinCondition};
pub use rules::{evaluate, Evaluation, GameEngine, GameError, MoveResult, RuleResolution};
pub use state::{
    Board,
    Cell,
    GameEvent,
    GameOutcome,
    GameState,
    GameStatus,
    GridSize,
    GridSizeError,
    IntegrityError,
    Player,
    Scoreboard,
    MAX_GRID_SIZE,
    MIN_GRID_SIZE,
    WIN_LENGTH,
};
