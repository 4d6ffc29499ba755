use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    conditions::{win_conditions, WinCondition},
    state::{
        Board, GameEvent, GameOutcome, GameState, GridSize, GridSizeError, IntegrityError, Player,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GameError {
    InvalidConfiguration { reason: GridSizeError },
    OutOfRange { index: i64, len: usize },
    CellOccupied { index: usize },
    GameOver,
    IntegrityViolation { error: IntegrityError },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidConfiguration { reason } => fmt::Display::fmt(reason, f),
            GameError::OutOfRange { index, len } => {
                write!(f, "Invalid cell index: {index}. Board length: {len}")
            }
            GameError::CellOccupied { .. } => {
                f.write_str("This cell is already occupied. Please choose another.")
            }
            GameError::GameOver => f.write_str("Game is over. Please start a new game."),
            GameError::IntegrityViolation { error } => {
                write!(f, "Game state error: {error:?}. Please restart the game.")
            }
        }
    }
}

impl std::error::Error for GameError {}

impl From<GridSizeError> for GameError {
    fn from(reason: GridSizeError) -> Self {
        GameError::InvalidConfiguration { reason }
    }
}

impl From<IntegrityError> for GameError {
    fn from(error: IntegrityError) -> Self {
        GameError::IntegrityViolation { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<GameOutcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome();
        if let Some(outcome) = outcome {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameWon { .. } | GameEvent::GameDrawn));
            if !has_event {
                events.push(match outcome {
                    GameOutcome::Won { winner, condition } => {
                        GameEvent::GameWon { winner, condition }
                    }
                    GameOutcome::Draw => GameEvent::GameDrawn,
                });
            }
        }

        Self {
            state,
            events,
            outcome,
        }
    }

    pub fn winning_line(&self) -> Option<WinCondition> {
        match self.outcome {
            Some(GameOutcome::Won { condition, .. }) => Some(condition),
            _ => None,
        }
    }
}

pub type MoveResult = Result<RuleResolution, GameError>;

/// 落子后的终局判定结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    Won(WinCondition),
    Draw,
    Continue,
}

/// 按生成顺序检查胜利条件，取第一条连成的线；否则判断是否下满。
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some(condition) = win_conditions(board.grid_size())
        .iter()
        .find(|condition| condition.owner(board).is_some())
    {
        return Evaluation::Won(*condition);
    }
    if board.is_full() {
        Evaluation::Draw
    } else {
        Evaluation::Continue
    }
}

/// 单局对战引擎，持有棋盘、当前玩家与比分。
#[derive(Debug, Clone, Default)]
pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            state: GameState::new(grid_size),
        }
    }

    /// 从外部快照恢复，快照必须通过完整性校验。
    pub fn with_state(state: GameState) -> Result<Self, GameError> {
        state.integrity_check()?;
        Ok(Self { state })
    }

    pub fn current_state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// 校验边长后开新局；校验失败时状态保持不变。
    pub fn reset(&mut self, grid_size: u8) -> MoveResult {
        let grid_size = GridSize::new(grid_size)?;
        Ok(self.reset_to(grid_size))
    }

    pub fn reset_to(&mut self, grid_size: GridSize) -> RuleResolution {
        self.state.reset(grid_size);
        RuleResolution::new(
            self.state.clone(),
            vec![GameEvent::BoardReset { grid_size }],
        )
    }

    /// 将页面传来的有符号下标转换为棋盘下标。
    pub fn checked_index(&self, index: i64) -> Result<usize, GameError> {
        let len = self.state.board.len();
        usize::try_from(index)
            .ok()
            .filter(|index| *index < len)
            .ok_or(GameError::OutOfRange { index, len })
    }

    pub fn place_mark(&mut self, index: usize) -> MoveResult {
        let len = self.state.board.len();
        if index >= len {
            return Err(GameError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        if self.state.is_finished() {
            return Err(GameError::GameOver);
        }
        if !self.state.board.get(index).map_or(false, |cell| cell.is_empty()) {
            return Err(GameError::CellOccupied { index });
        }

        let player: Player = self.state.current_player;
        self.state.board.place(index, player);

        let mut events = vec![GameEvent::MarkPlaced { player, index }];
        match evaluate(&self.state.board) {
            Evaluation::Won(condition) => {
                self.state.declare_victory(player, condition);
                events.push(GameEvent::GameWon {
                    winner: player,
                    condition,
                });
            }
            Evaluation::Draw => {
                self.state.declare_draw();
                events.push(GameEvent::GameDrawn);
            }
            Evaluation::Continue => {
                let next = self.state.pass_turn();
                events.push(GameEvent::TurnPassed { next });
            }
        }

        Ok(RuleResolution::new(self.state.clone(), events))
    }
}
