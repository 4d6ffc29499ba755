use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::conditions::{win_conditions, WinCondition};

/// 最小棋盘边长。
pub const MIN_GRID_SIZE: u8 = 3;
/// 最大棋盘边长。
pub const MAX_GRID_SIZE: u8 = 6;
/// 连成一线所需的棋子数，与棋盘大小无关。
pub const WIN_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }

    /// 页面上用于棋子样式的 class 名。
    pub fn class_name(self) -> &'static str {
        match self {
            Player::X => "x",
            Player::O => "o",
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::X
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GridSizeError {
    NotANumber,
    NotAnInteger { value: f64 },
    OutOfRange { value: f64 },
}

impl fmt::Display for GridSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSizeError::NotANumber => f.write_str("Grid size must be a number"),
            GridSizeError::NotAnInteger { .. } => f.write_str("Grid size must be an integer"),
            GridSizeError::OutOfRange { value } => write!(
                f,
                "Grid size must be between {MIN_GRID_SIZE} and {MAX_GRID_SIZE}. Received: {value}"
            ),
        }
    }
}

impl std::error::Error for GridSizeError {}

/// 棋盘边长，构造时即完成校验，一局之内不可变。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridSize(u8);

impl GridSize {
    pub const CLASSIC: GridSize = GridSize(MIN_GRID_SIZE);

    pub fn new(size: u8) -> Result<Self, GridSizeError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
            return Err(GridSizeError::OutOfRange {
                value: f64::from(size),
            });
        }
        Ok(Self(size))
    }

    /// 校验来自页面的数值：先判断是否为数字，再判断范围，最后判断是否为整数。
    pub fn from_f64(value: f64) -> Result<Self, GridSizeError> {
        if value.is_nan() {
            return Err(GridSizeError::NotANumber);
        }
        if value < f64::from(MIN_GRID_SIZE) || value > f64::from(MAX_GRID_SIZE) {
            return Err(GridSizeError::OutOfRange { value });
        }
        if value.fract() != 0.0 {
            return Err(GridSizeError::NotAnInteger { value });
        }
        Self::new(value as u8)
    }

    pub fn all() -> impl Iterator<Item = GridSize> {
        (MIN_GRID_SIZE..=MAX_GRID_SIZE).map(GridSize)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn side(self) -> usize {
        usize::from(self.0)
    }

    pub fn cell_count(self) -> usize {
        self.side() * self.side()
    }

    pub(crate) fn table_index(self) -> usize {
        usize::from(self.0 - MIN_GRID_SIZE)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::CLASSIC
    }
}

impl TryFrom<u8> for GridSize {
    type Error = GridSizeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GridSize::new(value)
    }
}

impl From<GridSize> for u8 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

impl FromStr for GridSize {
    type Err = GridSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| GridSizeError::NotANumber)?;
        GridSize::from_f64(value)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.0)
    }
}

/// 行优先存储的棋盘，下标为 row * N + col。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    grid_size: GridSize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            cells: vec![Cell::Empty; grid_size.cell_count()],
        }
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// 尚未落子。
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|cell| cell.is_empty())
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn count(&self, player: Player) -> usize {
        let mark = Cell::from(player);
        self.cells.iter().filter(|cell| **cell == mark).count()
    }

    /// 返回 0 起始的 (行, 列)。
    pub fn position(&self, index: usize) -> (usize, usize) {
        let side = self.grid_size.side();
        (index / side, index % side)
    }

    pub(crate) fn place(&mut self, index: usize, player: Player) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = Cell::from(player);
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.grid_size.side()) {
            let line: Vec<&str> = row
                .iter()
                .map(|cell| cell.player().map_or(".", Player::as_str))
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameStatus {
    InProgress,
    Won { winner: Player },
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus::InProgress
    }
}

/// 本次会话内的比分，重新开局不清零。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scoreboard {
    pub x: u32,
    pub o: u32,
    pub draw: u32,
}

impl Scoreboard {
    pub fn wins(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    pub fn games_played(&self) -> u32 {
        self.x + self.o + self.draw
    }

    pub fn record_win(&mut self, player: Player) {
        match player {
            Player::X => self.x = self.x.saturating_add(1),
            Player::O => self.o = self.o.saturating_add(1),
        }
    }

    pub fn record_draw(&mut self) {
        self.draw = self.draw.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameOutcome {
    Won {
        winner: Player,
        condition: WinCondition,
    },
    Draw,
}

/// 对局事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    BoardReset {
        grid_size: GridSize,
    },
    MarkPlaced {
        player: Player,
        index: usize,
    },
    TurnPassed {
        next: Player,
    },
    GameWon {
        winner: Player,
        condition: WinCondition,
    },
    GameDrawn,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    BoardSizeMismatch { expected: usize, actual: usize },
    TurnParity { x_count: usize, o_count: usize },
    CurrentPlayerMismatch { expected: Player, actual: Player },
    StatusMismatch { status: GameStatus },
}

/// 游戏整体状态，也是交给页面渲染的只读快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_player: Player,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<WinCondition>,
    #[serde(default)]
    pub scoreboard: Scoreboard,
}

impl GameState {
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            board: Board::new(grid_size),
            current_player: Player::X,
            status: GameStatus::InProgress,
            winning_line: None,
            scoreboard: Scoreboard::default(),
        }
    }

    pub fn with_scoreboard(mut self, scoreboard: Scoreboard) -> Self {
        self.scoreboard = scoreboard;
        self
    }

    pub fn grid_size(&self) -> GridSize {
        self.board.grid_size()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.status {
            GameStatus::InProgress => None,
            GameStatus::Won { winner } => self
                .winning_line
                .map(|condition| GameOutcome::Won { winner, condition }),
            GameStatus::Draw => Some(GameOutcome::Draw),
        }
    }

    pub(crate) fn reset(&mut self, grid_size: GridSize) {
        self.board = Board::new(grid_size);
        self.current_player = Player::X;
        self.status = GameStatus::InProgress;
        self.winning_line = None;
    }

    pub(crate) fn declare_victory(&mut self, winner: Player, condition: WinCondition) {
        if self.status.is_terminal() {
            return;
        }
        self.status = GameStatus::Won { winner };
        self.winning_line = Some(condition);
        self.scoreboard.record_win(winner);
    }

    pub(crate) fn declare_draw(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = GameStatus::Draw;
        self.scoreboard.record_draw();
    }

    pub(crate) fn pass_turn(&mut self) -> Player {
        self.current_player = self.current_player.opponent();
        self.current_player
    }

    /// 校验从页面回传的快照是否可能由合法对局产生。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let expected = self.grid_size().cell_count();
        if self.board.len() != expected {
            return Err(IntegrityError::BoardSizeMismatch {
                expected,
                actual: self.board.len(),
            });
        }

        let x_count = self.board.count(Player::X);
        let o_count = self.board.count(Player::O);
        if x_count != o_count && x_count != o_count + 1 {
            return Err(IntegrityError::TurnParity { x_count, o_count });
        }

        // 终局后不再换手，当前玩家就是最后落子的一方。
        let last_mover = if x_count == o_count { Player::O } else { Player::X };
        let expected_player = if self.is_finished() {
            last_mover
        } else {
            last_mover.opponent()
        };
        if self.current_player != expected_player {
            return Err(IntegrityError::CurrentPlayerMismatch {
                expected: expected_player,
                actual: self.current_player,
            });
        }

        let conditions = win_conditions(self.grid_size());
        let first_completed = conditions
            .iter()
            .copied()
            .find(|condition| condition.owner(&self.board).is_some());
        let consistent = match self.status {
            GameStatus::InProgress => {
                first_completed.is_none() && !self.board.is_full() && self.winning_line.is_none()
            }
            GameStatus::Won { winner } => {
                // 胜利线必须是按生成顺序第一条连成的线，且对手不能也连成一线。
                let loser_completed = conditions
                    .iter()
                    .any(|condition| condition.owner(&self.board) == Some(winner.opponent()));
                winner == last_mover
                    && !loser_completed
                    && self.winning_line.is_some()
                    && self.winning_line == first_completed
                    && first_completed.and_then(|line| line.owner(&self.board)) == Some(winner)
            }
            GameStatus::Draw => {
                first_completed.is_none() && self.board.is_full() && self.winning_line.is_none()
            }
        };
        if !consistent {
            return Err(IntegrityError::StatusMismatch {
                status: self.status,
            });
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(GridSize::default())
    }
}
