use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::game::{
    Cell, GameError, GameEvent, GameState, GameStatus, GridSize, Player, RuleResolution,
    Scoreboard,
};

/// 错误提示默认停留时间（毫秒）。
pub const DEFAULT_ERROR_CLEAR_MS: u32 = 4_000;

const WARNING_PREFIX: &str = "⚠️ ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// 完整的无障碍属性：aria 标签、tabindex、播报级别。
    Strict,
    /// 仅文本与样式 class。
    Minimal,
}

impl RenderMode {
    fn is_strict(self) -> bool {
        matches!(self, RenderMode::Strict)
    }
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Strict
    }
}

impl FromStr for RenderMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" | "accessible" => Ok(RenderMode::Strict),
            "minimal" | "legacy" => Ok(RenderMode::Minimal),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AriaLive {
    Polite,
    Assertive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellView {
    pub index: usize,
    pub text: String,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardView {
    pub grid_size: GridSize,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusView {
    pub text: String,
    pub tone: StatusTone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_live: Option<AriaLive>,
}

/// 交给页面脚本执行的界面副作用。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum UiEffect {
    RenderBoard { board: BoardView },
    RenderCell { cell: CellView },
    SetStatus { status: StatusView },
    HighlightCells { indices: Vec<usize> },
    UpdateScore { scoreboard: Scoreboard },
    SetRestartVisible { visible: bool },
    FocusCell { index: usize },
    FocusRestart,
    ClearError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub clear_after_ms: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderPlan {
    pub effects: Vec<UiEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<ErrorNotice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<GameError>,
}

impl RenderPlan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn clear_error() -> Self {
        Self {
            effects: vec![UiEffect::ClearError],
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    fn push(&mut self, effect: UiEffect) {
        self.effects.push(effect);
    }
}

pub fn turn_message(player: Player) -> String {
    format!("Player {player}'s turn")
}

pub fn win_message(player: Player) -> String {
    format!("🎉 Player {player} Wins! 🎉")
}

pub fn draw_message() -> String {
    "🤝 It's a Draw! 🤝".to_string()
}

/// 把引擎结果翻译为界面副作用，本身不接触 DOM。
#[derive(Debug, Clone)]
pub struct Presenter {
    mode: RenderMode,
    error_clear_ms: u32,
}

impl Presenter {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            error_clear_ms: DEFAULT_ERROR_CLEAR_MS,
        }
    }

    pub fn with_error_clear_ms(mut self, error_clear_ms: u32) -> Self {
        self.error_clear_ms = error_clear_ms;
        self
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn cell_view(&self, state: &GameState, index: usize) -> Option<CellView> {
        let cell = state.board.get(index)?;
        let grid_size = state.grid_size();

        let mut classes = vec!["cell".to_string(), format!("size-{}", grid_size.get())];
        if let Some(player) = cell.player() {
            classes.push(player.class_name().to_string());
            classes.push("played".to_string());
        }
        if state
            .winning_line
            .map_or(false, |line| line.contains(index))
        {
            classes.push("win".to_string());
        }

        let mut view = CellView {
            index,
            text: cell.player().map(|p| p.to_string()).unwrap_or_default(),
            class_name: classes.join(" "),
            aria_label: None,
            tab_index: None,
            disabled: None,
        };

        if self.mode.is_strict() {
            let (row, col) = state.board.position(index);
            let label = match cell.player() {
                Some(player) => format!("Cell {}, occupied by Player {player}", index + 1),
                None => format!("Cell {}, row {}, column {}, empty", index + 1, row + 1, col + 1),
            };
            let locked = !cell.is_empty() || state.is_finished();
            view.aria_label = Some(label);
            view.tab_index = Some(if locked { -1 } else { 0 });
            view.disabled = Some(locked);
        }

        Some(view)
    }

    pub fn board_view(&self, state: &GameState) -> BoardView {
        let n = state.grid_size().get();
        BoardView {
            grid_size: state.grid_size(),
            class_name: format!("game-board size-{n}"),
            aria_label: self
                .mode
                .is_strict()
                .then(|| format!("{n} by {n} tic-tac-toe game board")),
            cells: (0..state.board.len())
                .filter_map(|index| self.cell_view(state, index))
                .collect(),
        }
    }

    pub fn status_view(&self, state: &GameState) -> StatusView {
        let (text, tone, live) = match state.status {
            GameStatus::InProgress => (
                turn_message(state.current_player),
                StatusTone::Info,
                AriaLive::Polite,
            ),
            GameStatus::Won { winner } => {
                (win_message(winner), StatusTone::Success, AriaLive::Assertive)
            }
            GameStatus::Draw => (draw_message(), StatusTone::Success, AriaLive::Polite),
        };
        self.status(text, tone, live)
    }

    fn status(&self, text: String, tone: StatusTone, live: AriaLive) -> StatusView {
        StatusView {
            text,
            tone,
            aria_live: self.mode.is_strict().then_some(live),
        }
    }

    /// 整盘重绘，用于开局、改变边长与恢复快照。
    pub fn render_full(&self, state: &GameState) -> RenderPlan {
        let mut plan = RenderPlan::empty();
        plan.push(UiEffect::RenderBoard {
            board: self.board_view(state),
        });
        plan.push(UiEffect::SetStatus {
            status: self.status_view(state),
        });
        plan.push(UiEffect::UpdateScore {
            scoreboard: state.scoreboard,
        });
        if let Some(line) = state.winning_line {
            plan.push(UiEffect::HighlightCells {
                indices: line.indices().to_vec(),
            });
        }
        plan.push(UiEffect::SetRestartVisible {
            visible: state.is_finished(),
        });
        plan
    }

    pub fn render_reset(&self, resolution: &RuleResolution) -> RenderPlan {
        let mut plan = self.render_full(&resolution.state);
        plan.push(UiEffect::ClearError);
        plan
    }

    pub fn render_move(&self, resolution: &RuleResolution) -> RenderPlan {
        let state = &resolution.state;
        let mut plan = RenderPlan::empty();

        for event in &resolution.events {
            match event {
                GameEvent::BoardReset { .. } => return self.render_reset(resolution),
                GameEvent::MarkPlaced { index, .. } => {
                    if let Some(cell) = self.cell_view(state, *index) {
                        plan.push(UiEffect::RenderCell { cell });
                    }
                }
                GameEvent::TurnPassed { .. } => plan.push(UiEffect::SetStatus {
                    status: self.status_view(state),
                }),
                GameEvent::GameWon { condition, .. } => {
                    plan.push(UiEffect::SetStatus {
                        status: self.status_view(state),
                    });
                    plan.push(UiEffect::HighlightCells {
                        indices: condition.indices().to_vec(),
                    });
                    self.finish(state, &mut plan);
                }
                GameEvent::GameDrawn => {
                    plan.push(UiEffect::SetStatus {
                        status: self.status_view(state),
                    });
                    self.finish(state, &mut plan);
                }
            }
        }

        plan
    }

    fn finish(&self, state: &GameState, plan: &mut RenderPlan) {
        if self.mode.is_strict() {
            // 终局后所有格子都不可再聚焦。
            for index in 0..state.board.len() {
                if let Some(cell) = self.cell_view(state, index) {
                    plan.push(UiEffect::RenderCell { cell });
                }
            }
        }
        plan.push(UiEffect::UpdateScore {
            scoreboard: state.scoreboard,
        });
        plan.push(UiEffect::SetRestartVisible { visible: true });
        plan.push(UiEffect::FocusRestart);
    }

    /// 被拒绝的操作只改状态栏，不动棋盘。
    pub fn render_error(&self, error: &GameError) -> RenderPlan {
        let (message, tone) = match error {
            GameError::CellOccupied { .. } | GameError::GameOver => {
                (error.to_string(), StatusTone::Warning)
            }
            GameError::OutOfRange { .. } => (
                "Invalid cell selected. Please try again.".to_string(),
                StatusTone::Error,
            ),
            GameError::InvalidConfiguration { .. } | GameError::IntegrityViolation { .. } => {
                (error.to_string(), StatusTone::Error)
            }
        };

        let text = format!("{WARNING_PREFIX}{message}");
        let mut plan = RenderPlan::empty();
        plan.push(UiEffect::SetStatus {
            status: self.status(text, tone, AriaLive::Assertive),
        });
        if tone == StatusTone::Error {
            plan.notice = Some(ErrorNotice {
                message,
                clear_after_ms: self.error_clear_ms,
            });
        }
        plan.rejected = Some(error.clone());
        plan
    }

    /// 聚焦时刷新该格的 aria 标签，简洁模式下无需处理。
    /// 聚焦时已落子的格子也改用行列描述，如 "Cell 6, row 2, column 3, X"。
    pub fn render_focus(&self, state: &GameState, index: usize) -> RenderPlan {
        let mut plan = RenderPlan::empty();
        if self.mode.is_strict() {
            if let Some(mut cell) = self.cell_view(state, index) {
                if let Some(player) = state.board.get(index).and_then(Cell::player) {
                    let (row, col) = state.board.position(index);
                    cell.aria_label = Some(format!(
                        "Cell {}, row {}, column {}, {player}",
                        index + 1,
                        row + 1,
                        col + 1
                    ));
                }
                plan.push(UiEffect::RenderCell { cell });
            }
        }
        plan
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Presenter::new(RenderMode::default())
    }
}
