use serde::{Deserialize, Serialize};

use super::input::{is_restart_shortcut, navigate, KeyAction};
use super::view::{Presenter, RenderMode, RenderPlan, UiEffect, DEFAULT_ERROR_CLEAR_MS};
use crate::game::{GameEngine, GameError, GameState, GridSize};

/// 页面初始化时传入的会话配置，缺省字段取默认值。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub grid_size: u8,
    pub render_mode: RenderMode,
    pub error_clear_ms: u32,
}

impl SessionConfig {
    pub fn with_grid_size(mut self, grid_size: u8) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: GridSize::CLASSIC.get(),
            render_mode: RenderMode::default(),
            error_clear_ms: DEFAULT_ERROR_CLEAR_MS,
        }
    }
}

/// 一个页面会话：一个引擎加一个渲染器，所有界面手势都经由这里进入引擎。
#[derive(Debug, Clone)]
pub struct Session {
    engine: GameEngine,
    presenter: Presenter,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, GameError> {
        let grid_size = GridSize::new(config.grid_size)?;
        let presenter =
            Presenter::new(config.render_mode).with_error_clear_ms(config.error_clear_ms);
        Ok(Self {
            engine: GameEngine::new(grid_size),
            presenter,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        self.engine.current_state()
    }

    pub fn render(&self) -> RenderPlan {
        self.presenter.render_full(self.engine.current_state())
    }

    /// 改变边长或重新开局；非法边长只提示错误，当前对局保留。
    pub fn reset(&mut self, grid_size: f64) -> RenderPlan {
        match GridSize::from_f64(grid_size) {
            Ok(grid_size) => {
                let resolution = self.engine.reset_to(grid_size);
                self.presenter.render_reset(&resolution)
            }
            Err(reason) => self.reject(GameError::from(reason)),
        }
    }

    pub fn reset_from_str(&mut self, grid_size: &str) -> RenderPlan {
        match grid_size.parse::<GridSize>() {
            Ok(grid_size) => self.reset(f64::from(grid_size.get())),
            Err(reason) => self.reject(GameError::from(reason)),
        }
    }

    pub fn restart(&mut self) -> RenderPlan {
        let grid_size = self.engine.current_state().grid_size();
        let resolution = self.engine.reset_to(grid_size);
        self.presenter.render_reset(&resolution)
    }

    pub fn activate(&mut self, index: i64) -> RenderPlan {
        let result = self
            .engine
            .checked_index(index)
            .and_then(|index| self.engine.place_mark(index));
        match result {
            Ok(resolution) => self.presenter.render_move(&resolution),
            Err(error) => self.reject(error),
        }
    }

    pub fn key_down(&mut self, index: i64, key: &str) -> RenderPlan {
        match KeyAction::from_key(key) {
            Some(KeyAction::Activate) => self.activate(index),
            Some(KeyAction::Navigate { direction }) => match self.engine.checked_index(index) {
                Ok(index) => {
                    let target = navigate(index, direction, self.state().grid_size());
                    let mut plan = RenderPlan::empty();
                    if target != index {
                        plan.effects.push(UiEffect::FocusCell { index: target });
                    }
                    plan
                }
                Err(error) => self.reject(error),
            },
            None => RenderPlan::empty(),
        }
    }

    /// 快捷键只在重新开始按钮可见（即终局）时生效。
    pub fn restart_shortcut(&mut self, ctrl: bool, meta: bool, key: &str) -> RenderPlan {
        if is_restart_shortcut(ctrl, meta, key) && self.engine.is_finished() {
            self.restart()
        } else {
            RenderPlan::empty()
        }
    }

    pub fn focus(&self, index: i64) -> RenderPlan {
        match self.engine.checked_index(index) {
            Ok(index) => self
                .presenter
                .render_focus(self.engine.current_state(), index),
            Err(_) => RenderPlan::empty(),
        }
    }

    pub fn restore(&mut self, state: GameState) -> Result<RenderPlan, GameError> {
        self.engine = GameEngine::with_state(state)?;
        Ok(self.render())
    }

    fn reject(&self, error: GameError) -> RenderPlan {
        self.presenter.render_error(&error)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            engine: GameEngine::default(),
            presenter: Presenter::default(),
            config: SessionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::view::StatusTone;
    use crate::game::{GameStatus, Player};

    fn status_text(plan: &RenderPlan) -> Option<&str> {
        plan.effects.iter().find_map(|effect| match effect {
            UiEffect::SetStatus { status } => Some(status.text.as_str()),
            _ => None,
        })
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"render_mode":"minimal"}"#).expect("valid config");
        assert_eq!(config.grid_size, 3);
        assert_eq!(config.render_mode, RenderMode::Minimal);
        assert_eq!(config.error_clear_ms, 4_000);
    }

    #[test]
    fn session_rejects_bad_configured_size() {
        let config = SessionConfig::default().with_grid_size(9);
        assert!(matches!(
            Session::new(config),
            Err(GameError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn full_game_through_session() {
        let mut session = Session::new(SessionConfig::default()).expect("valid config");
        let first = session.render();
        assert_eq!(status_text(&first), Some("Player X's turn"));

        for index in [0, 3, 1, 4] {
            let plan = session.activate(index);
            assert!(plan.rejected.is_none());
        }
        let plan = session.activate(2);
        assert_eq!(status_text(&plan), Some("🎉 Player X Wins! 🎉"));
        assert_eq!(session.state().status, GameStatus::Won { winner: Player::X });

        let plan = session.activate(8);
        assert_eq!(plan.rejected, Some(GameError::GameOver));
        assert_eq!(
            status_text(&plan),
            Some("⚠️ Game is over. Please start a new game.")
        );
    }

    #[test]
    fn invalid_size_keeps_current_game() {
        let mut session = Session::default();
        session.activate(4);
        let plan = session.reset(2.0);
        assert!(matches!(
            plan.rejected,
            Some(GameError::InvalidConfiguration { .. })
        ));
        assert!(plan.notice.is_some());
        assert_eq!(session.state().board.count(Player::X), 1);

        let plan = session.reset(3.5);
        assert_eq!(
            status_text(&plan),
            Some("⚠️ Grid size must be an integer")
        );

        let plan = session.reset_from_str("abc");
        assert_eq!(status_text(&plan), Some("⚠️ Grid size must be a number"));
    }

    #[test]
    fn size_change_starts_fresh_game_and_keeps_scores() {
        let mut session = Session::default();
        for index in [0, 3, 1, 4, 2] {
            session.activate(index);
        }
        let plan = session.reset_from_str("4");
        assert!(plan.rejected.is_none());
        assert_eq!(session.state().board.len(), 16);
        assert_eq!(session.state().scoreboard.x, 1);
        assert_eq!(session.state().current_player, Player::X);
    }

    #[test]
    fn out_of_range_activation_is_an_error_notice() {
        let mut session = Session::default();
        let plan = session.activate(-3);
        assert_eq!(
            plan.rejected,
            Some(GameError::OutOfRange { index: -3, len: 9 })
        );
        assert_eq!(
            status_text(&plan),
            Some("⚠️ Invalid cell selected. Please try again.")
        );
        assert!(matches!(
            plan.effects.first(),
            Some(UiEffect::SetStatus { status }) if status.tone == StatusTone::Error
        ));
    }

    #[test]
    fn keyboard_activation_and_navigation() {
        let mut session = Session::default();
        let plan = session.key_down(4, "Enter");
        assert_eq!(session.state().board.count(Player::X), 1);
        assert!(plan.rejected.is_none());

        let plan = session.key_down(4, "ArrowDown");
        assert_eq!(plan.effects, vec![UiEffect::FocusCell { index: 7 }]);

        let plan = session.key_down(4, "Escape");
        assert!(plan.is_empty());
    }

    #[test]
    fn restart_shortcut_only_after_game_ends() {
        let mut session = Session::default();
        session.activate(0);
        assert!(session.restart_shortcut(true, false, "r").is_empty());
        assert_eq!(session.state().board.count(Player::X), 1);

        for index in [3, 1, 4, 2] {
            session.activate(index);
        }
        let plan = session.restart_shortcut(false, true, "r");
        assert!(!plan.is_empty());
        assert!(session.state().board.is_blank());
        assert_eq!(session.state().scoreboard.x, 1);
    }

    #[test]
    fn focus_refreshes_label_in_strict_mode_only() {
        let session = Session::default();
        assert_eq!(session.focus(0).effects.len(), 1);
        assert!(session.focus(99).is_empty());

        let minimal = Session::new(SessionConfig::default().with_render_mode(RenderMode::Minimal))
            .expect("valid config");
        assert!(minimal.focus(0).is_empty());
    }

    #[test]
    fn restore_validates_snapshot() {
        let mut session = Session::default();
        session.activate(0);
        let snapshot = session.state().clone();

        let mut other = Session::default();
        let plan = other.restore(snapshot.clone()).expect("consistent snapshot");
        assert!(!plan.is_empty());
        assert_eq!(other.state(), &snapshot);

        let mut tampered = snapshot;
        tampered.current_player = Player::X;
        assert!(other.restore(tampered).is_err());
        assert_eq!(other.state().current_player, Player::O);
    }
}
