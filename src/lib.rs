pub mod adapter;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde_wasm_bindgen::{from_value, to_value};
use std::fmt::Display;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use adapter::{
    navigate, Direction, KeyAction, Presenter, RenderMode, RenderPlan, Session, SessionConfig,
    UiEffect,
};
pub use game::{
    generate, win_conditions, Board, Cell, GameEngine, GameError, GameEvent, GameOutcome,
    GameState, GameStatus, GridSize, GridSizeError, IntegrityError, MoveResult, Player,
    RuleResolution, Scoreboard, WinCondition,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: GameError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn grid_size_from_js(value: f64) -> Result<GridSize, JsValue> {
    GridSize::from_f64(value).map_err(|reason| {
        let error = GameError::from(reason);
        utils::error(&format!("Invalid grid size: {error}"));
        to_js_error(error)
    })
}

fn log_rejection(plan: &RenderPlan) {
    match &plan.rejected {
        Some(error @ GameError::OutOfRange { .. }) => utils::warn(&error.to_string()),
        Some(
            error @ (GameError::InvalidConfiguration { .. }
            | GameError::IntegrityViolation { .. }),
        ) => utils::error(&error.to_string()),
        Some(error) => utils::log(&error.to_string()),
        None => {}
    }
}

fn make_plan_json(plan: RenderPlan) -> Result<String, JsValue> {
    log_rejection(&plan);
    serde_json::to_string(&plan).map_err(serde_to_js_error)
}

/// 一个页面持有一个会话；所有方法都返回 RenderPlan 的 JSON，由页面脚本执行其中的界面副作用。
#[wasm_bindgen]
pub struct GameSession {
    session: Session,
}

#[wasm_bindgen]
impl GameSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<GameSession, JsValue> {
        let config: SessionConfig = if let Some(json) = config_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            SessionConfig::default()
        };
        let session = Session::new(config).map_err(|error| {
            utils::error(&format!("Failed to initialize game: {error}"));
            to_js_error(error)
        })?;
        Ok(GameSession { session })
    }

    pub fn render(&self) -> Result<String, JsValue> {
        make_plan_json(self.session.render())
    }

    pub fn reset(&mut self, grid_size: f64) -> Result<String, JsValue> {
        make_plan_json(self.session.reset(grid_size))
    }

    /// 直接接收下拉框的字符串值。
    pub fn reset_from_selector(&mut self, value: &str) -> Result<String, JsValue> {
        make_plan_json(self.session.reset_from_str(value))
    }

    pub fn restart(&mut self) -> Result<String, JsValue> {
        make_plan_json(self.session.restart())
    }

    pub fn place_mark(&mut self, index: i32) -> Result<String, JsValue> {
        make_plan_json(self.session.activate(i64::from(index)))
    }

    pub fn key_down(&mut self, index: i32, key: &str) -> Result<String, JsValue> {
        make_plan_json(self.session.key_down(i64::from(index), key))
    }

    pub fn restart_shortcut(&mut self, ctrl: bool, meta: bool, key: &str) -> Result<String, JsValue> {
        make_plan_json(self.session.restart_shortcut(ctrl, meta, key))
    }

    pub fn focus(&self, index: i32) -> Result<String, JsValue> {
        make_plan_json(self.session.focus(i64::from(index)))
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(serde_to_js_error)
    }

    pub fn restore(&mut self, json: &str) -> Result<String, JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        let plan = self.session.restore(state).map_err(|error| {
            utils::error(&format!("Game state error: {error}"));
            to_js_error(error)
        })?;
        make_plan_json(plan)
    }

    pub fn scoreboard(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.state().scoreboard).map_err(JsValue::from)
    }

    /// 错误提示显示一段时间后自动清除；返回的 Promise 解析为清除用的 RenderPlan JSON。
    pub fn clear_error_after(&self, delay_ms: Option<u32>) -> Promise {
        let delay = delay_ms.unwrap_or(self.session.config().error_clear_ms);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let json = serde_json::to_string(&RenderPlan::clear_error()).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回指定边长下的全部胜利条件（按判定顺序）。
#[wasm_bindgen(js_name = "winningConditions")]
pub fn winning_conditions(grid_size: f64) -> Result<JsValue, JsValue> {
    let grid_size = grid_size_from_js(grid_size)?;
    to_value(&win_conditions(grid_size).to_vec()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "validateGridSize")]
pub fn validate_grid_size(value: f64) -> Result<u8, JsValue> {
    grid_size_from_js(value).map(GridSize::get)
}

/// 创建一个空棋盘的游戏状态，方便前端自行持有状态。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(grid_size: f64) -> Result<JsValue, JsValue> {
    let grid_size = grid_size_from_js(grid_size)?;
    to_value(&GameState::new(grid_size)).map_err(JsValue::from)
}

/// 对前端持有的状态落子，返回新的状态与事件。
#[wasm_bindgen(js_name = "placeMark")]
pub fn place_mark(state: JsValue, index: i32) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let mut engine = GameEngine::with_state(state).map_err(to_js_error)?;
    let result = engine
        .checked_index(i64::from(index))
        .and_then(|index| engine.place_mark(index));
    match result {
        Ok(resolution) => to_value(&resolution).map_err(JsValue::from),
        Err(error) => {
            utils::warn(&error.to_string());
            Err(to_js_error(error))
        }
    }
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(GameError::from(error)))
}

/// 方向键导航，返回目标格下标；非方向键原样返回。
#[wasm_bindgen(js_name = "navigateCell")]
pub fn navigate_cell(index: u32, key: &str, grid_size: f64) -> Result<u32, JsValue> {
    let grid_size = grid_size_from_js(grid_size)?;
    let len = grid_size.cell_count();
    let index = index as usize;
    if index >= len {
        return Err(to_js_error(GameError::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len,
        }));
    }
    let target = match Direction::from_key(key) {
        Some(direction) => navigate(index, direction, grid_size),
        None => index,
    };
    Ok(target as u32)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
