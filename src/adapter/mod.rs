//! 表现层适配：把引擎结果翻译成界面副作用，把键盘/点击翻译成引擎调用。

pub mod input;
pub mod session;
pub mod view;

pub use input::{is_restart_shortcut, navigate, Direction, KeyAction};
pub use session::{Session, SessionConfig};
pub use view::{
    AriaLive,
    BoardView,
    CellView,
    ErrorNotice,
    Presenter,
    RenderMode,
    RenderPlan,
    StatusTone,
    StatusView,
    UiEffect,
    DEFAULT_ERROR_CLEAR_MS,
};
