// src/session/mod.rs — Session controller
//
// State machine per session:
//   NoWeekSelected -> IntroPending(w) -> IntroReady(w)
// select_week(w) from anywhere lands in IntroPending(w) with a fresh session
// id. A failed intro stays in IntroPending. Chat works in either week phase.

pub mod controller;
pub mod intro;
pub mod state;

pub use controller::{ControllerSettings, SessionController};
pub use intro::{UserProfile, WeekIntro};
pub use state::{ConversationState, Phase};
