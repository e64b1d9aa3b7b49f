// src/session/state.rs — Per-session conversation state

use uuid::Uuid;

use super::intro::WeekIntro;
use crate::content::WeekId;
use crate::provider::Message;

/// Everything one user session knows. Owned by the caller and passed into
/// every controller operation.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub(crate) selected_week: Option<WeekId>,
    /// User-visible history. Never holds the system prompt.
    pub(crate) transcript: Vec<Message>,
    /// Full sequence sent to the backend, system prompt first.
    pub(crate) model_context: Vec<Message>,
    pub(crate) week_intro: Option<WeekIntro>,
    pub(crate) session_id: String,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            selected_week: None,
            transcript: Vec::new(),
            model_context: Vec::new(),
            week_intro: None,
            session_id: new_session_id(),
        }
    }

    pub fn selected_week(&self) -> Option<WeekId> {
        self.selected_week
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn model_context(&self) -> &[Message] {
        &self.model_context
    }

    pub fn week_intro(&self) -> Option<&WeekIntro> {
        self.week_intro.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        match (self.selected_week, &self.week_intro) {
            (None, _) => Phase::NoWeekSelected,
            (Some(w), None) => Phase::IntroPending(w),
            (Some(w), Some(_)) => Phase::IntroReady(w),
        }
    }

    /// Drop history and intro, start a new session for `week`.
    pub(crate) fn reset_for(&mut self, week: WeekId) {
        self.transcript.clear();
        self.model_context.clear();
        self.week_intro = None;
        self.session_id = new_session_id();
        self.selected_week = Some(week);
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.transcript.push(message.clone());
        self.model_context.push(message);
    }
}

/// Where a session stands with respect to week selection and intro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoWeekSelected,
    IntroPending(WeekId),
    IntroReady(WeekId),
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
