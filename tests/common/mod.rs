// tests/common/mod.rs — Shared fixtures: scripted backend and a small program

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use weekcoach::content::{ContentStore, Week, WeekId};
use weekcoach::infra::errors::CoachError;
use weekcoach::provider::{ChatBackend, ChatRequest, ChatResponse, TokenUsage};
use weekcoach::session::{ControllerSettings, SessionController};

/// A backend that replays scripted replies and records every request.
/// An empty script answers with a backend error.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, content: &str) {
        self.replies.lock().unwrap().push_back(Ok(content.to_string()));
    }

    pub fn fail(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests.lock().unwrap().last().cloned().expect("no requests made")
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(ChatResponse {
                content,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            }),
            Some(Err(message)) => Err(CoachError::backend("scripted", message)),
            None => Err(CoachError::backend("scripted", "script exhausted")),
        }
    }
}

pub fn week(n: u8, title: &str) -> Week {
    Week {
        id: WeekId(n),
        title: title.into(),
        intro: format!("Static intro for week {n}"),
        practice: format!("Practice for week {n}"),
        practice_display: None,
        system_prompt: format!("You are the coach for week {n}."),
    }
}

pub fn program() -> Arc<ContentStore> {
    Arc::new(ContentStore::from_weeks(vec![
        week(1, "Pause Before Reacting"),
        week(2, "Notice Your Fullness"),
        week(3, "Create Clarity and Consistency"),
    ]))
}

pub fn settings() -> ControllerSettings {
    ControllerSettings {
        model: "mock-model".into(),
        temperature: None,
        max_tokens: None,
        greeting: "Hi, how is the week going?".into(),
        display_limit: 20,
    }
}

pub fn controller(backend: Arc<ScriptedBackend>) -> SessionController {
    SessionController::new(backend, program(), settings())
}

pub const INTRO_JSON: &str = r#"{"introToTheWeek":"Welcome","whyThisMatters":"Builds awareness","encouragementToChat":"Chat anytime"}"#;
