// src/session/controller.rs — Week selection, intro caching, chat turns, logging

use std::sync::Arc;

use super::intro::{build_intro_prompt, UserProfile, WeekIntro};
use super::state::ConversationState;
use crate::activity::{ActivityLog, LogEntry};
use crate::content::{ContentStore, Week, WeekId};
use crate::infra::config::Config;
use crate::infra::errors::CoachError;
use crate::provider::{complete_structured, ChatBackend, ChatRequest, Message};

/// Model and display knobs the controller needs from config.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub greeting: String,
    pub display_limit: usize,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.model.clone(),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
            greeting: config.chat.greeting.clone(),
            display_limit: config.chat.display_limit,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Mediates every backend call and log write for a `ConversationState`.
pub struct SessionController {
    backend: Arc<dyn ChatBackend>,
    content: Arc<ContentStore>,
    settings: ControllerSettings,
    profile: UserProfile,
    activity: Option<ActivityLog>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        content: Arc<ContentStore>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            backend,
            content,
            settings,
            profile: UserProfile::default(),
            activity: None,
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.activity = Some(activity);
        self
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn greeting(&self) -> &str {
        &self.settings.greeting
    }

    pub fn current_week<'a>(&'a self, state: &ConversationState) -> Option<&'a Week> {
        state.selected_week.and_then(|id| self.content.get(id))
    }

    /// Switch weeks. Selecting the current week is a no-op; any other week
    /// clears history and cached intro and starts a new session id.
    pub async fn select_week(
        &self,
        state: &mut ConversationState,
        week: WeekId,
    ) -> Result<(), CoachError> {
        let label = self
            .content
            .get(week)
            .map(|w| w.label())
            .ok_or(CoachError::UnknownWeek(week.number()))?;

        if state.selected_week == Some(week) {
            return Ok(());
        }

        let previous = state.session_id.clone();
        state.reset_for(week);
        tracing::info!(
            previous = %previous,
            session = %state.session_id,
            "selected {}",
            label
        );

        self.record_activity(state, &format!("selected {label}")).await;
        Ok(())
    }

    /// Return the cached intro, or make exactly one backend call to generate it.
    ///
    /// Failures yield an all-empty intro and leave the cache untouched, so
    /// the next call tries again.
    pub async fn get_or_generate_week_intro(&self, state: &mut ConversationState) -> WeekIntro {
        if let Some(intro) = &state.week_intro {
            return intro.clone();
        }
        let Some(week) = self.current_week(state) else {
            return WeekIntro::empty();
        };

        let mut request = self.request(vec![Message::system(build_intro_prompt(
            week,
            &self.profile,
        ))]);
        request.response_schema = Some(WeekIntro::schema());

        match complete_structured::<WeekIntro>(self.backend.as_ref(), request).await {
            Ok(intro) => {
                tracing::debug!(week = %week.id, "week intro generated");
                state.week_intro = Some(intro.clone());
                self.record_activity(state, &format!("generated intro for {}", week.label()))
                    .await;
                intro
            }
            Err(e) => {
                tracing::warn!("Week intro generation failed: {}", e);
                WeekIntro::empty()
            }
        }
    }

    /// One chat turn. Blank input is ignored. On backend failure the user
    /// message stays in the history and the error is returned.
    pub async fn submit_chat_message(
        &self,
        state: &mut ConversationState,
        text: &str,
    ) -> Result<(), CoachError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let week = self.current_week(state).ok_or(CoachError::NoWeekSelected)?;

        if state.model_context.is_empty() {
            state
                .model_context
                .push(Message::system(week.system_prompt.clone()));
            state
                .model_context
                .push(Message::assistant(self.settings.greeting.clone()));
        }

        state.push(Message::user(text));

        let request = self.request(state.model_context.clone());
        let result = self.backend.complete(request).await;

        let outcome = match result {
            Ok(response) => {
                tracing::debug!(
                    tokens = response.usage.total(),
                    turns = state.transcript.len(),
                    "chat reply received"
                );
                state.push(Message::assistant(response.content));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Chat request failed: {}", e);
                Err(e)
            }
        };

        if self.activity.is_some() {
            if let Err(e) = self.log_snapshot(state).await {
                tracing::warn!("Could not write conversation log: {}", e);
            }
        }

        outcome
    }

    /// Upsert this session's conversation row. No-op without an attached log.
    pub async fn log_snapshot(&self, state: &ConversationState) -> Result<(), CoachError> {
        let Some(log) = &self.activity else {
            return Ok(());
        };
        let week = self
            .current_week(state)
            .map(|w| w.label())
            .unwrap_or_default();
        let entry = LogEntry::new(&state.session_id, &week, &state.transcript);
        log.log_snapshot(&entry).await
    }

    /// The most recent transcript entries, capped at the display limit.
    pub fn visible_transcript<'a>(&self, state: &'a ConversationState) -> &'a [Message] {
        let len = state.transcript.len();
        let start = len.saturating_sub(self.settings.display_limit);
        &state.transcript[start..]
    }

    fn request(&self, messages: Vec<Message>) -> ChatRequest {
        let mut request = ChatRequest::new(self.settings.model.clone(), messages);
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;
        request
    }

    async fn record_activity(&self, state: &ConversationState, description: &str) {
        if let Some(log) = &self.activity {
            if let Err(e) = log.log_activity(&state.session_id, description).await {
                tracing::warn!("Could not write activity log: {}", e);
            }
        }
    }
}
