// src/session/intro.rs — Structured week introduction and its prompt

use serde::{Deserialize, Serialize};

use crate::content::Week;
use crate::provider::ResponseSchema;

/// Three-part introduction generated once per week selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekIntro {
    #[serde(alias = "intro_to_the_week")]
    pub intro_to_the_week: String,
    #[serde(alias = "why_this_matters", alias = "why_does_this_matter_for_me")]
    pub why_this_matters: String,
    #[serde(alias = "encouragement_to_chat")]
    pub encouragement_to_chat: String,
}

impl WeekIntro {
    /// Placeholder returned when generation fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.intro_to_the_week.is_empty()
            && self.why_this_matters.is_empty()
            && self.encouragement_to_chat.is_empty()
    }

    /// JSON schema handed to the backend in structured mode.
    pub fn schema() -> ResponseSchema {
        ResponseSchema {
            name: "week_intro".into(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "introToTheWeek": { "type": "string" },
                    "whyThisMatters": { "type": "string" },
                    "encouragementToChat": { "type": "string" },
                },
                "required": ["introToTheWeek", "whyThisMatters", "encouragementToChat"],
                "additionalProperties": false,
            }),
        }
    }
}

/// What the user told us about themselves. Both fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub goal: Option<String>,
    pub why: Option<String>,
}

impl UserProfile {
    pub fn new(goal: Option<String>, why: Option<String>) -> Self {
        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            goal: clean(goal),
            why: clean(why),
        }
    }
}

/// System message for the intro request: the week's own prompt followed by
/// the fixed instruction template.
pub fn build_intro_prompt(week: &Week, profile: &UserProfile) -> String {
    let mut prompt = String::with_capacity(week.system_prompt.len() + week.practice.len() + 1024);

    prompt.push_str(week.system_prompt.trim_end());
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "You are introducing the focus of week {}, which is \"{}\".\n\n",
        week.id, week.title
    ));
    prompt.push_str("The practice for the week is:\n");
    prompt.push_str(week.practice.trim());
    prompt.push_str("\n\n");

    if profile.goal.is_some() || profile.why.is_some() {
        prompt.push_str("About the user:\n");
        if let Some(goal) = &profile.goal {
            prompt.push_str(&format!("- Their goal: {goal}\n"));
        }
        if let Some(why) = &profile.why {
            prompt.push_str(&format!("- Their real why: {why}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Your task:\n\
         1. Provide a short, welcoming introduction to this week.\n\
         2. Briefly explain how this contributes to the user's goals.\n\
         3. Offer encouragement to reach out during challenges or for insights.\n\n\
         Tone:\n\
         - Encouraging, honest and a bit edgy, like a supportive friend\n\
         - Concise\n\
         - Include a few emojis\n\n\
         Output format:\n\
         Return exactly one valid JSON object with these 3 keys:\n\
         - \"introToTheWeek\"\n\
         - \"whyThisMatters\"\n\
         - \"encouragementToChat\"\n\n\
         Markdown is allowed inside the values. No other keys and no text outside the object.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::WeekId;

    fn week() -> Week {
        Week {
            id: WeekId(1),
            title: "Pause Before Reacting".into(),
            intro: "intro".into(),
            practice: "Take three breaths before eating.".into(),
            practice_display: None,
            system_prompt: "You are a CBT and mindfulness coach.".into(),
        }
    }

    #[test]
    fn test_parse_camel_case() {
        let intro: WeekIntro = serde_json::from_str(
            r#"{"introToTheWeek":"Welcome","whyThisMatters":"Builds awareness","encouragementToChat":"Chat anytime"}"#,
        )
        .unwrap();
        assert_eq!(intro.intro_to_the_week, "Welcome");
        assert_eq!(intro.why_this_matters, "Builds awareness");
        assert_eq!(intro.encouragement_to_chat, "Chat anytime");
    }

    #[test]
    fn test_parse_legacy_keys() {
        let intro: WeekIntro = serde_json::from_str(
            r#"{"intro_to_the_week":"a","why_does_this_matter_for_me":"b","encouragement_to_chat":"c"}"#,
        )
        .unwrap();
        assert_eq!(intro.why_this_matters, "b");
    }

    #[test]
    fn test_missing_field_fails() {
        assert!(serde_json::from_str::<WeekIntro>(r#"{"introToTheWeek":"a"}"#).is_err());
    }

    #[test]
    fn test_empty() {
        assert!(WeekIntro::empty().is_empty());
        let intro = WeekIntro {
            intro_to_the_week: "x".into(),
            ..Default::default()
        };
        assert!(!intro.is_empty());
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let s = WeekIntro::schema();
        assert_eq!(s.schema["required"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_prompt_starts_with_week_prompt() {
        let prompt = build_intro_prompt(&week(), &UserProfile::default());
        assert!(prompt.starts_with("You are a CBT and mindfulness coach."));
        assert!(prompt.contains("week 1, which is \"Pause Before Reacting\""));
        assert!(prompt.contains("Take three breaths"));
        assert!(prompt.contains("\"encouragementToChat\""));
        assert!(!prompt.contains("About the user"));
    }

    #[test]
    fn test_prompt_includes_profile() {
        let profile = UserProfile::new(Some("lose 5kg".into()), Some("  ".into()));
        let prompt = build_intro_prompt(&week(), &profile);
        assert!(prompt.contains("Their goal: lose 5kg"));
        assert!(!prompt.contains("Their real why"));
    }
}
