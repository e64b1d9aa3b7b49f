// src/content/week.rs — Week identity and static texts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based week ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekId(pub u8);

impl WeekId {
    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WeekId {
    type Err = String;

    /// Accepts "3", "week 3", "Week 3" and "week_3".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        let digits = lower
            .strip_prefix("week")
            .map(|rest| rest.trim_start_matches(['_', ' ']))
            .unwrap_or(lower.as_str());
        match digits.parse::<u8>() {
            Ok(n) if n > 0 => Ok(WeekId(n)),
            _ => Err(format!("not a week number: '{s}'")),
        }
    }
}

/// A week of the program with its static texts. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub id: WeekId,
    pub title: String,
    pub intro: String,
    pub practice: String,
    /// Shorter practice text for display; `practice` is used when absent.
    pub practice_display: Option<String>,
    pub system_prompt: String,
}

impl Week {
    /// "Week 3: Create Clarity and Consistency"
    pub fn label(&self) -> String {
        format!("Week {}: {}", self.id, self.title)
    }

    pub fn display_practice(&self) -> &str {
        self.practice_display.as_deref().unwrap_or(&self.practice)
    }
}
