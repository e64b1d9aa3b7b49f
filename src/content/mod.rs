// src/content/mod.rs — Read-only per-week content store
//
// Layout under the content root:
//   intros/week_{n}.txt             required
//   practices/week_{n}.txt          required
//   prompts/week_{n}.txt            required (system prompt)
//   practices_display/week_{n}.txt  optional

pub mod week;

use std::collections::BTreeMap;
use std::path::Path;

pub use week::{Week, WeekId};

use crate::infra::config::WeekEntry;
use crate::infra::errors::CoachError;

pub struct ContentStore {
    weeks: BTreeMap<WeekId, Week>,
}

impl ContentStore {
    /// Read every configured week from `root`. A missing required file is fatal.
    pub fn load(root: &Path, entries: &[WeekEntry]) -> Result<Self, CoachError> {
        let mut weeks = BTreeMap::new();
        for entry in entries {
            let id = WeekId(entry.number);
            let week = Week {
                id,
                title: entry.title.clone(),
                intro: read_required(root, "intros", id)?,
                practice: read_required(root, "practices", id)?,
                practice_display: read_optional(root, "practices_display", id)?,
                system_prompt: read_required(root, "prompts", id)?,
            };
            weeks.insert(id, week);
        }
        tracing::info!("Loaded content for {} week(s) from {}", weeks.len(), root.display());
        Ok(Self { weeks })
    }

    pub fn from_weeks(weeks: Vec<Week>) -> Self {
        Self {
            weeks: weeks.into_iter().map(|w| (w.id, w)).collect(),
        }
    }

    pub fn get(&self, id: WeekId) -> Option<&Week> {
        self.weeks.get(&id)
    }

    /// Weeks in program order.
    pub fn weeks(&self) -> impl Iterator<Item = &Week> {
        self.weeks.values()
    }

    pub fn first(&self) -> Option<&Week> {
        self.weeks.values().next()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

fn week_file(root: &Path, kind: &str, id: WeekId) -> std::path::PathBuf {
    root.join(kind).join(format!("week_{}.txt", id))
}

fn read_required(root: &Path, kind: &str, id: WeekId) -> Result<String, CoachError> {
    let path = week_file(root, kind, id);
    std::fs::read_to_string(&path).map_err(|source| CoachError::ContentLoad {
        week: id.number(),
        path,
        source,
    })
}

fn read_optional(root: &Path, kind: &str, id: WeekId) -> Result<Option<String>, CoachError> {
    let path = week_file(root, kind, id);
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CoachError::ContentLoad {
            week: id.number(),
            path,
            source,
        }),
    }
}
