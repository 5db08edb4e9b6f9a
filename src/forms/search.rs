use serde::Deserialize;

use crate::domain::search::SearchTrigger;

/// Search box submission.
///
/// Pressing Enter posts only `q`; picking an autocomplete entry also posts
/// its `suggestion` index.
#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub suggestion: Option<usize>,
}

impl SearchForm {
    pub fn trigger(&self) -> SearchTrigger {
        match self.suggestion {
            Some(index) => SearchTrigger::Suggestion(index),
            None => SearchTrigger::Enter,
        }
    }
}
