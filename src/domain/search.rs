//! Search box dispatch: turns free text plus an entity kind into a navigation.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Record type targeted by a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Device,
    Shelf,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Device => "device",
            EntityKind::Shelf => "shelf",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(EntityKind::Device),
            "shelf" => Ok(EntityKind::Shelf),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown entity kind `{other}`"
            ))),
        }
    }
}

/// In-app navigation produced by a search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationRequest {
    pub path: [String; 2],
    /// Navigate without adding a browser history entry.
    pub skip_location_change: bool,
}

impl NavigationRequest {
    /// Results page for `text` searched as `kind`.
    pub fn search_results(kind: EntityKind, text: impl Into<String>) -> Self {
        Self {
            path: [format!("/search/{kind}/"), text.into()],
            skip_location_change: true,
        }
    }

    /// Joins the path segments into a URL path, percent-encoding the search text.
    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.path[0],
            utf8_percent_encode(&self.path[1], NON_ALPHANUMERIC)
        )
    }
}

/// Receiver of navigation requests.
pub trait Navigator {
    fn navigate(&mut self, request: NavigationRequest);
}

/// User interaction that submits the search box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchTrigger {
    /// Enter pressed in the text field.
    Enter,
    /// Autocomplete entry clicked, by position in the suggestion list.
    Suggestion(usize),
}

impl SearchTrigger {
    /// Entity kind implied by the trigger, `None` for an unknown suggestion index.
    pub fn entity_kind(self) -> Option<EntityKind> {
        match self {
            SearchTrigger::Enter | SearchTrigger::Suggestion(0) => Some(EntityKind::Device),
            SearchTrigger::Suggestion(1) => Some(EntityKind::Shelf),
            SearchTrigger::Suggestion(_) => None,
        }
    }
}

/// Autocomplete entry offered for the current search text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub kind: EntityKind,
    pub label: String,
}

/// Search box state for one interaction session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchDispatcher {
    pub search_text: String,
    pub entity_kind: EntityKind,
}

impl Default for SearchDispatcher {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            entity_kind: EntityKind::Device,
        }
    }
}

impl SearchDispatcher {
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            ..Self::default()
        }
    }

    /// Builds the navigation for `kind`, or `None` when there is nothing to search.
    pub fn search(&mut self, kind: EntityKind) -> Option<NavigationRequest> {
        if self.search_text.trim().is_empty() {
            return None;
        }
        self.entity_kind = kind;
        Some(NavigationRequest::search_results(
            kind,
            self.search_text.as_str(),
        ))
    }

    /// Runs [`SearchDispatcher::search`] and hands the result to `navigator`.
    ///
    /// Returns whether a navigation was dispatched.
    pub fn dispatch<N>(&mut self, kind: EntityKind, navigator: &mut N) -> bool
    where
        N: Navigator + ?Sized,
    {
        match self.search(kind) {
            Some(request) => {
                navigator.navigate(request);
                true
            }
            None => false,
        }
    }

    /// Dispatches on behalf of a UI trigger.
    pub fn trigger<N>(&mut self, trigger: SearchTrigger, navigator: &mut N) -> bool
    where
        N: Navigator + ?Sized,
    {
        match trigger.entity_kind() {
            Some(kind) => self.dispatch(kind, navigator),
            None => false,
        }
    }

    /// Autocomplete entries for the current text: device first, shelf second.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        let text = self.search_text.trim();
        [EntityKind::Device, EntityKind::Shelf]
            .into_iter()
            .map(|kind| Suggestion {
                kind,
                label: format!("Search {kind}s for \"{text}\""),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        requests: Vec<NavigationRequest>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&mut self, request: NavigationRequest) {
            self.requests.push(request);
        }
    }

    fn request(kind: &str, text: &str) -> NavigationRequest {
        NavigationRequest {
            path: [format!("/search/{kind}/"), text.to_string()],
            skip_location_change: true,
        }
    }

    #[test]
    fn searches_devices_with_a_query_of_1() {
        let mut navigator = RecordingNavigator::default();
        let mut dispatcher = SearchDispatcher::new("1");

        assert!(dispatcher.dispatch(EntityKind::Device, &mut navigator));

        assert_eq!(navigator.requests, vec![request("device", "1")]);
    }

    #[test]
    fn searches_shelves_with_a_query_of_nyc() {
        let mut navigator = RecordingNavigator::default();
        let mut dispatcher = SearchDispatcher::new("nyc");

        dispatcher.dispatch(EntityKind::Shelf, &mut navigator);

        assert_eq!(navigator.requests, vec![request("shelf", "nyc")]);
        assert_eq!(dispatcher.entity_kind, EntityKind::Shelf);
    }

    #[test]
    fn enter_key_searches_devices() {
        let mut navigator = RecordingNavigator::default();
        let mut dispatcher = SearchDispatcher::new("2");

        dispatcher.trigger(SearchTrigger::Enter, &mut navigator);

        assert_eq!(navigator.requests, vec![request("device", "2")]);
    }

    #[test]
    fn suggestion_positions_select_entity_kind() {
        let mut navigator = RecordingNavigator::default();

        SearchDispatcher::new("magic").trigger(SearchTrigger::Suggestion(1), &mut navigator);
        SearchDispatcher::new("123456").trigger(SearchTrigger::Suggestion(0), &mut navigator);

        assert_eq!(
            navigator.requests,
            vec![request("shelf", "magic"), request("device", "123456")]
        );
    }

    #[test]
    fn unknown_suggestion_does_nothing() {
        let mut navigator = RecordingNavigator::default();
        assert!(!SearchDispatcher::new("x").trigger(SearchTrigger::Suggestion(2), &mut navigator));
        assert!(navigator.requests.is_empty());
    }

    #[test]
    fn empty_text_is_not_dispatched() {
        let mut navigator = RecordingNavigator::default();
        let mut dispatcher = SearchDispatcher::new("");

        assert!(!dispatcher.dispatch(EntityKind::Device, &mut navigator));
        assert!(!dispatcher.dispatch(EntityKind::Shelf, &mut navigator));
        assert!(!dispatcher.trigger(SearchTrigger::Suggestion(1), &mut navigator));

        assert!(navigator.requests.is_empty());
    }

    #[test]
    fn whitespace_only_text_is_not_dispatched() {
        let mut dispatcher = SearchDispatcher::new("   ");
        assert_eq!(dispatcher.search(EntityKind::Device), None);
    }

    #[test]
    fn suggestions_list_device_before_shelf() {
        let kinds: Vec<_> = SearchDispatcher::new("nyc")
            .suggestions()
            .into_iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(kinds, vec![EntityKind::Device, EntityKind::Shelf]);
    }

    #[test]
    fn navigation_url_joins_segments() {
        assert_eq!(request("device", "1").url(), "/search/device/1");
    }

    #[test]
    fn navigation_url_keeps_text_in_one_segment() {
        let request = NavigationRequest::search_results(EntityKind::Shelf, "location:US/NYC");
        assert_eq!(request.path[1], "location:US/NYC");
        assert_eq!(request.url(), "/search/shelf/location%3AUS%2FNYC");
        assert_eq!(
            NavigationRequest::search_results(EntityKind::Device, "50% off?#").url(),
            "/search/device/50%25%20off%3F%23"
        );
    }

    #[test]
    fn entity_kind_parses_lowercase_names() {
        assert_eq!("shelf".parse::<EntityKind>(), Ok(EntityKind::Shelf));
        assert!("book".parse::<EntityKind>().is_err());
    }
}
