//! Query-string helpers for device and shelf searches.
//!
//! A query string is a space separated list of terms. Terms of the form
//! `field:value` filter on a known field; everything else is matched as free
//! text.

use serde::{Deserialize, Serialize};

use crate::domain::shelf::Shelf;

/// Sort order of a [`SortExpression`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Requested sort expression as sent by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchExpression {
    pub expression: String,
    pub direction: Option<SortDirection>,
}

/// Resolved sort expression with a concrete direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortExpression {
    pub expression: String,
    pub direction: SortDirection,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SortOptions {
    pub expressions: Vec<SortExpression>,
}

/// Search request accepted by the listing endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query_string: String,
    #[serde(default)]
    pub expressions: Vec<SearchExpression>,
    #[serde(default)]
    pub returned_fields: Vec<String>,
}

/// Splits a request into its query string, sort options and returned fields.
///
/// Sort options are `None` when the request carries no expressions; an
/// expression without a direction sorts descending.
pub fn set_search_query_options(
    request: &SearchRequest,
) -> (String, Option<SortOptions>, Vec<String>) {
    let sort_options = if request.expressions.is_empty() {
        None
    } else {
        Some(SortOptions {
            expressions: request
                .expressions
                .iter()
                .map(|expr| SortExpression {
                    expression: expr.expression.clone(),
                    direction: expr.direction.unwrap_or_default(),
                })
                .collect(),
        })
    };

    (
        request.query_string.clone(),
        sort_options,
        request.returned_fields.clone(),
    )
}

/// Builds a query string matching the given shelf's indexed fields.
pub fn to_query(shelf: &Shelf) -> String {
    format!(
        "location:{} capacity:{} enabled:{}",
        shelf.location,
        shelf.capacity,
        if shelf.enabled { "True" } else { "False" }
    )
}

/// Field filter extracted from a query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    /// Interprets the value as a boolean (`True`/`False`, case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.value.parse().ok()
    }
}

/// Parsed query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub filters: Vec<FieldFilter>,
    pub text: Option<String>,
}

impl SearchQuery {
    /// Parses `raw`, keeping only filters whose field is in `known_fields`.
    pub fn parse(raw: &str, known_fields: &[&str]) -> Self {
        let mut filters = Vec::new();
        let mut words = Vec::new();

        for term in raw.split_whitespace() {
            match term.split_once(':') {
                Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                    if known_fields.contains(&field) {
                        filters.push(FieldFilter {
                            field: field.to_string(),
                            value: value.to_string(),
                        });
                    } else {
                        log::warn!("Ignoring unknown search field `{field}`");
                    }
                }
                _ => words.push(term),
            }
        }

        let text = Some(words.join(" ")).filter(|s| !s.is_empty());
        Self { filters, text }
    }

    pub fn filter(&self, field: &str) -> Option<&FieldFilter> {
        self.filters.iter().find(|f| f.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.text.is_none()
    }
}
