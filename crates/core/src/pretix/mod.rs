//! pretix ticketing API as the remote data source.
//!
//! [`PretixSource`] is the seam between the pipeline and the network:
//! [`PretixClient`] talks to a real pretix instance, while
//! `testing::MockPretixSource` serves canned data in tests.

mod choices;
mod client;
mod types;

pub use choices::{
    extract_label, extract_labels, option_entries, LABEL_KEYS, LABEL_LANGUAGES, OPTION_LIST_KEYS,
};
pub use client::{collect_pages, PretixClient, PretixConfig};
pub use types::*;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors raised while reading from pretix.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("pretix returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid input from the caller.
    #[error("Invalid request: {0}")]
    Validation(String),
}

/// Read access to one pretix event.
#[async_trait]
pub trait PretixSource: Send + Sync {
    /// All questions of the event, in API order.
    async fn fetch_questions(&self) -> Result<Vec<Question>, SourceError>;

    /// All items of the event, in API order.
    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError>;

    /// All orders of the event, in API order.
    async fn fetch_orders(&self) -> Result<Vec<Order>, SourceError>;

    /// Raw detail record of a single question.
    async fn fetch_question_detail(&self, question_id: i64) -> Result<Value, SourceError>;

    /// Sorted, distinct answer options of every question whose display text
    /// matches `text` case-insensitively.
    ///
    /// A missing question is not an error: it yields an empty list and a
    /// warning. Failing to load one question's detail skips that question.
    async fn fetch_question_choices_by_text(&self, text: &str) -> Result<Vec<String>, SourceError> {
        let target = text.trim().to_lowercase();
        if target.is_empty() {
            return Err(SourceError::Validation(
                "question text must not be empty".to_string(),
            ));
        }

        let matching: Vec<i64> = self
            .fetch_questions()
            .await?
            .iter()
            .filter(|q| q.text().trim().to_lowercase() == target)
            .map(|q| q.id)
            .collect();

        if matching.is_empty() {
            warn!("No question IDs found for question text '{}'", text);
            return Ok(Vec::new());
        }

        let mut choices = BTreeSet::new();
        for id in &matching {
            match self.fetch_question_detail(*id).await {
                Ok(detail) => choices.extend(extract_labels(&detail)),
                Err(e) => error!("Error fetching choices for question id {}: {}", id, e),
            }
        }

        if matching.len() > 1 {
            info!(
                "Multiple question IDs {:?} map to the same question text '{}'. Merged unique choices ({} unique).",
                matching,
                text,
                choices.len()
            );
        }

        Ok(choices.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockPretixSource};
    use serde_json::json;

    #[tokio::test]
    async fn test_choices_by_text_merges_duplicates() {
        let source = MockPretixSource::new();
        source
            .set_questions(vec![
                fixtures::question(1, "Ortschaft"),
                fixtures::question(2, " ortschaft "),
                fixtures::question(3, "Alter"),
            ])
            .await;
        source
            .set_question_detail(1, json!({"options": [{"answer": {"de": "B-Dorf"}}, "A-Stadt"]}))
            .await;
        source
            .set_question_detail(2, json!({"choices": ["A-Stadt", "C-Heim"]}))
            .await;

        let choices = source
            .fetch_question_choices_by_text("ORTSCHAFT")
            .await
            .unwrap();
        assert_eq!(choices, vec!["A-Stadt", "B-Dorf", "C-Heim"]);
        assert_eq!(source.request_count("question_detail").await, 2);
    }

    #[tokio::test]
    async fn test_choices_by_text_edge_cases() {
        let source = MockPretixSource::new();
        source.set_questions(vec![fixtures::question(1, "Ort")]).await;

        assert!(matches!(
            source.fetch_question_choices_by_text("  ").await,
            Err(SourceError::Validation(_))
        ));
        assert!(source
            .fetch_question_choices_by_text("Unbekannt")
            .await
            .unwrap()
            .is_empty());

        // detail lookup failure skips the id
        assert!(source
            .fetch_question_choices_by_text("Ort")
            .await
            .unwrap()
            .is_empty());
    }
}
