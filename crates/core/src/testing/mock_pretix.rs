//! Mock pretix source for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pretix::{Item, Order, PretixSource, Question, SourceError};

/// Mock implementation of the PretixSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable questions, items, orders and question details
/// - Count listing requests for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use p2n_core::testing::{MockPretixSource, fixtures};
///
/// let source = MockPretixSource::new();
/// source.set_questions(vec![fixtures::question(1, "Ort")]).await;
/// source.fail_next(SourceError::Parse("boom".into())).await;
/// ```
#[derive(Default)]
pub struct MockPretixSource {
    questions: Arc<RwLock<Vec<Question>>>,
    items: Arc<RwLock<Vec<Item>>>,
    orders: Arc<RwLock<Vec<Order>>>,
    details: Arc<RwLock<HashMap<i64, Value>>>,
    /// If set, the next listing request fails with this error.
    next_error: Arc<RwLock<Option<SourceError>>>,
    /// Listing requests served so far, by endpoint.
    requests: Arc<RwLock<HashMap<String, usize>>>,
}

impl std::fmt::Debug for MockPretixSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPretixSource")
            .field("questions", &"<questions>")
            .field("items", &"<items>")
            .field("orders", &"<orders>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl MockPretixSource {
    /// Create a mock source with no data.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_questions(&self, questions: Vec<Question>) {
        *self.questions.write().await = questions;
    }

    pub async fn set_items(&self, items: Vec<Item>) {
        *self.items.write().await = items;
    }

    pub async fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.write().await = orders;
    }

    /// Mutate the configured orders in place.
    pub async fn update_orders<F: FnOnce(&mut Vec<Order>)>(&self, update: F) {
        update(&mut *self.orders.write().await);
    }

    /// Set the detail record served for a question id.
    pub async fn set_question_detail(&self, question_id: i64, detail: Value) {
        self.details.write().await.insert(question_id, detail);
    }

    /// Make the next listing request fail.
    pub async fn fail_next(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of requests served for an endpoint (`questions`, `items`,
    /// `orders`, `question_detail`).
    pub async fn request_count(&self, endpoint: &str) -> usize {
        self.requests
            .read()
            .await
            .get(endpoint)
            .copied()
            .unwrap_or_default()
    }

    async fn begin(&self, endpoint: &str) -> Result<(), SourceError> {
        *self
            .requests
            .write()
            .await
            .entry(endpoint.to_string())
            .or_default() += 1;

        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PretixSource for MockPretixSource {
    async fn fetch_questions(&self) -> Result<Vec<Question>, SourceError> {
        self.begin("questions").await?;
        Ok(self.questions.read().await.clone())
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, SourceError> {
        self.begin("items").await?;
        Ok(self.items.read().await.clone())
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, SourceError> {
        self.begin("orders").await?;
        Ok(self.orders.read().await.clone())
    }

    async fn fetch_question_detail(&self, question_id: i64) -> Result<Value, SourceError> {
        self.begin("question_detail").await?;
        self.details
            .read()
            .await
            .get(&question_id)
            .cloned()
            .ok_or_else(|| SourceError::Status {
                status: 404,
                url: format!("questions/{}/", question_id),
                message: "Not found".to_string(),
            })
    }
}
