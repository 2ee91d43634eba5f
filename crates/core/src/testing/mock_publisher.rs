//! Mock publisher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{PublishError, Publisher};
use crate::table::Table;

/// What a recorded publish carried.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishedContent {
    Table { table: Table, add_filters: bool },
    Text(String),
}

/// A recorded publish for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedFile {
    pub name: String,
    pub subdir: Option<String>,
    pub content: PublishedContent,
}

impl PublishedFile {
    pub fn table(&self) -> Option<&Table> {
        match &self.content {
            PublishedContent::Table { table, .. } => Some(table),
            PublishedContent::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            PublishedContent::Text(text) => Some(text),
            PublishedContent::Table { .. } => None,
        }
    }
}

/// Mock implementation of the Publisher trait.
///
/// Records every publish instead of uploading. Failures can be injected
/// for the next publish or for every publish of a given name.
#[derive(Debug, Default)]
pub struct MockPublisher {
    published: Arc<RwLock<Vec<PublishedFile>>>,
    /// If set, the next publish fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
    /// Names that always fail.
    failing_names: Arc<RwLock<Vec<String>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded publish, in order.
    pub async fn published(&self) -> Vec<PublishedFile> {
        self.published.read().await.clone()
    }

    /// Names of recorded publishes, in order.
    pub async fn published_names(&self) -> Vec<String> {
        self.published
            .read()
            .await
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Most recent publish of `name`.
    pub async fn find(&self, name: &str) -> Option<PublishedFile> {
        self.published
            .read()
            .await
            .iter()
            .rev()
            .find(|f| f.name == name)
            .cloned()
    }

    pub async fn clear(&self) {
        self.published.write().await.clear();
    }

    /// Make the next publish fail.
    pub async fn fail_next(&self, message: &str) {
        *self.next_error.write().await = Some(message.to_string());
    }

    /// Make every publish of `name` fail.
    pub async fn fail_name(&self, name: &str) {
        self.failing_names.write().await.push(name.to_string());
    }

    async fn record(
        &self,
        name: &str,
        subdir: Option<&str>,
        content: PublishedContent,
    ) -> Result<(), PublishError> {
        if let Some(message) = self.next_error.write().await.take() {
            return Err(PublishError::InvalidRequest(message));
        }
        if self.failing_names.read().await.iter().any(|n| n == name) {
            return Err(PublishError::Status {
                status: 500,
                url: name.to_string(),
                message: "mock failure".to_string(),
            });
        }

        self.published.write().await.push(PublishedFile {
            name: name.to_string(),
            subdir: subdir.map(String::from),
            content,
        });
        Ok(())
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish_table(
        &self,
        table: &Table,
        name: &str,
        subdir: Option<&str>,
        add_filters: bool,
    ) -> Result<(), PublishError> {
        let content = PublishedContent::Table {
            table: table.clone(),
            add_filters,
        };
        self.record(name, subdir, content).await
    }

    async fn publish_text(
        &self,
        name: &str,
        content: &str,
        subdir: Option<&str>,
    ) -> Result<(), PublishError> {
        self.record(name, subdir, PublishedContent::Text(content.to_string()))
            .await
    }
}
