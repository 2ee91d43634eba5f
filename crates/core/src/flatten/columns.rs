//! Stable column naming for question answers.

use std::collections::{HashMap, HashSet};

/// Maps question texts to column names for one flatten pass.
///
/// The first text to ask for a name gets the bare text. A text whose bare
/// name is already taken, by a reserved column or by another text's
/// allocation, gets the lowest free ` (#n)` suffix starting at 2. Asking
/// again for a known text always returns the same column.
#[derive(Debug, Default)]
pub struct ColumnAllocator {
    by_text: HashMap<String, String>,
    by_column: HashMap<String, String>,
    reserved: HashSet<String>,
    order: Vec<String>,
}

impl ColumnAllocator {
    /// Create an allocator that never hands out any of `reserved`.
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Column for `text`, allocating one on first use.
    pub fn column_for(&mut self, text: &str) -> &str {
        if !self.by_text.contains_key(text) {
            let column = self.unique_name(text);
            self.by_column.insert(column.clone(), text.to_string());
            self.by_text.insert(text.to_string(), column.clone());
            self.order.push(column);
        }
        &self.by_text[text]
    }

    /// Question text behind an allocated column.
    pub fn text_of(&self, column: &str) -> Option<&str> {
        self.by_column.get(column).map(String::as_str)
    }

    /// Allocated columns in allocation order.
    pub fn columns(&self) -> &[String] {
        &self.order
    }

    fn is_claimed(&self, name: &str) -> bool {
        self.reserved.contains(name) || self.by_column.contains_key(name)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.is_claimed(base) {
            return base.to_string();
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{} (#{})", base, counter);
            if !self.is_claimed(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
