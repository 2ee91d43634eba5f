//! One-slot change detection between cycles.

use crate::table::Table;

/// Result of comparing a fresh dataset with the stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Changed,
}

/// Structural equality: same columns, same rows in the same order, same
/// index. A single differing cell counts as a change.
pub fn is_unchanged(new: &Table, last: &Table) -> bool {
    new == last
}

/// Holds the last accepted dataset.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<Table>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `dataset` with the snapshot.
    ///
    /// The comparison only counts when the previous cycle succeeded. On any
    /// change the dataset becomes the new snapshot right away, whatever
    /// happens later in the cycle.
    pub fn observe(&mut self, dataset: &Table, last_run_succeeded: bool) -> Change {
        if last_run_succeeded {
            if let Some(last) = &self.last {
                if is_unchanged(dataset, last) {
                    return Change::Unchanged;
                }
            }
        }

        self.last = Some(dataset.clone());
        Change::Changed
    }

    #[cfg(test)]
    fn snapshot(&self) -> Option<&Table> {
        self.last.as_ref()
    }
}
