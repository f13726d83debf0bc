//! Edit script representation for line diffs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an edit script entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Line only present in the source
    Removed,
    /// Line only present in the target
    Added,
    /// Line shared by both sides (part of the common subsequence)
    Unchanged,
}

impl ChangeKind {
    /// Prefix used when the entry is rendered as text
    pub fn marker(self) -> char {
        match self {
            ChangeKind::Removed => '-',
            ChangeKind::Added => '+',
            ChangeKind::Unchanged => '=',
        }
    }
}

/// A single line of an edit script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub text: String,
}

impl Change {
    pub fn new(kind: ChangeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Removed, text)
    }

    pub fn added(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Added, text)
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(ChangeKind::Unchanged, text)
    }

    /// Check if this is an actual change (not a shared line)
    pub fn is_change(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.marker(), self.text)
    }
}

/// Ordered list of changes that turns the source lines into the target lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript {
    changes: Vec<Change>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            changes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Number of entries of the given kind
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// Check if the two sides were identical
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(Change::is_change)
    }

    /// Lines of the source side, in order (removed and unchanged entries)
    pub fn source_lines(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Added)
            .map(|c| c.text.as_str())
    }

    /// Lines of the target side, in order (added and unchanged entries)
    pub fn target_lines(&self) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Removed)
            .map(|c| c.text.as_str())
    }

    /// Render every entry as `<marker> <line>`
    pub fn to_lines(&self) -> Vec<String> {
        self.changes.iter().map(Change::to_string).collect()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
