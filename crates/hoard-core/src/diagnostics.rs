//! Diagnostics channel
//!
//! Configuration errors and structural warnings are reported here instead of
//! being returned as errors: the running game never aborts on them. Every entry
//! is logged through `tracing`; recording keeps the most recent ones around for
//! tools and tests.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Category of a reported problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Mismatched ownership, duplicate or missing list entries, inconsistent parents
    Configuration,
    /// Cycle found or depth limit hit during a tree walk
    Structural,
}

impl DiagnosticKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Structural => "structural",
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Debug rendering of the handle the problem is about, if any
    pub subject: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {}: {}", self.kind.name(), subject, self.message),
            None => write!(f, "[{}] {}", self.kind.name(), self.message),
        }
    }
}

/// Collects diagnostics reported by the item world. Recording is bounded:
/// once `limit` entries are held the oldest is dropped for each new one.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    record: bool,
    limit: usize,
    dropped: usize,
}

impl Diagnostics {
    pub fn new(record: bool, limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            record,
            limit,
            dropped: 0,
        }
    }

    /// Report a problem. Always logged, stored when recording is on.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        subject: Option<&dyn fmt::Debug>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.map(|s| format!("{s:?}")),
            message: message.into(),
        };
        warn!(kind = kind.name(), "{}", diagnostic);
        if !self.record {
            return;
        }
        if self.limit == 0 {
            self.dropped += 1;
            return;
        }
        if self.entries.len() == self.limit {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(diagnostic);
    }

    pub fn configuration(&mut self, subject: &dyn fmt::Debug, message: impl Into<String>) {
        self.report(DiagnosticKind::Configuration, Some(subject), message);
    }

    pub fn structural(&mut self, subject: &dyn fmt::Debug, message: impl Into<String>) {
        self.report(DiagnosticKind::Structural, Some(subject), message);
    }

    /// Recorded diagnostics, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.iter()
    }

    /// Number of recorded diagnostics of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Recorded entries evicted to stay under the limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Take all recorded diagnostics
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
