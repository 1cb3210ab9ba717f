//! Non-fatal problems found while building the tree.
//!
//! Each skip is logged as it happens and kept, so the CLI can print a summary
//! naming the offending rows without tracing enabled.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Row the problem belongs to, e.g. `PLC1/M01/ST02/ACT03` or `PLC1/alarm _01_00_Alms.L2`.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, subject: impl Into<String>, message: impl fmt::Display) {
        let d = Diagnostic {
            subject: subject.into(),
            message: message.to_string(),
        };
        tracing::warn!(subject = %d.subject, "{}", d.message);
        self.items.push(d);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
