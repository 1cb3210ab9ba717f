//! Per-run node identifiers (`hmiId`).
//!
//! A monotonic counter: identifiers are dense, start at 1 and are never
//! handed out twice within one run. Devices built in the same run share one
//! allocator.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HmiId(pub u32);

impl fmt::Display for HmiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> HmiId {
        let id = HmiId(self.next);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out since the last reset.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }
}
