// Bounded most-recent-first list of finished checks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use utoipa::ToSchema;

use crate::models::check::Verdict;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentCheck {
    pub input: String,
    pub verdict: Verdict,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecentChecks {
    capacity: usize,
    entries: VecDeque<RecentCheck>,
}

impl RecentChecks {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a check at the front. A repeated input moves to the front
    /// instead of appearing twice; blank inputs are ignored.
    pub fn record(&mut self, input: &str, verdict: Verdict, checked_at: DateTime<Utc>) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }

        self.entries.retain(|entry| entry.input != input);
        self.entries.push_front(RecentCheck {
            input: input.to_string(),
            verdict,
            checked_at,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn list(&self) -> Vec<RecentCheck> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentChecks {
    fn default() -> Self {
        Self::new(5)
    }
}
