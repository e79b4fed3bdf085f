//! Seat lookup index.

use std::collections::HashMap;

use crate::snapshot::SeatAssignment;

/// O(1) lookup from user login to seat assignment.
///
/// Construction deduplicates by assignee, keeping the first-seen assignment;
/// later duplicates are dropped. This mirrors the dedup-on-insert behavior
/// every ingestion path is required to have, so the index is safe to build
/// from a raw API listing.
#[derive(Debug, Clone, Default)]
pub struct SeatIndex {
    by_assignee: HashMap<String, SeatAssignment>,
}

impl SeatIndex {
    /// Builds the index from a raw seat listing. O(n).
    pub fn new(seats: &[SeatAssignment]) -> Self {
        let mut by_assignee = HashMap::with_capacity(seats.len());
        for seat in seats {
            by_assignee
                .entry(seat.assignee.clone())
                .or_insert_with(|| seat.clone());
        }
        Self { by_assignee }
    }

    /// Whether the user holds a Copilot seat.
    pub fn has_seat(&self, login: &str) -> bool {
        self.by_assignee.contains_key(login)
    }

    /// The seat assignment for a user, if they hold one.
    pub fn seat_for(&self, login: &str) -> Option<&SeatAssignment> {
        self.by_assignee.get(login)
    }

    /// Number of distinct seat holders.
    pub fn len(&self) -> usize {
        self.by_assignee.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_assignee.is_empty()
    }
}
