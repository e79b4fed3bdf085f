//! Wire types for the GitHub endpoints Seatscope reads.
//!
//! Only the fields the fetcher consumes are modeled; everything else in the
//! API payloads is ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A user or organization account reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub login: String,
}

impl Account {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// One Copilot seat from the billing listings.
///
/// The enterprise-wide listing additionally reports the organization that
/// assigned the seat; the per-org listing leaves it absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatDetails {
    pub assignee: Account,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub organization: Option<Account>,
}

/// Envelope of the seat-billing endpoints (`{ total_seats, seats: [...] }`).
#[derive(Debug, Clone, Deserialize)]
pub struct SeatPage {
    pub seats: Vec<SeatDetails>,
}

/// A team from the org team listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamDetails {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A repository from the org or team repository listings.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoDetails {
    pub name: String,
    pub full_name: String,
    pub owner: Account,
}

/// A contributor; anonymous entries carry a display name instead of a login.
#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Contributor {
    /// Login, falling back to the display name for anonymous contributors.
    pub fn identifier(&self) -> Option<&str> {
        self.login.as_deref().or(self.name.as_deref())
    }
}

/// One entry from the repository activity feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actor: Option<Account>,
}
