//! Organization snapshot data model.
//!
//! An [`OrgSnapshot`] is the complete, point-in-time set of records the
//! engine operates on: seat assignments, teams with their members and
//! accessible repositories, and repositories with their collaborators and
//! contributors. Snapshots are validated once at construction and read-only
//! afterwards; staleness across the API calls that produced one is the
//! ingestion layer's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A Copilot seat assignment for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    /// Login of the user holding the seat.
    pub assignee: String,
    /// Last Copilot activity reported for the seat, if any.
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl SeatAssignment {
    pub fn new(assignee: impl Into<String>, last_activity_at: Option<DateTime<Utc>>) -> Self {
        Self {
            assignee: assignee.into(),
            last_activity_at,
        }
    }
}

/// A user seen in a repository's activity feed within the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUser {
    /// Login of the active user.
    pub login: String,
    /// Timestamp of their most recent activity in the repository.
    pub last_active: DateTime<Utc>,
}

/// A team and the members and repositories attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable key used in API paths.
    pub slug: String,
    /// Human-readable team name.
    pub name: String,
    /// Team description, when one is set.
    #[serde(default)]
    pub description: Option<String>,
    /// Member logins in the order the API returned them.
    pub members: Vec<String>,
    /// Full names ("owner/name") of repositories the team has access to.
    /// Each must resolve to a [`Repository`] entry in the same snapshot.
    pub repositories: Vec<String>,
}

/// A repository and the users attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Owning organization or user login.
    pub owner: String,
    /// Repository name without the owner prefix.
    pub name: String,
    /// Logins with direct collaborator access.
    pub collaborators: Vec<String>,
    /// Logins with commit history in the repository.
    pub contributors: Vec<String>,
    /// Users active in the repository within the lookback window.
    #[serde(default)]
    pub active_users: Vec<ActiveUser>,
}

impl Repository {
    /// The "owner/name" form used as the repository's identity in joins.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One organization's validated, read-only snapshot.
///
/// Construction enforces referential integrity: team members must be present
/// in the snapshot's user registry, team repository references must resolve
/// to repository entries, and no identifier may be empty. The engine never
/// mutates a snapshot; it only derives new values from one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct OrgSnapshot {
    org: String,
    captured_at: DateTime<Utc>,
    users: Vec<String>,
    seats: Vec<SeatAssignment>,
    teams: Vec<Team>,
    repositories: Vec<Repository>,
}

/// Plain record form of a snapshot, used as the deserialization carrier so
/// that cached snapshots re-validate on load.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRecord {
    pub org: String,
    pub captured_at: DateTime<Utc>,
    pub users: Vec<String>,
    pub seats: Vec<SeatAssignment>,
    pub teams: Vec<Team>,
    pub repositories: Vec<Repository>,
}

impl TryFrom<SnapshotRecord> for OrgSnapshot {
    type Error = EngineError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        OrgSnapshot::new(
            record.org,
            record.captured_at,
            record.users,
            record.seats,
            record.teams,
            record.repositories,
        )
    }
}

impl OrgSnapshot {
    /// Builds a snapshot, validating referential integrity and rejecting
    /// empty identifiers.
    pub fn new(
        org: impl Into<String>,
        captured_at: DateTime<Utc>,
        users: Vec<String>,
        seats: Vec<SeatAssignment>,
        teams: Vec<Team>,
        repositories: Vec<Repository>,
    ) -> Result<Self, EngineError> {
        let org = org.into();
        if org.is_empty() {
            return Err(EngineError::malformed("", "organization name is empty"));
        }

        let snapshot = Self {
            org,
            captured_at,
            users,
            seats,
            teams,
            repositories,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), EngineError> {
        let org = &self.org;

        for login in &self.users {
            if login.is_empty() {
                return Err(EngineError::malformed(org, "empty login in user registry"));
            }
        }
        for seat in &self.seats {
            if seat.assignee.is_empty() {
                return Err(EngineError::malformed(org, "seat assignment with empty assignee"));
            }
        }

        let known_users: std::collections::HashSet<&str> =
            self.users.iter().map(String::as_str).collect();
        let known_repos: std::collections::HashSet<String> =
            self.repositories.iter().map(Repository::full_name).collect();

        for team in &self.teams {
            if team.slug.is_empty() || team.name.is_empty() {
                return Err(EngineError::malformed(org, "team with empty slug or name"));
            }
            for member in &team.members {
                if member.is_empty() {
                    return Err(EngineError::malformed(
                        org,
                        format!("team '{}' has an empty member login", team.slug),
                    ));
                }
                if !known_users.contains(member.as_str()) {
                    return Err(EngineError::malformed(
                        org,
                        format!(
                            "team '{}' references member '{}' not present in the snapshot",
                            team.slug, member
                        ),
                    ));
                }
            }
            for repo_ref in &team.repositories {
                if !known_repos.contains(repo_ref) {
                    return Err(EngineError::malformed(
                        org,
                        format!(
                            "team '{}' references repository '{}' not present in the snapshot",
                            team.slug, repo_ref
                        ),
                    ));
                }
            }
        }

        for repo in &self.repositories {
            if repo.owner.is_empty() || repo.name.is_empty() {
                return Err(EngineError::malformed(org, "repository with empty owner or name"));
            }
            let logins = repo
                .collaborators
                .iter()
                .chain(repo.contributors.iter())
                .chain(repo.active_users.iter().map(|u| &u.login));
            for login in logins {
                if login.is_empty() {
                    return Err(EngineError::malformed(
                        org,
                        format!("repository '{}' has an empty user login", repo.full_name()),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Organization login this snapshot was captured for.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// When the ingestion layer finished assembling this snapshot.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// All org member logins known at capture time.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Raw seat assignments as listed by the API (may contain duplicates;
    /// [`crate::SeatIndex`] collapses them).
    pub fn seats(&self) -> &[SeatAssignment] {
        &self.seats
    }

    /// Read-only iteration over teams.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    /// Read-only iteration over repositories.
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.iter()
    }
}
