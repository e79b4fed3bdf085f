//! Snapshot assembly.
//!
//! Pulls every record the engine needs through an [`OrgDataSource`] and
//! hands back one validated [`OrgSnapshot`]. The fetch order is seats,
//! members, teams (with their members and repositories), remaining org
//! repositories, then per-repository collaborators, contributors, and
//! activity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use seatscope_core::{
    ActiveUser, EngineError, OrgSnapshot, Repository, SeatAssignment, SeatIndex, Team,
};

use crate::error::SourceError;
use crate::lookback::Lookback;
use crate::source::OrgDataSource;
use crate::types::{ActivityEntry, RepoDetails};

/// Errors from snapshot assembly.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The API layer failed; resilience beyond retry/backoff is not
    /// attempted here.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The fetched records did not form a coherent snapshot, for example
    /// because membership changed between paginated calls.
    #[error(transparent)]
    Snapshot(#[from] EngineError),
}

/// One enterprise-wide seat assignment, scoped to its owning org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseSeat {
    pub assignee: String,
    pub organization: String,
}

/// Assembles fully-resolved snapshots from an [`OrgDataSource`].
pub struct SnapshotFetcher<'a> {
    source: &'a dyn OrgDataSource,
    lookback: Lookback,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(source: &'a dyn OrgDataSource, lookback: Lookback) -> Self {
        Self { source, lookback }
    }

    /// Fetches one organization's complete snapshot.
    pub async fn fetch_org(&self, org: &str) -> Result<OrgSnapshot, FetchError> {
        let captured_at = Utc::now();

        let seats: Vec<SeatAssignment> = self
            .source
            .org_seats(org)
            .await?
            .into_iter()
            .map(|seat| SeatAssignment::new(seat.assignee.login, seat.last_activity_at))
            .collect();

        let users: Vec<String> = self
            .source
            .org_members(org)
            .await?
            .into_iter()
            .map(|account| account.login)
            .collect();
        info!("Found {} members in org {}", users.len(), org);

        // Repositories are keyed by full name; team listings come first so
        // their entries keep first-seen order, org-wide listing fills the rest.
        let mut repo_order: Vec<String> = Vec::new();
        let mut repo_details: HashMap<String, RepoDetails> = HashMap::new();

        let mut teams = Vec::new();
        for team in self.source.teams(org).await? {
            let members: Vec<String> = self
                .source
                .team_members(org, &team.slug)
                .await?
                .into_iter()
                .map(|account| account.login)
                .collect();
            debug!("Team {} has {} members", team.slug, members.len());

            let mut repositories = Vec::new();
            for repo in self.source.team_repositories(org, &team.slug).await? {
                if !repositories.contains(&repo.full_name) {
                    repositories.push(repo.full_name.clone());
                }
                register_repo(&mut repo_order, &mut repo_details, repo);
            }

            teams.push(Team {
                slug: team.slug,
                name: team.name,
                description: team.description,
                members,
                repositories,
            });
        }
        info!("Found {} total teams in org {}", teams.len(), org);

        for repo in self.source.org_repositories(org).await? {
            register_repo(&mut repo_order, &mut repo_details, repo);
        }

        let cutoff = self.lookback.since(captured_at);
        let mut repositories = Vec::with_capacity(repo_order.len());
        for full_name in &repo_order {
            let details = &repo_details[full_name];
            repositories.push(self.fetch_repository(details, cutoff).await?);
        }
        info!("Resolved {} repositories in org {}", repositories.len(), org);

        Ok(OrgSnapshot::new(
            org,
            captured_at,
            users,
            seats,
            teams,
            repositories,
        )?)
    }

    async fn fetch_repository(
        &self,
        details: &RepoDetails,
        cutoff: DateTime<Utc>,
    ) -> Result<Repository, FetchError> {
        let owner = &details.owner.login;
        let name = &details.name;

        let collaborators: Vec<String> = self
            .source
            .collaborators(owner, name)
            .await?
            .into_iter()
            .map(|account| account.login)
            .collect();

        let contributors: Vec<String> = self
            .source
            .contributors(owner, name)
            .await?
            .into_iter()
            .filter_map(|contributor| contributor.identifier().map(str::to_string))
            .collect();
        debug!("Found {} contributors for repo {}", contributors.len(), name);

        let activity = self.source.repo_activity(owner, name, self.lookback).await?;
        let active_users = latest_activity_per_user(activity, cutoff);

        Ok(Repository {
            owner: owner.clone(),
            name: name.clone(),
            collaborators,
            contributors,
            active_users,
        })
    }

    /// Fetches the enterprise-wide seat listing, each seat scoped to the
    /// organization that assigned it.
    pub async fn fetch_enterprise_seats(
        &self,
        enterprise: &str,
    ) -> Result<Vec<EnterpriseSeat>, FetchError> {
        let mut seats = Vec::new();
        for seat in self.source.enterprise_seats(enterprise).await? {
            match seat.organization {
                Some(organization) => seats.push(EnterpriseSeat {
                    assignee: seat.assignee.login,
                    organization: organization.login,
                }),
                None => warn!(
                    "Enterprise seat for {} has no organization, skipping",
                    seat.assignee.login
                ),
            }
        }
        Ok(seats)
    }
}

fn register_repo(
    order: &mut Vec<String>,
    details: &mut HashMap<String, RepoDetails>,
    repo: RepoDetails,
) {
    if !details.contains_key(&repo.full_name) {
        order.push(repo.full_name.clone());
        details.insert(repo.full_name.clone(), repo);
    }
}

/// Collapses an activity feed to one entry per user, keeping only the
/// latest activity and dropping anything before the cutoff.
fn latest_activity_per_user(
    activity: Vec<ActivityEntry>,
    cutoff: DateTime<Utc>,
) -> Vec<ActiveUser> {
    use std::collections::hash_map::Entry;

    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, DateTime<Utc>> = HashMap::new();

    for entry in activity {
        let Some(actor) = entry.actor else {
            continue;
        };
        if entry.timestamp < cutoff {
            continue;
        }
        match latest.entry(actor.login) {
            Entry::Occupied(mut seen) => {
                if entry.timestamp > *seen.get() {
                    seen.insert(entry.timestamp);
                }
            }
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                slot.insert(entry.timestamp);
            }
        }
    }

    order
        .into_iter()
        .map(|login| {
            let last_active = latest[&login];
            ActiveUser { login, last_active }
        })
        .collect()
}

/// For every repository, the seat holders belonging to a team with access
/// to it. This enrichment is derived here rather than in the engine because
/// team-to-repository access resolution is an ingestion concern.
pub fn team_seat_holders_by_repo(
    snapshot: &OrgSnapshot,
    seats: &SeatIndex,
) -> HashMap<String, Vec<String>> {
    let mut by_repo: HashMap<String, Vec<String>> = HashMap::new();

    for team in snapshot.teams() {
        let holders: Vec<&String> = team
            .members
            .iter()
            .filter(|member| seats.has_seat(member))
            .collect();
        if holders.is_empty() {
            continue;
        }
        for repo_ref in &team.repositories {
            let entry = by_repo.entry(repo_ref.clone()).or_default();
            for holder in &holders {
                if !entry.contains(holder) {
                    entry.push((*holder).clone());
                }
            }
        }
    }

    by_repo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;
    use crate::types::{Account, Contributor, SeatDetails, TeamDetails};
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn mock_org() -> MockSource {
        let mut mock = MockSource::default();
        mock.seats = vec![SeatDetails {
            assignee: Account::new("alice"),
            last_activity_at: Some(ts(1, 0)),
            organization: None,
        }];
        mock.members = vec![
            Account::new("alice"),
            Account::new("bob"),
            Account::new("carol"),
        ];
        mock.teams = vec![TeamDetails {
            slug: "platform".to_string(),
            name: "Platform".to_string(),
            description: None,
        }];
        mock.team_members
            .insert("platform".to_string(), vec![Account::new("alice"), Account::new("bob")]);
        mock.team_repositories.insert(
            "platform".to_string(),
            vec![MockSource::repo("acme", "app")],
        );
        mock.repositories = vec![MockSource::repo("acme", "app"), MockSource::repo("acme", "tools")];
        mock.collaborators
            .insert("acme/app".to_string(), vec![Account::new("bob")]);
        mock.contributors.insert(
            "acme/app".to_string(),
            vec![
                Contributor {
                    login: Some("carol".to_string()),
                    name: None,
                },
                Contributor {
                    login: None,
                    name: Some("Anon Author".to_string()),
                },
            ],
        );
        mock
    }

    #[tokio::test]
    async fn assembles_a_validated_snapshot() {
        let mock = mock_org();
        let fetcher = SnapshotFetcher::new(&mock, Lookback::Month);

        let snapshot = fetcher.fetch_org("acme").await.unwrap();

        assert_eq!(snapshot.org(), "acme");
        assert_eq!(snapshot.seats().len(), 1);
        assert_eq!(snapshot.users().len(), 3);

        let team = snapshot.teams().next().unwrap();
        assert_eq!(team.name, "Platform");
        assert_eq!(team.repositories, vec!["acme/app".to_string()]);

        let repos: Vec<_> = snapshot.repositories().collect();
        assert_eq!(repos.len(), 2);
        // Team repositories come first, then the org-wide remainder.
        assert_eq!(repos[0].full_name(), "acme/app");
        assert_eq!(repos[1].full_name(), "acme/tools");
        assert_eq!(repos[0].collaborators, vec!["bob".to_string()]);
        // Anonymous contributor falls back to its display name.
        assert_eq!(
            repos[0].contributors,
            vec!["carol".to_string(), "Anon Author".to_string()]
        );
    }

    #[tokio::test]
    async fn activity_keeps_latest_per_user_inside_the_window() {
        let mut mock = mock_org();
        mock.activity.insert(
            "acme/app".to_string(),
            vec![
                ActivityEntry {
                    timestamp: ts(10, 9),
                    actor: Some(Account::new("bob")),
                },
                ActivityEntry {
                    timestamp: ts(12, 9),
                    actor: Some(Account::new("bob")),
                },
                ActivityEntry {
                    timestamp: ts(11, 9),
                    actor: None,
                },
            ],
        );
        let fetcher = SnapshotFetcher::new(&mock, Lookback::Year);

        let snapshot = fetcher.fetch_org("acme").await.unwrap();
        let app = snapshot
            .repositories()
            .find(|r| r.full_name() == "acme/app")
            .unwrap();

        assert_eq!(app.active_users.len(), 1);
        assert_eq!(app.active_users[0].login, "bob");
        assert_eq!(app.active_users[0].last_active, ts(12, 9));
    }

    #[test]
    fn stale_activity_is_dropped() {
        let cutoff = ts(15, 0);
        let activity = vec![
            ActivityEntry {
                timestamp: ts(10, 0),
                actor: Some(Account::new("old")),
            },
            ActivityEntry {
                timestamp: ts(20, 0),
                actor: Some(Account::new("recent")),
            },
        ];

        let active = latest_activity_per_user(activity, cutoff);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].login, "recent");
    }

    #[tokio::test]
    async fn enterprise_seats_require_an_organization() {
        let mut mock = mock_org();
        mock.enterprise_seats = vec![
            SeatDetails {
                assignee: Account::new("alice"),
                last_activity_at: None,
                organization: Some(Account::new("acme")),
            },
            SeatDetails {
                assignee: Account::new("mallory"),
                last_activity_at: None,
                organization: None,
            },
        ];
        let fetcher = SnapshotFetcher::new(&mock, Lookback::Month);

        let seats = fetcher.fetch_enterprise_seats("megacorp").await.unwrap();
        assert_eq!(
            seats,
            vec![EnterpriseSeat {
                assignee: "alice".to_string(),
                organization: "acme".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn team_seat_holders_map_follows_team_access() {
        let mock = mock_org();
        let fetcher = SnapshotFetcher::new(&mock, Lookback::Month);
        let snapshot = fetcher.fetch_org("acme").await.unwrap();
        let seats = SeatIndex::new(snapshot.seats());

        let by_repo = team_seat_holders_by_repo(&snapshot, &seats);

        // alice holds a seat and is on the platform team, which has app.
        assert_eq!(by_repo["acme/app"], vec!["alice".to_string()]);
        assert!(!by_repo.contains_key("acme/tools"));
    }
}
