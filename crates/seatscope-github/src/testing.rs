//! In-memory data source for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::lookback::Lookback;
use crate::source::OrgDataSource;
use crate::types::{Account, ActivityEntry, Contributor, RepoDetails, SeatDetails, TeamDetails};

/// [`OrgDataSource`] serving canned records from memory.
///
/// Collections keyed by team slug or repository full name return empty
/// results when absent, matching a team with no members or a repository
/// with no activity.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pub seats: Vec<SeatDetails>,
    pub members: Vec<Account>,
    pub teams: Vec<TeamDetails>,
    /// Team members by team slug.
    pub team_members: HashMap<String, Vec<Account>>,
    /// Team repositories by team slug.
    pub team_repositories: HashMap<String, Vec<RepoDetails>>,
    pub repositories: Vec<RepoDetails>,
    /// Collaborators by repository full name.
    pub collaborators: HashMap<String, Vec<Account>>,
    /// Contributors by repository full name.
    pub contributors: HashMap<String, Vec<Contributor>>,
    /// Activity by repository full name.
    pub activity: HashMap<String, Vec<ActivityEntry>>,
    pub enterprise_seats: Vec<SeatDetails>,
}

impl MockSource {
    /// Convenience constructor for a repository record.
    pub fn repo(owner: &str, name: &str) -> RepoDetails {
        RepoDetails {
            name: name.to_string(),
            full_name: format!("{}/{}", owner, name),
            owner: Account::new(owner),
        }
    }

    fn keyed<T: Clone>(map: &HashMap<String, Vec<T>>, key: &str) -> Vec<T> {
        map.get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl OrgDataSource for MockSource {
    async fn org_seats(&self, _org: &str) -> SourceResult<Vec<SeatDetails>> {
        Ok(self.seats.clone())
    }

    async fn org_members(&self, _org: &str) -> SourceResult<Vec<Account>> {
        Ok(self.members.clone())
    }

    async fn teams(&self, _org: &str) -> SourceResult<Vec<TeamDetails>> {
        Ok(self.teams.clone())
    }

    async fn team_members(&self, _org: &str, slug: &str) -> SourceResult<Vec<Account>> {
        Ok(Self::keyed(&self.team_members, slug))
    }

    async fn team_repositories(&self, _org: &str, slug: &str) -> SourceResult<Vec<RepoDetails>> {
        Ok(Self::keyed(&self.team_repositories, slug))
    }

    async fn org_repositories(&self, _org: &str) -> SourceResult<Vec<RepoDetails>> {
        Ok(self.repositories.clone())
    }

    async fn collaborators(&self, owner: &str, repo: &str) -> SourceResult<Vec<Account>> {
        Ok(Self::keyed(&self.collaborators, &format!("{}/{}", owner, repo)))
    }

    async fn contributors(&self, owner: &str, repo: &str) -> SourceResult<Vec<Contributor>> {
        Ok(Self::keyed(&self.contributors, &format!("{}/{}", owner, repo)))
    }

    async fn repo_activity(
        &self,
        owner: &str,
        repo: &str,
        _lookback: Lookback,
    ) -> SourceResult<Vec<ActivityEntry>> {
        Ok(Self::keyed(&self.activity, &format!("{}/{}", owner, repo)))
    }

    async fn enterprise_seats(&self, _enterprise: &str) -> SourceResult<Vec<SeatDetails>> {
        Ok(self.enterprise_seats.clone())
    }
}
