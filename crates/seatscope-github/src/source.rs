//! Data-source trait and its GitHub implementation.

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::config::GithubConfig;
use crate::error::SourceResult;
use crate::http::GithubClient;
use crate::lookback::Lookback;
use crate::token::TokenStore;
use crate::types::{Account, ActivityEntry, Contributor, RepoDetails, SeatDetails, SeatPage, TeamDetails};

/// The organization records the snapshot fetcher reads.
///
/// The GitHub implementation is [`GithubSource`]; tests use the in-memory
/// [`crate::testing::MockSource`].
#[async_trait]
pub trait OrgDataSource: Send + Sync {
    /// Copilot seat assignments for the organization.
    async fn org_seats(&self, org: &str) -> SourceResult<Vec<SeatDetails>>;

    /// All member logins of the organization.
    async fn org_members(&self, org: &str) -> SourceResult<Vec<Account>>;

    /// Teams in the organization.
    async fn teams(&self, org: &str) -> SourceResult<Vec<TeamDetails>>;

    /// Members of one team.
    async fn team_members(&self, org: &str, slug: &str) -> SourceResult<Vec<Account>>;

    /// Repositories one team has access to.
    async fn team_repositories(&self, org: &str, slug: &str) -> SourceResult<Vec<RepoDetails>>;

    /// All repositories of the organization.
    async fn org_repositories(&self, org: &str) -> SourceResult<Vec<RepoDetails>>;

    /// Direct collaborators of a repository.
    async fn collaborators(&self, owner: &str, repo: &str) -> SourceResult<Vec<Account>>;

    /// Users with commit history in a repository.
    async fn contributors(&self, owner: &str, repo: &str) -> SourceResult<Vec<Contributor>>;

    /// Repository activity within the lookback window.
    async fn repo_activity(
        &self,
        owner: &str,
        repo: &str,
        lookback: Lookback,
    ) -> SourceResult<Vec<ActivityEntry>>;

    /// Copilot seat assignments across an enterprise, each carrying its
    /// assigning organization.
    async fn enterprise_seats(&self, enterprise: &str) -> SourceResult<Vec<SeatDetails>>;
}

/// [`OrgDataSource`] backed by the GitHub REST API.
pub struct GithubSource {
    client: GithubClient,
    tokens: TokenStore,
}

impl GithubSource {
    pub fn new(config: GithubConfig, tokens: TokenStore) -> SourceResult<Self> {
        let client = GithubClient::new(config)?;
        Ok(Self { client, tokens })
    }

    /// Drains the seat-billing envelope pages at the given path.
    async fn seat_pages(
        &self,
        token: &crate::token::SecureToken,
        path: &str,
    ) -> SourceResult<Vec<SeatDetails>> {
        let per_page = self.client.per_page();
        let mut seats = Vec::new();

        for page in 1u32.. {
            let query = [
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ];
            let batch: SeatPage = self.client.get_json(token, path, &query).await?;
            let batch_len = batch.seats.len();
            seats.extend(batch.seats);

            if batch_len < per_page as usize {
                break;
            }
        }

        Ok(seats)
    }
}

#[async_trait]
impl OrgDataSource for GithubSource {
    #[instrument(skip(self))]
    async fn org_seats(&self, org: &str) -> SourceResult<Vec<SeatDetails>> {
        let token = self.tokens.for_org(org);
        let path = format!("/orgs/{}/copilot/billing/seats", urlencoding::encode(org));
        let seats = self.seat_pages(token, &path).await?;
        info!("Found {} copilot seats in org {}", seats.len(), org);
        Ok(seats)
    }

    async fn org_members(&self, org: &str) -> SourceResult<Vec<Account>> {
        let token = self.tokens.for_org(org);
        let path = format!("/orgs/{}/members", urlencoding::encode(org));
        self.client.get_all_pages(token, &path, &[]).await
    }

    async fn teams(&self, org: &str) -> SourceResult<Vec<TeamDetails>> {
        let token = self.tokens.for_org(org);
        let path = format!("/orgs/{}/teams", urlencoding::encode(org));
        self.client.get_all_pages(token, &path, &[]).await
    }

    async fn team_members(&self, org: &str, slug: &str) -> SourceResult<Vec<Account>> {
        let token = self.tokens.for_org(org);
        let path = format!(
            "/orgs/{}/teams/{}/members",
            urlencoding::encode(org),
            urlencoding::encode(slug)
        );
        self.client.get_all_pages(token, &path, &[]).await
    }

    async fn team_repositories(&self, org: &str, slug: &str) -> SourceResult<Vec<RepoDetails>> {
        let token = self.tokens.for_org(org);
        let path = format!(
            "/orgs/{}/teams/{}/repos",
            urlencoding::encode(org),
            urlencoding::encode(slug)
        );
        self.client.get_all_pages(token, &path, &[]).await
    }

    async fn org_repositories(&self, org: &str) -> SourceResult<Vec<RepoDetails>> {
        let token = self.tokens.for_org(org);
        let path = format!("/orgs/{}/repos", urlencoding::encode(org));
        let query = [("type", "all".to_string())];
        self.client.get_all_pages(token, &path, &query).await
    }

    async fn collaborators(&self, owner: &str, repo: &str) -> SourceResult<Vec<Account>> {
        let token = self.tokens.for_org(owner);
        let path = format!(
            "/repos/{}/{}/collaborators",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        // Direct access only; inherited org-wide access would sweep in
        // nearly every member.
        let query = [("affiliation", "direct".to_string())];
        self.client.get_all_pages(token, &path, &query).await
    }

    async fn contributors(&self, owner: &str, repo: &str) -> SourceResult<Vec<Contributor>> {
        let token = self.tokens.for_org(owner);
        let path = format!(
            "/repos/{}/{}/contributors",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        self.client.get_all_pages(token, &path, &[]).await
    }

    async fn repo_activity(
        &self,
        owner: &str,
        repo: &str,
        lookback: Lookback,
    ) -> SourceResult<Vec<ActivityEntry>> {
        let token = self.tokens.for_org(owner);
        let path = format!(
            "/repos/{}/{}/activity",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        let query = [("time_period", lookback.as_str().to_string())];
        self.client.get_all_pages(token, &path, &query).await
    }

    #[instrument(skip(self))]
    async fn enterprise_seats(&self, enterprise: &str) -> SourceResult<Vec<SeatDetails>> {
        // This endpoint only answers to a classic token.
        let token = self.tokens.classic()?;
        let path = format!(
            "/enterprises/{}/copilot/billing/seats",
            urlencoding::encode(enterprise)
        );
        let seats = self.seat_pages(token, &path).await?;
        info!(
            "Found {} copilot seats in enterprise {}",
            seats.len(),
            enterprise
        );
        Ok(seats)
    }
}
