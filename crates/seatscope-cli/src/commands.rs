//! Command implementations.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use seatscope_core::{
    aggregate, aggregate_summary, repository_associations, team_associations, AssociationOptions,
    AssociationTriple, OrgSnapshot, SeatIndex, ZeroSeatPolicy,
};
use seatscope_github::{team_seat_holders_by_repo, GithubSource, SnapshotFetcher};

use crate::config::AppConfig;
use crate::report::{
    detail_rows, render_detail, render_summary, summary_rows, write_report, ReportFormat,
};
use crate::store;

/// Report command options.
pub struct ReportArgs {
    pub summary: bool,
    pub refresh: bool,
    pub format: ReportFormat,
    pub permissive: bool,
    pub include_seat_holders: bool,
}

impl ReportArgs {
    fn options(&self) -> AssociationOptions {
        AssociationOptions {
            zero_seat_policy: if self.permissive {
                ZeroSeatPolicy::Permissive
            } else {
                ZeroSeatPolicy::Strict
            },
            include_seat_holders: self.include_seat_holders,
        }
    }
}

/// Fetches and caches snapshots for every configured organization, plus the
/// enterprise seat listing when an enterprise is configured.
pub async fn run_fetch(config: &AppConfig) -> Result<()> {
    config.require_organizations()?;

    let tokens = config.tokens.resolve()?;
    let source = GithubSource::new(config.github.clone(), tokens)?;
    let fetcher = SnapshotFetcher::new(&source, config.lookback);

    for org in &config.organizations {
        println!("{} {}", "Fetching snapshot for".cyan(), org.bold());
        let snapshot = fetcher.fetch_org(org).await?;
        let path = store::write_snapshot(&config.output_dir, &snapshot)?;
        println!("  {} {}", "saved".green(), path.display());
    }

    if let Some(enterprise) = &config.enterprise {
        println!("{} {}", "Fetching enterprise seats for".cyan(), enterprise.bold());
        let seats = fetcher.fetch_enterprise_seats(enterprise).await?;
        let path = store::write_enterprise_seats(&config.output_dir, enterprise, &seats)?;
        println!("  {} {}", "saved".green(), path.display());
    }

    Ok(())
}

/// Derives associations for every configured organization and writes the
/// report file. Nothing is written when any step fails.
pub async fn run_report(config: &AppConfig, args: &ReportArgs) -> Result<PathBuf> {
    config.require_organizations()?;
    let options = args.options();

    let mut team_triples = Vec::new();
    let mut repo_triples = Vec::new();
    for org in &config.organizations {
        let snapshot = load_snapshot(config, org, args.refresh).await?;
        let (teams, repos) = derive_org(&snapshot, &options);
        team_triples.extend(teams);
        repo_triples.extend(repos);
    }

    let (file_name, content) = if args.summary {
        let summary = aggregate_summary(team_triples, repo_triples)?;
        info!("Summary report covers {} members", summary.len());
        (
            format!("copilot_associations_summary.{}", args.format.extension()),
            render_summary(&summary_rows(&summary), args.format)?,
        )
    } else {
        let rows = aggregate(team_triples, repo_triples)?;
        info!("Detail report has {} rows", rows.len());
        (
            format!("copilot_associations.{}", args.format.extension()),
            render_detail(&detail_rows(&rows), args.format)?,
        )
    };

    Ok(write_report(&config.output_dir, &file_name, &content)?)
}

/// Runs both builders over one snapshot.
fn derive_org(
    snapshot: &OrgSnapshot,
    options: &AssociationOptions,
) -> (Vec<AssociationTriple>, Vec<AssociationTriple>) {
    let seats = SeatIndex::new(snapshot.seats());

    let team_triples: Vec<AssociationTriple> = snapshot
        .teams()
        .flat_map(|team| team_associations(team, &seats, snapshot.org(), options))
        .collect();

    let holders_by_repo = team_seat_holders_by_repo(snapshot, &seats);
    let no_holders: Vec<String> = Vec::new();
    let repo_triples: Vec<AssociationTriple> = snapshot
        .repositories()
        .flat_map(|repo| {
            let team_holders = holders_by_repo
                .get(&repo.full_name())
                .unwrap_or(&no_holders);
            repository_associations(repo, &seats, team_holders, snapshot.org(), options)
        })
        .collect();

    (team_triples, repo_triples)
}

/// Reuses the cached snapshot unless a refresh was requested or no cache
/// exists yet.
async fn load_snapshot(config: &AppConfig, org: &str, refresh: bool) -> Result<OrgSnapshot> {
    if !refresh {
        if let Some(snapshot) = store::read_snapshot(&config.output_dir, org)? {
            info!("Using cached snapshot for org {}", org);
            return Ok(snapshot);
        }
    }

    let tokens = config.tokens.resolve()?;
    let source = GithubSource::new(config.github.clone(), tokens)?;
    let fetcher = SnapshotFetcher::new(&source, config.lookback);
    let snapshot = fetcher.fetch_org(org).await?;
    store::write_snapshot(&config.output_dir, &snapshot)?;
    Ok(snapshot)
}
