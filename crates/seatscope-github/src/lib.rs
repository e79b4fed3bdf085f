//! # seatscope-github
//!
//! GitHub REST ingestion for Seatscope: paginated, rate-limited fetchers for
//! Copilot seat assignments, teams, and repository collaborator/contributor
//! data, plus the assembly of one fully-resolved
//! [`seatscope_core::OrgSnapshot`] per run.
//!
//! All network concerns live here — retry, backoff, token selection,
//! pagination — so the core engine only ever sees resolved snapshots.

pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod lookback;
pub mod source;
pub mod testing;
pub mod token;
pub mod types;

pub use config::GithubConfig;
pub use error::{SourceError, SourceResult};
pub use fetch::{team_seat_holders_by_repo, EnterpriseSeat, FetchError, SnapshotFetcher};
pub use http::{GithubClient, RateLimitConfig};
pub use lookback::Lookback;
pub use source::{GithubSource, OrgDataSource};
pub use token::{SecureToken, TokenStore};
