//! Association derivation.
//!
//! Builders turn one team or repository into [`AssociationTriple`] values;
//! the aggregator merges and deduplicates builder output into the final
//! relation, in detail or summary form.

mod aggregate;
mod repository;
mod team;
mod types;

pub use aggregate::{aggregate, aggregate_summary, AssociationSummary};
pub use repository::repository_associations;
pub use team::team_associations;
pub use types::{AssociationOptions, AssociationTriple, ContextKind, RelatedUser, ZeroSeatPolicy};

/// Deduplicates logins preserving first-seen order.
///
/// Data-source anomalies can list the same login twice in one membership or
/// contributor list; every builder collapses those before partitioning.
pub(crate) fn dedup_logins<'a, I>(logins: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = std::collections::HashSet::new();
    logins
        .into_iter()
        .map(String::as_str)
        .filter(|login| seen.insert(*login))
        .collect()
}
