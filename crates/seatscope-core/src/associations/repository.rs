//! Repository-derived associations.

use tracing::debug;

use crate::seats::SeatIndex;
use crate::snapshot::Repository;

use super::types::{
    AssociationOptions, AssociationTriple, ContextKind, RelatedUser, ZeroSeatPolicy,
};
use super::dedup_logins;

/// Derives the association rows for one repository.
///
/// Collaborators and contributors are deduplicated and partitioned
/// separately, so a contributor without collaborator access is still
/// reported and vice versa. The unlicensed subjects from both lists are
/// merged before emitting, which keeps a user present in both roles from
/// producing duplicate rows for the same seat holder.
///
/// The related seat holders for the repository are the union of licensed
/// collaborators, licensed contributors, and `team_seat_holders` — seat
/// holders belonging to a team with access to this repository, supplied by
/// the ingestion layer rather than re-derived here.
pub fn repository_associations(
    repo: &Repository,
    seats: &SeatIndex,
    team_seat_holders: &[String],
    org: &str,
    options: &AssociationOptions,
) -> Vec<AssociationTriple> {
    let collaborators = dedup_logins(&repo.collaborators);
    let contributors = dedup_logins(&repo.contributors);

    let (licensed_collaborators, other_collaborators): (Vec<&str>, Vec<&str>) =
        collaborators.iter().partition(|login| seats.has_seat(login));
    let (licensed_contributors, other_contributors): (Vec<&str>, Vec<&str>) =
        contributors.iter().partition(|login| seats.has_seat(login));

    let related = merge_ordered(
        licensed_collaborators
            .iter()
            .copied()
            .chain(licensed_contributors.iter().copied())
            .chain(team_seat_holders.iter().map(String::as_str)),
    );
    let subjects = merge_ordered(
        other_collaborators
            .iter()
            .copied()
            .chain(other_contributors.iter().copied()),
    );

    debug!(
        repo = %repo.full_name(),
        subjects = subjects.len(),
        seat_holders = related.len(),
        "deriving repository associations"
    );

    let full_name = repo.full_name();
    let mut triples = Vec::new();

    for subject in &subjects {
        if related.is_empty() {
            if options.zero_seat_policy == ZeroSeatPolicy::Permissive {
                triples.push(triple(org, subject, false, RelatedUser::Unknown, &full_name));
            }
            continue;
        }
        for holder in &related {
            triples.push(triple(
                org,
                subject,
                false,
                RelatedUser::Licensed(holder.to_string()),
                &full_name,
            ));
        }
    }

    if options.include_seat_holders {
        let holders_on_repo = merge_ordered(
            licensed_collaborators
                .iter()
                .copied()
                .chain(licensed_contributors.iter().copied()),
        );
        for holder in &holders_on_repo {
            triples.push(triple(org, holder, true, RelatedUser::SelfHolder, &full_name));
        }
    }

    triples
}

/// Union preserving first-seen order.
fn merge_ordered<'a>(logins: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    logins.filter(|login| seen.insert(*login)).collect()
}

fn triple(
    org: &str,
    subject: &str,
    subject_has_seat: bool,
    related: RelatedUser,
    full_name: &str,
) -> AssociationTriple {
    AssociationTriple {
        org: org.to_string(),
        subject: subject.to_string(),
        subject_has_seat,
        related,
        context_name: full_name.to_string(),
        context_kind: ContextKind::Repository,
    }
}
