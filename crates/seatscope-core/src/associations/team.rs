//! Team-derived associations.

use tracing::debug;

use crate::seats::SeatIndex;
use crate::snapshot::Team;

use super::types::{
    AssociationOptions, AssociationTriple, ContextKind, RelatedUser, ZeroSeatPolicy,
};
use super::dedup_logins;

/// Derives the association rows for one team.
///
/// Members are deduplicated, then partitioned into seat holders and
/// non-holders preserving the original order. Every non-holder is paired
/// with every holder on the team; a team with no holders falls back to the
/// zero-seat policy, and a team with no non-holders produces nothing
/// (unless seat holders are included as subjects).
pub fn team_associations(
    team: &Team,
    seats: &SeatIndex,
    org: &str,
    options: &AssociationOptions,
) -> Vec<AssociationTriple> {
    let members = dedup_logins(&team.members);
    let (holders, others): (Vec<&str>, Vec<&str>) =
        members.iter().partition(|login| seats.has_seat(login));

    debug!(
        team = %team.slug,
        members = members.len(),
        seat_holders = holders.len(),
        "deriving team associations"
    );

    let mut triples = Vec::new();

    for subject in &others {
        if holders.is_empty() {
            if options.zero_seat_policy == ZeroSeatPolicy::Permissive {
                triples.push(triple(org, subject, false, RelatedUser::Unknown, team));
            }
            continue;
        }
        for holder in &holders {
            triples.push(triple(
                org,
                subject,
                false,
                RelatedUser::Licensed(holder.to_string()),
                team,
            ));
        }
    }

    if options.include_seat_holders {
        for holder in &holders {
            triples.push(triple(org, holder, true, RelatedUser::SelfHolder, team));
        }
    }

    triples
}

fn triple(
    org: &str,
    subject: &str,
    subject_has_seat: bool,
    related: RelatedUser,
    team: &Team,
) -> AssociationTriple {
    AssociationTriple {
        org: org.to_string(),
        subject: subject.to_string(),
        subject_has_seat,
        related,
        context_name: team.name.clone(),
        context_kind: ContextKind::Team,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SeatAssignment;

    fn team(name: &str, members: &[&str]) -> Team {
        Team {
            slug: name.to_lowercase(),
            name: name.to_string(),
            description: None,
            members: members.iter().map(|s| s.to_string()).collect(),
            repositories: Vec::new(),
        }
    }

    fn seats(holders: &[&str]) -> SeatIndex {
        let assignments: Vec<SeatAssignment> = holders
            .iter()
            .map(|login| SeatAssignment::new(*login, None))
            .collect();
        SeatIndex::new(&assignments)
    }

    #[test]
    fn pairs_every_non_holder_with_every_holder() {
        let team = team("Platform", &["alice", "bob", "carol", "dave"]);
        let index = seats(&["alice", "dave"]);

        let triples =
            team_associations(&team, &index, "acme", &AssociationOptions::default());

        // |U| x |L| = 2 x 2, each combination exactly once.
        assert_eq!(triples.len(), 4);
        for subject in ["bob", "carol"] {
            for holder in ["alice", "dave"] {
                assert!(triples.iter().any(|t| {
                    t.subject == subject
                        && t.related == RelatedUser::Licensed(holder.to_string())
                        && t.context_name == "Platform"
                        && t.context_kind == ContextKind::Team
                }));
            }
        }
        assert!(triples.iter().all(|t| !t.subject_has_seat));
    }

    #[test]
    fn seat_holder_never_appears_as_subject_by_default() {
        let team = team("Platform", &["alice", "bob"]);
        let index = seats(&["alice"]);

        let triples =
            team_associations(&team, &index, "acme", &AssociationOptions::default());
        assert!(triples.iter().all(|t| t.subject != "alice"));
    }

    #[test]
    fn zero_holders_strict_emits_nothing() {
        let team = team("Platform", &["bob", "carol"]);
        let index = seats(&[]);

        let triples =
            team_associations(&team, &index, "acme", &AssociationOptions::default());
        assert!(triples.is_empty());
    }

    #[test]
    fn zero_holders_permissive_emits_unknown_sentinels() {
        let team = team("Platform", &["bob", "carol"]);
        let index = seats(&[]);
        let options = AssociationOptions {
            zero_seat_policy: ZeroSeatPolicy::Permissive,
            ..Default::default()
        };

        let triples = team_associations(&team, &index, "acme", &options);
        assert_eq!(triples.len(), 2);
        assert!(triples.iter().all(|t| t.related == RelatedUser::Unknown));
    }

    #[test]
    fn all_holders_emits_nothing_without_self_rows() {
        let team = team("Platform", &["alice", "dave"]);
        let index = seats(&["alice", "dave"]);

        let triples =
            team_associations(&team, &index, "acme", &AssociationOptions::default());
        assert!(triples.is_empty());
    }

    #[test]
    fn include_seat_holders_adds_self_rows() {
        let team = team("Platform", &["alice", "bob"]);
        let index = seats(&["alice"]);
        let options = AssociationOptions {
            include_seat_holders: true,
            ..Default::default()
        };

        let triples = team_associations(&team, &index, "acme", &options);
        let self_rows: Vec<_> = triples
            .iter()
            .filter(|t| t.related == RelatedUser::SelfHolder)
            .collect();
        assert_eq!(self_rows.len(), 1);
        assert_eq!(self_rows[0].subject, "alice");
        assert!(self_rows[0].subject_has_seat);
    }

    #[test]
    fn duplicate_membership_counts_once() {
        let team = team("Platform", &["bob", "alice", "bob"]);
        let index = seats(&["alice"]);

        let triples =
            team_associations(&team, &index, "acme", &AssociationOptions::default());
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].subject, "bob");
    }
}
