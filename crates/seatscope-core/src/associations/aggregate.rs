//! Merging and deduplication of builder output.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

use super::types::{AssociationTriple, ContextKind, RelatedUser};

/// Distinct-association counts for one subject, summary mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationSummary {
    /// Distinct teams the subject shares with anyone.
    pub teams: usize,
    /// Distinct repositories the subject shares with anyone.
    pub repositories: usize,
    /// Distinct seat holders the subject is associated with.
    pub seat_holders: usize,
}

/// Merges team- and repository-derived triples into the detail relation.
///
/// Exact duplicates (same subject, related user, context name, context kind)
/// collapse to the first occurrence; everything else keeps first-seen order.
/// The same subject/related pair recurring under a different context is kept,
/// since per-context rows are the report's granularity.
pub fn aggregate(
    team_triples: Vec<AssociationTriple>,
    repo_triples: Vec<AssociationTriple>,
) -> Result<Vec<AssociationTriple>, EngineError> {
    let mut seen: HashSet<AssociationTriple> = HashSet::new();
    let mut merged = Vec::new();

    for triple in team_triples.into_iter().chain(repo_triples) {
        check_not_self_associated(&triple)?;
        if seen.insert(triple.clone()) {
            merged.push(triple);
        }
    }

    debug!(rows = merged.len(), "aggregated association rows");
    Ok(merged)
}

/// Collapses builder output into per-subject distinct counts.
///
/// Subjects with no licensed association anywhere are omitted; a subject
/// linked only to [`RelatedUser::Unknown`] sentinels has nothing to report.
pub fn aggregate_summary(
    team_triples: Vec<AssociationTriple>,
    repo_triples: Vec<AssociationTriple>,
) -> Result<BTreeMap<String, AssociationSummary>, EngineError> {
    #[derive(Default)]
    struct Accumulator {
        teams: HashSet<String>,
        repositories: HashSet<String>,
        seat_holders: HashSet<String>,
    }

    let mut by_subject: BTreeMap<String, Accumulator> = BTreeMap::new();

    for triple in team_triples.into_iter().chain(repo_triples) {
        check_not_self_associated(&triple)?;
        let entry = by_subject.entry(triple.subject.clone()).or_default();
        match triple.context_kind {
            ContextKind::Team => entry.teams.insert(triple.context_name.clone()),
            ContextKind::Repository => entry.repositories.insert(triple.context_name.clone()),
        };
        if let RelatedUser::Licensed(holder) = triple.related {
            entry.seat_holders.insert(holder);
        }
    }

    Ok(by_subject
        .into_iter()
        .filter(|(_, acc)| !acc.seat_holders.is_empty())
        .map(|(subject, acc)| {
            (
                subject,
                AssociationSummary {
                    teams: acc.teams.len(),
                    repositories: acc.repositories.len(),
                    seat_holders: acc.seat_holders.len(),
                },
            )
        })
        .collect())
}

/// Defensive check that a builder never paired a user with themselves.
/// Unreachable when the builders are correct; failing loudly beats writing
/// a wrong report.
fn check_not_self_associated(triple: &AssociationTriple) -> Result<(), EngineError> {
    if let RelatedUser::Licensed(holder) = &triple.related {
        if holder == &triple.subject {
            return Err(EngineError::InvariantViolation(format!(
                "user '{}' is associated with themselves in {} '{}'",
                triple.subject, triple.context_kind, triple.context_name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(subject: &str, related: RelatedUser, context: &str, kind: ContextKind) -> AssociationTriple {
        AssociationTriple {
            org: "acme".to_string(),
            subject: subject.to_string(),
            subject_has_seat: false,
            related,
            context_name: context.to_string(),
            context_kind: kind,
        }
    }

    fn licensed(login: &str) -> RelatedUser {
        RelatedUser::Licensed(login.to_string())
    }

    #[test]
    fn exact_duplicates_collapse_to_first_seen() {
        let rows = vec![
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("carol", licensed("alice"), "platform", ContextKind::Team),
        ];

        let merged = aggregate(rows, vec![]).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].subject, "bob");
        assert_eq!(merged[1].subject, "carol");
    }

    #[test]
    fn same_pair_in_different_contexts_is_kept() {
        let rows = vec![
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("alice"), "acme/app", ContextKind::Repository),
        ];

        let merged = aggregate(rows, vec![]).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn deduplication_is_idempotent() {
        let rows = vec![
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("dave"), "acme/app", ContextKind::Repository),
        ];

        let once = aggregate(rows, vec![]).unwrap();
        let twice = aggregate(once.clone(), vec![]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn self_association_fails_loudly() {
        let rows = vec![triple("alice", licensed("alice"), "platform", ContextKind::Team)];
        let err = aggregate(rows, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
    }

    #[test]
    fn summary_counts_distinct_contexts_and_holders() {
        let team_rows = vec![
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("dave"), "platform", ContextKind::Team),
            triple("bob", licensed("alice"), "infra", ContextKind::Team),
        ];
        let repo_rows = vec![
            triple("bob", licensed("alice"), "acme/app", ContextKind::Repository),
            triple("bob", licensed("erin"), "acme/app", ContextKind::Repository),
        ];

        let summary = aggregate_summary(team_rows, repo_rows).unwrap();
        let bob = &summary["bob"];
        assert_eq!(bob.teams, 2);
        assert_eq!(bob.repositories, 1);
        assert_eq!(bob.seat_holders, 3);
    }

    #[test]
    fn summary_omits_subjects_with_no_licensed_relation() {
        let rows = vec![
            triple("bob", RelatedUser::Unknown, "platform", ContextKind::Team),
            triple("carol", licensed("alice"), "platform", ContextKind::Team),
        ];

        let summary = aggregate_summary(rows, vec![]).unwrap();
        assert!(!summary.contains_key("bob"));
        assert!(summary.contains_key("carol"));
    }

    #[test]
    fn summary_matches_detail_distinct_counts() {
        let team_rows = vec![
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("alice"), "platform", ContextKind::Team),
            triple("bob", licensed("dave"), "infra", ContextKind::Team),
        ];
        let repo_rows = vec![
            triple("bob", licensed("dave"), "acme/app", ContextKind::Repository),
        ];

        let detail = aggregate(team_rows.clone(), repo_rows.clone()).unwrap();
        let summary = aggregate_summary(team_rows, repo_rows).unwrap();

        let bob = &summary["bob"];
        let detail_teams: HashSet<&str> = detail
            .iter()
            .filter(|t| t.subject == "bob" && t.context_kind == ContextKind::Team)
            .map(|t| t.context_name.as_str())
            .collect();
        let detail_repos: HashSet<&str> = detail
            .iter()
            .filter(|t| t.subject == "bob" && t.context_kind == ContextKind::Repository)
            .map(|t| t.context_name.as_str())
            .collect();

        assert_eq!(bob.teams, detail_teams.len());
        assert_eq!(bob.repositories, detail_repos.len());
    }
}
