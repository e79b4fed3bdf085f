//! Output types and derivation modes for association building.

use serde::{Deserialize, Serialize};

/// The licensed side of an association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedUser {
    /// A seat holder the subject shares the context with.
    Licensed(String),
    /// No seat holder exists in the context (permissive mode only).
    Unknown,
    /// The subject holds a seat themselves (emitted only when seat holders
    /// are included as subjects).
    SelfHolder,
}

impl std::fmt::Display for RelatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelatedUser::Licensed(login) => write!(f, "{}", login),
            RelatedUser::Unknown => write!(f, "Unknown"),
            RelatedUser::SelfHolder => write!(f, "Self"),
        }
    }
}

/// Which kind of shared context produced an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Team,
    Repository,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextKind::Team => write!(f, "team"),
            ContextKind::Repository => write!(f, "repository"),
        }
    }
}

/// One derived association row.
///
/// For a given (subject, context) pair there is one triple per distinct
/// related seat holder; the fan-out is intentional and only the summary
/// aggregation collapses it into counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssociationTriple {
    /// Organization the association was derived in.
    pub org: String,
    /// The user being reported on.
    pub subject: String,
    /// Whether the subject holds a seat in this org.
    pub subject_has_seat: bool,
    /// The seat holder they are associated with.
    pub related: RelatedUser,
    /// Team name or repository full name.
    pub context_name: String,
    /// Whether the context is a team or a repository.
    pub context_kind: ContextKind,
}

/// Policy for a context with no licensed user in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSeatPolicy {
    /// Emit nothing for the context.
    #[default]
    Strict,
    /// Emit one sentinel row per unlicensed member, with the related user
    /// reported as [`RelatedUser::Unknown`].
    Permissive,
}

/// Caller-selected derivation modes.
///
/// Both knobs are explicit because the reporting requirements never settled
/// on a single answer; defaults match the strict, holders-excluded reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociationOptions {
    /// How to treat contexts with no seat holder.
    pub zero_seat_policy: ZeroSeatPolicy,
    /// When true, seat holders also appear as subjects, each with a single
    /// "Self" row per context, instead of being excluded from the subject
    /// role entirely.
    pub include_seat_holders: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_user_display() {
        assert_eq!(RelatedUser::Licensed("alice".into()).to_string(), "alice");
        assert_eq!(RelatedUser::Unknown.to_string(), "Unknown");
        assert_eq!(RelatedUser::SelfHolder.to_string(), "Self");
    }

    #[test]
    fn context_kind_display() {
        assert_eq!(ContextKind::Team.to_string(), "team");
        assert_eq!(ContextKind::Repository.to_string(), "repository");
    }

    #[test]
    fn default_options_are_strict_and_exclude_holders() {
        let options = AssociationOptions::default();
        assert_eq!(options.zero_seat_policy, ZeroSeatPolicy::Strict);
        assert!(!options.include_seat_holders);
    }

    #[test]
    fn triple_serializes_with_snake_case_variants() {
        let triple = AssociationTriple {
            org: "acme".into(),
            subject: "bob".into(),
            subject_has_seat: false,
            related: RelatedUser::Unknown,
            context_name: "platform".into(),
            context_kind: ContextKind::Team,
        };
        let json = serde_json::to_value(&triple).unwrap();
        assert_eq!(json["related"], "unknown");
        assert_eq!(json["context_kind"], "team");
    }
}
