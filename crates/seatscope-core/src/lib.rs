//! # seatscope-core
//!
//! Core association-derivation engine for Seatscope.
//!
//! This crate holds the in-memory data model for one organization's Copilot
//! seat assignments, teams, and repositories, and derives the
//! "non-licensed user works alongside licensed user" relation from it. It is
//! purely synchronous and performs no I/O: ingestion hands it one
//! fully-resolved [`OrgSnapshot`] per run and every derivation is a pure
//! function of that snapshot.

pub mod associations;
pub mod error;
pub mod seats;
pub mod snapshot;

pub use associations::{
    aggregate, aggregate_summary, repository_associations, team_associations, AssociationOptions,
    AssociationSummary, AssociationTriple, ContextKind, RelatedUser, ZeroSeatPolicy,
};
pub use error::EngineError;
pub use seats::SeatIndex;
pub use snapshot::{ActiveUser, OrgSnapshot, Repository, SeatAssignment, Team};
