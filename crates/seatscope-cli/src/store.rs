//! Snapshot persistence.
//!
//! Fetched snapshots are cached as JSON under the output directory, keyed
//! by organization name, so a report run can reuse them instead of hitting
//! the API again. Snapshots re-validate on load; a hand-edited or
//! truncated cache file fails instead of producing a wrong report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use seatscope_core::OrgSnapshot;
use seatscope_github::EnterpriseSeat;

/// Path of the cached snapshot for an organization.
pub fn snapshot_path(dir: &Path, org: &str) -> PathBuf {
    dir.join(format!("{}-snapshot.json", org))
}

/// Path of the cached enterprise seat listing.
pub fn enterprise_seats_path(dir: &Path, enterprise: &str) -> PathBuf {
    dir.join(format!("{}-enterprise-seats.json", enterprise))
}

/// Writes a snapshot to its cache file, creating the directory if needed.
pub fn write_snapshot(dir: &Path, snapshot: &OrgSnapshot) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = snapshot_path(dir, snapshot.org());
    let contents = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

    info!("Snapshot for org {} saved to {}", snapshot.org(), path.display());
    Ok(path)
}

/// Reads a cached snapshot, if one exists. Validation happens on
/// deserialization.
pub fn read_snapshot(dir: &Path, org: &str) -> Result<Option<OrgSnapshot>> {
    let path = snapshot_path(dir, org);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
    let snapshot: OrgSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid snapshot file {}", path.display()))?;

    Ok(Some(snapshot))
}

/// Writes the enterprise seat listing next to the org snapshots.
pub fn write_enterprise_seats(
    dir: &Path,
    enterprise: &str,
    seats: &[EnterpriseSeat],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = enterprise_seats_path(dir, enterprise);
    let contents = serde_json::to_string_pretty(seats)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write enterprise seats to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use seatscope_core::SeatAssignment;
    use tempfile::TempDir;

    fn snapshot(org: &str) -> OrgSnapshot {
        OrgSnapshot::new(
            org,
            Utc::now(),
            vec!["alice".to_string()],
            vec![SeatAssignment::new("alice", None)],
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn round_trips_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let original = snapshot("acme");

        write_snapshot(dir.path(), &original).unwrap();
        let restored = read_snapshot(dir.path(), "acme").unwrap().unwrap();

        assert_eq!(restored.org(), "acme");
        assert_eq!(restored.seats(), original.seats());
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_snapshot(dir.path(), "ghost").unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshot_fails_instead_of_reporting_wrong_data() {
        let dir = TempDir::new().unwrap();
        std::fs::write(snapshot_path(dir.path(), "acme"), "{not json").unwrap();

        assert!(read_snapshot(dir.path(), "acme").is_err());
    }

    #[test]
    fn writes_enterprise_seats() {
        let dir = TempDir::new().unwrap();
        let seats = vec![EnterpriseSeat {
            assignee: "alice".to_string(),
            organization: "acme".to_string(),
        }];

        let path = write_enterprise_seats(dir.path(), "megacorp", &seats).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let restored: Vec<EnterpriseSeat> = serde_json::from_str(&contents).unwrap();
        assert_eq!(restored, seats);
    }
}
