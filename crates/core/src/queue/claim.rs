//! Lease markers written into the status cell while a row is in flight.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

const MARKER_PREFIX: &str = "Processing";

/// A run's reservation of a queue row.
///
/// Stored in the status cell as `Processing <run-id> <rfc3339>`. The value
/// is not `complete`, so an abandoned claim never blocks the row forever:
/// once older than the lease it is eligible again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub run_id: String,
    pub claimed_at: DateTime<Utc>,
}

impl Claim {
    pub fn new(run_id: impl Into<String>, claimed_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            claimed_at,
        }
    }

    /// A claim with a fresh random run id.
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string(), now)
    }

    /// Cell value representing this claim.
    pub fn marker(&self) -> String {
        format!(
            "{} {} {}",
            MARKER_PREFIX,
            self.run_id,
            self.claimed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Parse a status cell; `None` when it is not a claim marker.
    pub fn parse(status: &str) -> Option<Self> {
        let mut parts = status.split_whitespace();
        let prefix = parts.next()?;
        if !prefix.eq_ignore_ascii_case(MARKER_PREFIX) {
            return None;
        }
        let run_id = parts.next()?;
        let claimed_at = DateTime::parse_from_rfc3339(parts.next()?)
            .ok()?
            .with_timezone(&Utc);
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(run_id, claimed_at))
    }

    /// Whether the lease still holds at `now`.
    pub fn is_live(&self, now: DateTime<Utc>, lease: Duration) -> bool {
        now.signed_duration_since(self.claimed_at) < lease
    }
}
