use chrono::{DateTime, SecondsFormat, Utc};

/// The (id, timestamp) tag shared by every ranking of one run
///
/// The id is fixed when the run starts and never refreshed per term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pull {
    pub id: i64,
    pub issued_at: DateTime<Utc>,
}

impl Pull {
    /// Starts the pull that follows `previous_max`, or pull 1 with no history
    pub fn next_after(previous_max: Option<i64>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: previous_max.map_or(1, |max| max + 1),
            issued_at,
        }
    }

    /// ISO-8601 UTC form used in headers and the database
    pub fn timestamp(&self) -> String {
        self.issued_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
