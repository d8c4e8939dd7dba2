use std::collections::HashSet;

use super::ConfigError;

/// Status codes that force a retryable outcome even though a response arrived.
///
/// Empty set means no status forces a retry. Membership is checked before the
/// 2xx-range test, so a configured 2xx code still triggers a retry.
#[derive(Debug, Clone, Default)]
pub struct RetryStatusSet(HashSet<u16>);

impl RetryStatusSet {
    /// Parses a comma-separated status list; the empty string yields the
    /// empty set. Non-numeric entries fail validation outright.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut statuses = HashSet::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let code: u16 = entry.parse().map_err(|_| {
                ConfigError::InvalidRetryStatuses(format!("'{entry}' is not a status code"))
            })?;
            statuses.insert(code);
        }
        Ok(Self(statuses))
    }

    pub fn contains(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<u16> for RetryStatusSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
