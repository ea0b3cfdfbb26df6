//! Status classification against the configured whitelist.

use std::collections::HashSet;

/// Statuses whose bodies are handed to the validators.
///
/// Anything outside the set is rejected before the body is read, whatever
/// the body contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWhitelist {
    statuses: HashSet<u16>,
}

impl StatusWhitelist {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    pub fn is_acceptable(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }
}

impl Default for StatusWhitelist {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ACCEPTABLE_STATUSES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let whitelist = StatusWhitelist::default();
        for status in [200, 201, 202, 400, 401, 403, 409, 422, 500] {
            assert!(whitelist.is_acceptable(status), "{} should pass", status);
        }
        for status in [204, 301, 404, 502, 503] {
            assert!(!whitelist.is_acceptable(status), "{} should be rejected", status);
        }
    }

    #[test]
    fn test_custom_set() {
        let whitelist = StatusWhitelist::new([200, 404, 404]);
        assert!(whitelist.is_acceptable(404));
        assert!(!whitelist.is_acceptable(500));
        assert!(!StatusWhitelist::new([]).is_acceptable(200));
    }
}
