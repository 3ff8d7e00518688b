use std::collections::{BTreeMap, VecDeque};

use battle_core::{BattleContext, BattleError, BattleErrorKind};
use serde::{Deserialize, Serialize};

use super::policy::RecoveryDirective;

/// Number of error records retained.
pub const RECENT_ERROR_LIMIT: usize = 50;

/// One handled error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: BattleErrorKind,
    pub message: String,
    pub suggested_action: String,
    pub context: Option<BattleContext>,
    /// `None` for validation failures that only get reported.
    pub directive: Option<RecoveryDirective>,
    pub timestamp: u64,
}

impl ErrorRecord {
    pub fn new(error: &BattleError, directive: Option<RecoveryDirective>, timestamp: u64) -> Self {
        Self {
            kind: error.kind,
            message: error.message.clone(),
            suggested_action: error.suggested_action().to_string(),
            context: error.context().cloned(),
            directive,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStatistics {
    pub total: u64,
    pub by_kind: BTreeMap<BattleErrorKind, u64>,
    /// Most recent last.
    pub recent: VecDeque<ErrorRecord>,
}

impl ErrorStatistics {
    pub(crate) fn push(&mut self, record: ErrorRecord) {
        self.total += 1;
        *self.by_kind.entry(record.kind).or_default() += 1;
        if self.recent.len() == RECENT_ERROR_LIMIT {
            self.recent.pop_front();
        }
        self.recent.push_back(record);
    }

    pub fn count(&self, kind: BattleErrorKind) -> u64 {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn most_frequent(&self) -> Option<BattleErrorKind> {
        self.by_kind
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(kind, _)| *kind)
    }

    pub fn last(&self) -> Option<&ErrorRecord> {
        self.recent.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_records_are_bounded() {
        let mut stats = ErrorStatistics::default();
        for i in 0..(RECENT_ERROR_LIMIT + 5) {
            let err = BattleError::out_of_range(format!("attempt {i}"));
            stats.push(ErrorRecord::new(&err, None, i as u64));
        }

        assert_eq!(stats.total, (RECENT_ERROR_LIMIT + 5) as u64);
        assert_eq!(stats.recent.len(), RECENT_ERROR_LIMIT);
        assert_eq!(stats.recent.front().unwrap().message, "attempt 5");
        assert_eq!(stats.count(BattleErrorKind::OutOfRange), stats.total);
    }

    #[test]
    fn most_frequent_kind() {
        let mut stats = ErrorStatistics::default();
        stats.push(ErrorRecord::new(&BattleError::system("a"), None, 0));
        stats.push(ErrorRecord::new(&BattleError::invalid_target("b"), None, 0));
        stats.push(ErrorRecord::new(&BattleError::invalid_target("c"), None, 0));

        assert_eq!(stats.most_frequent(), Some(BattleErrorKind::InvalidTarget));
        assert_eq!(stats.last().unwrap().message, "c");
    }
}
