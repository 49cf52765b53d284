use serde::{Deserialize, Serialize};

use super::model::{StudentDataset, StudentRecord};

/// Rule deriving the "needs advising" column.
///
/// A record is flagged when any of the following holds:
/// * its engagement score is below `engagement_threshold`
/// * it is known not to have been retained
/// * its advising flag is set
///
/// Missing values never trigger their clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRule {
    pub engagement_threshold: f64,
}

impl Default for RiskRule {
    fn default() -> Self {
        Self {
            engagement_threshold: 55.0,
        }
    }
}

impl RiskRule {
    pub fn needs_advising(&self, record: &StudentRecord) -> bool {
        record
            .engagement_score
            .is_some_and(|score| score < self.engagement_threshold)
            || record.retained == Some(false)
            || record.advising_flag == Some(true)
    }
}

/// The risk column for the given rows, aligned with `indices`.
pub fn risk_flags(dataset: &StudentDataset, indices: &[usize], rule: &RiskRule) -> Vec<bool> {
    indices
        .iter()
        .map(|&i| rule.needs_advising(&dataset.records[i]))
        .collect()
}
