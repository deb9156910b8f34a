use serde::{Deserialize, Serialize};

use super::result::AuditEntry;

/// Policy deciding how a recovery exam affects a period grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// The best recovery score replaces the regular average only when strictly greater.
    #[default]
    ReplaceIfHigher,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RecoveryOutcome {
    pub recovery_grade: Option<f64>,
    pub final_grade: f64,
    pub used: bool,
}

impl RecoveryStrategy {
    pub(crate) fn apply(
        self,
        regular_average: f64,
        recovery_scores: &[f64],
        log: &mut Vec<AuditEntry>,
    ) -> RecoveryOutcome {
        match self {
            RecoveryStrategy::ReplaceIfHigher => {
                replace_if_higher(regular_average, recovery_scores, log)
            }
        }
    }
}

fn replace_if_higher(
    regular_average: f64,
    recovery_scores: &[f64],
    log: &mut Vec<AuditEntry>,
) -> RecoveryOutcome {
    let Some(best) = recovery_scores.iter().copied().reduce(f64::max) else {
        log.push(AuditEntry::RecoveryAbsent);
        return RecoveryOutcome {
            recovery_grade: None,
            final_grade: regular_average,
            used: false,
        };
    };

    if best > regular_average {
        log.push(AuditEntry::RecoverySubstituted {
            recovery_grade: best,
            regular_average,
        });
        RecoveryOutcome {
            recovery_grade: Some(best),
            final_grade: best,
            used: true,
        }
    } else {
        log.push(AuditEntry::RecoveryKept {
            recovery_grade: best,
            regular_average,
        });
        RecoveryOutcome {
            recovery_grade: Some(best),
            final_grade: regular_average,
            used: false,
        }
    }
}
