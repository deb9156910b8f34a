use std::fmt;

use serde::Serialize;

use super::domain::{AssessmentTypeId, PeriodId};
use super::formula::FormulaError;
use super::status::AcademicStatus;

/// One arithmetic decision taken while computing a grade, in the order it was taken.
///
/// The `Display` form is the sentence printed in transcripts and promotion records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEntry {
    NoValidAssessments,
    DescriptiveValueSkipped {
        value: String,
    },
    ExcludedByType {
        type_name: String,
        value: String,
    },
    LowestScoreDropped {
        score: f64,
    },
    SimpleAverage {
        count: usize,
        sum: f64,
        average: f64,
    },
    WeightedContribution {
        type_id: AssessmentTypeId,
        type_name: String,
        count: usize,
        average: f64,
        weight: f64,
        contribution: f64,
    },
    UnweightedIgnored {
        count: usize,
    },
    WeightedAverage {
        total: f64,
    },
    RecoveryAbsent,
    RecoverySubstituted {
        recovery_grade: f64,
        regular_average: f64,
    },
    RecoveryKept {
        recovery_grade: f64,
        regular_average: f64,
    },
    PeriodCountDefaulted {
        configured: Option<u32>,
        applied: u32,
    },
    DefaultAverage {
        sum: f64,
        period_count: u32,
        graded_periods: usize,
        result: f64,
    },
    UnresolvedPlaceholder {
        placeholder: String,
    },
    FormulaEvaluated {
        formula: String,
        result: f64,
    },
    FormulaRejected {
        formula: String,
        error: FormulaError,
    },
    /// Combined grade that overflowed before or during rounding.
    NonFiniteGrade {
        raw: f64,
    },
    Classified {
        final_grade: f64,
        status: AcademicStatus,
        passing_grade: f64,
        min_dependency_grade: f64,
    },
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEntry::NoValidAssessments => {
                write!(f, "no valid regular assessments; regular average is 0")
            }
            AuditEntry::DescriptiveValueSkipped { value } => {
                write!(f, "descriptive value {value} skipped (not a numeric score)")
            }
            AuditEntry::ExcludedByType { type_name, value } => write!(
                f,
                "value {value} ignored: type '{type_name}' does not count toward the average"
            ),
            AuditEntry::LowestScoreDropped { score } => {
                write!(f, "lowest score {score:.2} excluded from the average")
            }
            AuditEntry::SimpleAverage {
                count,
                sum,
                average,
            } => write!(
                f,
                "simple average of {count} score(s): {sum:.2} / {count} = {average:.2}"
            ),
            AuditEntry::WeightedContribution {
                type_name,
                count,
                average,
                weight,
                contribution,
                ..
            } => {
                if *count == 0 {
                    write!(
                        f,
                        "type '{type_name}' ({weight}%): no assessments, contributes 0"
                    )
                } else {
                    write!(
                        f,
                        "type '{type_name}' ({weight}%): average {average:.2} of {count} score(s) contributes {contribution:.2}"
                    )
                }
            }
            AuditEntry::UnweightedIgnored { count } => write!(
                f,
                "{count} assessment(s) of types without a configured weight ignored"
            ),
            AuditEntry::WeightedAverage { total } => {
                write!(f, "weighted regular average {total:.2}")
            }
            AuditEntry::RecoveryAbsent => write!(f, "no recovery assessment for this period"),
            AuditEntry::RecoverySubstituted {
                recovery_grade,
                regular_average,
            } => write!(
                f,
                "recovery grade {recovery_grade:.2} replaces regular average {regular_average:.2}"
            ),
            AuditEntry::RecoveryKept {
                recovery_grade,
                regular_average,
            } => write!(
                f,
                "recovery grade {recovery_grade:.2} does not exceed regular average {regular_average:.2}; average kept"
            ),
            AuditEntry::PeriodCountDefaulted {
                configured,
                applied,
            } => match configured {
                Some(configured) => write!(
                    f,
                    "configured period count {configured} is unusable; using {applied}"
                ),
                None => write!(f, "period count not configured; using {applied}"),
            },
            AuditEntry::DefaultAverage {
                sum,
                period_count,
                graded_periods,
                result,
            } => write!(
                f,
                "final grade = {sum:.2} / {period_count} = {result:.4} ({graded_periods} period(s) supplied)"
            ),
            AuditEntry::UnresolvedPlaceholder { placeholder } => {
                write!(f, "{placeholder} has no graded period; substituted with 0")
            }
            AuditEntry::FormulaEvaluated { formula, result } => {
                write!(f, "formula '{formula}' evaluated to {result:.4}")
            }
            AuditEntry::FormulaRejected { formula, error } => {
                write!(f, "formula '{formula}' rejected ({error}); final grade is 0")
            }
            AuditEntry::NonFiniteGrade { raw } => {
                write!(f, "combined grade {raw} is not a finite number; final grade is 0")
            }
            AuditEntry::Classified {
                final_grade,
                status,
                passing_grade,
                min_dependency_grade,
            } => write!(
                f,
                "final grade {final_grade:.1} classified as {} (passing {passing_grade:.1}, dependency {min_dependency_grade:.1})",
                status.label()
            ),
        }
    }
}

/// Outcome for one grading period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodCalculationResult {
    pub period_id: PeriodId,
    pub period_name: String,
    pub regular_average: f64,
    pub recovery_grade: Option<f64>,
    /// Regular average after recovery substitution; never below `regular_average`.
    pub final_grade: f64,
    pub recovery_used: bool,
    pub log: Vec<AuditEntry>,
}

/// How the per-period grades were combined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FinalGradeMethod {
    Formula { expression: String },
    DefaultAverage { period_count: u32 },
}

/// Which rule and combination produced a subject result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationTrace {
    pub rule_id: Option<String>,
    pub method: FinalGradeMethod,
    pub formula_error: Option<FormulaError>,
    pub passing_grade: f64,
    pub min_dependency_grade: f64,
    pub log: Vec<AuditEntry>,
}

/// Outcome for one (student, subject) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectCalculationResult {
    /// Rounded to one decimal place; classification uses this value.
    pub final_grade: f64,
    pub raw_final_grade: f64,
    pub passed: bool,
    pub status: AcademicStatus,
    pub periods: Vec<PeriodCalculationResult>,
    pub trace: CalculationTrace,
}

impl SubjectCalculationResult {
    /// Every audit line, period entries first, in the order they were recorded.
    pub fn audit_lines(&self) -> Vec<String> {
        self.periods
            .iter()
            .flat_map(|period| {
                period
                    .log
                    .iter()
                    .map(move |entry| format!("{}: {entry}", period.period_name))
            })
            .chain(self.trace.log.iter().map(ToString::to_string))
            .collect()
    }
}
