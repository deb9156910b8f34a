//! Per-period grades, final grade and academic status for one student in one subject.
//!
//! Each period is aggregated independently (weighted-by-type or simple average, then
//! recovery substitution), the period grades are combined by the rule's formula or the
//! default divisor, and the rounded result is classified. The engine performs no I/O and
//! keeps no state; identical inputs give identical results.

mod averaging;
pub mod domain;
pub mod formula;
mod period;
mod recovery;
pub mod result;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    Assessment, AssessmentCategory, AssessmentType, AssessmentTypeId, AssessmentValue,
    EvaluationRule, Period, PeriodId, StudentId, SubjectId, DEFAULT_MIN_DEPENDENCY_GRADE,
    DEFAULT_PASSING_GRADE, DEFAULT_PERIOD_COUNT,
};
pub use formula::{validate_formula, CompiledFormula, FormulaError};
pub use recovery::RecoveryStrategy;
pub use result::{
    AuditEntry, CalculationTrace, FinalGradeMethod, PeriodCalculationResult,
    SubjectCalculationResult,
};
pub use status::{classify, round_to_tenth, AcademicStatus, StatusThresholds};

use std::collections::BTreeMap;

use averaging::TypeCatalog;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Computes the grade of one (student, subject) pair.
///
/// `assessments` should already be restricted to the pair; period filtering happens here.
pub fn compute_subject_grade(
    assessments: &[Assessment],
    rule: &EvaluationRule,
    periods: &[Period],
    assessment_types: &[AssessmentType],
) -> SubjectCalculationResult {
    let assessments: Vec<&Assessment> = assessments.iter().collect();
    evaluate(&assessments, rule, periods, assessment_types)
}

/// Stateless evaluator bound to one rule, calendar and type catalog, for callers that grade
/// many students against the same policy.
#[derive(Debug, Clone)]
pub struct GradingEngine {
    rule: EvaluationRule,
    periods: Vec<Period>,
    assessment_types: Vec<AssessmentType>,
}

impl GradingEngine {
    pub fn new(
        rule: EvaluationRule,
        periods: Vec<Period>,
        assessment_types: Vec<AssessmentType>,
    ) -> Self {
        Self {
            rule,
            periods,
            assessment_types,
        }
    }

    pub fn compute(&self, assessments: &[Assessment]) -> SubjectCalculationResult {
        compute_subject_grade(assessments, &self.rule, &self.periods, &self.assessment_types)
    }

    /// Groups a flat export by (student, subject) and grades each group in parallel.
    ///
    /// Entries are ordered by student, then subject.
    pub fn compute_roster(&self, assessments: &[Assessment]) -> Vec<RosterEntry> {
        let mut groups: BTreeMap<(&StudentId, &SubjectId), Vec<&Assessment>> = BTreeMap::new();
        for assessment in assessments {
            groups
                .entry((&assessment.student_id, &assessment.subject_id))
                .or_default()
                .push(assessment);
        }

        debug!(
            groups = groups.len(),
            assessments = assessments.len(),
            "grading roster"
        );

        let groups: Vec<_> = groups.into_iter().collect();
        groups
            .into_par_iter()
            .map(|((student_id, subject_id), group)| RosterEntry {
                student_id: student_id.clone(),
                subject_id: subject_id.clone(),
                result: evaluate(&group, &self.rule, &self.periods, &self.assessment_types),
            })
            .collect()
    }
}

/// Result of one (student, subject) group in a roster evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub result: SubjectCalculationResult,
}

fn evaluate(
    assessments: &[&Assessment],
    rule: &EvaluationRule,
    periods: &[Period],
    assessment_types: &[AssessmentType],
) -> SubjectCalculationResult {
    let catalog = TypeCatalog::new(assessment_types);

    let period_results: Vec<PeriodCalculationResult> = periods
        .iter()
        .map(|period| period::aggregate_period(period, assessments, rule, &catalog))
        .collect();

    let mut log = Vec::new();
    let mut combined = formula::combine_periods(rule, &period_results, &mut log);

    let thresholds = StatusThresholds::from_rule(rule);
    let mut final_grade = round_to_tenth(combined.raw);
    if !final_grade.is_finite() {
        warn!(raw = combined.raw, "combined grade is not finite; final grade forced to 0");
        log.push(AuditEntry::NonFiniteGrade { raw: combined.raw });
        combined.raw = 0.0;
        combined.error.get_or_insert(FormulaError::NonFinite);
        final_grade = 0.0;
    }
    let status = classify(final_grade, thresholds);
    log.push(AuditEntry::Classified {
        final_grade,
        status,
        passing_grade: thresholds.passing_grade,
        min_dependency_grade: thresholds.min_dependency_grade,
    });

    debug!(
        rule = rule.id.as_deref().unwrap_or("-"),
        raw = combined.raw,
        final_grade,
        status = status.label(),
        "subject grade computed"
    );

    SubjectCalculationResult {
        final_grade,
        raw_final_grade: combined.raw,
        passed: status == AcademicStatus::Approved,
        status,
        periods: period_results,
        trace: CalculationTrace {
            rule_id: rule.id.clone(),
            method: combined.method,
            formula_error: combined.error,
            passing_grade: thresholds.passing_grade,
            min_dependency_grade: thresholds.min_dependency_grade,
            log,
        },
    }
}
