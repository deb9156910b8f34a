use super::averaging::{score_or_log, simple_average, weighted_average, TypeCatalog};
use super::domain::{Assessment, AssessmentCategory, EvaluationRule, Period};
use super::result::{AuditEntry, PeriodCalculationResult};

/// Computes the grade of a single period from the subject's assessments.
///
/// Only assessments referencing `period` are considered. An empty period yields a zero
/// regular average with an explanatory entry, never an error.
pub(crate) fn aggregate_period(
    period: &Period,
    assessments: &[&Assessment],
    rule: &EvaluationRule,
    catalog: &TypeCatalog<'_>,
) -> PeriodCalculationResult {
    let mut log = Vec::new();

    let (regular, recuperation): (Vec<&Assessment>, Vec<&Assessment>) = assessments
        .iter()
        .copied()
        .filter(|assessment| assessment.period_id == period.id)
        .partition(|assessment| assessment.category == AssessmentCategory::Regular);

    let mut regular_average = if regular.is_empty() {
        log.push(AuditEntry::NoValidAssessments);
        0.0
    } else if rule.uses_type_weights() {
        weighted_average(&regular, &rule.type_weights, catalog, &mut log)
    } else {
        simple_average(&regular, rule.allowed_exclusions, catalog, &mut log)
    };
    if !regular_average.is_finite() {
        log.push(AuditEntry::NonFiniteGrade {
            raw: regular_average,
        });
        regular_average = 0.0;
    }

    let recovery_scores: Vec<f64> = recuperation
        .iter()
        .filter_map(|assessment| score_or_log(assessment, &mut log))
        .collect();
    let recovery = rule
        .recovery_strategy
        .apply(regular_average, &recovery_scores, &mut log);

    PeriodCalculationResult {
        period_id: period.id.clone(),
        period_name: period.name.clone(),
        regular_average,
        recovery_grade: recovery.recovery_grade,
        final_grade: recovery.final_grade,
        recovery_used: recovery.used,
        log,
    }
}
