use std::collections::BTreeMap;

use super::common::*;
use crate::grading::averaging::TypeCatalog;
use crate::grading::domain::{Assessment, AssessmentTypeId, EvaluationRule};
use crate::grading::period::aggregate_period;
use crate::grading::result::{AuditEntry, PeriodCalculationResult};

fn aggregate(assessments: &[Assessment], rule: &EvaluationRule) -> PeriodCalculationResult {
    let types = assessment_types();
    let catalog = TypeCatalog::new(&types);
    let borrowed: Vec<&Assessment> = assessments.iter().collect();
    aggregate_period(&period(1), &borrowed, rule, &catalog)
}

fn weights(entries: &[(&str, f64)]) -> BTreeMap<AssessmentTypeId, f64> {
    entries
        .iter()
        .map(|(id, weight)| (AssessmentTypeId::new(*id), *weight))
        .collect()
}

#[test]
fn empty_period_yields_zero_with_explanation() {
    let result = aggregate(&[], &EvaluationRule::default());

    assert_eq!(result.regular_average, 0.0);
    assert_eq!(result.final_grade, 0.0);
    assert_eq!(result.recovery_grade, None);
    assert!(!result.recovery_used);
    assert_eq!(result.log.first(), Some(&AuditEntry::NoValidAssessments));
}

#[test]
fn only_assessments_of_the_period_are_used() {
    let result = aggregate(
        &[regular(1, 6.0), regular(1, 8.0), regular(2, 1.0)],
        &EvaluationRule::default(),
    );

    assert_close(result.regular_average, 7.0);
    assert_eq!(result.period_id, period(1).id);
}

#[test]
fn simple_average_skips_excluded_types_and_descriptive_values() {
    let result = aggregate(
        &[
            regular(1, 6.0),
            typed(1, "diagnostic", 0.0),
            descriptive(1, "Satisfatório"),
            typed(1, "test", 9.0),
        ],
        &EvaluationRule::default(),
    );

    assert_close(result.regular_average, 7.5);
    assert!(result.log.iter().any(|entry| matches!(
        entry,
        AuditEntry::ExcludedByType { type_name, .. } if type_name == "Diagnostic"
    )));
    assert!(result
        .log
        .iter()
        .any(|entry| matches!(entry, AuditEntry::DescriptiveValueSkipped { .. })));
}

#[test]
fn exclusion_drops_exactly_one_lowest_score() {
    let rule = EvaluationRule {
        allowed_exclusions: true,
        ..EvaluationRule::default()
    };
    let result = aggregate(&[regular(1, 7.0), regular(1, 4.0), regular(1, 9.0)], &rule);

    assert_close(result.regular_average, 8.0);
    assert!(result
        .log
        .contains(&AuditEntry::LowestScoreDropped { score: 4.0 }));
}

#[test]
fn exclusion_removes_a_single_instance_of_tied_minimums() {
    let rule = EvaluationRule {
        allowed_exclusions: true,
        ..EvaluationRule::default()
    };
    let result = aggregate(&[regular(1, 5.0), regular(1, 5.0), regular(1, 8.0)], &rule);

    assert_close(result.regular_average, 6.5);
}

#[test]
fn exclusion_keeps_a_lone_score() {
    let rule = EvaluationRule {
        allowed_exclusions: true,
        ..EvaluationRule::default()
    };
    let result = aggregate(&[regular(1, 3.0)], &rule);

    assert_close(result.regular_average, 3.0);
    assert!(!result
        .log
        .iter()
        .any(|entry| matches!(entry, AuditEntry::LowestScoreDropped { .. })));
}

#[test]
fn all_descriptive_values_average_to_zero() {
    let result = aggregate(
        &[descriptive(1, "Bom"), descriptive(1, "Ótimo")],
        &EvaluationRule::default(),
    );

    assert_eq!(result.regular_average, 0.0);
    assert!(result.log.contains(&AuditEntry::NoValidAssessments));
}

#[test]
fn weighted_average_sums_contributions() {
    let rule = EvaluationRule {
        type_weights: weights(&[("test", 50.0), ("homework", 50.0)]),
        ..EvaluationRule::default()
    };
    let result = aggregate(
        &[
            typed(1, "test", 7.0),
            typed(1, "test", 9.0),
            typed(1, "homework", 6.0),
        ],
        &rule,
    );

    assert_close(result.regular_average, 7.0);
}

#[test]
fn weighted_average_is_not_renormalized() {
    let rule = EvaluationRule {
        type_weights: weights(&[("test", 60.0), ("homework", 60.0)]),
        ..EvaluationRule::default()
    };
    let result = aggregate(&[typed(1, "test", 8.0), typed(1, "homework", 6.0)], &rule);

    assert_close(result.regular_average, 8.4);
}

#[test]
fn weighted_type_without_assessments_contributes_zero_but_is_logged() {
    let rule = EvaluationRule {
        type_weights: weights(&[("test", 70.0), ("homework", 30.0)]),
        ..EvaluationRule::default()
    };
    let result = aggregate(&[typed(1, "test", 10.0), regular(1, 2.0)], &rule);

    assert_close(result.regular_average, 7.0);
    assert!(result.log.iter().any(|entry| matches!(
        entry,
        AuditEntry::WeightedContribution { type_name, count: 0, contribution, .. }
            if type_name == "Homework" && *contribution == 0.0
    )));
    assert!(result
        .log
        .contains(&AuditEntry::UnweightedIgnored { count: 1 }));
}

#[test]
fn weights_take_precedence_over_exclusions() {
    let rule = EvaluationRule {
        type_weights: weights(&[("test", 100.0)]),
        allowed_exclusions: true,
        ..EvaluationRule::default()
    };
    let result = aggregate(&[typed(1, "test", 4.0), typed(1, "test", 8.0)], &rule);

    assert_close(result.regular_average, 6.0);
}

#[test]
fn higher_recovery_replaces_regular_average() {
    let result = aggregate(
        &[regular(1, 5.5), recovery(1, 8.0), recovery(1, 6.0)],
        &EvaluationRule::default(),
    );

    assert_close(result.regular_average, 5.5);
    assert_eq!(result.recovery_grade, Some(8.0));
    assert_close(result.final_grade, 8.0);
    assert!(result.recovery_used);
}

#[test]
fn equal_recovery_keeps_regular_average() {
    let result = aggregate(
        &[regular(1, 6.0), recovery(1, 6.0)],
        &EvaluationRule::default(),
    );

    assert_eq!(result.recovery_grade, Some(6.0));
    assert_close(result.final_grade, 6.0);
    assert!(!result.recovery_used);
}

#[test]
fn recovery_without_regular_scores_still_applies() {
    let result = aggregate(&[recovery(1, 5.0)], &EvaluationRule::default());

    assert_eq!(result.regular_average, 0.0);
    assert_close(result.final_grade, 5.0);
    assert!(result.recovery_used);
}

#[test]
fn recovery_does_not_enter_the_regular_average() {
    let result = aggregate(
        &[regular(1, 9.0), recovery(1, 2.0)],
        &EvaluationRule::default(),
    );

    assert_close(result.regular_average, 9.0);
    assert_close(result.final_grade, 9.0);
}

#[test]
fn overflowing_weighted_average_falls_back_to_zero() {
    let rule = EvaluationRule {
        type_weights: weights(&[("test", 1e308)]),
        ..EvaluationRule::default()
    };
    let result = aggregate(&[typed(1, "test", 10.0)], &rule);

    assert_eq!(result.regular_average, 0.0);
    assert_eq!(result.final_grade, 0.0);
    assert!(result
        .log
        .iter()
        .any(|entry| matches!(entry, AuditEntry::NonFiniteGrade { raw } if raw.is_infinite())));
}
