use std::collections::{BTreeMap, HashMap};

use super::domain::{Assessment, AssessmentType, AssessmentTypeId};
use super::result::AuditEntry;

/// Lookup over the supplied assessment types.
pub(crate) struct TypeCatalog<'a> {
    types: HashMap<&'a AssessmentTypeId, &'a AssessmentType>,
}

impl<'a> TypeCatalog<'a> {
    pub(crate) fn new(types: &'a [AssessmentType]) -> Self {
        Self {
            types: types.iter().map(|kind| (&kind.id, kind)).collect(),
        }
    }

    pub(crate) fn name(&self, id: &AssessmentTypeId) -> String {
        self.types
            .get(id)
            .map(|kind| kind.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn excluded_from_average(&self, id: Option<&AssessmentTypeId>) -> Option<&'a AssessmentType> {
        id.and_then(|id| self.types.get(id).copied())
            .filter(|kind| kind.exclude_from_average)
    }
}

/// Numeric score of an assessment, logging descriptive values that cannot be averaged.
pub(crate) fn score_or_log(assessment: &Assessment, log: &mut Vec<AuditEntry>) -> Option<f64> {
    let score = assessment.value.score();
    if score.is_none() {
        log.push(AuditEntry::DescriptiveValueSkipped {
            value: assessment.value.to_string(),
        });
    }
    score
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Arithmetic mean of the valid regular scores.
///
/// Types flagged `exclude_from_average` are dropped first; with `allowed_exclusions` one
/// instance of the lowest remaining score is removed when more than one score is left.
pub(crate) fn simple_average(
    regular: &[&Assessment],
    allowed_exclusions: bool,
    catalog: &TypeCatalog<'_>,
    log: &mut Vec<AuditEntry>,
) -> f64 {
    let mut scores = Vec::with_capacity(regular.len());

    for assessment in regular {
        if let Some(kind) = catalog.excluded_from_average(assessment.assessment_type_id.as_ref()) {
            log.push(AuditEntry::ExcludedByType {
                type_name: kind.name.clone(),
                value: assessment.value.to_string(),
            });
            continue;
        }

        if let Some(score) = score_or_log(assessment, log) {
            scores.push(score);
        }
    }

    if allowed_exclusions && scores.len() > 1 {
        let lowest = scores
            .iter()
            .enumerate()
            .fold(0, |lowest, (index, score)| {
                if *score < scores[lowest] {
                    index
                } else {
                    lowest
                }
            });
        let dropped = scores.remove(lowest);
        log.push(AuditEntry::LowestScoreDropped { score: dropped });
    }

    if scores.is_empty() {
        log.push(AuditEntry::NoValidAssessments);
        return 0.0;
    }

    let sum: f64 = scores.iter().sum();
    let average = mean(&scores);
    log.push(AuditEntry::SimpleAverage {
        count: scores.len(),
        sum,
        average,
    });
    average
}

/// Sum of per-type averages scaled by their weight percentage.
///
/// Weights are absolute contributions to the grade scale; a weight table that does not sum
/// to 100 is applied as-is.
pub(crate) fn weighted_average(
    regular: &[&Assessment],
    weights: &BTreeMap<AssessmentTypeId, f64>,
    catalog: &TypeCatalog<'_>,
    log: &mut Vec<AuditEntry>,
) -> f64 {
    let mut total = 0.0;

    for (type_id, weight) in weights {
        let scores: Vec<f64> = regular
            .iter()
            .filter(|assessment| assessment.assessment_type_id.as_ref() == Some(type_id))
            .filter_map(|assessment| score_or_log(assessment, log))
            .collect();

        let average = mean(&scores);
        let contribution = average * weight / 100.0;
        total += contribution;

        log.push(AuditEntry::WeightedContribution {
            type_id: type_id.clone(),
            type_name: catalog.name(type_id),
            count: scores.len(),
            average,
            weight: *weight,
            contribution,
        });
    }

    let unweighted = regular
        .iter()
        .filter(|assessment| {
            assessment
                .assessment_type_id
                .as_ref()
                .map_or(true, |type_id| !weights.contains_key(type_id))
        })
        .count();
    if unweighted > 0 {
        log.push(AuditEntry::UnweightedIgnored { count: unweighted });
    }

    log.push(AuditEntry::WeightedAverage { total });
    total
}
