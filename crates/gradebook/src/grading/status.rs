use serde::{Deserialize, Serialize};

use super::domain::EvaluationRule;

/// Academic status of a student in a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcademicStatus {
    #[serde(rename = "Aprovado")]
    Approved,
    /// Conditional advancement pending remediation of the subject.
    #[serde(rename = "Dependência")]
    Dependency,
    #[serde(rename = "Reprovado")]
    Failed,
    /// Assigned by callers for school years still open; never produced by [`classify`].
    #[serde(rename = "Cursando")]
    InProgress,
}

impl AcademicStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AcademicStatus::Approved => "Aprovado",
            AcademicStatus::Dependency => "Dependência",
            AcademicStatus::Failed => "Reprovado",
            AcademicStatus::InProgress => "Cursando",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AcademicStatus::InProgress)
    }
}

/// Pass and dependency cut-offs, both inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusThresholds {
    pub passing_grade: f64,
    pub min_dependency_grade: f64,
}

impl StatusThresholds {
    pub fn from_rule(rule: &EvaluationRule) -> Self {
        Self {
            passing_grade: rule.passing_grade(),
            min_dependency_grade: rule.min_dependency_grade(),
        }
    }
}

/// Classifies a rounded final grade. Completeness of the period calendar is not considered.
pub fn classify(final_grade: f64, thresholds: StatusThresholds) -> AcademicStatus {
    if final_grade >= thresholds.passing_grade {
        AcademicStatus::Approved
    } else if final_grade >= thresholds.min_dependency_grade {
        AcademicStatus::Dependency
    } else {
        AcademicStatus::Failed
    }
}

/// Rounds half up to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}
