use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::recovery::RecoveryStrategy;

pub const DEFAULT_PASSING_GRADE: f64 = 6.0;
pub const DEFAULT_MIN_DEPENDENCY_GRADE: f64 = 4.0;
pub const DEFAULT_PERIOD_COUNT: u32 = 4;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of an enrolled student.
    StudentId
);
string_id!(
    /// Identifier of a curriculum subject.
    SubjectId
);
string_id!(
    /// Identifier of a grading window (e.g. a bimester).
    PeriodId
);
string_id!(
    /// Identifier of an assessment type such as "Test" or "Recovery Exam".
    AssessmentTypeId
);

/// Whether an assessment counts toward the regular average or is a recovery exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentCategory {
    #[default]
    Regular,
    Recuperation,
}

impl AssessmentCategory {
    /// Parses an exported category label. A blank label means [`AssessmentCategory::Regular`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "regular" => Some(Self::Regular),
            "recuperation" => Some(Self::Recuperation),
            _ => None,
        }
    }
}

/// Recorded value of an assessment. Descriptive (textual) grades are kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssessmentValue {
    Numeric(f64),
    Text(String),
}

impl AssessmentValue {
    /// Numeric score usable in averages, if any.
    ///
    /// Text holding a finite number (`"7.5"` or `"7,5"`) counts as numeric; anything else,
    /// including non-finite numbers, is not a score.
    pub fn score(&self) -> Option<f64> {
        match self {
            AssessmentValue::Numeric(value) => value.is_finite().then_some(*value),
            AssessmentValue::Text(raw) => parse_score(raw),
        }
    }
}

impl From<f64> for AssessmentValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl fmt::Display for AssessmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentValue::Numeric(value) => write!(f, "{value}"),
            AssessmentValue::Text(raw) => write!(f, "'{raw}'"),
        }
    }
}

pub(crate) fn parse_score(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// One graded (or descriptive) activity instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
    pub period_id: PeriodId,
    #[serde(default)]
    pub category: AssessmentCategory,
    #[serde(default)]
    pub assessment_type_id: Option<AssessmentTypeId>,
    pub value: AssessmentValue,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Classification of an activity, supplied to the engine as a lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentType {
    pub id: AssessmentTypeId,
    pub name: String,
    /// Recorded but never part of the mean.
    #[serde(default)]
    pub exclude_from_average: bool,
}

/// Grading window; the caller's ordering numbers the `evalN` formula placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Grading policy for a subject/grade combination.
///
/// Every field is optional on the wire. Missing or unusable thresholds fall back to
/// [`DEFAULT_PASSING_GRADE`] and [`DEFAULT_MIN_DEPENDENCY_GRADE`], and a missing or zero
/// period count falls back to [`DEFAULT_PERIOD_COUNT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub passing_grade: Option<f64>,
    #[serde(default)]
    pub min_dependency_grade: Option<f64>,
    /// Consumed by attendance reports, not by the grade engine.
    #[serde(default)]
    pub min_attendance_percent: Option<f64>,
    /// Assessment type to weight percentage. Weights are absolute contributions and are
    /// never renormalized.
    #[serde(default)]
    pub type_weights: BTreeMap<AssessmentTypeId, f64>,
    /// Drop one lowest regular score per period before averaging.
    #[serde(default)]
    pub allowed_exclusions: bool,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub period_count: Option<u32>,
    #[serde(default)]
    pub recovery_strategy: RecoveryStrategy,
}

impl EvaluationRule {
    pub fn passing_grade(&self) -> f64 {
        self.passing_grade
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_PASSING_GRADE)
    }

    pub fn min_dependency_grade(&self) -> f64 {
        self.min_dependency_grade
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_MIN_DEPENDENCY_GRADE)
    }

    /// Formula text, or `None` when absent or blank.
    pub fn formula(&self) -> Option<&str> {
        self.formula
            .as_deref()
            .map(str::trim)
            .filter(|formula| !formula.is_empty())
    }

    pub fn uses_type_weights(&self) -> bool {
        !self.type_weights.is_empty()
    }
}
