use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::ImportError;
use crate::grading::domain::{
    parse_score, Assessment, AssessmentCategory, AssessmentTypeId, AssessmentValue, PeriodId,
    StudentId, SubjectId,
};

pub(crate) fn parse_assessments<R: Read>(reader: R) -> Result<Vec<Assessment>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut assessments = Vec::new();

    for (index, record) in csv_reader.deserialize::<AssessmentRow>().enumerate() {
        let row = record?;
        // Header is line 1.
        let line = index + 2;
        assessments.push(row.into_assessment(line)?);
    }

    Ok(assessments)
}

#[derive(Debug, Deserialize)]
struct AssessmentRow {
    student_id: String,
    subject_id: String,
    period_id: String,
    #[serde(default)]
    category: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    type_id: Option<String>,
    #[serde(default)]
    value: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
}

impl AssessmentRow {
    fn into_assessment(self, line: usize) -> Result<Assessment, ImportError> {
        let category =
            AssessmentCategory::parse(&self.category).ok_or_else(|| ImportError::UnknownCategory {
                line,
                value: self.category.clone(),
            })?;

        let date = match self.date.as_deref() {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| ImportError::InvalidDate {
                line,
                value: raw.to_string(),
            })?),
            None => None,
        };

        let value = match parse_score(&self.value) {
            Some(score) => AssessmentValue::Numeric(score),
            None => AssessmentValue::Text(self.value),
        };

        Ok(Assessment {
            student_id: StudentId(self.student_id),
            subject_id: SubjectId(self.subject_id),
            period_id: PeriodId(self.period_id),
            category,
            assessment_type_id: self.type_id.map(AssessmentTypeId),
            value,
            date,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}
