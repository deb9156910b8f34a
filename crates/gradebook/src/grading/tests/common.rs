use chrono::NaiveDate;

use crate::grading::domain::{
    Assessment, AssessmentCategory, AssessmentType, AssessmentTypeId, AssessmentValue, Period,
    PeriodId, StudentId, SubjectId,
};

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn period(index: u32) -> Period {
    let start = NaiveDate::from_ymd_opt(2025, 2 * index - 1, 1).expect("valid start");
    let end = NaiveDate::from_ymd_opt(2025, 2 * index, 28).expect("valid end");
    Period {
        id: PeriodId(format!("p{index}")),
        name: format!("{index}º bimestre"),
        start_date: start,
        end_date: end,
    }
}

pub(super) fn periods(count: u32) -> Vec<Period> {
    (1..=count).map(period).collect()
}

fn assessment(
    period_index: u32,
    category: AssessmentCategory,
    type_id: Option<&str>,
    value: AssessmentValue,
) -> Assessment {
    Assessment {
        student_id: StudentId::new("s-001"),
        subject_id: SubjectId::new("math"),
        period_id: PeriodId(format!("p{period_index}")),
        category,
        assessment_type_id: type_id.map(AssessmentTypeId::new),
        value,
        date: NaiveDate::from_ymd_opt(2025, 3, 10),
    }
}

pub(super) fn regular(period_index: u32, value: f64) -> Assessment {
    assessment(
        period_index,
        AssessmentCategory::Regular,
        None,
        AssessmentValue::Numeric(value),
    )
}

pub(super) fn typed(period_index: u32, type_id: &str, value: f64) -> Assessment {
    assessment(
        period_index,
        AssessmentCategory::Regular,
        Some(type_id),
        AssessmentValue::Numeric(value),
    )
}

pub(super) fn descriptive(period_index: u32, text: &str) -> Assessment {
    assessment(
        period_index,
        AssessmentCategory::Regular,
        None,
        AssessmentValue::Text(text.to_string()),
    )
}

pub(super) fn recovery(period_index: u32, value: f64) -> Assessment {
    assessment(
        period_index,
        AssessmentCategory::Recuperation,
        Some("recovery"),
        AssessmentValue::Numeric(value),
    )
}

pub(super) fn assessment_types() -> Vec<AssessmentType> {
    vec![
        AssessmentType {
            id: AssessmentTypeId::new("test"),
            name: "Test".to_string(),
            exclude_from_average: false,
        },
        AssessmentType {
            id: AssessmentTypeId::new("homework"),
            name: "Homework".to_string(),
            exclude_from_average: false,
        },
        AssessmentType {
            id: AssessmentTypeId::new("diagnostic"),
            name: "Diagnostic".to_string(),
            exclude_from_average: true,
        },
        AssessmentType {
            id: AssessmentTypeId::new("recovery"),
            name: "Recovery Exam".to_string(),
            exclude_from_average: false,
        },
    ]
}
