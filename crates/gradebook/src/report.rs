//! Flattened views of subject results for transcripts and the command line.

use serde::Serialize;

use crate::grading::{
    AcademicStatus, FinalGradeMethod, PeriodCalculationResult, RosterEntry,
    SubjectCalculationResult,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRow {
    pub period: String,
    pub regular_average: f64,
    pub recovery_grade: Option<f64>,
    pub final_grade: f64,
    pub recovery_used: bool,
}

impl From<&PeriodCalculationResult> for PeriodRow {
    fn from(result: &PeriodCalculationResult) -> Self {
        Self {
            period: result.period_name.clone(),
            regular_average: result.regular_average,
            recovery_grade: result.recovery_grade,
            final_grade: result.final_grade,
            recovery_used: result.recovery_used,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectReport {
    pub student_id: String,
    pub subject_id: String,
    pub periods: Vec<PeriodRow>,
    pub final_grade: f64,
    pub status: AcademicStatus,
    pub status_label: &'static str,
    pub method_label: String,
    pub formula_error: Option<String>,
    pub audit: Vec<String>,
}

impl SubjectReport {
    pub fn new(student_id: &str, subject_id: &str, result: &SubjectCalculationResult) -> Self {
        let method_label = match &result.trace.method {
            FinalGradeMethod::Formula { expression } => format!("formula {expression}"),
            FinalGradeMethod::DefaultAverage { period_count } => {
                format!("sum of periods / {period_count}")
            }
        };

        Self {
            student_id: student_id.to_string(),
            subject_id: subject_id.to_string(),
            periods: result.periods.iter().map(PeriodRow::from).collect(),
            final_grade: result.final_grade,
            status: result.status,
            status_label: result.status.label(),
            method_label,
            formula_error: result
                .trace
                .formula_error
                .as_ref()
                .map(ToString::to_string),
            audit: result.audit_lines(),
        }
    }
}

impl From<&RosterEntry> for SubjectReport {
    fn from(entry: &RosterEntry) -> Self {
        Self::new(
            entry.student_id.as_str(),
            entry.subject_id.as_str(),
            &entry.result,
        )
    }
}

/// Renders the plain-text block printed per (student, subject).
pub fn render_text(report: &SubjectReport, include_audit: bool) -> String {
    let mut out = format!(
        "{} / {}: {:.1} ({})\n",
        report.student_id, report.subject_id, report.final_grade, report.status_label
    );

    for row in &report.periods {
        let recovery = match (row.recovery_grade, row.recovery_used) {
            (Some(grade), true) => format!(" | recovery {grade:.2} applied"),
            (Some(grade), false) => format!(" | recovery {grade:.2} not applied"),
            (None, _) => String::new(),
        };
        out.push_str(&format!(
            "  - {}: average {:.2}{} | final {:.2}\n",
            row.period, row.regular_average, recovery, row.final_grade
        ));
    }

    out.push_str(&format!("  combined by {}\n", report.method_label));
    if let Some(error) = &report.formula_error {
        out.push_str(&format!("  formula error: {error}\n"));
    }

    if include_audit {
        out.push_str("  audit:\n");
        for line in &report.audit {
            out.push_str(&format!("    * {line}\n"));
        }
    }

    out
}
