use crate::infra::{resolve_rule, OutputFormat};
use clap::Args;
use gradebook::config::AppConfig;
use gradebook::error::AppError;
use gradebook::grading::{AcademicStatus, GradingEngine, RosterEntry};
use gradebook::import::{load_assessment_types, load_periods, AssessmentImporter};
use gradebook::report::{render_text, SubjectReport};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ComputeArgs {
    /// Assessment export (CSV: student_id,subject_id,period_id,category,type_id,value,date)
    #[arg(long)]
    pub(crate) assessments: PathBuf,
    /// Evaluation rule (JSON). Defaults to the configured thresholds.
    #[arg(long)]
    pub(crate) rule: Option<PathBuf>,
    /// Grading periods in calendar order (JSON array)
    #[arg(long)]
    pub(crate) periods: PathBuf,
    /// Assessment type catalog (JSON array)
    #[arg(long)]
    pub(crate) types: Option<PathBuf>,
    /// Only grade this student
    #[arg(long)]
    pub(crate) student: Option<String>,
    /// Only grade this subject
    #[arg(long)]
    pub(crate) subject: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Print the audit trail below each result (text format)
    #[arg(long)]
    pub(crate) audit: bool,
}

pub(crate) fn run_compute(args: ComputeArgs, config: &AppConfig) -> Result<(), AppError> {
    let ComputeArgs {
        assessments,
        rule,
        periods,
        types,
        student,
        subject,
        format,
        audit,
    } = args;

    let rule = resolve_rule(rule.as_deref(), config)?;
    let periods = load_periods(&periods)?;
    let types = match types {
        Some(path) => load_assessment_types(path)?,
        None => Vec::new(),
    };

    let assessments: Vec<_> = AssessmentImporter::from_path(&assessments)?
        .into_iter()
        .filter(|assessment| {
            student
                .as_deref()
                .map_or(true, |id| assessment.student_id.as_str() == id)
        })
        .filter(|assessment| {
            subject
                .as_deref()
                .map_or(true, |id| assessment.subject_id.as_str() == id)
        })
        .collect();

    let engine = GradingEngine::new(rule, periods, types);
    let roster = engine.compute_roster(&assessments);
    info!(
        assessments = assessments.len(),
        results = roster.len(),
        "roster graded"
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&roster)?);
        }
        OutputFormat::Text => render_roster(&roster, audit),
    }

    Ok(())
}

fn render_roster(roster: &[RosterEntry], audit: bool) {
    if roster.is_empty() {
        println!("no assessments matched");
        return;
    }

    for entry in roster {
        print!("{}", render_text(&SubjectReport::from(entry), audit));
    }

    let count = |status: AcademicStatus| {
        roster
            .iter()
            .filter(|entry| entry.result.status == status)
            .count()
    };
    println!(
        "\n{} result(s): {} {} | {} {} | {} {}",
        roster.len(),
        count(AcademicStatus::Approved),
        AcademicStatus::Approved.label(),
        count(AcademicStatus::Dependency),
        AcademicStatus::Dependency.label(),
        count(AcademicStatus::Failed),
        AcademicStatus::Failed.label()
    );
}
