use clap::ValueEnum;
use gradebook::config::AppConfig;
use gradebook::error::AppError;
use gradebook::grading::EvaluationRule;
use gradebook::import::load_rule;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Sample period grades in calendar order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradeList(pub(crate) Vec<f64>);

pub(crate) fn parse_grade_list(raw: &str) -> Result<GradeList, String> {
    raw.split(';')
        .flat_map(|chunk| chunk.split(' '))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.replace(',', ".")
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("'{item}' is not a grade"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(GradeList)
}

pub(crate) fn resolve_rule(
    path: Option<&Path>,
    config: &AppConfig,
) -> Result<EvaluationRule, AppError> {
    match path {
        Some(path) => Ok(load_rule(path)?),
        None => Ok(config.grading.rule()),
    }
}
