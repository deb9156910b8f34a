//! Final-grade combination: administrator formulas and the default period average.
//!
//! Formulas are parsed into an expression tree over numbers, `+ - * /`, parentheses and
//! `evalN` placeholders, then walked by a small interpreter. Nothing outside that grammar
//! is ever evaluated.

mod lexer;
mod parser;

use serde::Serialize;
use tracing::warn;

use parser::Expr;

use super::domain::{EvaluationRule, DEFAULT_PERIOD_COUNT};
use super::result::{AuditEntry, FinalGradeMethod, PeriodCalculationResult};

/// Reasons a formula fails closed to a final grade of 0.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormulaError {
    #[error("character '{character}' at offset {offset} is not allowed in a formula")]
    InvalidCharacter { character: char, offset: usize },
    #[error("malformed number '{literal}' at offset {offset}")]
    MalformedNumber { literal: String, offset: usize },
    #[error("unexpected '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    #[error("formula ends unexpectedly at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("formula nests deeper than {limit} levels")]
    TooDeeplyNested { limit: usize },
    #[error("formula has more than {limit} tokens")]
    TooLong { limit: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("formula result is not a finite number")]
    NonFinite,
}

/// A parsed formula with its placeholders bound to period grades.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    expr: Expr,
    unresolved: Vec<String>,
}

impl CompiledFormula {
    /// Parses `source`, binding `evalK` to `period_grades[K - 1]` and every other
    /// placeholder to 0.
    pub fn compile(source: &str, period_grades: &[f64]) -> Result<Self, FormulaError> {
        let tokens = lexer::tokenize(source)?;
        let (expr, unresolved) =
            parser::Parser::new(&tokens, period_grades, source.len()).parse()?;

        Ok(Self {
            expr,
            unresolved,
        })
    }

    pub fn evaluate(&self) -> Result<f64, FormulaError> {
        let value = self.expr.evaluate()?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }

    /// Placeholder names that had no graded period, in first-seen order.
    pub fn unresolved_placeholders(&self) -> &[String] {
        &self.unresolved
    }
}

/// Checks that a formula parses for a calendar of `period_count` periods.
pub fn validate_formula(source: &str, period_count: usize) -> Result<(), FormulaError> {
    CompiledFormula::compile(source, &vec![0.0; period_count]).map(|_| ())
}

pub(crate) struct CombinedGrade {
    pub raw: f64,
    pub method: FinalGradeMethod,
    pub error: Option<FormulaError>,
}

/// Combines period grades into the unrounded subject grade.
pub(crate) fn combine_periods(
    rule: &EvaluationRule,
    periods: &[PeriodCalculationResult],
    log: &mut Vec<AuditEntry>,
) -> CombinedGrade {
    let grades: Vec<f64> = periods.iter().map(|period| period.final_grade).collect();

    match rule.formula() {
        Some(formula) => evaluate_formula(formula, &grades, log),
        None => default_average(rule.period_count, &grades, log),
    }
}

fn evaluate_formula(formula: &str, grades: &[f64], log: &mut Vec<AuditEntry>) -> CombinedGrade {
    let method = FinalGradeMethod::Formula {
        expression: formula.to_string(),
    };

    let outcome = CompiledFormula::compile(formula, grades).and_then(|compiled| {
        for placeholder in compiled.unresolved_placeholders() {
            log.push(AuditEntry::UnresolvedPlaceholder {
                placeholder: placeholder.clone(),
            });
        }
        compiled.evaluate()
    });

    match outcome {
        Ok(result) => {
            log.push(AuditEntry::FormulaEvaluated {
                formula: formula.to_string(),
                result,
            });
            CombinedGrade {
                raw: result,
                method,
                error: None,
            }
        }
        Err(error) => {
            warn!(%formula, %error, "formula rejected; final grade forced to 0");
            log.push(AuditEntry::FormulaRejected {
                formula: formula.to_string(),
                error: error.clone(),
            });
            CombinedGrade {
                raw: 0.0,
                method,
                error: Some(error),
            }
        }
    }
}

fn default_average(
    configured: Option<u32>,
    grades: &[f64],
    log: &mut Vec<AuditEntry>,
) -> CombinedGrade {
    let period_count = match configured {
        Some(count) if count > 0 => count,
        other => {
            log.push(AuditEntry::PeriodCountDefaulted {
                configured: other,
                applied: DEFAULT_PERIOD_COUNT,
            });
            DEFAULT_PERIOD_COUNT
        }
    };

    let sum: f64 = grades.iter().sum();
    let result = sum / f64::from(period_count);
    log.push(AuditEntry::DefaultAverage {
        sum,
        period_count,
        graded_periods: grades.len(),
        result,
    });

    CombinedGrade {
        raw: result,
        method: FinalGradeMethod::DefaultAverage { period_count },
        error: None,
    }
}
