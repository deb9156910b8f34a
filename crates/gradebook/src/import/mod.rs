//! Adapters loading engine inputs from roster exports.
//!
//! Assessments arrive as CSV (`student_id,subject_id,period_id,category,type_id,value,date`);
//! rules, periods and assessment types arrive as JSON documents.

mod parser;

use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

use crate::grading::domain::{Assessment, AssessmentType, EvaluationRule, Period};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid assessment CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: unknown assessment category '{value}'")]
    UnknownCategory { line: usize, value: String },
    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { line: usize, value: String },
}

pub struct AssessmentImporter;

impl AssessmentImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Assessment>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Assessment>, ImportError> {
        parser::parse_assessments(reader)
    }
}

pub fn load_rule<P: AsRef<Path>>(path: P) -> Result<EvaluationRule, ImportError> {
    load_json(path)
}

pub fn load_periods<P: AsRef<Path>>(path: P) -> Result<Vec<Period>, ImportError> {
    load_json(path)
}

pub fn load_assessment_types<P: AsRef<Path>>(path: P) -> Result<Vec<AssessmentType>, ImportError> {
    load_json(path)
}

pub fn from_json_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T, ImportError> {
    Ok(serde_json::from_reader(reader)?)
}

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, ImportError> {
    let file = std::fs::File::open(path)?;
    from_json_reader(std::io::BufReader::new(file))
}
