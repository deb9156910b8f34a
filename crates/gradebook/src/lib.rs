//! Grade and promotion-status calculation for school records.
//!
//! The [`grading`] module is a pure engine: given a student's assessments for one subject,
//! the subject's evaluation rule, the grading calendar and the assessment type catalog it
//! produces per-period grades, a final grade and an academic status together with an
//! ordered audit trail. The remaining modules are the adapters the command line uses to
//! feed it.

pub mod config;
pub mod error;
pub mod grading;
pub mod import;
pub mod report;
pub mod telemetry;
