use std::env;
use std::fmt;

use crate::grading::{
    EvaluationRule, DEFAULT_MIN_DEPENDENCY_GRADE, DEFAULT_PASSING_GRADE, DEFAULT_PERIOD_COUNT,
};

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the command line tools.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub grading: GradingDefaults,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("GRADEBOOK_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("GRADEBOOK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let passing_grade = grade_var("GRADEBOOK_PASSING_GRADE", DEFAULT_PASSING_GRADE)?;
        let min_dependency_grade =
            grade_var("GRADEBOOK_MIN_DEPENDENCY_GRADE", DEFAULT_MIN_DEPENDENCY_GRADE)?;
        let period_count = match env::var("GRADEBOOK_PERIOD_COUNT") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|count| *count > 0)
                .ok_or(ConfigError::InvalidPeriodCount { value: raw })?,
            Err(_) => DEFAULT_PERIOD_COUNT,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            grading: GradingDefaults {
                passing_grade,
                min_dependency_grade,
                period_count,
            },
        })
    }
}

/// Policy used when no evaluation rule document is supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingDefaults {
    pub passing_grade: f64,
    pub min_dependency_grade: f64,
    pub period_count: u32,
}

impl GradingDefaults {
    pub fn rule(&self) -> EvaluationRule {
        EvaluationRule {
            id: Some("default".to_string()),
            passing_grade: Some(self.passing_grade),
            min_dependency_grade: Some(self.min_dependency_grade),
            period_count: Some(self.period_count),
            ..EvaluationRule::default()
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidGrade { name: &'static str, value: String },
    InvalidPeriodCount { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidGrade { name, value } => {
                write!(f, "{name} must be a finite number, got '{value}'")
            }
            ConfigError::InvalidPeriodCount { value } => write!(
                f,
                "GRADEBOOK_PERIOD_COUNT must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn grade_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidGrade { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("GRADEBOOK_ENV");
        env::remove_var("GRADEBOOK_LOG_LEVEL");
        env::remove_var("GRADEBOOK_PASSING_GRADE");
        env::remove_var("GRADEBOOK_MIN_DEPENDENCY_GRADE");
        env::remove_var("GRADEBOOK_PERIOD_COUNT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.grading,
            GradingDefaults {
                passing_grade: 6.0,
                min_dependency_grade: 4.0,
                period_count: 4,
            }
        );
    }

    #[test]
    fn overrides_flow_into_default_rule() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GRADEBOOK_ENV", "production");
        env::set_var("GRADEBOOK_PASSING_GRADE", "7");
        env::set_var("GRADEBOOK_PERIOD_COUNT", "3");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        let rule = config.grading.rule();
        assert_eq!(rule.passing_grade(), 7.0);
        assert_eq!(rule.min_dependency_grade(), 4.0);
        assert_eq!(rule.period_count, Some(3));
    }

    #[test]
    fn rejects_unparseable_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GRADEBOOK_MIN_DEPENDENCY_GRADE", "four");
        let error = AppConfig::load().expect_err("grade rejected");
        assert!(matches!(
            error,
            ConfigError::InvalidGrade {
                name: "GRADEBOOK_MIN_DEPENDENCY_GRADE",
                ..
            }
        ));

        reset_env();
        env::set_var("GRADEBOOK_PERIOD_COUNT", "0");
        let error = AppConfig::load().expect_err("zero period count rejected");
        reset_env();
        assert!(matches!(error, ConfigError::InvalidPeriodCount { .. }));
    }
}
