use crate::infra::{parse_grade_list, GradeList};
use clap::Args;
use gradebook::error::AppError;
use gradebook::grading::{round_to_tenth, validate_formula, CompiledFormula};

#[derive(Args, Debug)]
pub(crate) struct CheckFormulaArgs {
    /// Formula over eval1..evalN placeholders, e.g. "(eval1 + eval2) * 0.4 + eval3 * 0.2"
    pub(crate) formula: String,
    /// Number of periods in the calendar
    #[arg(long, default_value_t = 4)]
    pub(crate) periods: usize,
    /// Sample period grades in calendar order, separated by ';' (e.g. "6;7,5;8")
    #[arg(long, value_parser = parse_grade_list)]
    pub(crate) grades: Option<GradeList>,
}

pub(crate) fn run_check_formula(args: CheckFormulaArgs) -> Result<(), AppError> {
    let CheckFormulaArgs {
        formula,
        periods,
        grades,
    } = args;

    if let Err(error) = validate_formula(&formula, periods) {
        println!("formula rejected: {error}");
        return Ok(());
    }
    println!("formula accepted for {periods} period(s)");

    let Some(GradeList(grades)) = grades else {
        return Ok(());
    };

    match CompiledFormula::compile(&formula, &grades).and_then(|compiled| {
        for placeholder in compiled.unresolved_placeholders() {
            println!("- {placeholder} has no sample grade; using 0");
        }
        compiled.evaluate()
    }) {
        Ok(value) => println!(
            "result with sample grades: {value:.4} (rounded {:.1})",
            round_to_tenth(value)
        ),
        Err(error) => println!("evaluation failed: {error}; final grade would be 0"),
    }

    Ok(())
}
