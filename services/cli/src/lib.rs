mod cli;
mod compute;
mod formula;
mod infra;

use gradebook::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
