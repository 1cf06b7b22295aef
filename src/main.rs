use std::process::ExitCode;

fn main() -> ExitCode {
    match health_series::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Load failures were already reported with their hint.
            if !err.is_load() {
                eprintln!("{err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
