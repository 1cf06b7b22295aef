//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - assembles `Settings`
//! - runs the load pipeline
//! - prints reports or writes exports

use std::thread;
use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, ExportArgs, LoadArgs, WatchArgs};
use crate::config::Settings;
use crate::data::{demo_source, SourceDescriptor};
use crate::error::{AppError, LoadError};

pub mod pipeline;

use pipeline::{LoadOutput, Loader};

/// Entry point for the `health` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Status(args) => handle_status(&args),
        Command::Series(args) => handle_series(&args),
        Command::Export(args) => handle_export(&args),
        Command::Watch(args) => handle_watch(&args),
    }
}

fn handle_status(args: &LoadArgs) -> Result<(), AppError> {
    let (loader, source) = prepare(args)?;
    let run = load_or_report(&loader, &source)?;
    print_status(&run, &loader, args.json)
}

fn handle_series(args: &LoadArgs) -> Result<(), AppError> {
    let (loader, source) = prepare(args)?;
    let run = load_or_report(&loader, &source)?;

    if args.json {
        println!("{}", to_json(&run.ingest.series)?);
    } else {
        eprintln!("{}", crate::report::format_load_summary(&run.ingest, &source.to_string(), run.cached));
        print!("{}", crate::report::format_series(&run.ingest.series));
    }
    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<(), AppError> {
    let (loader, source) = prepare(&args.load)?;
    let run = load_or_report(&loader, &source)?;

    crate::io::export::write_series(&args.out, &run.ingest.series, args.format)?;
    tracing::info!(path = %args.out.display(), rows = run.ingest.rows_used(), "series exported");
    Ok(())
}

fn handle_watch(args: &WatchArgs) -> Result<(), AppError> {
    let (loader, source) = prepare(&args.load)?;
    let interval = Duration::from_secs(args.interval);

    let mut iteration = 0u64;
    loop {
        iteration += 1;
        // A failed reload is reported and retried on the next tick.
        match loader.load(&source) {
            Ok(run) => {
                println!("--- {} ---", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                print_status(&run, &loader, args.load.json)?;
            }
            Err(err) => report_load_error(&err),
        }

        if args.iterations.is_some_and(|n| iteration >= n) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn prepare(args: &LoadArgs) -> Result<(Loader, SourceDescriptor), AppError> {
    let settings = Settings::load(args.config.as_deref())?;
    let source = resolve_source(args, &settings);
    let loader = Loader::new(settings)?;
    Ok((loader, source))
}

/// Command-line source flags win, then `HEALTH_SHEET_URL`, then the demo table.
pub fn resolve_source(args: &LoadArgs, settings: &Settings) -> SourceDescriptor {
    if let Some(url) = &args.url {
        return SourceDescriptor::Url(url.clone());
    }
    if let Some(path) = &args.file {
        return SourceDescriptor::File(path.clone());
    }
    if args.demo {
        return demo_source();
    }
    match &settings.sheet_url {
        Some(url) => SourceDescriptor::Url(url.clone()),
        None => {
            tracing::info!("no source configured; using the embedded demo table");
            demo_source()
        }
    }
}

fn load_or_report(loader: &Loader, source: &SourceDescriptor) -> Result<LoadOutput, AppError> {
    loader.load(source).map_err(|err| {
        report_load_error(&err);
        AppError::from(err)
    })
}

fn report_load_error(err: &LoadError) {
    eprintln!("{}", load_error_report(err));
}

/// Error line plus the user hint, printed once per failed load.
fn load_error_report(err: &LoadError) -> String {
    format!("error: {err}\n{}", err.hint())
}

fn print_status(run: &LoadOutput, loader: &Loader, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", to_json(&run.status)?);
    } else {
        print!("{}", crate::report::format_status(&run.status, &loader.settings().goals));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::output(format!("Failed to serialize JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LoadArgs {
        LoadArgs {
            url: None,
            file: None,
            demo: false,
            config: None,
            json: false,
        }
    }

    #[test]
    fn explicit_flag_beats_environment() {
        let settings = Settings {
            sheet_url: Some("https://example.test/env".to_string()),
            ..Settings::default()
        };
        let mut a = args();
        a.demo = true;
        assert_eq!(resolve_source(&a, &settings), demo_source());

        let mut a = args();
        a.url = Some("https://example.test/flag".to_string());
        assert_eq!(
            resolve_source(&a, &settings),
            SourceDescriptor::Url("https://example.test/flag".to_string())
        );
    }

    #[test]
    fn environment_url_then_demo_fallback() {
        let settings = Settings {
            sheet_url: Some("https://example.test/env".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            resolve_source(&args(), &settings),
            SourceDescriptor::Url("https://example.test/env".to_string())
        );
        assert_eq!(resolve_source(&args(), &Settings::default()), demo_source());
    }

    #[test]
    fn load_error_report_has_error_then_hint() {
        let report = load_error_report(&LoadError::EmptySeries);
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "error: no valid rows: every row has an empty date cell");
        assert_eq!(lines[1], LoadError::EmptySeries.hint());
    }
}
