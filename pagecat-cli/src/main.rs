//! pagecat - arrange PDF pages and images into a single PDF.

mod cli;

use clap::Parser;
use std::io::{self, Write};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pagecat::config::{Config, OverwriteMode};
use pagecat::error::{PageCatError, Result};
use pagecat::io::PdfWriter;
use pagecat::merge::CancellationToken;
use pagecat::output::{self, OutputFormatter, ProgressBar, ProgressStyle};
use pagecat::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Diagnostics go to stderr. `PAGECAT_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pagecat=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("PAGECAT_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    formatter.debug(&format!("{} v{}", pagecat::NAME, pagecat::VERSION));
    debug!(
        sources = config.plan.entries.len(),
        output = %config.output.display(),
        "configuration loaded"
    );

    let mut session = Session::new(config.export.clone());
    let mut added = session.add_plan(&config.plan)?;
    if !config.continue_on_error && !added.failures.is_empty() {
        return Err(added.failures.swap_remove(0).error);
    }
    output::display_add_report(&formatter, &added);

    if session.is_empty() {
        return Err(PageCatError::NothingToExport);
    }

    if config.dry_run {
        output::display_plan(&formatter, session.pages());
        formatter.success(&format!(
            "Dry run: would write {} page(s) to {}",
            session.len(),
            config.output.display()
        ));
        return Ok(());
    }

    handle_output_overwrite(&config, &formatter)?;
    PdfWriter::new().can_write(&config.output)?;

    let total = session.len();
    let job = session.begin_export()?;
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();
    let destination = config.output.clone();
    let show_progress = !config.quiet;

    let mut worker = tokio::task::spawn_blocking(move || {
        let mut job = job;
        let mut progress = if show_progress {
            ProgressBar::new(total, ProgressStyle::Bar)
        } else {
            ProgressBar::disabled()
        };
        progress.set_message("Exporting");

        let result = {
            let mut tick = |done: usize, _total: usize| progress.update(done);
            job.run(&destination, &worker_cancel, Some(&mut tick))
        };
        if result.is_ok() {
            progress.finish();
        } else {
            progress.clear();
        }
        (job, result)
    });

    let joined = tokio::select! {
        joined = &mut worker => joined,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            formatter.warning("Cancelling export...");
            worker.await
        }
    };
    let (job, result) =
        joined.map_err(|e| PageCatError::other(format!("Export worker failed: {e}")))?;
    session.finish_export(job);

    let report = result?;
    output::display_export_report(&formatter, &report);
    Ok(())
}

/// Decide whether an existing output may be replaced.
fn handle_output_overwrite(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    if !config.output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PageCatError::output_exists(config.output.clone())),
        // Nobody to ask.
        OverwriteMode::Prompt if formatter.is_quiet() => {
            Err(PageCatError::output_exists(config.output.clone()))
        }
        OverwriteMode::Prompt => {
            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PageCatError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(PageCatError::Cancelled),
            }
        }
    }
}
