mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use catalog_audit_lib::{Progress, ProgressEvent};
use tracing_subscriber::EnvFilter;

use cli::Commands;
use commands::{run_audit_command, run_scan_remote};
use settings::AuditFlags;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);
    let progress = progress_for(args.verbose);

    match args.command {
        Commands::Audit {
            master,
            storefront,
            remote,
            view_type,
            all_view_types,
            site_id,
            online_only,
            sequential,
            format,
            output,
        } => {
            let flags = AuditFlags {
                view_type,
                all_view_types,
                site_id,
                online_only,
                sequential,
            };
            run_audit_command(
                args.config,
                args.verbose,
                progress,
                master,
                storefront,
                remote,
                flags,
                format,
                output,
            )
            .await
        }
        Commands::ScanRemote {
            remote,
            format,
            output,
        } => run_scan_remote(args.config, args.verbose, progress, remote, format, output).await,
    }
}

/// Logs go to stderr so stdout stays a clean report. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log events already reach stderr through tracing; only counters are printed here.
fn progress_for(verbose: bool) -> Progress {
    if !verbose {
        return Progress::silent();
    }
    Progress::new(Arc::new(|event: &ProgressEvent| match event {
        ProgressEvent::Parsing { count, done } => {
            if *done {
                eprintln!("Master catalog: {count} products parsed");
            } else {
                eprintln!("Master catalog: {count} products\u{2026}");
            }
        }
        ProgressEvent::ParsingStorefront { count, done } => {
            if *done {
                eprintln!("Storefront catalog: {count} assignments parsed");
            } else {
                eprintln!("Storefront catalog: {count} assignments\u{2026}");
            }
        }
        ProgressEvent::WebdavScan { count } => eprintln!("WebDAV: {count} files listed\u{2026}"),
        ProgressEvent::Log { .. } | ProgressEvent::Summary { .. } => {}
    }))
}
