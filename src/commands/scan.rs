use std::path::PathBuf;
use std::process::ExitCode;

use catalog_audit_lib::output::AUDIT_OUTPUT_VERSION;
use catalog_audit_lib::{AuditError, AuditOutput, Progress, RemoteScanOutput, WebDavClient};

use crate::cli::{OutputFormat, RemoteArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, process_env, resolve_remote_settings};

/// Run the scan-remote command: one PROPFIND, listed the way the audit sees it.
pub async fn run_scan_remote(
    config_path: Option<PathBuf>,
    verbose: bool,
    progress: Progress,
    remote: RemoteArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let resolved = match resolve_remote_settings(&remote, &config, process_env) {
        Ok(resolved) => resolved,
        Err(err) => return render_error(err, format, output),
    };
    if verbose {
        eprintln!(
            "Listing {} (stripping '{}')\u{2026}",
            resolved.target.url(),
            resolved.base_path_to_strip()
        );
    }

    let client = match WebDavClient::with_timeout(resolved.credentials.clone(), resolved.timeout) {
        Ok(client) => client,
        Err(err) => return render_error(err, format, output),
    };
    let files = match client
        .list_files(&resolved.target, resolved.base_path_to_strip(), &progress)
        .await
    {
        Ok(files) => files,
        Err(err) => return render_error(err, format, output),
    };

    let mut files: Vec<String> = files.into_iter().collect();
    files.sort();
    let body = AuditOutput::RemoteScan(RemoteScanOutput {
        version: AUDIT_OUTPUT_VERSION.to_string(),
        success: true,
        url: resolved.target.url().to_string(),
        file_count: files.len(),
        files,
    });
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Unknown(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
