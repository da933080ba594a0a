use std::path::PathBuf;
use std::process::ExitCode;

use catalog_audit_lib::{run_audit, AuditError, AuditOutput, AuditRequest, AuditSuccess, Progress};

use crate::cli::{OutputFormat, RemoteArgs};
use crate::formatting::{exit_code_for_audit, render_error, write_output};
use crate::settings::{
    format_effective_config, load_config, process_env, resolve_audit_settings, AuditFlags,
};

/// Run the audit command.
#[allow(clippy::too_many_arguments)]
pub async fn run_audit_command(
    config_path: Option<PathBuf>,
    verbose: bool,
    progress: Progress,
    master: PathBuf,
    storefront: PathBuf,
    remote: RemoteArgs,
    flags: AuditFlags,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    let resolved = match resolve_audit_settings(&flags, &remote, &config, process_env) {
        Ok(resolved) => resolved,
        Err(err) => return render_error(err, format, output),
    };
    if verbose {
        eprintln!(
            "{}",
            format_effective_config(&resolved, config_path.as_deref())
        );
    }

    let view_type = resolved.options.view_type.label().to_string();
    let request = AuditRequest {
        master_catalog: master,
        storefront_catalog: storefront,
        remote: resolved.remote.target,
        credentials: resolved.remote.credentials,
        base_path: resolved.remote.base_path,
        options: resolved.options,
        parse_concurrently: resolved.parse_concurrently,
        timeout: resolved.remote.timeout,
    };

    let report = match run_audit(&request, &progress).await {
        Ok(report) => report,
        Err(err) => return render_error(err, format, output),
    };

    let success = AuditSuccess::from_report(report, &view_type);
    let code = exit_code_for_audit(&success);
    if let Err(err) = write_output(&AuditOutput::Audit(success), format, output.clone()) {
        return render_error(AuditError::Unknown(err.to_string()), format, output);
    }
    code
}
