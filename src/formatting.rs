use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use catalog_audit_lib::{AuditError, AuditOutput, AuditSuccess, ErrorOutput, IssueKind};

use crate::cli::OutputFormat;

/// Issues listed in the human view before the rest are elided.
const MAX_PRETTY_ISSUES: usize = 20;

/// Write output in the requested format.
pub fn write_output(
    body: &AuditOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: AuditError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    tracing::debug!(error = ?err, "audit aborted");
    let payload = AuditOutput::Error(ErrorOutput::new(err.to_payload()));

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"success\":false}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Exit code 2 is reserved for fatal errors; findings use 1.
    ExitCode::from(2)
}

fn write_json_output(
    body: &AuditOutput,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

fn write_pretty_output(body: &AuditOutput, output: Option<&Path>) -> io::Result<()> {
    let use_human = output.is_none() && std::io::stdout().is_terminal();

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Files and pipes keep the JSON shape.
    let content = serde_json::to_string_pretty(body)
        .unwrap_or_else(|_| "{\"success\":false}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &AuditOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        AuditOutput::Audit(out) => {
            let clean = out.summary.total == 0;
            let status = color(
                if clean { "OK" } else { "ISSUES" },
                if clean { "32" } else { "31" },
                colorize,
            );
            writeln!(buf, "{status} Catalog image audit (view-type '{}')", out.view_type).ok();
            writeln!(
                buf,
                "Summary: {} missing image groups, {} empty image groups, {} missing files ({} total)",
                out.summary.missing_groups,
                out.summary.empty_groups,
                out.summary.missing_files,
                out.summary.total
            )
            .ok();
            writeln!(
                buf,
                "Checked {} categorized products, {} image paths against {} remote files",
                out.stats.reconcile.categorized,
                out.stats.paths_checked,
                out.stats
                    .remote_files
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "no".to_string())
            )
            .ok();
            if let Some(advisory) = &out.advisory {
                writeln!(buf, "{} {}", color("Note:", "33", colorize), advisory).ok();
            }

            if !out.issues.is_empty() {
                writeln!(buf, "Issues (max {MAX_PRETTY_ISSUES}):").ok();
                for issue in out.issues.iter().take(MAX_PRETTY_ISSUES) {
                    let label = match issue.kind {
                        IssueKind::MissingImageGroup => color("missing-group", "31", colorize),
                        IssueKind::EmptyImageGroup => color("empty-group", "33", colorize),
                        IssueKind::FileNotFound => color("missing-file", "35", colorize),
                    };
                    let product = match &issue.master_product_id {
                        Some(master) => format!("{} (master {})", issue.product_id, master),
                        None => issue.product_id.clone(),
                    };
                    let detail = if issue.image_path.is_empty() {
                        &issue.reason
                    } else {
                        &issue.image_path
                    };
                    writeln!(buf, "- [{label}] {product}: {detail}").ok();
                }
                if out.issues.len() > MAX_PRETTY_ISSUES {
                    writeln!(
                        buf,
                        "... and {} more (use --format json for the full list)",
                        out.issues.len() - MAX_PRETTY_ISSUES
                    )
                    .ok();
                }
            }
        }
        AuditOutput::RemoteScan(out) => {
            let header = color("[SCAN]", "36", colorize);
            writeln!(buf, "{header} {} files under {}", out.file_count, out.url).ok();
            for file in &out.files {
                writeln!(buf, "- {file}").ok();
            }
        }
        AuditOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            writeln!(buf, "{} {}", header, out.error).ok();
            if let Some(remediation) = &out.details.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Exit code for a completed audit: 1 when any issue was found.
pub fn exit_code_for_audit(report: &AuditSuccess) -> ExitCode {
    if report.summary.total == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_audit_lib::output::{RemoteScanOutput, AUDIT_OUTPUT_VERSION};
    use catalog_audit_lib::{AuditStats, Issue, Summary, ViewTypeFilter};

    fn audit_output(issues: Vec<Issue>, advisory: Option<String>) -> AuditSuccess {
        AuditSuccess {
            version: AUDIT_OUTPUT_VERSION.to_string(),
            success: true,
            view_type: "large".into(),
            summary: Summary::from_issues(&issues),
            issues,
            stats: AuditStats::default(),
            advisory,
        }
    }

    #[test]
    fn exit_code_reflects_issue_count() {
        assert_eq!(exit_code_for_audit(&audit_output(vec![], None)), ExitCode::SUCCESS);
        let filter = ViewTypeFilter::Only("large".into());
        let issues = vec![Issue::missing_image_group("P1", &filter)];
        assert_eq!(exit_code_for_audit(&audit_output(issues, None)), ExitCode::from(1));
    }

    #[test]
    fn render_error_always_returns_fatal_exit_code() {
        let code = render_error(
            AuditError::Config("boom".to_string()),
            OutputFormat::Json,
            None,
        );
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn format_pretty_lists_issues_and_advisory() {
        let filter = ViewTypeFilter::Only("large".into());
        let issues = vec![
            Issue::missing_image_group("P1", &filter),
            Issue::file_not_found("V1", Some("P2"), "images/p2.jpg", "large"),
        ];
        let output = AuditOutput::Audit(audit_output(
            issues,
            Some("Most categorized products are missing from the master catalog".into()),
        ));

        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("ISSUES Catalog image audit (view-type 'large')"));
        assert!(pretty.contains("1 missing image groups"));
        assert!(pretty.contains("1 missing files"));
        assert!(pretty.contains("[missing-group] P1"));
        assert!(pretty.contains("[missing-file] V1 (master P2): images/p2.jpg"));
        assert!(pretty.contains("Note: Most categorized products"));
    }

    #[test]
    fn format_pretty_elides_long_issue_lists() {
        let filter = ViewTypeFilter::All;
        let issues: Vec<_> = (0..25)
            .map(|i| Issue::empty_image_group(&format!("P{i}"), &filter))
            .collect();
        let pretty = format_pretty(&AuditOutput::Audit(audit_output(issues, None)), false);
        assert!(pretty.contains("... and 5 more"));
    }

    #[test]
    fn format_pretty_lists_scanned_files() {
        let output = AuditOutput::RemoteScan(RemoteScanOutput {
            version: AUDIT_OUTPUT_VERSION.to_string(),
            success: true,
            url: "https://host/lib".into(),
            file_count: 2,
            files: vec!["a.jpg".into(), "b/c.png".into()],
        });
        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[SCAN] 2 files under https://host/lib"));
        assert!(pretty.contains("- b/c.png"));
    }

    #[test]
    fn format_pretty_handles_errors() {
        let output = AuditOutput::Error(ErrorOutput::new(
            AuditError::Config("WebDAV password is required".into()).to_payload(),
        ));
        let pretty = format_pretty(&output, false);
        assert!(pretty.contains("[ERROR] WebDAV password is required"));
        assert!(pretty.contains("Hint:"));
    }
}
