use catalog_audit_lib::AuditOutput;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Nothing listens on port 9; these runs must finish without touching the remote.
const UNREACHABLE_URL: &str = "http://127.0.0.1:9/webdav/library";

fn write_fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fixture");
    path
}

/// Runs the binary with an isolated config home and no credential env vars.
fn run_cli(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_catalog-audit"))
        .args(args)
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("CATALOG_AUDIT_USERNAME")
        .env_remove("CATALOG_AUDIT_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .expect("run catalog-audit")
}

fn parse_stdout(output: &Output) -> AuditOutput {
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON payload")
}

#[test]
fn audit_exits_one_when_image_groups_are_missing() {
    let dir = TempDir::new().expect("tempdir");
    let master = write_fixture(
        dir.path(),
        "master.xml",
        r#"<catalog><product product-id="P1"><images><image-group view-type="swatch"/></images></product></catalog>"#,
    );
    let storefront = write_fixture(
        dir.path(),
        "storefront.xml",
        r#"<catalog><category-assignment category-id="c" product-id="P1"/></catalog>"#,
    );

    let output = run_cli(
        &dir,
        &[
            "audit",
            "--master",
            master.to_str().unwrap(),
            "--storefront",
            storefront.to_str().unwrap(),
            "--webdav-url",
            UNREACHABLE_URL,
            "--username",
            "user",
            "--password",
            "pass",
            "--view-type",
            "large",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    match parse_stdout(&output) {
        AuditOutput::Audit(report) => {
            assert_eq!(report.view_type, "large");
            assert_eq!(report.summary.missing_groups, 1);
            assert_eq!(report.issues[0].product_id, "P1");
        }
        other => panic!("expected audit output, got {other:?}"),
    }
}

#[test]
fn audit_exits_zero_when_no_issues_are_found() {
    let dir = TempDir::new().expect("tempdir");
    let master = write_fixture(dir.path(), "master.xml", "<catalog/>");
    let storefront = write_fixture(
        dir.path(),
        "storefront.xml",
        r#"<catalog><category-assignment product-id="GONE"/></catalog>"#,
    );

    let output = run_cli(
        &dir,
        &[
            "audit",
            "--master",
            master.to_str().unwrap(),
            "--storefront",
            storefront.to_str().unwrap(),
            "--webdav-url",
            UNREACHABLE_URL,
            "--username",
            "user",
            "--password",
            "pass",
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    match parse_stdout(&output) {
        AuditOutput::Audit(report) => {
            assert_eq!(report.view_type, "all");
            assert!(report.issues.is_empty());
            assert_eq!(report.stats.reconcile.not_found_in_master, 1);
            assert!(report.advisory.is_some());
        }
        other => panic!("expected audit output, got {other:?}"),
    }
}

#[test]
fn audit_accepts_config_file_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let master = write_fixture(
        dir.path(),
        "master.xml",
        r#"<catalog><product product-id="P1"><images><image-group view-type="swatch"/></images></product></catalog>"#,
    );
    let storefront = write_fixture(
        dir.path(),
        "storefront.xml",
        r#"<catalog><category-assignment product-id="P1"/></catalog>"#,
    );
    let config = write_fixture(
        dir.path(),
        "audit.toml",
        &format!(
            "view_type = \"large\"\n\n[webdav]\nurl = \"{UNREACHABLE_URL}\"\nusername = \"cfg-user\"\ntimeout = \"5s\"\n"
        ),
    );

    let output = run_cli(
        &dir,
        &[
            "audit",
            "--config",
            config.to_str().unwrap(),
            "--master",
            master.to_str().unwrap(),
            "--storefront",
            storefront.to_str().unwrap(),
            "--password",
            "pass",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    match parse_stdout(&output) {
        AuditOutput::Audit(report) => assert_eq!(report.summary.missing_groups, 1),
        other => panic!("expected audit output, got {other:?}"),
    }
}

#[test]
fn audit_exits_two_for_invalid_url() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_cli(
        &dir,
        &[
            "audit",
            "--master",
            "missing-master.xml",
            "--storefront",
            "missing-storefront.xml",
            "--webdav-url",
            "not a url",
            "--username",
            "user",
            "--password",
            "pass",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        AuditOutput::Error(err) => {
            assert!(!err.success);
            assert!(err.error.contains("relative URL") || err.error.contains("URL"));
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn audit_exits_two_for_missing_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let storefront = write_fixture(dir.path(), "storefront.xml", "<catalog/>");
    let missing = dir.path().join("absent.xml");

    let output = run_cli(
        &dir,
        &[
            "audit",
            "--master",
            missing.to_str().unwrap(),
            "--storefront",
            storefront.to_str().unwrap(),
            "--webdav-url",
            UNREACHABLE_URL,
            "--username",
            "user",
            "--password",
            "pass",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        AuditOutput::Error(err) => assert!(err.error.contains("master catalog")),
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn missing_password_is_fatal_before_any_parsing() {
    let dir = TempDir::new().expect("tempdir");
    let output = run_cli(
        &dir,
        &[
            "scan-remote",
            "--webdav-url",
            UNREACHABLE_URL,
            "--username",
            "user",
        ],
    );
    assert_eq!(output.status.code(), Some(2));
    match parse_stdout(&output) {
        AuditOutput::Error(err) => {
            assert!(err.error.contains("password"));
            assert!(err
                .details
                .remediation
                .unwrap_or_default()
                .contains("CATALOG_AUDIT_PASSWORD"));
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn invalid_config_file_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_fixture(dir.path(), "bad.toml", "unknown_key = 1\n");
    let output = run_cli(
        &dir,
        &[
            "scan-remote",
            "--config",
            config.to_str().unwrap(),
            "--webdav-url",
            UNREACHABLE_URL,
        ],
    );
    assert_eq!(output.status.code(), Some(2));
}
