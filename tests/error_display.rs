use catalog_audit_lib::{AuditError, ErrorCategory};

#[test]
fn config_error_display_includes_message() {
    let err = AuditError::Config("WebDAV URL is required".to_string());

    assert_eq!(format!("{}", err), "Configuration error: WebDAV URL is required");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: AuditError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn parse_helper_names_the_document() {
    let err = AuditError::parse("master catalog", "unexpected end of document");

    assert_eq!(
        format!("{}", err),
        "Failed to parse master catalog: unexpected end of document"
    );
}

#[test]
fn remote_request_helper_includes_status_and_message() {
    let err = AuditError::remote_request(reqwest::StatusCode::UNAUTHORIZED, "Unauthorized");

    assert_eq!(
        format!("{}", err),
        "WebDAV request failed (status 401 Unauthorized): Unauthorized"
    );
    assert_eq!(err.to_payload().category, ErrorCategory::Remote);
}

#[test]
fn invalid_url_converts_from_parse_error() {
    let parse_err = url::Url::parse("not a url").unwrap_err();
    let err: AuditError = parse_err.into();

    assert!(format!("{}", err).starts_with("Invalid URL: "));
    assert_eq!(err.to_payload().category, ErrorCategory::Config);
}
