//! Catalog Audit Library
//!
//! Reconciles a product catalog export against a WebDAV image library to find
//! storefront products whose images are missing, either from the catalog
//! itself or from remote storage.
//!
//! # Module Overview
//!
//! - [`catalog`] - Streaming readers for the master and storefront catalogs
//! - [`reconcile`] - Classification of categorized products into issues
//! - [`webdav`] - PROPFIND listing of the remote image library
//! - [`audit`] - End-to-end run combining the above
//! - [`path`] - Path normalization shared by catalog and remote paths
//! - [`progress`] - Structured progress events
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use catalog_audit_lib::{run_audit, AuditRequest, Progress, RemoteTarget, WebDavCredentials};
//!
//! # async fn example() -> catalog_audit_lib::Result<()> {
//! let remote = RemoteTarget::parse("https://host/on/demandware.servlet/webdav/Sites/Catalogs/master")?;
//! let request = AuditRequest::new(
//!     "master.xml",
//!     "storefront.xml",
//!     remote,
//!     WebDavCredentials::new("user", "secret"),
//! );
//! let report = run_audit(&request, &Progress::silent()).await?;
//! println!("{} issues", report.summary.total);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod path;
pub mod progress;
pub mod reconcile;
pub mod types;
pub mod webdav;

pub use audit::{run_audit, AuditReport, AuditRequest, AuditStats};
pub use catalog::{
    parse_master_catalog, parse_storefront_catalog, read_master_catalog,
    read_storefront_catalog, MasterCatalog, StorefrontAssignments,
};
pub use config::Config;
pub use error::{AuditError, ErrorCategory, ErrorPayload, Result};
pub use output::{AuditOutput, AuditSuccess, ErrorOutput, RemoteScanOutput, AUDIT_OUTPUT_VERSION};
pub use path::normalize_path;
pub use progress::{LogLevel, Progress, ProgressCallback, ProgressEvent};
pub use reconcile::{
    diff_remote, reconcile, PendingCheck, ReconcileOptions, ReconcileStats, Reconciliation,
};
pub use types::{
    CategoryAssignments, ImageGroup, Issue, IssueKind, Product, ProductRegistry, RemoteFileSet,
    Summary, VariantMap, ViewTypeFilter, FILE_NOT_FOUND_REASON,
};
pub use webdav::{parse_multistatus, RemoteTarget, WebDavClient, WebDavCredentials};
