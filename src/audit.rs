//! End-to-end audit run: parse both catalogs, reconcile, check remote storage.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{
    parse_master_catalog_until, parse_storefront_catalog_until, MasterCatalog,
    StorefrontAssignments,
};
use crate::error::{AuditError, Result};
use crate::progress::{Progress, ProgressEvent};
use crate::reconcile::{diff_remote, reconcile, ReconcileOptions, ReconcileStats};
use crate::types::{Issue, Summary};
use crate::webdav::{RemoteTarget, WebDavClient, WebDavCredentials, DEFAULT_TIMEOUT};

#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub master_catalog: PathBuf,
    pub storefront_catalog: PathBuf,
    pub remote: RemoteTarget,
    pub credentials: WebDavCredentials,
    /// Prefix removed from listed hrefs; defaults to the library path.
    pub base_path: Option<String>,
    pub options: ReconcileOptions,
    pub parse_concurrently: bool,
    pub timeout: Duration,
}

impl AuditRequest {
    pub fn new(
        master_catalog: impl Into<PathBuf>,
        storefront_catalog: impl Into<PathBuf>,
        remote: RemoteTarget,
        credentials: WebDavCredentials,
    ) -> Self {
        Self {
            master_catalog: master_catalog.into(),
            storefront_catalog: storefront_catalog.into(),
            remote,
            credentials,
            base_path: None,
            options: ReconcileOptions::default(),
            parse_concurrently: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn base_path_to_strip(&self) -> &str {
        self.base_path
            .as_deref()
            .unwrap_or(self.remote.remote_path.as_str())
    }
}

/// Counters gathered along the run, reported next to the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub products_parsed: u64,
    pub variants_mapped: usize,
    pub duplicate_products: u64,
    pub remapped_variants: u64,
    pub category_assignments: u64,
    #[serde(flatten)]
    pub reconcile: ReconcileStats,
    pub paths_checked: usize,
    /// `None` when no path needed verification and the listing was skipped.
    pub remote_files: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AuditReport {
    pub issues: Vec<Issue>,
    pub summary: Summary,
    pub stats: AuditStats,
    pub advisory: Option<String>,
}

/// Runs a complete audit. Any fatal error aborts the run without a partial report.
pub async fn run_audit(request: &AuditRequest, progress: &Progress) -> Result<AuditReport> {
    let (master, storefront) = parse_catalogs(request, progress).await?;

    progress.info(format!(
        "Parsed {} products from master catalog",
        master.product_count
    ));
    progress.info(format!(
        "Mapped {} variants to master products",
        master.variants.len()
    ));
    progress.info(format!(
        "Found {} category assignments ({} distinct products)",
        storefront.assignment_count,
        storefront.product_ids.len()
    ));

    progress.info(format!(
        "Analyzing products for image groups (view-type '{}')",
        request.options.view_type
    ));
    let mut reconciliation = reconcile(
        &master.products,
        &master.variants,
        &storefront.product_ids,
        &request.options,
    );
    let reconcile_stats = reconciliation.stats;

    if reconcile_stats.variants_resolved > 0 {
        progress.info(format!(
            "Mapped {} variant products to their masters",
            reconcile_stats.variants_resolved
        ));
    }
    if reconcile_stats.offline_skipped > 0 {
        progress.info(format!(
            "Skipped {} offline products",
            reconcile_stats.offline_skipped
        ));
    }
    if reconcile_stats.not_found_in_master > 0 {
        progress.warn(format!(
            "{} products not found in master catalog (skipped)",
            reconcile_stats.not_found_in_master
        ));
    }
    let advisory = reconcile_stats.advisory();
    if let Some(advisory) = &advisory {
        progress.warn(advisory.clone());
    }

    progress.info(format!(
        "Found {} products with image group issues",
        reconciliation.issues.len()
    ));
    progress.info(format!(
        "Found {} image paths to check against WebDAV",
        reconciliation.paths_to_verify.len()
    ));

    let mut remote_files = None;
    if !reconciliation.paths_to_verify.is_empty() {
        progress.info("Connecting to WebDAV server");
        let client = WebDavClient::with_timeout(request.credentials.clone(), request.timeout)?;
        let files = client
            .list_files(&request.remote, request.base_path_to_strip(), progress)
            .await?;
        progress.info(format!("Found {} files on WebDAV", files.len()));
        remote_files = Some(files.len());

        let missing = diff_remote(&reconciliation.paths_to_verify, &files);
        progress.info(format!(
            "Found {} missing image files on WebDAV",
            missing.len()
        ));
        reconciliation.issues.extend(missing);
    }

    let summary = Summary::from_issues(&reconciliation.issues);
    progress.info(format!(
        "Analysis complete: {} missing image groups, {} empty image groups, {} missing files, {} issues total",
        summary.missing_groups, summary.empty_groups, summary.missing_files, summary.total
    ));
    progress.emit(ProgressEvent::Summary { summary });

    Ok(AuditReport {
        issues: reconciliation.issues,
        summary,
        stats: AuditStats {
            products_parsed: master.product_count,
            variants_mapped: master.variants.len(),
            duplicate_products: master.duplicate_products,
            remapped_variants: master.remapped_variants,
            category_assignments: storefront.assignment_count,
            reconcile: reconcile_stats,
            paths_checked: reconciliation.paths_to_verify.len(),
            remote_files,
        },
        advisory,
    })
}

/// The two parses are independent; their order only affects progress ordering.
///
/// When run side by side, a failed parse raises a shared stop flag so the
/// other one quits at its next XML event instead of reading to the end.
async fn parse_catalogs(
    request: &AuditRequest,
    progress: &Progress,
) -> Result<(MasterCatalog, StorefrontAssignments)> {
    let stop = Arc::new(AtomicBool::new(false));
    let master_task = {
        let path = request.master_catalog.clone();
        let progress = progress.clone();
        let stop = stop.clone();
        move || {
            progress.info(format!("Parsing master catalog {}", path.display()));
            parse_master_catalog_until(&path, &progress, &stop).inspect_err(|_| raise(&stop))
        }
    };
    let storefront_task = {
        let path = request.storefront_catalog.clone();
        let progress = progress.clone();
        let stop = stop.clone();
        move || {
            progress.info(format!("Parsing storefront catalog {}", path.display()));
            parse_storefront_catalog_until(&path, &progress, &stop).inspect_err(|_| raise(&stop))
        }
    };

    if request.parse_concurrently {
        let (master, storefront) = tokio::join!(blocking(master_task), blocking(storefront_task));
        // A side that was stopped returns Ok; the side that failed carries the error.
        match (master, storefront) {
            (Ok(master), Ok(storefront)) => Ok((master, storefront)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    } else {
        let master = blocking(master_task).await?;
        let storefront = blocking(storefront_task).await?;
        Ok((master, storefront))
    }
}

fn raise(stop: &AtomicBool) {
    stop.store(true, Ordering::Relaxed);
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AuditError::Unknown(format!("catalog parser task failed: {e}")))?
}
