use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::error::Result;
use crate::progress::{is_progress_tick, Progress, ProgressEvent};
use crate::types::CategoryAssignments;

use super::events::{drive, DriveOutcome, XmlEvent, XmlHandler};
use super::open_catalog;

pub const STOREFRONT_DOCUMENT: &str = "storefront catalog";

#[derive(Debug, Clone, Default)]
pub struct StorefrontAssignments {
    /// Distinct product ids assigned to any category.
    pub product_ids: CategoryAssignments,
    /// Every `category-assignment` with a product id, duplicates included.
    pub assignment_count: u64,
}

struct AssignmentCollector {
    assignments: StorefrontAssignments,
    progress: Progress,
}

impl XmlHandler for AssignmentCollector {
    fn on_event(&mut self, event: XmlEvent<'_>) -> std::result::Result<(), quick_xml::Error> {
        if let XmlEvent::Open { name, attrs, .. } = event {
            if name == "category-assignment" {
                if let Some(id) = attrs.get_non_empty("product-id")? {
                    self.assignments.assignment_count += 1;
                    self.assignments.product_ids.insert(id);
                    if is_progress_tick(self.assignments.assignment_count) {
                        self.progress.emit(ProgressEvent::ParsingStorefront {
                            count: self.assignments.assignment_count,
                            done: false,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Collect category-assigned product ids from any buffered reader.
pub fn read_storefront_catalog<R: BufRead>(
    input: R,
    progress: &Progress,
) -> Result<StorefrontAssignments> {
    read_storefront_catalog_until(input, progress, &AtomicBool::new(false))
}

/// Like [`read_storefront_catalog`], but returns what was collected so far
/// once `stop` is raised, without a `done` progress event.
pub(crate) fn read_storefront_catalog_until<R: BufRead>(
    input: R,
    progress: &Progress,
    stop: &AtomicBool,
) -> Result<StorefrontAssignments> {
    let mut collector = AssignmentCollector {
        assignments: StorefrontAssignments::default(),
        progress: progress.clone(),
    };
    if drive(input, STOREFRONT_DOCUMENT, &mut collector, stop)? == DriveOutcome::Finished {
        progress.emit(ProgressEvent::ParsingStorefront {
            count: collector.assignments.assignment_count,
            done: true,
        });
    }
    Ok(collector.assignments)
}

/// Collect category-assigned product ids from the storefront export at `path`.
pub fn parse_storefront_catalog(path: &Path, progress: &Progress) -> Result<StorefrontAssignments> {
    parse_storefront_catalog_until(path, progress, &AtomicBool::new(false))
}

pub(crate) fn parse_storefront_catalog_until(
    path: &Path,
    progress: &Progress,
    stop: &AtomicBool,
) -> Result<StorefrontAssignments> {
    let input = open_catalog(path, STOREFRONT_DOCUMENT)?;
    read_storefront_catalog_until(input, progress, stop)
}
