//! Streaming readers for the master and storefront catalog exports.
//!
//! Both readers consume the document as a stream of element events, so
//! memory stays proportional to the extracted records rather than the file.

mod events;
mod master;
mod storefront;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{AuditError, Result};

pub use master::{parse_master_catalog, read_master_catalog, MasterCatalog, MASTER_DOCUMENT};
pub use storefront::{
    parse_storefront_catalog, read_storefront_catalog, StorefrontAssignments,
    STOREFRONT_DOCUMENT,
};
pub(crate) use master::parse_master_catalog_until;
pub(crate) use storefront::parse_storefront_catalog_until;

const READ_BUFFER_SIZE: usize = 64 * 1024;

fn open_catalog(path: &Path, document: &str) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        AuditError::parse(document, format!("cannot open {}: {e}", path.display()))
    })?;
    Ok(BufReader::with_capacity(READ_BUFFER_SIZE, file))
}
