use std::collections::hash_map::Entry;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::error::Result;
use crate::progress::{is_progress_tick, Progress, ProgressEvent};
use crate::types::{ImageGroup, Product, ProductRegistry, VariantMap};

use super::events::{drive, DriveOutcome, ElementAttrs, XmlEvent, XmlHandler};
use super::open_catalog;

pub const MASTER_DOCUMENT: &str = "master catalog";

/// `product` elements are direct children of the document root.
const PRODUCT_DEPTH: usize = 2;
const ONLINE_FLAG_DEPTH: usize = PRODUCT_DEPTH + 1;

/// Everything the reconciliation needs from the master catalog.
#[derive(Debug, Clone, Default)]
pub struct MasterCatalog {
    pub products: ProductRegistry,
    pub variants: VariantMap,
    /// Completed `product` elements, including ones without an id.
    pub product_count: u64,
    /// Product ids seen more than once; the last definition is kept.
    pub duplicate_products: u64,
    /// Variant ids moved from one master to another; the last master is kept.
    pub remapped_variants: u64,
}

/// An `online-flag` element whose text is still being read.
#[derive(Debug)]
struct PendingOnlineFlag {
    site_id: Option<String>,
    text: String,
}

#[derive(Debug)]
struct ProductBuilder {
    product: Product,
    variant_ids: Vec<String>,
    online_flag: Option<PendingOnlineFlag>,
}

impl ProductBuilder {
    fn start(attrs: &ElementAttrs<'_>) -> std::result::Result<Self, quick_xml::Error> {
        Ok(Self {
            product: Product {
                product_id: attrs.get("product-id")?.unwrap_or_default(),
                online_flag: attrs.get_non_empty("online-flag")?,
                ..Product::default()
            },
            variant_ids: Vec::new(),
            online_flag: None,
        })
    }

    fn open_child(
        &mut self,
        name: &str,
        depth: usize,
        attrs: &ElementAttrs<'_>,
    ) -> std::result::Result<(), quick_xml::Error> {
        match name {
            "online-flag" if depth == ONLINE_FLAG_DEPTH => {
                debug_assert!(self.online_flag.is_none(), "online-flag elements do not nest");
                self.online_flag = Some(PendingOnlineFlag {
                    site_id: attrs.get_non_empty("site-id")?,
                    text: String::new(),
                });
            }
            "image-group" => {
                let view_type = attrs.get("view-type")?;
                self.product.image_groups.push(ImageGroup::new(view_type));
            }
            "image" => {
                if let Some(group) = self.product.image_groups.last_mut() {
                    if let Some(path) = attrs.get_non_empty("path")? {
                        group.image_paths.push(path);
                    }
                }
            }
            "variant" => {
                if let Some(id) = attrs.get_non_empty("product-id")? {
                    self.variant_ids.push(id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(flag) = self.online_flag.as_mut() {
            flag.text.push_str(text);
        }
    }

    /// Commits the pending online flag. Site attribution never outlives its element.
    fn close_online_flag(&mut self) {
        let Some(flag) = self.online_flag.take() else {
            return;
        };
        let value = flag.text.trim();
        if value.is_empty() {
            return;
        }
        match flag.site_id {
            Some(site) => {
                self.product
                    .site_online_flags
                    .insert(site, value.to_string());
            }
            None => {
                if self.product.online_flag.is_none() {
                    self.product.online_flag = Some(value.to_string());
                }
            }
        }
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    Scanning,
    InProduct(Box<ProductBuilder>),
}

/// Event-driven builder for [`MasterCatalog`], scoped to one parse.
///
/// At most one product is under construction at a time, and at most one
/// online flag of that product is awaiting its text.
#[derive(Debug, Default)]
pub(crate) struct MasterCatalogBuilder {
    state: ParserState,
    catalog: MasterCatalog,
    progress: Progress,
}

impl MasterCatalogBuilder {
    pub(crate) fn new(progress: Progress) -> Self {
        Self {
            progress,
            ..Self::default()
        }
    }

    pub(crate) fn finish(self, outcome: DriveOutcome) -> MasterCatalog {
        if outcome == DriveOutcome::Finished {
            self.progress.emit(ProgressEvent::Parsing {
                count: self.catalog.product_count,
                done: true,
            });
        }
        self.catalog
    }

    fn complete_product(&mut self, builder: ProductBuilder) {
        self.catalog.product_count += 1;
        if is_progress_tick(self.catalog.product_count) {
            self.progress.emit(ProgressEvent::Parsing {
                count: self.catalog.product_count,
                done: false,
            });
        }

        let ProductBuilder {
            mut product,
            variant_ids,
            ..
        } = builder;
        if product.product_id.is_empty() {
            tracing::debug!("skipping product without product-id");
            return;
        }

        product.has_variants = !variant_ids.is_empty();
        for variant_id in variant_ids {
            if let Some(previous) = self
                .catalog
                .variants
                .insert(variant_id.clone(), product.product_id.clone())
            {
                if previous != product.product_id {
                    self.catalog.remapped_variants += 1;
                    tracing::debug!(
                        variant = %variant_id,
                        from = %previous,
                        to = %product.product_id,
                        "variant remapped to a different master"
                    );
                }
            }
        }

        match self.catalog.products.entry(product.product_id.clone()) {
            Entry::Occupied(mut slot) => {
                self.catalog.duplicate_products += 1;
                tracing::debug!(
                    product = %product.product_id,
                    "duplicate product definition replaces earlier one"
                );
                slot.insert(product);
            }
            Entry::Vacant(slot) => {
                slot.insert(product);
            }
        }
    }
}

impl XmlHandler for MasterCatalogBuilder {
    fn on_event(&mut self, event: XmlEvent<'_>) -> std::result::Result<(), quick_xml::Error> {
        match (&mut self.state, event) {
            (ParserState::Scanning, XmlEvent::Open { name, depth, attrs })
                if name == "product" && depth == PRODUCT_DEPTH =>
            {
                self.state = ParserState::InProduct(Box::new(ProductBuilder::start(&attrs)?));
            }
            (ParserState::InProduct(builder), XmlEvent::Open { name, depth, attrs }) => {
                builder.open_child(name, depth, &attrs)?;
            }
            (ParserState::InProduct(builder), XmlEvent::Text(text)) => builder.text(text),
            (ParserState::InProduct(builder), XmlEvent::Close { name, depth })
                if name == "online-flag" && depth == ONLINE_FLAG_DEPTH =>
            {
                builder.close_online_flag();
            }
            (ParserState::InProduct(_), XmlEvent::Close { name, depth })
                if name == "product" && depth == PRODUCT_DEPTH =>
            {
                if let ParserState::InProduct(builder) = std::mem::take(&mut self.state) {
                    self.complete_product(*builder);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Stream a master catalog from any buffered reader.
pub fn read_master_catalog<R: BufRead>(input: R, progress: &Progress) -> Result<MasterCatalog> {
    read_master_catalog_until(input, progress, &AtomicBool::new(false))
}

/// Like [`read_master_catalog`], but returns what was read so far once `stop`
/// is raised. No `done` progress event is emitted for a stopped read.
pub(crate) fn read_master_catalog_until<R: BufRead>(
    input: R,
    progress: &Progress,
    stop: &AtomicBool,
) -> Result<MasterCatalog> {
    let mut builder = MasterCatalogBuilder::new(progress.clone());
    let outcome = drive(input, MASTER_DOCUMENT, &mut builder, stop)?;
    Ok(builder.finish(outcome))
}

/// Stream the master catalog export at `path`.
pub fn parse_master_catalog(path: &Path, progress: &Progress) -> Result<MasterCatalog> {
    parse_master_catalog_until(path, progress, &AtomicBool::new(false))
}

pub(crate) fn parse_master_catalog_until(
    path: &Path,
    progress: &Progress,
    stop: &AtomicBool,
) -> Result<MasterCatalog> {
    let input = open_catalog(path, MASTER_DOCUMENT)?;
    read_master_catalog_until(input, progress, stop)
}
