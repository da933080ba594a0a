use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Products keyed by `product-id`.
pub type ProductRegistry = HashMap<String, Product>;

/// Variant product id to the id of the master product that declares it.
pub type VariantMap = HashMap<String, String>;

/// Distinct product ids (masters or variants) assigned to a storefront category.
///
/// Ordered so that reconciliation visits ids in a stable order.
pub type CategoryAssignments = BTreeSet<String>;

/// Normalized relative paths of the files present in remote storage.
pub type RemoteFileSet = HashSet<String>;

/// An `image-group` of a master product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_type: Option<String>,
    /// Raw `path` attributes in source order.
    pub image_paths: Vec<String>,
}

impl ImageGroup {
    pub fn new(view_type: Option<String>) -> Self {
        Self {
            view_type,
            image_paths: Vec::new(),
        }
    }
}

/// A product from the master catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    /// Global online flag; the first one seen wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_flag: Option<String>,
    #[serde(default)]
    pub site_online_flags: HashMap<String, String>,
    #[serde(default)]
    pub image_groups: Vec<ImageGroup>,
    pub has_variants: bool,
}

impl Product {
    /// Online flag that applies to `site_id`, falling back to the global flag.
    pub fn resolve_online_flag(&self, site_id: Option<&str>) -> Option<&str> {
        site_id
            .and_then(|site| self.site_online_flags.get(site))
            .or(self.online_flag.as_ref())
            .map(String::as_str)
    }

    /// A product is online only when its resolved flag reads `true` (any case).
    pub fn is_online(&self, site_id: Option<&str>) -> bool {
        self.resolve_online_flag(site_id)
            .map(|flag| flag.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}
