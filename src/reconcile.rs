//! Cross-reference of categorized product ids against the master catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::normalize_path;
use crate::types::{
    CategoryAssignments, ImageGroup, Issue, Product, ProductRegistry, RemoteFileSet, VariantMap,
    ViewTypeFilter, ALL_VIEW_TYPES,
};

/// Share of categorized ids missing from the master catalog above which the
/// catalogs are reported as probably mismatched.
pub const NOT_FOUND_ADVISORY_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub view_type: ViewTypeFilter,
    /// Site whose online flag takes precedence over the global one.
    pub site_id: Option<String>,
    /// Skip products that are not online.
    pub online_only: bool,
}

/// A catalog image path waiting for the remote existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCheck {
    pub product_id: String,
    pub master_product_id: String,
    pub original_path: String,
    pub view_type: String,
    pub is_variant: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileStats {
    pub categorized: usize,
    pub variants_resolved: usize,
    pub not_found_in_master: usize,
    pub offline_skipped: usize,
}

impl ReconcileStats {
    pub fn not_found_ratio(&self) -> f64 {
        if self.categorized == 0 {
            0.0
        } else {
            self.not_found_in_master as f64 / self.categorized as f64
        }
    }

    /// Advisory text when most categorized ids are unknown to the master catalog.
    pub fn advisory(&self) -> Option<String> {
        let ratio = self.not_found_ratio();
        (ratio > NOT_FOUND_ADVISORY_RATIO).then(|| {
            format!(
                "{:.0}% of categorized products were not found in the master catalog; the catalogs may come from different environments or the master catalog may be partial",
                ratio * 100.0
            )
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Image group issues, in categorized id order.
    pub issues: Vec<Issue>,
    /// Normalized path to the check that owns it; the last categorized id wins.
    pub paths_to_verify: BTreeMap<String, PendingCheck>,
    pub stats: ReconcileStats,
}

/// Classifies each categorized id; no I/O happens here.
pub fn reconcile(
    products: &ProductRegistry,
    variants: &VariantMap,
    assignments: &CategoryAssignments,
    options: &ReconcileOptions,
) -> Reconciliation {
    let mut result = Reconciliation::default();
    result.stats.categorized = assignments.len();

    for categorized_id in assignments {
        let (master_id, is_variant) = match variants.get(categorized_id) {
            Some(master) => (master.as_str(), true),
            None => (categorized_id.as_str(), false),
        };
        if is_variant {
            result.stats.variants_resolved += 1;
        }

        let Some(product) = products.get(master_id) else {
            result.stats.not_found_in_master += 1;
            continue;
        };

        if options.online_only && !product.is_online(options.site_id.as_deref()) {
            result.stats.offline_skipped += 1;
            continue;
        }

        let matched = matching_groups(product, &options.view_type);
        if matched.is_empty() {
            result
                .issues
                .push(Issue::missing_image_group(categorized_id, &options.view_type));
            continue;
        }

        let mut collected = 0usize;
        for group in matched {
            let view_type = match &options.view_type {
                ViewTypeFilter::All => group.view_type.as_deref().unwrap_or(ALL_VIEW_TYPES),
                ViewTypeFilter::Only(vt) => vt.as_str(),
            };
            for original_path in &group.image_paths {
                collected += 1;
                let normalized = normalize_path(original_path);
                if normalized.is_empty() {
                    continue;
                }
                result.paths_to_verify.insert(
                    normalized,
                    PendingCheck {
                        product_id: categorized_id.clone(),
                        master_product_id: master_id.to_string(),
                        original_path: original_path.clone(),
                        view_type: view_type.to_string(),
                        is_variant,
                    },
                );
            }
        }
        if collected == 0 {
            result
                .issues
                .push(Issue::empty_image_group(categorized_id, &options.view_type));
        }
    }

    result
}

/// All groups in all-view-types mode, otherwise the first group of the wanted type.
fn matching_groups<'a>(product: &'a Product, filter: &ViewTypeFilter) -> Vec<&'a ImageGroup> {
    match filter {
        ViewTypeFilter::All => product.image_groups.iter().collect(),
        ViewTypeFilter::Only(_) => product
            .image_groups
            .iter()
            .find(|group| filter.matches(group.view_type.as_deref()))
            .into_iter()
            .collect(),
    }
}

/// One issue per pending path absent from `remote`, in normalized path order.
pub fn diff_remote(
    paths_to_verify: &BTreeMap<String, PendingCheck>,
    remote: &RemoteFileSet,
) -> Vec<Issue> {
    paths_to_verify
        .iter()
        .filter(|(normalized, _)| !remote.contains(normalized.as_str()))
        .map(|(_, check)| {
            Issue::file_not_found(
                &check.product_id,
                check.is_variant.then_some(check.master_product_id.as_str()),
                &check.original_path,
                &check.view_type,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueKind;
    use proptest::prelude::*;

    fn group(view_type: &str, paths: &[&str]) -> ImageGroup {
        ImageGroup {
            view_type: Some(view_type.to_string()),
            image_paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn product(id: &str, online: Option<&str>, groups: Vec<ImageGroup>) -> Product {
        Product {
            product_id: id.to_string(),
            online_flag: online.map(str::to_string),
            image_groups: groups,
            ..Product::default()
        }
    }

    fn registry(products: Vec<Product>) -> ProductRegistry {
        products
            .into_iter()
            .map(|p| (p.product_id.clone(), p))
            .collect()
    }

    fn assigned(ids: &[&str]) -> CategoryAssignments {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn only(view_type: &str) -> ReconcileOptions {
        ReconcileOptions {
            view_type: ViewTypeFilter::Only(view_type.to_string()),
            ..ReconcileOptions::default()
        }
    }

    #[test]
    fn product_without_groups_is_missing_group() {
        let products = registry(vec![product("P2", Some("true"), vec![])]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P2"]), &only("large"));

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::MissingImageGroup);
        assert_eq!(
            result.issues[0].reason,
            "Missing image group for view-type 'large'"
        );
        assert!(result.paths_to_verify.is_empty());
    }

    #[test]
    fn first_matching_group_wins() {
        let products = registry(vec![product(
            "P",
            None,
            vec![group("large", &[]), group("large", &["b.jpg"])],
        )]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P"]), &only("large"));

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::EmptyImageGroup);
        assert!(result.paths_to_verify.is_empty());
    }

    #[test]
    fn all_mode_collects_every_group_with_its_view_type() {
        let products = registry(vec![product(
            "P",
            None,
            vec![group("large", &["A.jpg"]), group("swatch", &[])],
        )]);
        let result = reconcile(
            &products,
            &VariantMap::new(),
            &assigned(&["P"]),
            &ReconcileOptions::default(),
        );

        assert!(result.issues.is_empty());
        let check = &result.paths_to_verify["a.jpg"];
        assert_eq!(check.view_type, "large");
        assert_eq!(check.original_path, "A.jpg");
    }

    #[test]
    fn all_mode_reports_empty_only_when_every_group_is_empty() {
        let products = registry(vec![product(
            "P",
            None,
            vec![group("large", &[]), group("swatch", &[])],
        )]);
        let result = reconcile(
            &products,
            &VariantMap::new(),
            &assigned(&["P"]),
            &ReconcileOptions::default(),
        );

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].reason, "Image groups exist but are empty");
        assert_eq!(result.issues[0].view_type, "all");
    }

    #[test]
    fn unusable_paths_count_as_collected_but_are_not_verified() {
        let products = registry(vec![product("P", None, vec![group("large", &["//"])])]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P"]), &only("large"));

        assert!(result.issues.is_empty());
        assert!(result.paths_to_verify.is_empty());
    }

    #[test]
    fn variants_use_master_data() {
        let products = registry(vec![product(
            "P3",
            Some("true"),
            vec![group("large", &["Images/p3.jpg"])],
        )]);
        let variants = VariantMap::from([("V1".to_string(), "P3".to_string())]);
        let result = reconcile(&products, &variants, &assigned(&["V1"]), &only("large"));

        assert_eq!(result.stats.variants_resolved, 1);
        let check = &result.paths_to_verify["images/p3.jpg"];
        assert_eq!(check.product_id, "V1");
        assert_eq!(check.master_product_id, "P3");
        assert!(check.is_variant);

        let issues = diff_remote(&result.paths_to_verify, &RemoteFileSet::new());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].product_id, "V1");
        assert_eq!(issues[0].master_product_id.as_deref(), Some("P3"));
        assert_eq!(issues[0].image_path, "Images/p3.jpg");
    }

    #[test]
    fn masters_carry_no_master_id_on_file_issues() {
        let products = registry(vec![product(
            "P1",
            None,
            vec![group("large", &["Images/p1.jpg"])],
        )]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P1"]), &only("large"));
        let issues = diff_remote(&result.paths_to_verify, &RemoteFileSet::new());
        assert_eq!(issues[0].master_product_id, None);
    }

    #[test]
    fn unknown_ids_are_counted_not_reported() {
        let products = registry(vec![product("P1", None, vec![group("large", &["a.jpg"])])]);
        let variants = VariantMap::from([("V9".to_string(), "GONE".to_string())]);
        let result = reconcile(
            &products,
            &variants,
            &assigned(&["P1", "X1", "V9"]),
            &only("large"),
        );

        assert!(result.issues.is_empty());
        assert_eq!(result.stats.not_found_in_master, 2);
        assert_eq!(result.stats.variants_resolved, 1);
        assert!(result.stats.advisory().is_some());
    }

    #[test]
    fn advisory_needs_more_than_half_missing() {
        let stats = ReconcileStats {
            categorized: 4,
            not_found_in_master: 2,
            ..ReconcileStats::default()
        };
        assert!(stats.advisory().is_none());
        assert!(ReconcileStats::default().advisory().is_none());
    }

    #[test]
    fn online_filter_uses_site_flag_then_global() {
        let mut p = product("P", Some("false"), vec![group("large", &["a.jpg"])]);
        p.site_online_flags.insert("US".into(), "true".into());
        let products = registry(vec![p]);
        let ids = assigned(&["P"]);

        let us = ReconcileOptions {
            site_id: Some("US".into()),
            online_only: true,
            ..only("large")
        };
        let result = reconcile(&products, &VariantMap::new(), &ids, &us);
        assert_eq!(result.stats.offline_skipped, 0);
        assert_eq!(result.paths_to_verify.len(), 1);

        let eu = ReconcileOptions {
            site_id: Some("EU".into()),
            ..us
        };
        let result = reconcile(&products, &VariantMap::new(), &ids, &eu);
        assert_eq!(result.stats.offline_skipped, 1);
        assert!(result.paths_to_verify.is_empty());
        assert!(result.issues.is_empty());
    }

    #[test]
    fn offline_products_are_checked_when_filter_disabled() {
        let products = registry(vec![product("P", Some("false"), vec![])]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P"]), &only("large"));
        assert_eq!(result.stats.offline_skipped, 0);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn later_categorized_id_owns_shared_path() {
        let products = registry(vec![
            product("A", None, vec![group("large", &["shared.jpg"])]),
            product("B", None, vec![group("large", &["SHARED.jpg"])]),
        ]);
        let result = reconcile(
            &products,
            &VariantMap::new(),
            &assigned(&["A", "B"]),
            &only("large"),
        );

        assert_eq!(result.paths_to_verify.len(), 1);
        let check = &result.paths_to_verify["shared.jpg"];
        assert_eq!(check.product_id, "B");
        assert_eq!(check.original_path, "SHARED.jpg");
    }

    #[test]
    fn present_files_produce_no_issues() {
        let products = registry(vec![product(
            "P",
            None,
            vec![group("large", &["\\Images\\P.JPG"])],
        )]);
        let result = reconcile(&products, &VariantMap::new(), &assigned(&["P"]), &only("large"));
        let remote = RemoteFileSet::from(["images/p.jpg".to_string()]);
        assert!(diff_remote(&result.paths_to_verify, &remote).is_empty());
    }

    proptest! {
        #[test]
        fn verification_keys_are_normalized(paths in proptest::collection::vec("[ A-Za-z0-9_./\\\\-]{0,24}", 0..8)) {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            let products = registry(vec![product("P", None, vec![group("large", &refs)])]);
            let result =
                reconcile(&products, &VariantMap::new(), &assigned(&["P"]), &only("large"));
            for key in result.paths_to_verify.keys() {
                prop_assert!(!key.is_empty());
                prop_assert_eq!(&normalize_path(key), key);
            }
        }
    }
}
