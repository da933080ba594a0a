use serde::{Deserialize, Serialize};

use super::view_type::ViewTypeFilter;

/// Reason text used for files missing from remote storage.
pub const FILE_NOT_FOUND_REASON: &str = "File not found on remote store";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingImageGroup,
    EmptyImageGroup,
    FileNotFound,
}

/// A classified discrepancy for one categorized product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// The id as assigned in the storefront (variant or master).
    pub product_id: String,
    /// Set only for file lookups made on behalf of a variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_product_id: Option<String>,
    pub kind: IssueKind,
    pub reason: String,
    /// Original, non-normalized path; empty when the issue is not about a file.
    pub image_path: String,
    pub view_type: String,
}

impl Issue {
    pub fn missing_image_group(product_id: &str, filter: &ViewTypeFilter) -> Self {
        let reason = match filter {
            ViewTypeFilter::All => "Missing image group (no image groups defined)".to_string(),
            ViewTypeFilter::Only(vt) => format!("Missing image group for view-type '{vt}'"),
        };
        Self {
            product_id: product_id.to_string(),
            master_product_id: None,
            kind: IssueKind::MissingImageGroup,
            reason,
            image_path: String::new(),
            view_type: filter.label().to_string(),
        }
    }

    pub fn empty_image_group(product_id: &str, filter: &ViewTypeFilter) -> Self {
        let reason = match filter {
            ViewTypeFilter::All => "Image groups exist but are empty".to_string(),
            ViewTypeFilter::Only(vt) => {
                format!("Image group for view-type '{vt}' exists but is empty")
            }
        };
        Self {
            product_id: product_id.to_string(),
            master_product_id: None,
            kind: IssueKind::EmptyImageGroup,
            reason,
            image_path: String::new(),
            view_type: filter.label().to_string(),
        }
    }

    pub fn file_not_found(
        product_id: &str,
        master_product_id: Option<&str>,
        image_path: &str,
        view_type: &str,
    ) -> Self {
        Self {
            product_id: product_id.to_string(),
            master_product_id: master_product_id.map(str::to_string),
            kind: IssueKind::FileNotFound,
            reason: FILE_NOT_FOUND_REASON.to_string(),
            image_path: image_path.to_string(),
            view_type: view_type.to_string(),
        }
    }
}

/// Counts derived from the final issue list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub missing_groups: usize,
    pub empty_groups: usize,
    pub missing_files: usize,
}

impl Summary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let count = |kind: IssueKind| issues.iter().filter(|i| i.kind == kind).count();
        Self {
            total: issues.len(),
            missing_groups: count(IssueKind::MissingImageGroup),
            empty_groups: count(IssueKind::EmptyImageGroup),
            missing_files: count(IssueKind::FileNotFound),
        }
    }
}
