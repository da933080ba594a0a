use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Sentinel view type recorded on issues raised in all-view-types mode.
pub const ALL_VIEW_TYPES: &str = "all";

/// Selects which image groups of a product are inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewTypeFilter {
    /// Every image group counts; paths keep their own group's view type.
    #[default]
    All,
    /// Only the first group with exactly this view type counts.
    Only(String),
}

impl ViewTypeFilter {
    /// Builds a filter from an optional setting; blank, `all` and `*` select every group.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("*") => ViewTypeFilter::All,
            Some(v) if v.eq_ignore_ascii_case(ALL_VIEW_TYPES) => ViewTypeFilter::All,
            Some(v) => ViewTypeFilter::Only(v.to_string()),
        }
    }

    pub fn matches(&self, view_type: Option<&str>) -> bool {
        match self {
            ViewTypeFilter::All => true,
            ViewTypeFilter::Only(wanted) => view_type == Some(wanted.as_str()),
        }
    }

    /// Label used on issues and in log lines.
    pub fn label(&self) -> &str {
        match self {
            ViewTypeFilter::All => ALL_VIEW_TYPES,
            ViewTypeFilter::Only(v) => v,
        }
    }
}

impl FromStr for ViewTypeFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_setting(Some(s)))
    }
}

impl fmt::Display for ViewTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
