//! Core types used throughout the catalog audit library.
//!
//! - [`Product`] / [`ImageGroup`] - master catalog records
//! - [`ViewTypeFilter`] - which image groups an audit inspects
//! - [`Issue`] / [`Summary`] - classified findings and their counts

mod catalog;
mod issue;
mod view_type;

pub use catalog::{
    CategoryAssignments, ImageGroup, Product, ProductRegistry, RemoteFileSet, VariantMap,
};
pub use issue::{Issue, IssueKind, Summary, FILE_NOT_FOUND_REASON};
pub use view_type::{ViewTypeFilter, ALL_VIEW_TYPES};
