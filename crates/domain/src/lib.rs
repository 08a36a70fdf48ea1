//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod document;
mod notification;
mod permission_rows;
mod query_filter;
mod role;

pub use document::{AllPermissions, ChildTable, PERMISSION_MANAGER_DOCTYPE, PermissionManagerDocument};
pub use notification::{ALERT_DURATION_SECONDS, Indicator, Notification};
pub use permission_rows::{
    DocumentPermission, DocumentTypePermissionRow, PageOrReportPermissionRow, ResourceType, RowId,
};
pub use query_filter::{FilterValue, QueryFilter};
pub use role::RoleName;
