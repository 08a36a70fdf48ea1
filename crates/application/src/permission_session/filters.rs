use permdesk_domain::{ChildTable, PageOrReportPermissionRow, QueryFilter, ResourceType};

use super::PermissionEditingSession;

/// Label of the bulk fetch action button.
pub const GET_ALL_PERMISSIONS_LABEL: &str = "Get All Permissions";

/// Link fields of the permission manager form that carry a query hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkField {
    /// `role` on the parent document.
    Role,
    /// `document_type` on a row of either document type table.
    DocumentType(ChildTable),
    /// `resource_name` on a page/report row.
    ResourceName,
}

impl LinkField {
    /// Returns the form field name.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::DocumentType(_) => "document_type",
            Self::ResourceName => "resource_name",
        }
    }
}

/// Custom actions the form exposes next to its standard buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAction {
    /// Replace every row with the grants the role holds right now.
    GetAllPermissions,
}

impl SessionAction {
    /// Returns the button label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::GetAllPermissions => GET_ALL_PERMISSIONS_LABEL,
        }
    }

    /// Returns every action in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::GetAllPermissions]
    }
}

impl PermissionEditingSession {
    /// Only custom, enabled roles with desk access may be managed.
    #[must_use]
    pub fn filter_role_candidates(&self) -> QueryFilter {
        QueryFilter::new()
            .with_flag("is_custom", true)
            .with_flag("disabled", false)
            .with_flag("desk_access", true)
    }

    /// Child-table document types cannot be granted on their own.
    ///
    /// Shared by the full and select-only document type tables.
    #[must_use]
    pub fn filter_document_type_candidates(&self) -> QueryFilter {
        QueryFilter::new().with_flag("istable", false)
    }

    /// System pages are hidden from page rows; reports are unconstrained.
    #[must_use]
    pub fn filter_resource_candidates(&self, row: &PageOrReportPermissionRow) -> Option<QueryFilter> {
        match row.resource_type() {
            ResourceType::Page => Some(QueryFilter::new().with_flag("system_page", false)),
            ResourceType::Report => None,
        }
    }

    /// Resolves the query hook registered for a link field.
    ///
    /// `row_index` addresses the page/report row being edited and is ignored
    /// for the other fields. An unknown row yields no constraint.
    #[must_use]
    pub fn query_for(&self, field: LinkField, row_index: Option<usize>) -> Option<QueryFilter> {
        match field {
            LinkField::Role => Some(self.filter_role_candidates()),
            LinkField::DocumentType(
                ChildTable::DocumentTypePermissions | ChildTable::DocumentTypeSelectPermissions,
            ) => Some(self.filter_document_type_candidates()),
            LinkField::DocumentType(ChildTable::PageAndReportPermissions) => None,
            LinkField::ResourceName => row_index
                .and_then(|index| self.document.page_and_report_permissions.get(index))
                .and_then(|row| self.filter_resource_candidates(row)),
        }
    }
}
