use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{DocumentTypePermissionRow, PageOrReportPermissionRow, RoleName};

/// Document type name of the permission manager.
pub const PERMISSION_MANAGER_DOCTYPE: &str = "Role Permission Manager";

/// Child tables of the permission manager document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildTable {
    /// Full document type grants.
    DocumentTypePermissions,
    /// Select-only document type grants.
    DocumentTypeSelectPermissions,
    /// Page and report grants.
    PageAndReportPermissions,
}

impl ChildTable {
    /// Returns the parent field name holding the table.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::DocumentTypePermissions => "document_type_permissions",
            Self::DocumentTypeSelectPermissions => "document_type_select_permissions",
            Self::PageAndReportPermissions => "page_and_report_permissions",
        }
    }
}

impl Display for ChildTable {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.field_name())
    }
}

/// Permission manager document: one role and the grants it should hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionManagerDocument {
    /// Document name; managers are named after their role.
    pub name: RoleName,
    /// Role the grants apply to.
    pub role: RoleName,
    /// Full document type grants.
    #[serde(default)]
    pub document_type_permissions: Vec<DocumentTypePermissionRow>,
    /// Select-only grants derived from link fields of the full grants.
    #[serde(default)]
    pub document_type_select_permissions: Vec<DocumentTypePermissionRow>,
    /// Page and report grants.
    #[serde(default)]
    pub page_and_report_permissions: Vec<PageOrReportPermissionRow>,
}

impl PermissionManagerDocument {
    /// Creates an empty manager document for a role.
    #[must_use]
    pub fn new(role: RoleName) -> Self {
        Self {
            name: role.clone(),
            role,
            document_type_permissions: Vec::new(),
            document_type_select_permissions: Vec::new(),
            page_and_report_permissions: Vec::new(),
        }
    }
}

/// Grants computed by the Document Service for a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllPermissions {
    /// Full document type grants.
    #[serde(default)]
    pub permissions: Vec<DocumentTypePermissionRow>,
    /// Page and report grants.
    #[serde(default)]
    pub page_and_report_permissions: Vec<PageOrReportPermissionRow>,
}

impl AllPermissions {
    /// Returns true when neither table has rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty() && self.page_and_report_permissions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AllPermissions, ChildTable, PermissionManagerDocument};
    use crate::ResourceType;

    #[test]
    fn document_deserializes_with_missing_tables() {
        let document: Result<PermissionManagerDocument, _> = serde_json::from_value(json!({
            "name": "Auditor",
            "role": "Auditor",
        }));
        let document = document.unwrap_or_else(|_| unreachable!());

        assert_eq!(document.role.as_str(), "Auditor");
        assert!(document.document_type_permissions.is_empty());
        assert!(document.page_and_report_permissions.is_empty());
    }

    #[test]
    fn child_tables_display_their_parent_field() {
        assert_eq!(
            ChildTable::DocumentTypeSelectPermissions.to_string(),
            "document_type_select_permissions"
        );
        assert_eq!(
            ChildTable::PageAndReportPermissions.field_name(),
            "page_and_report_permissions"
        );
    }

    #[test]
    fn document_rejects_blank_role() {
        let document: Result<PermissionManagerDocument, _> = serde_json::from_value(json!({
            "name": "Auditor",
            "role": " ",
        }));
        assert!(document.is_err());
    }

    #[test]
    fn all_permissions_payload_parses_service_shape() {
        let payload: Result<AllPermissions, _> = serde_json::from_value(json!({
            "permissions": [{"document_type": "Item", "read_perm": 1}],
            "page_and_report_permissions": [
                {"resource_type": "Page", "resource_name": "stock-balance"}
            ],
        }));
        let payload = payload.unwrap_or_default();

        assert_eq!(payload.permissions.len(), 1);
        assert_eq!(
            payload.page_and_report_permissions[0].resource_type(),
            ResourceType::Page
        );
        assert!(!payload.is_empty());
    }
}
