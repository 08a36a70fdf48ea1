//! Typed rows of the permission manager child tables.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use permdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session-local identity of a child-table row.
///
/// Never sent to the Document Service; rows arriving from it get a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(Uuid);

impl RowId {
    /// Creates a new random row identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RowId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Document-level permission flags carried by a document type grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPermission {
    /// Read documents.
    Read,
    /// Modify documents.
    Write,
    /// Create documents.
    Create,
    /// Submit submittable documents.
    Submit,
    /// Cancel submitted documents.
    Cancel,
    /// Amend cancelled documents.
    Amend,
    /// Delete documents.
    Delete,
    /// Restrict every other flag to documents the user owns.
    IfOwner,
    /// Open report views.
    Report,
    /// Export data.
    Export,
    /// Import data.
    Import,
    /// Share documents with other users.
    Share,
    /// Print documents.
    Print,
    /// Email documents.
    Email,
}

impl DocumentPermission {
    /// Returns the permission column name used by the Document Service.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Submit => "submit",
            Self::Cancel => "cancel",
            Self::Amend => "amend",
            Self::Delete => "delete",
            Self::IfOwner => "if_owner",
            Self::Report => "report",
            Self::Export => "export",
            Self::Import => "import",
            Self::Share => "share",
            Self::Print => "print",
            Self::Email => "email",
        }
    }

    /// Returns all known permissions in column order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[DocumentPermission] = &[
            DocumentPermission::Read,
            DocumentPermission::Write,
            DocumentPermission::Create,
            DocumentPermission::Submit,
            DocumentPermission::Cancel,
            DocumentPermission::Amend,
            DocumentPermission::Delete,
            DocumentPermission::IfOwner,
            DocumentPermission::Report,
            DocumentPermission::Export,
            DocumentPermission::Import,
            DocumentPermission::Share,
            DocumentPermission::Print,
            DocumentPermission::Email,
        ];

        ALL
    }
}

impl FromStr for DocumentPermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown document permission '{value}'")))
    }
}

/// Grant of document-level permissions on one non-table document type.
///
/// The same row shape backs both the full grant table and the select-only
/// table; select rows simply carry no flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "wire::DocumentTypeRowWire", into = "wire::DocumentTypeRowWire")]
pub struct DocumentTypePermissionRow {
    row_id: RowId,
    document_type: NonEmptyString,
    granted: BTreeSet<DocumentPermission>,
}

impl DocumentTypePermissionRow {
    /// Creates a row for a document type without any flags set.
    pub fn new(document_type: impl Into<String>) -> AppResult<Self> {
        let document_type = NonEmptyString::new(document_type).map_err(|_| {
            AppError::Validation("document type permission row requires a document type".to_owned())
        })?;

        Ok(Self {
            row_id: RowId::new(),
            document_type,
            granted: BTreeSet::new(),
        })
    }

    /// Creates a row with the given flags set.
    pub fn with_permissions(
        document_type: impl Into<String>,
        permissions: impl IntoIterator<Item = DocumentPermission>,
    ) -> AppResult<Self> {
        let mut row = Self::new(document_type)?;
        row.granted.extend(permissions);
        Ok(row)
    }

    /// Returns the session-local row identity.
    #[must_use]
    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    /// Returns the referenced document type.
    #[must_use]
    pub fn document_type(&self) -> &str {
        self.document_type.as_str()
    }

    /// Returns whether a permission flag is set.
    #[must_use]
    pub fn allows(&self, permission: DocumentPermission) -> bool {
        self.granted.contains(&permission)
    }

    /// Sets or clears a permission flag.
    pub fn set_permission(&mut self, permission: DocumentPermission, enabled: bool) {
        if enabled {
            self.granted.insert(permission);
        } else {
            self.granted.remove(&permission);
        }
    }

    /// Returns the set flags in column order.
    pub fn permissions(&self) -> impl Iterator<Item = DocumentPermission> + '_ {
        self.granted.iter().copied()
    }
}

/// Catalog a page/report row points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    /// Desk page.
    Page,
    /// Query or script report.
    Report,
}

impl ResourceType {
    /// Returns the catalog document type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Report => "Report",
        }
    }
}

impl Display for ResourceType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Page" => Ok(Self::Page),
            "Report" => Ok(Self::Report),
            _ => Err(AppError::Validation(format!(
                "unknown resource type '{value}', expected 'Page' or 'Report'"
            ))),
        }
    }
}

/// Access grant on a single page or report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "wire::PageOrReportRowWire", into = "wire::PageOrReportRowWire")]
pub struct PageOrReportPermissionRow {
    row_id: RowId,
    resource_type: ResourceType,
    resource_name: String,
}

impl PageOrReportPermissionRow {
    /// Creates a row. An empty resource name means "not picked yet".
    #[must_use]
    pub fn new(resource_type: ResourceType, resource_name: impl Into<String>) -> Self {
        Self {
            row_id: RowId::new(),
            resource_type,
            resource_name: resource_name.into().trim().to_owned(),
        }
    }

    /// Returns the session-local row identity.
    #[must_use]
    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    /// Returns the resource catalog of this row.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Returns the picked resource name, empty when none is picked.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        self.resource_name.as_str()
    }

    /// Returns true once a resource has been picked.
    #[must_use]
    pub fn has_resource(&self) -> bool {
        !self.resource_name.is_empty()
    }

    /// Switches the resource catalog.
    ///
    /// The picked name is left alone; the editing session clears it through
    /// its type-change hook.
    pub fn set_resource_type(&mut self, resource_type: ResourceType) {
        self.resource_type = resource_type;
    }

    /// Picks a resource from the current catalog.
    pub fn set_resource_name(&mut self, resource_name: impl Into<String>) {
        self.resource_name = resource_name.into().trim().to_owned();
    }

    /// Clears the picked resource.
    pub fn clear_resource_name(&mut self) {
        self.resource_name.clear();
    }
}

mod wire {
    //! Document Service row shapes: flags travel as `<permission>_perm` check
    //! fields holding `0`/`1`.

    use permdesk_core::AppError;
    use serde::{Deserialize, Deserializer, Serialize};

    use super::{
        DocumentPermission, DocumentTypePermissionRow, PageOrReportPermissionRow, ResourceType,
    };

    #[derive(Serialize, Deserialize)]
    pub(super) struct DocumentTypeRowWire {
        document_type: String,
        #[serde(default, with = "check")]
        read_perm: bool,
        #[serde(default, with = "check")]
        write_perm: bool,
        #[serde(default, with = "check")]
        create_perm: bool,
        #[serde(default, with = "check")]
        submit_perm: bool,
        #[serde(default, with = "check")]
        cancel_perm: bool,
        #[serde(default, with = "check")]
        amend_perm: bool,
        #[serde(default, with = "check")]
        delete_perm: bool,
        #[serde(default, with = "check")]
        if_owner_perm: bool,
        #[serde(default, with = "check")]
        report_perm: bool,
        #[serde(default, with = "check")]
        export_perm: bool,
        #[serde(default, with = "check")]
        import_perm: bool,
        #[serde(default, with = "check")]
        share_perm: bool,
        #[serde(default, with = "check")]
        print_perm: bool,
        #[serde(default, with = "check")]
        email_perm: bool,
    }

    impl DocumentTypeRowWire {
        fn flag(&self, permission: DocumentPermission) -> bool {
            match permission {
                DocumentPermission::Read => self.read_perm,
                DocumentPermission::Write => self.write_perm,
                DocumentPermission::Create => self.create_perm,
                DocumentPermission::Submit => self.submit_perm,
                DocumentPermission::Cancel => self.cancel_perm,
                DocumentPermission::Amend => self.amend_perm,
                DocumentPermission::Delete => self.delete_perm,
                DocumentPermission::IfOwner => self.if_owner_perm,
                DocumentPermission::Report => self.report_perm,
                DocumentPermission::Export => self.export_perm,
                DocumentPermission::Import => self.import_perm,
                DocumentPermission::Share => self.share_perm,
                DocumentPermission::Print => self.print_perm,
                DocumentPermission::Email => self.email_perm,
            }
        }
    }

    impl TryFrom<DocumentTypeRowWire> for DocumentTypePermissionRow {
        type Error = AppError;

        fn try_from(value: DocumentTypeRowWire) -> Result<Self, Self::Error> {
            let granted: Vec<DocumentPermission> = DocumentPermission::all()
                .iter()
                .copied()
                .filter(|permission| value.flag(*permission))
                .collect();
            Self::with_permissions(value.document_type, granted)
        }
    }

    impl From<DocumentTypePermissionRow> for DocumentTypeRowWire {
        fn from(value: DocumentTypePermissionRow) -> Self {
            let flag = |permission| value.allows(permission);
            Self {
                read_perm: flag(DocumentPermission::Read),
                write_perm: flag(DocumentPermission::Write),
                create_perm: flag(DocumentPermission::Create),
                submit_perm: flag(DocumentPermission::Submit),
                cancel_perm: flag(DocumentPermission::Cancel),
                amend_perm: flag(DocumentPermission::Amend),
                delete_perm: flag(DocumentPermission::Delete),
                if_owner_perm: flag(DocumentPermission::IfOwner),
                report_perm: flag(DocumentPermission::Report),
                export_perm: flag(DocumentPermission::Export),
                import_perm: flag(DocumentPermission::Import),
                share_perm: flag(DocumentPermission::Share),
                print_perm: flag(DocumentPermission::Print),
                email_perm: flag(DocumentPermission::Email),
                document_type: value.document_type.into(),
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub(super) struct PageOrReportRowWire {
        resource_type: ResourceType,
        #[serde(default, deserialize_with = "nullable_text")]
        resource_name: String,
    }

    impl From<PageOrReportRowWire> for PageOrReportPermissionRow {
        fn from(value: PageOrReportRowWire) -> Self {
            Self::new(value.resource_type, value.resource_name)
        }
    }

    impl From<PageOrReportPermissionRow> for PageOrReportRowWire {
        fn from(value: PageOrReportPermissionRow) -> Self {
            Self {
                resource_type: value.resource_type,
                resource_name: value.resource_name,
            }
        }
    }

    fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    mod check {
        use serde::de::Error;
        use serde::{Deserialize, Deserializer, Serializer};
        use serde_json::Value;

        pub(super) fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_u8(u8::from(*value))
        }

        pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Value::deserialize(deserializer)? {
                Value::Null => Ok(false),
                Value::Bool(flag) => Ok(flag),
                Value::Number(number) => match number.as_i64() {
                    Some(0) => Ok(false),
                    Some(1) => Ok(true),
                    _ => Err(D::Error::custom(format!("invalid check value {number}"))),
                },
                other => Err(D::Error::custom(format!("invalid check value {other}"))),
            }
        }
    }
}
