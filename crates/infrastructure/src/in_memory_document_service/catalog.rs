use super::*;

/// Role known to the Document Service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Role name.
    pub name: String,
    /// Created by an administrator rather than shipped with an app.
    pub is_custom: bool,
    /// Disabled roles cannot be assigned.
    pub disabled: bool,
    /// Grants access to the desk UI.
    pub desk_access: bool,
}

impl RoleRecord {
    /// Creates an enabled custom desk role.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_custom: true,
            disabled: false,
            desk_access: true,
        }
    }

    /// Creates an enabled standard desk role.
    #[must_use]
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            is_custom: false,
            ..Self::custom(name)
        }
    }

    fn fields(&self) -> Map<String, Value> {
        record_fields(
            self.name.as_str(),
            [
                ("is_custom", self.is_custom),
                ("disabled", self.disabled),
                ("desk_access", self.desk_access),
            ],
        )
    }
}

/// Document type metadata relevant to permission management.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocTypeRecord {
    /// Document type name.
    pub name: String,
    /// Child table document types only exist inside a parent.
    pub istable: bool,
    /// Targets of the document type's link fields.
    pub link_targets: Vec<String>,
    /// Child table document types embedded through table fields.
    pub table_fields: Vec<String>,
    /// Permissions shipped with the document type, per role.
    pub standard_permissions: BTreeMap<String, BTreeSet<DocumentPermission>>,
}

impl DocTypeRecord {
    /// Creates a parent document type without links.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a child table document type.
    #[must_use]
    pub fn child_table(name: impl Into<String>) -> Self {
        Self {
            istable: true,
            ..Self::new(name)
        }
    }

    /// Adds a link field target.
    #[must_use]
    pub fn with_link(mut self, target: impl Into<String>) -> Self {
        self.link_targets.push(target.into());
        self
    }

    /// Adds a table field.
    #[must_use]
    pub fn with_table(mut self, child_doctype: impl Into<String>) -> Self {
        self.table_fields.push(child_doctype.into());
        self
    }

    /// Adds a shipped permission set for a role.
    #[must_use]
    pub fn with_standard_permissions(
        mut self,
        role: impl Into<String>,
        permissions: impl IntoIterator<Item = DocumentPermission>,
    ) -> Self {
        self.standard_permissions
            .entry(role.into())
            .or_default()
            .extend(permissions);
        self
    }

    fn fields(&self) -> Map<String, Value> {
        record_fields(self.name.as_str(), [("istable", self.istable)])
    }
}

/// Desk page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// Page name.
    pub name: String,
    /// Framework pages that must not be granted through custom roles.
    pub system_page: bool,
    /// Roles the page ships with.
    pub roles: BTreeSet<String>,
}

impl PageRecord {
    fn fields(&self) -> Map<String, Value> {
        record_fields(self.name.as_str(), [("system_page", self.system_page)])
    }
}

/// Query or script report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRecord {
    /// Report name.
    pub name: String,
    /// Document type the report reads.
    pub ref_doctype: Option<String>,
    /// Roles the report ships with.
    pub roles: BTreeSet<String>,
}

impl ReportRecord {
    fn fields(&self) -> Map<String, Value> {
        let mut fields = record_fields(self.name.as_str(), []);
        fields.insert(
            "ref_doctype".to_owned(),
            self.ref_doctype
                .as_deref()
                .map_or(Value::Null, Value::from),
        );
        fields
    }
}

fn record_fields<const N: usize>(name: &str, flags: [(&str, bool); N]) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("name".to_owned(), Value::from(name));
    for (field, flag) in flags {
        fields.insert(field.to_owned(), Value::from(u8::from(flag)));
    }
    fields
}

impl Catalog {
    pub(super) fn role(&self, name: &str) -> Option<&RoleRecord> {
        self.roles.get(name)
    }

    pub(super) fn doctype(&self, name: &str) -> Option<&DocTypeRecord> {
        self.doctypes.get(name)
    }

    pub(super) fn resource_exists(&self, resource_type: ResourceType, name: &str) -> bool {
        match resource_type {
            ResourceType::Page => self.pages.contains_key(name),
            ResourceType::Report => self.reports.contains_key(name),
        }
    }

    pub(super) fn resource_roles(
        &self,
        resource_type: ResourceType,
        name: &str,
    ) -> BTreeSet<String> {
        match resource_type {
            ResourceType::Page => self.pages.get(name).map(|page| page.roles.clone()),
            ResourceType::Report => self.reports.get(name).map(|report| report.roles.clone()),
        }
        .unwrap_or_default()
    }

    fn candidates(&self, doctype: &str) -> AppResult<Vec<Map<String, Value>>> {
        let records = match doctype {
            "Role" => self.roles.values().map(RoleRecord::fields).collect(),
            "DocType" => self.doctypes.values().map(DocTypeRecord::fields).collect(),
            "Page" => self.pages.values().map(PageRecord::fields).collect(),
            "Report" => self.reports.values().map(ReportRecord::fields).collect(),
            _ => {
                return Err(AppError::NotFound(format!(
                    "document type '{doctype}' is not searchable"
                )));
            }
        };

        Ok(records)
    }
}

impl InMemoryDocumentService {
    /// Registers or replaces a role.
    pub async fn register_role(&self, role: RoleRecord) {
        self.catalog
            .write()
            .await
            .roles
            .insert(role.name.clone(), role);
    }

    /// Registers or replaces a document type.
    pub async fn register_doctype(&self, doctype: DocTypeRecord) {
        self.catalog
            .write()
            .await
            .doctypes
            .insert(doctype.name.clone(), doctype);
    }

    /// Registers or replaces a page.
    pub async fn register_page(&self, page: PageRecord) {
        self.catalog
            .write()
            .await
            .pages
            .insert(page.name.clone(), page);
    }

    /// Registers or replaces a report.
    pub async fn register_report(&self, report: ReportRecord) {
        self.catalog
            .write()
            .await
            .reports
            .insert(report.name.clone(), report);
    }

    pub(super) async fn search_link_impl(&self, query: LinkSearchQuery) -> AppResult<Vec<String>> {
        let catalog = self.catalog.read().await;
        let needle = query.text.as_deref().map(str::to_lowercase);

        let names = catalog
            .candidates(query.doctype.as_str())?
            .into_iter()
            .filter(|fields| {
                query
                    .filter
                    .as_ref()
                    .is_none_or(|filter| filter.matches(|field| fields.get(field)))
            })
            .filter_map(|fields| match fields.get("name") {
                Some(Value::String(name)) => Some(name.clone()),
                _ => None,
            })
            .filter(|name| {
                needle
                    .as_deref()
                    .is_none_or(|needle| name.to_lowercase().contains(needle))
            })
            .take(query.limit)
            .collect();

        Ok(names)
    }
}
