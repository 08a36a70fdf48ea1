use super::*;

impl InMemoryDocumentService {
    pub(super) async fn load_document_impl(
        &self,
        name: &RoleName,
    ) -> AppResult<PermissionManagerDocument> {
        self.documents
            .read()
            .await
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("permission manager '{name}' does not exist")))
    }

    pub(super) async fn insert_document_impl(
        &self,
        role: &RoleName,
    ) -> AppResult<PermissionManagerDocument> {
        if self.documents.read().await.contains_key(role.as_str()) {
            return Err(AppError::Conflict(format!(
                "permission manager '{role}' already exists"
            )));
        }

        let all_permissions = self.compute_all_permissions(role).await?;
        let mut document = PermissionManagerDocument::new(role.clone());
        document.document_type_permissions = all_permissions.permissions;
        document.page_and_report_permissions = all_permissions.page_and_report_permissions;

        self.save_document_impl(&document).await
    }

    /// Validates the document, derives its select-only rows and brings the
    /// custom doc-perms and page/report custom roles in line with it.
    pub(super) async fn save_document_impl(
        &self,
        document: &PermissionManagerDocument,
    ) -> AppResult<PermissionManagerDocument> {
        let mut progress = SaveProgress::new(&document.name);
        progress.publish(1);
        let result = self.store_document(document, &mut progress).await;
        *self.save_progress.write().await = progress.into_stages();
        result
    }

    async fn store_document(
        &self,
        document: &PermissionManagerDocument,
        progress: &mut SaveProgress<'_>,
    ) -> AppResult<PermissionManagerDocument> {
        let catalog = self.catalog.read().await;
        validate_document(&catalog, document)?;

        let mut saved = document.clone();
        saved.document_type_select_permissions = select_rows(&catalog, document)?;

        let mut grants = self.grants.write().await;
        let role = saved.role.as_str();

        for row in &saved.document_type_permissions {
            let doc_perm = grants.doc_perm_mut(row.document_type(), role);
            doc_perm.permissions = row.permissions().collect();
            doc_perm.select = false;
        }
        progress.publish(25);
        for row in &saved.document_type_select_permissions {
            let doc_perm = grants.doc_perm_mut(row.document_type(), role);
            doc_perm.permissions.clear();
            doc_perm.select = true;
        }
        progress.publish(50);
        grants.doc_perm_mut(FILE_DOCTYPE, role).permissions.extend([
            DocumentPermission::Read,
            DocumentPermission::Create,
            DocumentPermission::Write,
        ]);

        for row in &saved.page_and_report_permissions {
            grants.grant_resource(
                row.resource_type(),
                row.resource_name(),
                catalog.resource_roles(row.resource_type(), row.resource_name()),
                role,
            );
        }
        progress.publish(75);

        let kept = kept_doctypes(&saved);
        let removed = grants.remove_doc_perms_for_role(role, |doctype| !kept.contains(doctype));
        progress.publish(100);

        self.documents
            .write()
            .await
            .insert(saved.name.as_str().to_owned(), saved.clone());
        info!(
            document = %saved.name,
            role = role,
            document_type_rows = saved.document_type_permissions.len(),
            select_rows = saved.document_type_select_permissions.len(),
            page_and_report_rows = saved.page_and_report_permissions.len(),
            removed_doc_perms = removed,
            "permission manager stored"
        );

        Ok(saved)
    }

    pub(super) async fn delete_document_impl(&self, name: &RoleName) -> AppResult<()> {
        let document = self.load_document_impl(name).await?;
        let role = document.role.as_str();

        let mut grants = self.grants.write().await;
        let kept = kept_doctypes(&document);
        let removed_doc_perms = grants.remove_doc_perms_for_role(role, |doctype| kept.contains(doctype));
        let revoked_resources = document
            .page_and_report_permissions
            .iter()
            .filter(|row| grants.revoke_resource(row.resource_type(), row.resource_name(), role))
            .count();

        self.documents.write().await.remove(name.as_str());
        info!(
            document = %name,
            removed_doc_perms,
            revoked_resources,
            "permission manager removed with its grants"
        );

        Ok(())
    }
}

fn validate_document(catalog: &Catalog, document: &PermissionManagerDocument) -> AppResult<()> {
    let role = document.role.as_str();
    let record = catalog
        .role(role)
        .ok_or_else(|| AppError::Validation(format!("role '{role}' does not exist")))?;
    if !record.is_custom {
        return Err(AppError::Validation(format!(
            "the role '{role}' should be a custom role"
        )));
    }

    for row in &document.document_type_permissions {
        match catalog.doctype(row.document_type()) {
            Some(doctype) if doctype.istable => {
                return Err(AppError::Validation(format!(
                    "child table '{}' cannot be granted on its own",
                    doctype.name
                )));
            }
            Some(_) => {}
            None => {
                return Err(AppError::Validation(format!(
                    "document type '{}' does not exist",
                    row.document_type()
                )));
            }
        }
    }

    for (index, row) in document.page_and_report_permissions.iter().enumerate() {
        if !row.has_resource() {
            return Err(AppError::Validation(format!(
                "row {} of page_and_report_permissions is missing a resource name",
                index + 1
            )));
        }
        if !catalog.resource_exists(row.resource_type(), row.resource_name()) {
            return Err(AppError::Validation(format!(
                "{} '{}' does not exist",
                row.resource_type(),
                row.resource_name()
            )));
        }
    }

    Ok(())
}

/// Link targets of the granted document types, and of their child tables,
/// that are not granted themselves.
fn select_rows(
    catalog: &Catalog,
    document: &PermissionManagerDocument,
) -> AppResult<Vec<DocumentTypePermissionRow>> {
    let granted: BTreeSet<&str> = document
        .document_type_permissions
        .iter()
        .map(DocumentTypePermissionRow::document_type)
        .collect();

    let mut targets = BTreeSet::new();
    for doctype in granted.iter().filter_map(|name| catalog.doctype(name)) {
        let child_tables = doctype
            .table_fields
            .iter()
            .filter_map(|child| catalog.doctype(child));
        for source in std::iter::once(doctype).chain(child_tables) {
            targets.extend(
                source
                    .link_targets
                    .iter()
                    .map(String::as_str)
                    .filter(|target| !granted.contains(target)),
            );
        }
    }

    targets
        .into_iter()
        .map(DocumentTypePermissionRow::new)
        .collect()
}

fn kept_doctypes(document: &PermissionManagerDocument) -> BTreeSet<String> {
    document
        .document_type_permissions
        .iter()
        .chain(&document.document_type_select_permissions)
        .map(|row| row.document_type().to_owned())
        .chain(std::iter::once(FILE_DOCTYPE.to_owned()))
        .collect()
}

/// Staged progress of a save, mirroring the progress bar the desk shows
/// while permissions are updated.
struct SaveProgress<'a> {
    document: &'a RoleName,
    stages: Vec<u8>,
}

impl<'a> SaveProgress<'a> {
    fn new(document: &'a RoleName) -> Self {
        Self {
            document,
            stages: Vec::new(),
        }
    }

    fn publish(&mut self, percent: u8) {
        debug!(document = %self.document, percent, "updating permissions");
        self.stages.push(percent);
    }

    fn into_stages(self) -> Vec<u8> {
        self.stages
    }
}
