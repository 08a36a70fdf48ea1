use super::*;

impl GrantStore {
    /// Copies shipped permissions of a document type into custom doc-perms
    /// unless the document type was customised already.
    fn setup_custom_perms(&mut self, doctype: &DocTypeRecord) -> bool {
        let customised = self
            .doc_perms
            .keys()
            .any(|(stored_doctype, _)| stored_doctype == &doctype.name);
        if customised {
            return false;
        }

        for (role, permissions) in &doctype.standard_permissions {
            self.doc_perms.insert(
                (doctype.name.clone(), role.clone()),
                CustomDocPerm {
                    permissions: permissions.clone(),
                    select: false,
                },
            );
        }
        true
    }

    pub(super) fn doc_perm_mut(&mut self, doctype: &str, role: &str) -> &mut CustomDocPerm {
        self.doc_perms
            .entry((doctype.to_owned(), role.to_owned()))
            .or_default()
    }

    pub(super) fn remove_doc_perms_for_role<F>(&mut self, role: &str, mut remove: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.doc_perms.len();
        self.doc_perms
            .retain(|(doctype, stored_role), _| stored_role != role || !remove(doctype));
        before - self.doc_perms.len()
    }

    /// Adds the role to the custom role of a resource, creating the custom
    /// role from the resource's shipped roles first when needed.
    pub(super) fn grant_resource(
        &mut self,
        resource_type: ResourceType,
        resource_name: &str,
        shipped_roles: BTreeSet<String>,
        role: &str,
    ) {
        self.custom_roles
            .entry((resource_type, resource_name.to_owned()))
            .or_insert(shipped_roles)
            .insert(role.to_owned());
    }

    pub(super) fn revoke_resource(
        &mut self,
        resource_type: ResourceType,
        resource_name: &str,
        role: &str,
    ) -> bool {
        self.custom_roles
            .get_mut(&(resource_type, resource_name.to_owned()))
            .is_some_and(|roles| roles.remove(role))
    }

    fn document_permissions(&self, role: &str) -> AppResult<Vec<DocumentTypePermissionRow>> {
        self.doc_perms
            .iter()
            .filter(|((doctype, stored_role), doc_perm)| {
                stored_role == role && !doc_perm.select && doctype != FILE_DOCTYPE
            })
            .map(|((doctype, _), doc_perm)| {
                DocumentTypePermissionRow::with_permissions(
                    doctype.as_str(),
                    doc_perm.permissions.iter().copied(),
                )
            })
            .collect()
    }

    fn page_and_report_permissions(&self, role: &str) -> Vec<PageOrReportPermissionRow> {
        self.custom_roles
            .iter()
            .filter(|(_, roles)| roles.contains(role))
            .map(|((resource_type, resource_name), _)| {
                PageOrReportPermissionRow::new(*resource_type, resource_name.as_str())
            })
            .collect()
    }
}

impl InMemoryDocumentService {
    /// Computes the grants a role holds, materialising shipped permissions
    /// as custom ones on the way.
    pub(super) async fn compute_all_permissions(&self, role: &RoleName) -> AppResult<AllPermissions> {
        let catalog = self.catalog.read().await;
        let mut grants = self.grants.write().await;
        let role = role.as_str();

        for doctype in catalog.doctypes.values() {
            if doctype.standard_permissions.contains_key(role) && grants.setup_custom_perms(doctype)
            {
                debug!(doctype = %doctype.name, "copied shipped permissions to custom doc-perms");
            }
        }

        for page in catalog.pages.values().filter(|page| page.roles.contains(role)) {
            if !grants
                .custom_roles
                .contains_key(&(ResourceType::Page, page.name.clone()))
            {
                grants.grant_resource(ResourceType::Page, page.name.as_str(), page.roles.clone(), role);
            }
        }
        for report in catalog
            .reports
            .values()
            .filter(|report| report.roles.contains(role))
        {
            if !grants
                .custom_roles
                .contains_key(&(ResourceType::Report, report.name.clone()))
            {
                grants.grant_resource(
                    ResourceType::Report,
                    report.name.as_str(),
                    report.roles.clone(),
                    role,
                );
            }
        }

        Ok(AllPermissions {
            permissions: grants.document_permissions(role)?,
            page_and_report_permissions: grants.page_and_report_permissions(role),
        })
    }

    pub(super) async fn get_all_permissions_impl(
        &self,
        request: GetAllPermissionsRequest,
    ) -> AppResult<GetAllPermissionsResponse> {
        let document = self.load_document_impl(&request.rpm).await?;
        let all_permissions = self.compute_all_permissions(&document.role).await?;

        if !request.is_button {
            let mut documents = self.documents.write().await;
            if let Some(stored) = documents.get_mut(document.name.as_str()) {
                stored.document_type_permissions = all_permissions.permissions.clone();
                stored.page_and_report_permissions =
                    all_permissions.page_and_report_permissions.clone();
            }
        }

        let found = !all_permissions.is_empty();
        info!(
            role = %document.role,
            document_type_rows = all_permissions.permissions.len(),
            page_and_report_rows = all_permissions.page_and_report_permissions.len(),
            "computed permissions for role"
        );

        Ok(GetAllPermissionsResponse {
            indicator: if found { Indicator::Green } else { Indicator::Red },
            message: if found {
                "Successful".to_owned()
            } else {
                "No permissions found".to_owned()
            },
            all_permissions: (found && request.is_button).then_some(all_permissions),
        })
    }

    pub(super) async fn remove_page_and_report_permissions_impl(
        &self,
        request: RemovePageAndReportPermissionsRequest,
    ) -> AppResult<ServiceAlert> {
        let mut grants = self.grants.write().await;
        let role = request.role.as_str();

        let revoked = request
            .permissions
            .iter()
            .filter(|row| grants.revoke_resource(row.resource_type(), row.resource_name(), role))
            .count();
        info!(
            role = role,
            requested = request.permissions.len(),
            revoked,
            "revoked page/report permissions"
        );

        Ok(ServiceAlert {
            indicator: Indicator::Green,
            message: "Page and Report Permissions Removed".to_owned(),
        })
    }
}
