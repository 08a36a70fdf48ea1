use permdesk_core::{AppError, AppResult};
use permdesk_domain::{
    DocumentPermission, DocumentTypePermissionRow, PageOrReportPermissionRow, ResourceType,
    RoleName,
};

use super::PermissionEditingSession;

impl PermissionEditingSession {
    /// Points the document at another role.
    pub fn set_role(&mut self, role: RoleName) {
        self.document.role = role;
    }

    /// Appends a full document type grant.
    pub fn add_document_type_permission(&mut self, row: DocumentTypePermissionRow) {
        self.document.document_type_permissions.push(row);
    }

    /// Sets or clears one flag on a document type grant.
    pub fn set_document_permission(
        &mut self,
        index: usize,
        permission: DocumentPermission,
        enabled: bool,
    ) -> AppResult<()> {
        let row = self
            .document
            .document_type_permissions
            .get_mut(index)
            .ok_or_else(|| missing_row("document_type_permissions", index))?;
        row.set_permission(permission, enabled);
        Ok(())
    }

    /// Removes a full document type grant.
    ///
    /// The Document Service revokes grants for unlisted document types on
    /// save, so nothing is buffered.
    pub fn remove_document_type_permission(
        &mut self,
        index: usize,
    ) -> AppResult<DocumentTypePermissionRow> {
        if index >= self.document.document_type_permissions.len() {
            return Err(missing_row("document_type_permissions", index));
        }
        Ok(self.document.document_type_permissions.remove(index))
    }

    /// Appends a page/report grant.
    pub fn add_page_and_report_permission(&mut self, row: PageOrReportPermissionRow) {
        self.document.page_and_report_permissions.push(row);
    }

    /// Sets the resource catalog of a page/report row and fires the
    /// type-change hook, which clears its name.
    pub fn set_resource_type(&mut self, index: usize, resource_type: ResourceType) -> AppResult<()> {
        let row = self.page_and_report_row_mut(index)?;
        row.set_resource_type(resource_type);
        Self::on_resource_type_changed(row);
        Ok(())
    }

    /// Picks the resource of a page/report row.
    pub fn set_resource_name(&mut self, index: usize, resource_name: &str) -> AppResult<()> {
        self.page_and_report_row_mut(index)?
            .set_resource_name(resource_name);
        Ok(())
    }

    /// Removes a page/report row, buffering it for revocation after save.
    pub fn remove_page_and_report_permission(
        &mut self,
        index: usize,
    ) -> AppResult<PageOrReportPermissionRow> {
        let row = self
            .document
            .page_and_report_permissions
            .get(index)
            .cloned()
            .ok_or_else(|| missing_row("page_and_report_permissions", index))?;

        self.on_row_removed(&row);
        self.document.page_and_report_permissions.remove(index);

        Ok(row)
    }

    fn page_and_report_row_mut(&mut self, index: usize) -> AppResult<&mut PageOrReportPermissionRow> {
        self.document
            .page_and_report_permissions
            .get_mut(index)
            .ok_or_else(|| missing_row("page_and_report_permissions", index))
    }
}

fn missing_row(table: &str, index: usize) -> AppError {
    AppError::NotFound(format!("row {index} does not exist in '{table}'"))
}
