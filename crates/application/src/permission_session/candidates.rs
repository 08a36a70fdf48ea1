use permdesk_core::{AppError, AppResult};
use permdesk_domain::ChildTable;

use super::{LinkField, PermissionEditingSession};
use crate::LinkSearchQuery;

impl PermissionEditingSession {
    /// Lists roles the document may manage.
    pub async fn role_candidates(&self, text: Option<&str>) -> AppResult<Vec<String>> {
        self.search(LinkSearchQuery::new("Role"), LinkField::Role, None, text)
            .await
    }

    /// Lists document types grantable in either document type table.
    pub async fn document_type_candidates(&self, text: Option<&str>) -> AppResult<Vec<String>> {
        self.search(
            LinkSearchQuery::new("DocType"),
            LinkField::DocumentType(ChildTable::DocumentTypePermissions),
            None,
            text,
        )
        .await
    }

    /// Lists resources pickable on a page/report row.
    pub async fn resource_candidates(
        &self,
        index: usize,
        text: Option<&str>,
    ) -> AppResult<Vec<String>> {
        let row = self
            .document
            .page_and_report_permissions
            .get(index)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "row {index} does not exist in 'page_and_report_permissions'"
                ))
            })?;

        self.search(
            LinkSearchQuery::new(row.resource_type().as_str()),
            LinkField::ResourceName,
            Some(index),
            text,
        )
        .await
    }

    async fn search(
        &self,
        query: LinkSearchQuery,
        field: LinkField,
        row_index: Option<usize>,
        text: Option<&str>,
    ) -> AppResult<Vec<String>> {
        let query = query
            .with_filter(self.query_for(field, row_index))
            .with_text(text);
        self.document_service.search_link(query).await
    }
}
