use async_trait::async_trait;
use permdesk_core::AppResult;
use permdesk_domain::{PermissionManagerDocument, RoleName};

use super::requests::{
    GetAllPermissionsRequest, GetAllPermissionsResponse, LinkSearchQuery,
    RemovePageAndReportPermissionsRequest, ServiceAlert,
};

/// Port to the system of record holding permission manager documents.
///
/// Implementations return `AppError::Unauthorized` or `AppError::Forbidden`
/// when the service rejects the credentials, and `AppError::RemoteCall` when
/// it cannot be reached or answers with any other non-success status. An
/// answer carrying a red indicator is still a successful call.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Computes every grant the role currently holds.
    async fn get_all_permissions(
        &self,
        request: GetAllPermissionsRequest,
    ) -> AppResult<GetAllPermissionsResponse>;

    /// Revokes the role's access to the listed pages and reports.
    async fn remove_page_and_report_permissions(
        &self,
        request: RemovePageAndReportPermissionsRequest,
    ) -> AppResult<ServiceAlert>;

    /// Loads a stored document by name.
    async fn load_document(&self, name: &RoleName) -> AppResult<PermissionManagerDocument>;

    /// Creates the document for a role, prefilled with the grants the role
    /// already holds.
    async fn insert_document(&self, role: &RoleName) -> AppResult<PermissionManagerDocument>;

    /// Persists the document and returns the stored version.
    async fn save_document(
        &self,
        document: &PermissionManagerDocument,
    ) -> AppResult<PermissionManagerDocument>;

    /// Deletes the document along with every grant it created.
    async fn delete_document(&self, name: &RoleName) -> AppResult<()>;

    /// Lists link candidates of one document type.
    async fn search_link(&self, query: LinkSearchQuery) -> AppResult<Vec<String>>;
}
