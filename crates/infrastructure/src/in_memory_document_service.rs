//! In-memory Document Service reproducing the permission manager server
//! behaviour: catalog lookups, custom doc-perm bookkeeping and page/report
//! custom roles.

mod catalog;
mod documents;
mod grants;


use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use permdesk_application::{
    DocumentService, GetAllPermissionsRequest, GetAllPermissionsResponse, LinkSearchQuery,
    RemovePageAndReportPermissionsRequest, ServiceAlert,
};
use permdesk_core::{AppError, AppResult};
use permdesk_domain::{
    AllPermissions, DocumentPermission, DocumentTypePermissionRow, Indicator,
    PageOrReportPermissionRow, PermissionManagerDocument, ResourceType, RoleName,
};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use catalog::{DocTypeRecord, PageRecord, ReportRecord, RoleRecord};

/// Document type whose permission is granted to every managed role.
const FILE_DOCTYPE: &str = "File";

/// Custom permission row of one role on one document type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomDocPerm {
    /// Granted flags.
    pub permissions: BTreeSet<DocumentPermission>,
    /// Select-only grant used for link lookups.
    pub select: bool,
}

#[derive(Debug, Default)]
struct Catalog {
    roles: BTreeMap<String, RoleRecord>,
    doctypes: BTreeMap<String, DocTypeRecord>,
    pages: BTreeMap<String, PageRecord>,
    reports: BTreeMap<String, ReportRecord>,
}

#[derive(Debug, Default)]
struct GrantStore {
    doc_perms: BTreeMap<(String, String), CustomDocPerm>,
    custom_roles: BTreeMap<(ResourceType, String), BTreeSet<String>>,
}

/// In-memory Document Service implementation.
#[derive(Debug, Default)]
pub struct InMemoryDocumentService {
    catalog: RwLock<Catalog>,
    grants: RwLock<GrantStore>,
    documents: RwLock<BTreeMap<String, PermissionManagerDocument>>,
    save_progress: RwLock<Vec<u8>>,
}

impl InMemoryDocumentService {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the progress percentages published by the most recent save.
    pub async fn last_save_progress(&self) -> Vec<u8> {
        self.save_progress.read().await.clone()
    }

    /// Returns the custom doc-perm of a role on a document type.
    pub async fn custom_doc_perm(&self, doctype: &str, role: &str) -> Option<CustomDocPerm> {
        self.grants
            .read()
            .await
            .doc_perms
            .get(&(doctype.to_owned(), role.to_owned()))
            .cloned()
    }

    /// Returns the roles holding a page or report through its custom role.
    pub async fn resource_roles(
        &self,
        resource_type: ResourceType,
        resource_name: &str,
    ) -> Option<BTreeSet<String>> {
        self.grants
            .read()
            .await
            .custom_roles
            .get(&(resource_type, resource_name.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl DocumentService for InMemoryDocumentService {
    async fn get_all_permissions(
        &self,
        request: GetAllPermissionsRequest,
    ) -> AppResult<GetAllPermissionsResponse> {
        self.get_all_permissions_impl(request).await
    }

    async fn remove_page_and_report_permissions(
        &self,
        request: RemovePageAndReportPermissionsRequest,
    ) -> AppResult<ServiceAlert> {
        self.remove_page_and_report_permissions_impl(request).await
    }

    async fn load_document(&self, name: &RoleName) -> AppResult<PermissionManagerDocument> {
        self.load_document_impl(name).await
    }

    async fn insert_document(&self, role: &RoleName) -> AppResult<PermissionManagerDocument> {
        self.insert_document_impl(role).await
    }

    async fn save_document(
        &self,
        document: &PermissionManagerDocument,
    ) -> AppResult<PermissionManagerDocument> {
        self.save_document_impl(document).await
    }

    async fn delete_document(&self, name: &RoleName) -> AppResult<()> {
        self.delete_document_impl(name).await
    }

    async fn search_link(&self, query: LinkSearchQuery) -> AppResult<Vec<String>> {
        self.search_link_impl(query).await
    }
}
