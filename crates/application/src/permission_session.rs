//! Editing session for one permission manager document.
//!
//! The session owns the in-memory document while a person edits it, answers
//! the link-field query hooks of the host form, and keeps the page/report
//! rows removed since the last save so they can be revoked once the save
//! has been persisted.

mod candidates;
mod editing;
mod filters;
mod hooks;
mod remote;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use permdesk_core::AppResult;
use permdesk_domain::{PageOrReportPermissionRow, PermissionManagerDocument, RoleName};
use tracing::info;

use crate::{DocumentService, Notifier};

pub use filters::{GET_ALL_PERMISSIONS_LABEL, LinkField, SessionAction};

/// Interactive editing state of one permission manager document.
pub struct PermissionEditingSession {
    document: PermissionManagerDocument,
    removed_permissions: Vec<PageOrReportPermissionRow>,
    document_service: Arc<dyn DocumentService>,
    notifier: Arc<dyn Notifier>,
}

impl PermissionEditingSession {
    /// Opens a session over a loaded document.
    #[must_use]
    pub fn new(
        document: PermissionManagerDocument,
        document_service: Arc<dyn DocumentService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            document,
            removed_permissions: Vec::new(),
            document_service,
            notifier,
        }
    }

    /// Loads a stored document and opens a session over it.
    pub async fn open(
        name: &RoleName,
        document_service: Arc<dyn DocumentService>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        let document = document_service.load_document(name).await?;
        Ok(Self::new(document, document_service, notifier))
    }

    /// Creates the document for a role and opens a session over it.
    pub async fn create(
        role: &RoleName,
        document_service: Arc<dyn DocumentService>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        let document = document_service.insert_document(role).await?;
        info!(
            document = %document.name,
            document_type_rows = document.document_type_permissions.len(),
            page_and_report_rows = document.page_and_report_permissions.len(),
            "permission manager created"
        );
        Ok(Self::new(document, document_service, notifier))
    }

    /// Returns the document as currently edited.
    #[must_use]
    pub fn document(&self) -> &PermissionManagerDocument {
        &self.document
    }

    /// Returns page/report rows removed since the last save, oldest first.
    #[must_use]
    pub fn removed_permissions(&self) -> &[PageOrReportPermissionRow] {
        self.removed_permissions.as_slice()
    }

    /// Ends the session and returns the edited document.
    ///
    /// Pending removals that were never saved are discarded.
    #[must_use]
    pub fn into_document(self) -> PermissionManagerDocument {
        self.document
    }
}
