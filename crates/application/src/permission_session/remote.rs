use permdesk_core::AppResult;
use permdesk_domain::{AllPermissions, Indicator, Notification, RoleName};
use tracing::{info, warn};

use super::{PermissionEditingSession, SessionAction};
use crate::{GetAllPermissionsRequest, RemovePageAndReportPermissionsRequest};

impl PermissionEditingSession {
    /// Runs a custom form action.
    pub async fn run_action(&mut self, action: SessionAction) -> AppResult<()> {
        match action {
            SessionAction::GetAllPermissions => {
                let role = self.document.name.clone();
                self.fetch_all_permissions(&role).await.map(|_| ())
            }
        }
    }

    /// Replaces both grant tables with the grants the role holds right now.
    ///
    /// When the service returns a payload the rows are swapped wholesale and
    /// the document is saved. The service's alert is always shown; a failed
    /// call is shown as a red alert and leaves the rows untouched.
    pub async fn fetch_all_permissions(
        &mut self,
        role: &RoleName,
    ) -> AppResult<Option<AllPermissions>> {
        let request = GetAllPermissionsRequest {
            rpm: role.clone(),
            is_button: true,
        };

        let response = match self.document_service.get_all_permissions(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(role = %role, error = %error, "bulk permission fetch failed");
                self.alert(Notification::new(Indicator::Red, error.to_string()))
                    .await;
                return Err(error);
            }
        };

        let alert = response.alert();
        let Some(all_permissions) = response.all_permissions else {
            info!(
                role = %role,
                indicator = alert.indicator.as_str(),
                "bulk permission fetch returned no grants"
            );
            self.alert(alert).await;
            return Ok(None);
        };

        info!(
            role = %role,
            document_type_rows = all_permissions.permissions.len(),
            page_and_report_rows = all_permissions.page_and_report_permissions.len(),
            "replacing permission rows with fetched grants"
        );
        self.document.document_type_permissions = all_permissions.permissions.clone();
        self.document.page_and_report_permissions =
            all_permissions.page_and_report_permissions.clone();
        self.alert(alert).await;

        self.save().await?;

        Ok(Some(all_permissions))
    }

    /// Persists the document, then revokes the page/report rows removed
    /// since the previous save.
    ///
    /// A failed persist keeps the removal buffer for the next attempt.
    pub async fn save(&mut self) -> AppResult<()> {
        let saved = match self.document_service.save_document(&self.document).await {
            Ok(saved) => saved,
            Err(error) => {
                warn!(
                    document = %self.document.name,
                    error = %error,
                    "permission manager save failed"
                );
                self.alert(Notification::new(Indicator::Red, error.to_string()))
                    .await;
                return Err(error);
            }
        };

        info!(
            document = %saved.name,
            document_type_rows = saved.document_type_permissions.len(),
            select_rows = saved.document_type_select_permissions.len(),
            page_and_report_rows = saved.page_and_report_permissions.len(),
            "permission manager saved"
        );
        self.document = saved;

        let role = self.document.role.clone();
        self.reconcile_removed_permissions(&role).await
    }

    /// Sends buffered page/report removals to the Document Service.
    ///
    /// Does nothing when the buffer is empty. The buffer is emptied whether
    /// or not the call succeeds.
    pub async fn reconcile_removed_permissions(&mut self, role: &RoleName) -> AppResult<()> {
        if self.removed_permissions.is_empty() {
            return Ok(());
        }

        let permissions = std::mem::take(&mut self.removed_permissions);
        let removed_count = permissions.len();
        let request = RemovePageAndReportPermissionsRequest {
            permissions,
            role: role.clone(),
        };

        match self
            .document_service
            .remove_page_and_report_permissions(request)
            .await
        {
            Ok(alert) => {
                info!(
                    role = %role,
                    removed_count,
                    indicator = alert.indicator.as_str(),
                    "page/report permissions reconciled"
                );
                self.alert(alert.into()).await;
                Ok(())
            }
            Err(error) => {
                warn!(
                    role = %role,
                    removed_count,
                    error = %error,
                    "page/report permission removal failed, dropping buffered rows"
                );
                self.alert(Notification::new(Indicator::Red, error.to_string()))
                    .await;
                Err(error)
            }
        }
    }

    /// Deletes the document and every grant it created.
    pub async fn trash(self) -> AppResult<()> {
        self.document_service
            .delete_document(&self.document.name)
            .await?;
        info!(document = %self.document.name, "permission manager deleted");
        Ok(())
    }

    async fn alert(&self, notification: Notification) {
        self.notifier.show_alert(notification).await;
    }
}
