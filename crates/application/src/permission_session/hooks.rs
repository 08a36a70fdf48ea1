use permdesk_domain::PageOrReportPermissionRow;
use tracing::debug;

use super::PermissionEditingSession;

impl PermissionEditingSession {
    /// Host hook fired when a page/report row's resource type changed.
    ///
    /// Runs before the user can pick again, so a stale name never pairs with
    /// the new catalog. This is the only place the name is cleared.
    pub fn on_resource_type_changed(row: &mut PageOrReportPermissionRow) {
        if row.has_resource() {
            debug!(
                row_id = %row.row_id(),
                resource_type = %row.resource_type(),
                stale_resource_name = row.resource_name(),
                "clearing resource name after resource type change"
            );
        }
        row.clear_resource_name();
    }

    /// Host hook fired right before a page/report row leaves its table.
    ///
    /// Keeps a full snapshot since the host discards the row afterwards.
    pub fn on_row_removed(&mut self, row: &PageOrReportPermissionRow) {
        debug!(
            role = %self.document.role,
            resource_type = %row.resource_type(),
            resource_name = row.resource_name(),
            pending = self.removed_permissions.len() + 1,
            "buffering removed page/report permission"
        );
        self.removed_permissions.push(row.clone());
    }
}
