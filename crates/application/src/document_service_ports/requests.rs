use permdesk_domain::{
    AllPermissions, Indicator, Notification, PageOrReportPermissionRow, QueryFilter, RoleName,
};
use serde::{Deserialize, Serialize};

/// Default number of link candidates requested per search.
pub const DEFAULT_LINK_SEARCH_LIMIT: usize = 20;

/// Bulk permission computation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAllPermissionsRequest {
    /// Permission manager document to compute grants for.
    pub rpm: RoleName,
    /// Marks calls triggered from the form action button. The service only
    /// returns a payload for button calls.
    pub is_button: bool,
}

/// Answer to a bulk permission computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllPermissionsResponse {
    /// Severity of the outcome.
    pub indicator: Indicator,
    /// Human-readable outcome.
    pub message: String,
    /// Computed grants, absent when nothing was found.
    #[serde(default)]
    pub all_permissions: Option<AllPermissions>,
}

impl GetAllPermissionsResponse {
    /// Returns the alert to show for this answer.
    #[must_use]
    pub fn alert(&self) -> Notification {
        Notification::new(self.indicator, self.message.as_str())
    }
}

/// Request revoking page and report grants removed during an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovePageAndReportPermissionsRequest {
    /// Row snapshots in removal order.
    pub permissions: Vec<PageOrReportPermissionRow>,
    /// Role losing the grants.
    pub role: RoleName,
}

/// Indicator and message pair returned by mutation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAlert {
    /// Severity of the outcome.
    pub indicator: Indicator,
    /// Human-readable outcome.
    pub message: String,
}

impl From<ServiceAlert> for Notification {
    fn from(value: ServiceAlert) -> Self {
        Notification::new(value.indicator, value.message)
    }
}

/// Link field candidate search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSearchQuery {
    /// Document type the link points to.
    pub doctype: String,
    /// Constraint registered for the link field, if any.
    pub filter: Option<QueryFilter>,
    /// Case-insensitive name fragment typed by the user.
    pub text: Option<String>,
    /// Maximum number of names returned.
    pub limit: usize,
}

impl LinkSearchQuery {
    /// Creates an unconstrained search over a document type.
    #[must_use]
    pub fn new(doctype: impl Into<String>) -> Self {
        Self {
            doctype: doctype.into(),
            filter: None,
            text: None,
            limit: DEFAULT_LINK_SEARCH_LIMIT,
        }
    }

    /// Applies an optional query filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<QueryFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Applies a name fragment; blank fragments are ignored.
    #[must_use]
    pub fn with_text(mut self, text: Option<&str>) -> Self {
        self.text = text
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned);
        self
    }

    /// Overrides the result limit.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}
