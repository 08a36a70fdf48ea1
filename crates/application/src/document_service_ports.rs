mod document_service;
mod notifier;
mod requests;

pub use document_service::DocumentService;
pub use notifier::Notifier;
pub use requests::{
    DEFAULT_LINK_SEARCH_LIMIT, GetAllPermissionsRequest, GetAllPermissionsResponse, LinkSearchQuery,
    RemovePageAndReportPermissionsRequest, ServiceAlert,
};
