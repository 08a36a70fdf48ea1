//! Application services and ports.

#![forbid(unsafe_code)]

mod document_service_ports;
mod permission_session;

pub use document_service_ports::{
    DEFAULT_LINK_SEARCH_LIMIT, DocumentService, GetAllPermissionsRequest,
    GetAllPermissionsResponse, LinkSearchQuery, Notifier, RemovePageAndReportPermissionsRequest,
    ServiceAlert,
};
pub use permission_session::{
    GET_ALL_PERMISSIONS_LABEL, LinkField, PermissionEditingSession, SessionAction,
};
