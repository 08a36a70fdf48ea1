//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod frappe_http_document_service;
mod in_memory_document_service;
mod tracing_notifier;

pub use frappe_http_document_service::FrappeHttpDocumentService;
pub use in_memory_document_service::{
    CustomDocPerm, DocTypeRecord, InMemoryDocumentService, PageRecord, ReportRecord, RoleRecord,
};
pub use tracing_notifier::TracingNotifier;
