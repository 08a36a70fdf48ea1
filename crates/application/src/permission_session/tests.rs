use std::sync::Arc;

use async_trait::async_trait;
use permdesk_core::{AppError, AppResult};
use permdesk_domain::{
    AllPermissions, ChildTable, DocumentPermission, DocumentTypePermissionRow, Indicator,
    Notification, PageOrReportPermissionRow, PermissionManagerDocument, QueryFilter,
    ResourceType, RoleName,
};
use proptest::prelude::*;
use tokio::sync::Mutex;

use super::{LinkField, PermissionEditingSession, SessionAction};
use crate::{
    DocumentService, GetAllPermissionsRequest, GetAllPermissionsResponse, LinkSearchQuery,
    Notifier, RemovePageAndReportPermissionsRequest, ServiceAlert,
};

#[derive(Default)]
struct FakeDocumentService {
    fetch_response: Option<GetAllPermissionsResponse>,
    reject_credentials: bool,
    fail_remove: bool,
    fail_save: bool,
    calls: Mutex<Vec<&'static str>>,
    fetch_requests: Mutex<Vec<GetAllPermissionsRequest>>,
    remove_requests: Mutex<Vec<RemovePageAndReportPermissionsRequest>>,
    saved_documents: Mutex<Vec<PermissionManagerDocument>>,
    search_queries: Mutex<Vec<LinkSearchQuery>>,
}

#[async_trait]
impl DocumentService for FakeDocumentService {
    async fn get_all_permissions(
        &self,
        request: GetAllPermissionsRequest,
    ) -> AppResult<GetAllPermissionsResponse> {
        self.calls.lock().await.push("get_all_permissions");
        self.fetch_requests.lock().await.push(request);
        if self.reject_credentials {
            return Err(AppError::Unauthorized("status 401: Invalid API key".to_owned()));
        }
        self.fetch_response
            .clone()
            .ok_or_else(|| AppError::RemoteCall("connection refused".to_owned()))
    }

    async fn remove_page_and_report_permissions(
        &self,
        request: RemovePageAndReportPermissionsRequest,
    ) -> AppResult<ServiceAlert> {
        self.calls.lock().await.push("remove_page_and_report_permissions");
        self.remove_requests.lock().await.push(request);
        if self.fail_remove {
            return Err(AppError::RemoteCall("status 500".to_owned()));
        }

        Ok(ServiceAlert {
            indicator: Indicator::Green,
            message: "Page and Report Permissions Removed".to_owned(),
        })
    }

    async fn load_document(&self, name: &RoleName) -> AppResult<PermissionManagerDocument> {
        self.calls.lock().await.push("load_document");
        Ok(PermissionManagerDocument::new(name.clone()))
    }

    async fn insert_document(&self, role: &RoleName) -> AppResult<PermissionManagerDocument> {
        self.calls.lock().await.push("insert_document");
        let mut document = PermissionManagerDocument::new(role.clone());
        document
            .document_type_permissions
            .push(document_row("ToDo"));
        Ok(document)
    }

    async fn save_document(
        &self,
        document: &PermissionManagerDocument,
    ) -> AppResult<PermissionManagerDocument> {
        self.calls.lock().await.push("save_document");
        if self.fail_save {
            return Err(AppError::RemoteCall("status 417".to_owned()));
        }
        self.saved_documents.lock().await.push(document.clone());
        Ok(document.clone())
    }

    async fn delete_document(&self, _name: &RoleName) -> AppResult<()> {
        self.calls.lock().await.push("delete_document");
        Ok(())
    }

    async fn search_link(&self, query: LinkSearchQuery) -> AppResult<Vec<String>> {
        self.calls.lock().await.push("search_link");
        self.search_queries.lock().await.push(query);
        Ok(vec!["candidate".to_owned()])
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show_alert(&self, notification: Notification) {
        self.alerts.lock().await.push(notification);
    }
}

fn role(name: &str) -> RoleName {
    RoleName::new(name).unwrap_or_else(|_| unreachable!())
}

fn document_row(document_type: &str) -> DocumentTypePermissionRow {
    DocumentTypePermissionRow::with_permissions(document_type, [DocumentPermission::Read])
        .unwrap_or_else(|_| unreachable!())
}

fn session_with(
    service: FakeDocumentService,
) -> (
    PermissionEditingSession,
    Arc<FakeDocumentService>,
    Arc<RecordingNotifier>,
) {
    let service = Arc::new(service);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut document = PermissionManagerDocument::new(role("Store Keeper"));
    document
        .document_type_permissions
        .push(document_row("Stock Entry"));
    document
        .page_and_report_permissions
        .push(PageOrReportPermissionRow::new(
            ResourceType::Page,
            "stock-balance",
        ));

    let session = PermissionEditingSession::new(document, service.clone(), notifier.clone());
    (session, service, notifier)
}

#[test]
fn role_filter_selects_custom_enabled_desk_roles() {
    let (session, _, _) = session_with(FakeDocumentService::default());

    assert_eq!(
        session.filter_role_candidates(),
        QueryFilter::new()
            .with_flag("is_custom", true)
            .with_flag("disabled", false)
            .with_flag("desk_access", true)
    );
}

#[test]
fn document_type_filter_is_shared_by_both_tables() {
    let (session, _, _) = session_with(FakeDocumentService::default());
    let expected = Some(QueryFilter::new().with_flag("istable", false));

    assert_eq!(
        session.query_for(
            LinkField::DocumentType(ChildTable::DocumentTypePermissions),
            None
        ),
        expected
    );
    assert_eq!(
        session.query_for(
            LinkField::DocumentType(ChildTable::DocumentTypeSelectPermissions),
            None
        ),
        expected
    );
}

#[test]
fn resource_filter_hides_system_pages_only_for_page_rows() {
    let (session, _, _) = session_with(FakeDocumentService::default());
    let page_row = PageOrReportPermissionRow::new(ResourceType::Page, "");
    let report_row = PageOrReportPermissionRow::new(ResourceType::Report, "");

    assert_eq!(
        session.filter_resource_candidates(&page_row),
        Some(QueryFilter::new().with_flag("system_page", false))
    );
    assert_eq!(session.filter_resource_candidates(&report_row), None);
}

#[test]
fn resource_query_follows_the_addressed_row() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());
    session.add_page_and_report_permission(PageOrReportPermissionRow::new(
        ResourceType::Report,
        "Stock Ledger",
    ));

    assert!(session.query_for(LinkField::ResourceName, Some(0)).is_some());
    assert!(session.query_for(LinkField::ResourceName, Some(1)).is_none());
    assert!(session.query_for(LinkField::ResourceName, Some(9)).is_none());
}

#[test]
fn resource_type_change_hook_clears_resource_name() {
    let mut row = PageOrReportPermissionRow::new(ResourceType::Report, "General Ledger");

    PermissionEditingSession::on_resource_type_changed(&mut row);

    assert_eq!(row.resource_name(), "");
    assert_eq!(row.resource_type(), ResourceType::Report);
}

#[test]
fn set_resource_type_clears_previous_name() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());

    let result = session.set_resource_type(0, ResourceType::Report);

    assert!(result.is_ok());
    let row = &session.document().page_and_report_permissions[0];
    assert_eq!(row.resource_type(), ResourceType::Report);
    assert_eq!(row.resource_name(), "");
}

#[test]
fn reselecting_the_same_resource_type_still_clears_name() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());

    let result = session.set_resource_type(0, ResourceType::Page);

    assert!(result.is_ok());
    let row = &session.document().page_and_report_permissions[0];
    assert_eq!(row.resource_type(), ResourceType::Page);
    assert!(!row.has_resource());
}

#[test]
fn set_resource_type_on_unknown_row_is_not_found() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());

    let result = session.set_resource_type(4, ResourceType::Report);

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

fn resource_type_strategy() -> impl Strategy<Value = ResourceType> {
    prop_oneof![Just(ResourceType::Page), Just(ResourceType::Report)]
}

proptest! {
    #[test]
    fn changing_resource_type_always_clears_resource_name(
        initial in resource_type_strategy(),
        next in resource_type_strategy(),
        name in "[A-Za-z0-9 _-]{0,40}",
    ) {
        let (mut session, _, _) = session_with(FakeDocumentService::default());
        session.add_page_and_report_permission(PageOrReportPermissionRow::new(initial, name));

        prop_assert!(session.set_resource_type(1, next).is_ok());

        let row = &session.document().page_and_report_permissions[1];
        prop_assert_eq!(row.resource_name(), "");
        prop_assert_eq!(row.resource_type(), next);
    }
}

#[test]
fn link_fields_and_actions_describe_the_form() {
    assert_eq!(LinkField::Role.field_name(), "role");
    assert_eq!(
        LinkField::DocumentType(ChildTable::DocumentTypeSelectPermissions).field_name(),
        "document_type"
    );
    assert_eq!(LinkField::ResourceName.field_name(), "resource_name");
    assert_eq!(SessionAction::all(), &[SessionAction::GetAllPermissions]);
    assert_eq!(
        SessionAction::all()
            .iter()
            .map(SessionAction::label)
            .collect::<Vec<_>>(),
        vec!["Get All Permissions"]
    );
}

#[test]
fn link_search_limit_never_drops_to_zero() {
    let query = LinkSearchQuery::new("Role");
    assert_eq!(query.limit, crate::DEFAULT_LINK_SEARCH_LIMIT);

    assert_eq!(query.clone().with_limit(5).limit, 5);
    assert_eq!(query.with_limit(0).limit, 1);
}

#[test]
fn document_type_rows_are_edited_without_buffering() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());
    session.add_document_type_permission(document_row("Warehouse"));

    let granted = session.set_document_permission(1, DocumentPermission::Write, true);
    let revoked = session.set_document_permission(1, DocumentPermission::Read, false);
    let missing = session.set_document_permission(7, DocumentPermission::Read, true);

    assert!(granted.is_ok());
    assert!(revoked.is_ok());
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    let warehouse = &session.document().document_type_permissions[1];
    assert!(warehouse.allows(DocumentPermission::Write));
    assert!(!warehouse.allows(DocumentPermission::Read));

    let removed = session.remove_document_type_permission(0);
    assert!(removed.is_ok_and(|row| row.document_type() == "Stock Entry"));
    assert!(matches!(
        session.remove_document_type_permission(3),
        Err(AppError::NotFound(_))
    ));
    assert!(session.removed_permissions().is_empty());
    let remaining: Vec<&str> = session
        .document()
        .document_type_permissions
        .iter()
        .map(DocumentTypePermissionRow::document_type)
        .collect();
    assert_eq!(remaining, vec!["Warehouse"]);
}

#[tokio::test]
async fn save_persists_role_change_and_skips_reconciliation() {
    let (mut session, service, notifier) = session_with(FakeDocumentService::default());
    session.set_role(role("Auditor"));
    session
        .remove_document_type_permission(0)
        .unwrap_or_else(|_| unreachable!());

    assert!(session.save().await.is_ok());

    let saved = service.saved_documents.lock().await;
    assert_eq!(saved[0].role.as_str(), "Auditor");
    assert!(saved[0].document_type_permissions.is_empty());
    assert_eq!(*service.calls.lock().await, vec!["save_document"]);
    assert!(notifier.alerts.lock().await.is_empty());
}

#[test]
fn removing_unknown_row_is_not_found() {
    let (mut session, _, _) = session_with(FakeDocumentService::default());

    let result = session.remove_page_and_report_permission(3);

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(session.removed_permissions().is_empty());
}

#[tokio::test]
async fn save_reconciles_removed_rows_in_removal_order() {
    let (mut session, service, notifier) = session_with(FakeDocumentService::default());
    session.add_page_and_report_permission(PageOrReportPermissionRow::new(
        ResourceType::Report,
        "Stock Ledger",
    ));
    session.add_page_and_report_permission(PageOrReportPermissionRow::new(
        ResourceType::Report,
        "Stock Ageing",
    ));

    let first = session
        .remove_page_and_report_permission(2)
        .unwrap_or_else(|_| unreachable!());
    let second = session
        .remove_page_and_report_permission(0)
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(session.removed_permissions().len(), 2);

    let result = session.save().await;
    assert!(result.is_ok());

    let requests = service.remove_requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].permissions, vec![first, second]);
    assert_eq!(requests[0].role.as_str(), "Store Keeper");
    assert!(session.removed_permissions().is_empty());
    assert_eq!(
        *service.calls.lock().await,
        vec!["save_document", "remove_page_and_report_permissions"]
    );

    let alerts = notifier.alerts.lock().await;
    assert_eq!(
        alerts.as_slice(),
        &[Notification::new(
            Indicator::Green,
            "Page and Report Permissions Removed"
        )]
    );
}

#[tokio::test]
async fn failed_reconciliation_still_clears_buffer() {
    let (mut session, service, notifier) = session_with(FakeDocumentService {
        fail_remove: true,
        ..FakeDocumentService::default()
    });
    let removed = session
        .remove_page_and_report_permission(0)
        .unwrap_or_else(|_| unreachable!());
    let store_keeper = role("Store Keeper");

    let result = session.reconcile_removed_permissions(&store_keeper).await;

    assert!(matches!(result, Err(AppError::RemoteCall(_))));
    assert!(session.removed_permissions().is_empty());
    assert_eq!(
        service.remove_requests.lock().await[0].permissions,
        vec![removed]
    );
    let alerts = notifier.alerts.lock().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].indicator, Indicator::Red);
}

#[tokio::test]
async fn reconcile_with_empty_buffer_makes_no_call() {
    let (mut session, service, _) = session_with(FakeDocumentService::default());
    session
        .remove_page_and_report_permission(0)
        .unwrap_or_else(|_| unreachable!());
    let store_keeper = role("Store Keeper");

    assert!(
        session
            .reconcile_removed_permissions(&store_keeper)
            .await
            .is_ok()
    );
    assert!(
        session
            .reconcile_removed_permissions(&store_keeper)
            .await
            .is_ok()
    );

    assert_eq!(service.remove_requests.lock().await.len(), 1);
}

#[tokio::test]
async fn failed_save_keeps_removed_rows_for_next_save() {
    let (mut session, service, notifier) = session_with(FakeDocumentService {
        fail_save: true,
        ..FakeDocumentService::default()
    });
    session
        .remove_page_and_report_permission(0)
        .unwrap_or_else(|_| unreachable!());

    let result = session.save().await;

    assert!(result.is_err());
    assert_eq!(session.removed_permissions().len(), 1);
    assert!(service.remove_requests.lock().await.is_empty());
    assert_eq!(notifier.alerts.lock().await[0].indicator, Indicator::Red);
}

#[tokio::test]
async fn fetch_replaces_rows_saves_and_alerts() {
    let p1 = document_row("Item");
    let p2 = document_row("Warehouse");
    let q1 = PageOrReportPermissionRow::new(ResourceType::Report, "Stock Ledger");
    let (mut session, service, notifier) = session_with(FakeDocumentService {
        fetch_response: Some(GetAllPermissionsResponse {
            indicator: Indicator::Green,
            message: "Done".to_owned(),
            all_permissions: Some(AllPermissions {
                permissions: vec![p1.clone(), p2.clone()],
                page_and_report_permissions: vec![q1.clone()],
            }),
        }),
        ..FakeDocumentService::default()
    });
    let store_keeper = role("Store Keeper");

    let fetched = session.fetch_all_permissions(&store_keeper).await;

    assert!(matches!(fetched, Ok(Some(_))));
    assert_eq!(
        session.document().document_type_permissions,
        vec![p1.clone(), p2.clone()]
    );
    assert_eq!(session.document().page_and_report_permissions, vec![q1.clone()]);

    let saved = service.saved_documents.lock().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].document_type_permissions, vec![p1, p2]);
    assert_eq!(saved[0].page_and_report_permissions, vec![q1]);

    let requests = service.fetch_requests.lock().await;
    assert_eq!(requests[0].rpm.as_str(), "Store Keeper");
    assert!(requests[0].is_button);

    assert_eq!(
        notifier.alerts.lock().await.as_slice(),
        &[Notification::new(Indicator::Green, "Done")]
    );
}

#[tokio::test]
async fn fetch_without_payload_keeps_rows_and_alerts() {
    let (mut session, service, notifier) = session_with(FakeDocumentService {
        fetch_response: Some(GetAllPermissionsResponse {
            indicator: Indicator::Red,
            message: "Failed".to_owned(),
            all_permissions: None,
        }),
        ..FakeDocumentService::default()
    });
    let before = session.document().clone();
    let store_keeper = role("Store Keeper");

    let fetched = session.fetch_all_permissions(&store_keeper).await;

    assert!(matches!(fetched, Ok(None)));
    assert_eq!(session.document(), &before);
    assert!(service.saved_documents.lock().await.is_empty());
    assert_eq!(
        notifier.alerts.lock().await.as_slice(),
        &[Notification::new(Indicator::Red, "Failed")]
    );
}

#[tokio::test]
async fn fetch_transport_failure_alerts_and_keeps_rows() {
    let (mut session, service, notifier) = session_with(FakeDocumentService::default());
    let before = session.document().clone();
    let store_keeper = role("Store Keeper");

    let fetched = session.fetch_all_permissions(&store_keeper).await;

    assert!(matches!(fetched, Err(AppError::RemoteCall(_))));
    assert_eq!(session.document(), &before);
    assert_eq!(*service.calls.lock().await, vec!["get_all_permissions"]);
    let alerts = notifier.alerts.lock().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].indicator, Indicator::Red);
}

#[tokio::test]
async fn fetch_with_rejected_credentials_alerts_and_keeps_rows() {
    let (mut session, _, notifier) = session_with(FakeDocumentService {
        reject_credentials: true,
        ..FakeDocumentService::default()
    });
    let before = session.document().clone();

    let fetched = session.run_action(SessionAction::GetAllPermissions).await;

    assert!(matches!(fetched, Err(AppError::Unauthorized(_))));
    assert_eq!(session.document(), &before);
    let alerts = notifier.alerts.lock().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].indicator, Indicator::Red);
    assert!(alerts[0].message.contains("Invalid API key"));
}

#[tokio::test]
async fn get_all_permissions_action_targets_the_open_document() {
    let (mut session, service, _) = session_with(FakeDocumentService {
        fetch_response: Some(GetAllPermissionsResponse {
            indicator: Indicator::Red,
            message: "No permissions found".to_owned(),
            all_permissions: None,
        }),
        ..FakeDocumentService::default()
    });

    assert_eq!(SessionAction::GetAllPermissions.label(), "Get All Permissions");
    let result = session.run_action(SessionAction::GetAllPermissions).await;

    assert!(result.is_ok());
    assert_eq!(
        service.fetch_requests.lock().await[0].rpm.as_str(),
        "Store Keeper"
    );
}

#[tokio::test]
async fn resource_candidates_apply_row_filter() {
    let (mut session, service, _) = session_with(FakeDocumentService::default());
    session.add_page_and_report_permission(PageOrReportPermissionRow::new(
        ResourceType::Report,
        "",
    ));

    let pages = session.resource_candidates(0, Some(" stock ")).await;
    let reports = session.resource_candidates(1, None).await;
    let missing = session.resource_candidates(5, None).await;

    assert!(pages.is_ok());
    assert!(reports.is_ok());
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let queries = service.search_queries.lock().await;
    assert_eq!(queries[0].doctype, "Page");
    assert_eq!(
        queries[0].filter,
        Some(QueryFilter::new().with_flag("system_page", false))
    );
    assert_eq!(queries[0].text.as_deref(), Some("stock"));
    assert_eq!(queries[1].doctype, "Report");
    assert_eq!(queries[1].filter, None);
}

#[tokio::test]
async fn role_and_document_type_candidates_use_their_filters() {
    let (session, service, _) = session_with(FakeDocumentService::default());

    assert!(session.role_candidates(None).await.is_ok());
    assert!(session.document_type_candidates(Some("")).await.is_ok());

    let queries = service.search_queries.lock().await;
    assert_eq!(queries[0].doctype, "Role");
    assert_eq!(queries[0].filter, Some(session.filter_role_candidates()));
    assert_eq!(queries[1].doctype, "DocType");
    assert_eq!(
        queries[1].filter,
        Some(session.filter_document_type_candidates())
    );
    assert_eq!(queries[1].text, None);
}

#[tokio::test]
async fn trash_deletes_the_document() {
    let (session, service, _) = session_with(FakeDocumentService::default());

    assert!(session.trash().await.is_ok());
    assert_eq!(*service.calls.lock().await, vec!["delete_document"]);
}

#[tokio::test]
async fn open_and_create_start_from_service_documents() {
    let service = Arc::new(FakeDocumentService::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let auditor = role("Auditor");

    let opened = PermissionEditingSession::open(&auditor, service.clone(), notifier.clone()).await;
    let created = PermissionEditingSession::create(&auditor, service.clone(), notifier).await;

    let opened = opened.unwrap_or_else(|_| unreachable!());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert!(opened.document().document_type_permissions.is_empty());
    let document_types: Vec<String> = created
        .into_document()
        .document_type_permissions
        .iter()
        .map(|row| row.document_type().to_owned())
        .collect();
    assert_eq!(document_types, vec!["ToDo".to_owned()]);
    assert_eq!(
        *service.calls.lock().await,
        vec!["load_document", "insert_document"]
    );
}
