//! Document Service adapter speaking the Frappe REST and RPC API.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use permdesk_application::{
    DocumentService, GetAllPermissionsRequest, GetAllPermissionsResponse, LinkSearchQuery,
    RemovePageAndReportPermissionsRequest, ServiceAlert,
};
use permdesk_core::{ApiCredentials, AppError, AppResult};
use permdesk_domain::{PERMISSION_MANAGER_DOCTYPE, PermissionManagerDocument, RoleName};
use reqwest::header;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use wire::{MethodEnvelope, ResourceEnvelope, endpoint, link_filters, remote_failure};

const GET_ALL_PERMISSIONS_METHOD: &str = "role_permission_manager.role_permission_manager.doctype.role_permission_manager.role_permission_manager.get_all_permissions";
const REMOVE_PERMISSIONS_METHOD: &str = "role_permission_manager.role_permission_manager.doctype.role_permission_manager.role_permission_manager.remove_permissions_for_page_and_report";

/// HTTP implementation of the Document Service port.
pub struct FrappeHttpDocumentService {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: ApiCredentials,
}

impl FrappeHttpDocumentService {
    /// Creates an adapter over an existing HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url, credentials: ApiCredentials) -> Self {
        Self {
            http_client,
            base_url,
            credentials,
        }
    }

    /// Creates an adapter with its own client using the given request timeout.
    pub fn with_timeout(
        base_url: Url,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self::new(http_client, base_url, credentials))
    }

    async fn call_method<T>(&self, method: &str, args: Value) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, &["api", "method", method])?;
        let envelope: MethodEnvelope<T> = self
            .send(self.http_client.post(url).json(&args), method)
            .await?;

        envelope.message.ok_or_else(|| {
            AppError::RemoteCall(format!("method '{method}' returned no message"))
        })
    }

    fn resource_url(&self, name: Option<&RoleName>) -> AppResult<Url> {
        match name {
            Some(name) => endpoint(
                &self.base_url,
                &["api", "resource", PERMISSION_MANAGER_DOCTYPE, name.as_str()],
            ),
            None => endpoint(&self.base_url, &["api", "resource", PERMISSION_MANAGER_DOCTYPE]),
        }
    }

    async fn send<T>(&self, builder: reqwest::RequestBuilder, operation: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .header(
                header::AUTHORIZATION,
                self.credentials.authorization_header(),
            )
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                AppError::RemoteCall(format!("failed to call '{operation}': {error}"))
            })?;

        let status = response.status();
        debug!(operation = operation, status = status.as_u16(), "document service responded");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(remote_failure(operation, status.as_u16(), body.as_str()));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::RemoteCall(format!(
                "failed to parse '{operation}' response body: {error}"
            ))
        })
    }
}

#[async_trait]
impl DocumentService for FrappeHttpDocumentService {
    async fn get_all_permissions(
        &self,
        request: GetAllPermissionsRequest,
    ) -> AppResult<GetAllPermissionsResponse> {
        self.call_method(
            GET_ALL_PERMISSIONS_METHOD,
            json!({
                "rpm": request.rpm,
                "is_button": u8::from(request.is_button),
            }),
        )
        .await
    }

    async fn remove_page_and_report_permissions(
        &self,
        request: RemovePageAndReportPermissionsRequest,
    ) -> AppResult<ServiceAlert> {
        self.call_method(REMOVE_PERMISSIONS_METHOD, wire::removal_args(&request)?)
            .await
    }

    async fn load_document(&self, name: &RoleName) -> AppResult<PermissionManagerDocument> {
        let url = self.resource_url(Some(name))?;
        let envelope: ResourceEnvelope<PermissionManagerDocument> = self
            .send(self.http_client.get(url), "load permission manager")
            .await?;
        Ok(envelope.data)
    }

    async fn insert_document(&self, role: &RoleName) -> AppResult<PermissionManagerDocument> {
        let url = self.resource_url(None)?;
        let envelope: ResourceEnvelope<PermissionManagerDocument> = self
            .send(
                self.http_client.post(url).json(&json!({ "role": role })),
                "insert permission manager",
            )
            .await?;
        Ok(envelope.data)
    }

    async fn save_document(
        &self,
        document: &PermissionManagerDocument,
    ) -> AppResult<PermissionManagerDocument> {
        let url = self.resource_url(Some(&document.name))?;
        let envelope: ResourceEnvelope<PermissionManagerDocument> = self
            .send(self.http_client.put(url).json(document), "save permission manager")
            .await?;
        Ok(envelope.data)
    }

    async fn delete_document(&self, name: &RoleName) -> AppResult<()> {
        let url = self.resource_url(Some(name))?;
        let _: Value = self
            .send(self.http_client.delete(url), "delete permission manager")
            .await?;
        Ok(())
    }

    async fn search_link(&self, query: LinkSearchQuery) -> AppResult<Vec<String>> {
        let mut url = endpoint(&self.base_url, &["api", "resource", query.doctype.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", r#"["name"]"#)
            .append_pair("filters", link_filters(&query).to_string().as_str())
            .append_pair("order_by", "name asc")
            .append_pair("limit_page_length", query.limit.to_string().as_str());

        let envelope: ResourceEnvelope<Vec<wire::NamedRecord>> =
            self.send(self.http_client.get(url), "search link").await?;
        Ok(envelope.data.into_iter().map(|record| record.name).collect())
    }
}
