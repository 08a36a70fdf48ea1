use permdesk_application::{LinkSearchQuery, RemovePageAndReportPermissionsRequest};
use permdesk_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// `{"message": ...}` body returned by whitelisted methods.
#[derive(Debug, Deserialize)]
pub(super) struct MethodEnvelope<T> {
    pub(super) message: Option<T>,
}

/// `{"data": ...}` body returned by resource endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct ResourceEnvelope<T> {
    pub(super) data: T,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedRecord {
    pub(super) name: String,
}

pub(super) fn endpoint(base: &Url, segments: &[&str]) -> AppResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AppError::Validation(format!("base URL '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// List-form filters: one `[field, "=", value]` triple per constraint plus a
/// `like` triple for the typed text.
pub(super) fn link_filters(query: &LinkSearchQuery) -> Value {
    let mut filters: Vec<Value> = query
        .filter
        .iter()
        .flat_map(|filter| {
            filter
                .iter()
                .map(|(field, value)| json!([field, "=", value.to_wire()]))
        })
        .collect();

    if let Some(text) = &query.text {
        filters.push(json!(["name", "like", format!("%{text}%")]));
    }

    Value::Array(filters)
}

/// The removal endpoint decodes `permissions` itself, so it travels as a
/// JSON string.
pub(super) fn removal_args(request: &RemovePageAndReportPermissionsRequest) -> AppResult<Value> {
    let permissions = serde_json::to_string(&request.permissions).map_err(|error| {
        AppError::Internal(format!("failed to encode removed permissions: {error}"))
    })?;

    Ok(json!({
        "permissions": permissions,
        "role": request.role,
    }))
}

/// Maps a non-success status to an error; credential problems keep their
/// own categories so callers can tell them from service failures.
pub(super) fn remote_failure(operation: &str, status: u16, body: &str) -> AppError {
    let detail = server_message(body).unwrap_or_else(|| body.to_owned());
    let message = format!("'{operation}' returned status {status}: {detail}");
    match status {
        401 => AppError::Unauthorized(message),
        403 => AppError::Forbidden(message),
        _ => AppError::RemoteCall(message),
    }
}

/// Extracts the first user-facing message from `_server_messages`, a JSON
/// string holding a list of JSON-encoded message objects.
fn server_message(body: &str) -> Option<String> {
    let body: Value = serde_json::from_str(body).ok()?;
    let encoded = body.get("_server_messages")?.as_str()?;
    let messages: Vec<String> = serde_json::from_str(encoded).ok()?;

    messages.iter().find_map(|message| {
        serde_json::from_str::<Value>(message)
            .ok()?
            .get("message")?
            .as_str()
            .map(ToOwned::to_owned)
    })
}
