//! Headless runner applying a permission manager action against a Frappe
//! site.

#![forbid(unsafe_code)]

mod sync_config;

use std::sync::Arc;

use permdesk_application::{PermissionEditingSession, SessionAction};
use permdesk_core::{AppError, AppResult};
use permdesk_infrastructure::{FrappeHttpDocumentService, TracingNotifier};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sync_config::{SyncConfig, SyncMode};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = SyncConfig::load()?;
    info!(
        base_url = %config.base_url,
        api_key = config.credentials.api_key(),
        manager = %config.manager_name,
        mode = config.mode.as_str(),
        "permdesk-sync started"
    );

    let document_service = Arc::new(FrappeHttpDocumentService::with_timeout(
        config.base_url.clone(),
        config.credentials.clone(),
        config.http_timeout,
    )?);
    let notifier = Arc::new(TracingNotifier::new());

    run(&config, document_service, notifier).await
}

async fn run(
    config: &SyncConfig,
    document_service: Arc<FrappeHttpDocumentService>,
    notifier: Arc<TracingNotifier>,
) -> AppResult<()> {
    let session = match config.mode {
        SyncMode::Create => {
            PermissionEditingSession::create(&config.manager_name, document_service, notifier)
                .await?
        }
        SyncMode::Fetch | SyncMode::Save => {
            let mut session =
                PermissionEditingSession::open(&config.manager_name, document_service, notifier)
                    .await?;
            if config.mode == SyncMode::Fetch {
                session.run_action(SessionAction::GetAllPermissions).await?;
            } else {
                session.save().await?;
            }
            session
        }
    };

    let document = session.document();
    info!(
        manager = %document.name,
        role = %document.role,
        document_type_rows = document.document_type_permissions.len(),
        select_rows = document.document_type_select_permissions.len(),
        page_and_report_rows = document.page_and_report_permissions.len(),
        "permdesk-sync finished"
    );

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
