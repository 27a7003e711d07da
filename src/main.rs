//! Portal client entry point: checks the backend and prints the signed-in
//! user's dashboard as JSON.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use school_portal_client::logging::{init_logging, log_startup};
use school_portal_client::models::Role;
use school_portal_client::panels::{DashboardPanel, PanelContext};
use school_portal_client::session::FileTokenStore;
use school_portal_client::{ApiClient, Config, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    init_logging(&config);
    log_startup();
    config.log_config();

    let session = Session::new(Arc::new(FileTokenStore::new(config.token_file.clone())));
    let api = Arc::new(ApiClient::new(&config, session.clone()).context("failed to build HTTP client")?);

    match api.health().await {
        Ok(status) => tracing::info!(status = %status, "Backend is reachable"),
        Err(error) => tracing::warn!(error = %error, "Health check failed"),
    }

    if !session.is_signed_in() {
        tracing::info!("No stored session, nothing to show");
        return Ok(());
    }

    let role: Role = env::var("SCHOOL_PORTAL_ROLE")
        .unwrap_or_else(|_| "student".to_string())
        .parse()
        .context("SCHOOL_PORTAL_ROLE must be admin, teacher, parent or student")?;
    let user_id = env::var("SCHOOL_PORTAL_USER_ID").context("SCHOOL_PORTAL_USER_ID is required when signed in")?;

    let context = PanelContext::from_config(&config, api, role, &user_id);
    let dashboard = DashboardPanel::new(context);

    for (section, outcome) in dashboard.mount().await {
        tracing::debug!(section = %section, outcome = ?outcome, "Section loaded");
    }

    let view = dashboard.view().await;
    dashboard.unmount();

    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
