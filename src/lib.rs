pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use axum::extract::Request;
use axum::ServiceExt;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::rois::RoiService;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let rois = RoiService::from_settings(&settings)?;
    let state = AppState::new(settings, rois);

    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        upstream = %state.settings().upstream().base_url,
        "OL3 viewer listening"
    );

    // NormalizePath wraps the router, so it has to be converted into a make
    // service here rather than on the Router itself.
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await?;

    Ok(())
}
