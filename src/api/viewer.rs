use axum::extract::State;
use axum::response::Html;

use crate::api::errors::ApiError;
use crate::api::extract::MaybeImageId;
use crate::core::state::AppState;
use crate::services::pages;

pub(crate) async fn index(
    MaybeImageId(iid): MaybeImageId,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(pages::render_index(state.settings(), iid)))
}

pub(crate) async fn plugin(
    MaybeImageId(iid): MaybeImageId,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(pages::render_plugin(state.settings(), iid, false)))
}

pub(crate) async fn plugin_debug(
    MaybeImageId(iid): MaybeImageId,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(pages::render_plugin(state.settings(), iid, true)))
}
