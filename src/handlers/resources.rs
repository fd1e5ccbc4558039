use crate::error::Result;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

/// GET /resources/*path - Raw knowledge text, e.g. `/resources/catalogs/feelings`
/// serves `nvc://catalogs/feelings`.
pub async fn resource_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse> {
    let uri = format!("nvc://{}", path.trim_start_matches('/'));
    let entry = state.registry.resolve_resource(&uri)?;

    Ok((
        [(header::CONTENT_TYPE, entry.mime_kind.mime_type())],
        entry.body.clone(),
    ))
}
