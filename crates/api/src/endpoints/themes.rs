//! Theme endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use linkgator_common::{AppError, AppResult};
use linkgator_plugins::{Capability, ThemeVariable};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

/// List the registered themes, enabled or not.
async fn list(State(state): State<AppState>) -> ApiResponse<Vec<ThemeInfo>> {
    let themes = state
        .registry
        .get_by_capability(Capability::Theme)
        .iter()
        .map(|plugin| {
            let manifest = plugin.manifest();
            ThemeInfo {
                id: manifest.id.clone(),
                name: manifest.name.clone(),
                description: manifest.description.clone(),
                enabled: plugin.is_enabled(),
            }
        })
        .collect();

    ApiResponse::ok(themes)
}

/// CSS variables of one theme.
async fn variables(
    State(state): State<AppState>,
    Path(theme_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ThemeVariable>>> {
    let plugin = state.registry.get_by_id(&theme_id)?;

    let theme = plugin
        .as_theme()
        .filter(|_| plugin.capabilities().contains(Capability::Theme))
        .ok_or_else(|| AppError::NotFound(format!("Theme not found: {theme_id}")))?;

    if !plugin.is_enabled() {
        return Err(AppError::BadRequest(format!("Theme is disabled: {theme_id}")));
    }

    Ok(ApiResponse::ok(theme.theme_variables()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/variables", get(variables))
}
