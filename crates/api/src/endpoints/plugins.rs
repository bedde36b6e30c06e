//! Plugin administration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use linkgator_common::{AppError, AppResult};
use linkgator_plugins::{CapabilitySet, Plugin, PluginSettings, SettingsRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

/// A registered plugin as shown to administrators.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub capabilities: CapabilitySet,
    pub enabled: bool,
    pub settings: Option<SettingsRecord>,
}

impl PluginInfo {
    fn from_plugin(plugin: &dyn Plugin) -> Self {
        let manifest = plugin.manifest();
        Self {
            id: manifest.id.clone(),
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            capabilities: manifest.capabilities.clone(),
            enabled: plugin.is_enabled(),
            settings: plugin.settings().map(PluginSettings::snapshot),
        }
    }
}

/// Keeps an explicit JSON `null` distinct from a missing member.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Update-setting request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
    #[validate(required, length(min = 1))]
    pub setting_key: Option<String>,

    #[validate(required)]
    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingResponse {
    pub success: bool,
}

/// List every registered plugin.
async fn list(State(state): State<AppState>) -> ApiResponse<Vec<PluginInfo>> {
    let plugins = state
        .registry
        .all()
        .iter()
        .map(|plugin| PluginInfo::from_plugin(plugin.as_ref()))
        .collect();

    ApiResponse::ok(plugins)
}

/// Update one setting of a plugin and persist it.
async fn update_setting(
    State(state): State<AppState>,
    Path(plugin_id): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> AppResult<ApiResponse<UpdateSettingResponse>> {
    req.validate()?;

    let (Some(key), Some(value)) = (req.setting_key, req.value) else {
        return Err(AppError::Validation(
            "Missing settingKey or value".to_string(),
        ));
    };

    state.registry.update_setting(&plugin_id, &key, value).await?;

    Ok(ApiResponse::ok(UpdateSettingResponse { success: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/settings", post(update_setting))
}
