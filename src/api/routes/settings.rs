use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{setting_keys as keys, ChunkingConfig, DomainError, Setting, SettingCategory};

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: Option<String>,
    pub category: SettingCategory,
    /// Layer the effective value came from.
    pub source: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

async fn effective(state: &AppState, key: &str) -> Result<SettingResponse, ApiError> {
    let found = state.settings.get(key).await?;
    Ok(SettingResponse {
        key: key.to_string(),
        category: keys::category(key),
        source: found.as_ref().map(|(_, source)| *source),
        value: found.map(|(value, _)| value),
    })
}

pub async fn list_settings(
    State(state): State<AppState>,
) -> Result<Json<Vec<SettingResponse>>, ApiError> {
    let mut settings = Vec::with_capacity(keys::ALL.len());
    for key in keys::ALL {
        settings.push(effective(&state, key).await?);
    }
    Ok(Json(settings))
}

async fn current_usize(state: &AppState, key: &str) -> Result<Option<usize>, DomainError> {
    Ok(state
        .settings
        .get(key)
        .await?
        .and_then(|(value, _)| value.trim().parse().ok()))
}

/// Rejects values the pipeline could not resolve, so a bad write never
/// reaches the store.
async fn validate(state: &AppState, key: &str, value: &str) -> Result<(), DomainError> {
    match key {
        keys::LLM_MODEL if state.rag_service.supports_model(value) => Ok(()),
        keys::LLM_MODEL => Err(DomainError::validation(format!(
            "no tokenizer configured for model `{value}`"
        ))),
        keys::CHUNK_SIZE | keys::CHUNK_OVERLAP => {
            let parsed: usize = value
                .parse()
                .map_err(|_| DomainError::validation(format!("{key} must be a number")))?;
            let (size, overlap) = if key == keys::CHUNK_SIZE {
                (parsed, current_usize(state, keys::CHUNK_OVERLAP).await?.unwrap_or(0))
            } else {
                let size = current_usize(state, keys::CHUNK_SIZE)
                    .await?
                    .unwrap_or(usize::MAX);
                (size, parsed)
            };
            ChunkingConfig::new(size, overlap)
                .map(|_| ())
                .map_err(|e| DomainError::validation(e.to_string()))
        }
        _ => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(DomainError::validation(format!(
                "{key} must be a positive number"
            ))),
        },
    }
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<Json<SettingResponse>, ApiError> {
    let Some(key) = keys::ALL.iter().copied().find(|k| *k == key) else {
        return Err(DomainError::not_found(format!("setting {key}")).into());
    };
    let value = request.value.trim();
    if value.is_empty() {
        return Err(DomainError::validation("setting value is empty").into());
    }
    validate(&state, key, value).await?;

    state
        .settings_store
        .put_setting(&Setting::new(key, value, keys::category(key)))
        .await?;
    tracing::info!(key, value, "setting updated");

    Ok(Json(effective(&state, key).await?))
}
