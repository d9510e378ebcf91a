use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::types::{DefinitionUpdate, SignatureKind};
use crate::error::LicensingServiceError;
use crate::state::AppState;
use crate::usecase::signature::{GetDefinitionsDocumentUseCase, GetLatestDefinitionsUseCase};

#[derive(Serialize)]
pub struct DefinitionsInfo {
    pub version: Option<String>,
    pub signature_count: u64,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms_opt")]
    pub generated_at: Option<DateTime<Utc>>,
    pub definitions: Option<serde_json::Value>,
}

impl From<Option<DefinitionUpdate>> for DefinitionsInfo {
    fn from(update: Option<DefinitionUpdate>) -> Self {
        match update {
            Some(update) => Self {
                version: Some(update.version),
                signature_count: update.signature_count,
                generated_at: Some(update.created_at),
                definitions: Some(update.document),
            },
            None => Self {
                version: None,
                signature_count: 0,
                generated_at: None,
                definitions: None,
            },
        }
    }
}

// ── GET /api/definitions ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LatestDefinitionsResponse {
    pub hash_definitions: DefinitionsInfo,
    pub pattern_definitions: DefinitionsInfo,
}

pub async fn get_definitions(
    State(state): State<AppState>,
) -> Result<Json<LatestDefinitionsResponse>, LicensingServiceError> {
    let usecase = GetLatestDefinitionsUseCase {
        definitions: state.definition_repo(),
    };
    let latest = usecase.execute().await?;
    Ok(Json(LatestDefinitionsResponse {
        hash_definitions: latest.hash.into(),
        pattern_definitions: latest.pattern.into(),
    }))
}

// ── GET /api/download-definitions/{type} ─────────────────────────────────────

/// Body is the bare definitions document of the latest generation.
pub async fn download_definitions(
    State(state): State<AppState>,
    Path(kind): Path<SignatureKind>,
) -> Result<Json<serde_json::Value>, LicensingServiceError> {
    let usecase = GetDefinitionsDocumentUseCase {
        definitions: state.definition_repo(),
    };
    let update = usecase.execute(kind).await?;
    Ok(Json(update.document))
}
