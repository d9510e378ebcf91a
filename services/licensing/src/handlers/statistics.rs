use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use zari_auth_types::identity::AdminIdentity;

use crate::domain::types::{DefinitionUpdate, LicenseStats, SignatureStats};
use crate::error::LicensingServiceError;
use crate::state::AppState;
use crate::usecase::statistics::GetStatisticsUseCase;

// ── GET /api/statistics ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub licenses: LicenseStats,
    pub signatures: SignatureStats,
    pub definitions: DefinitionsSummary,
}

#[derive(Serialize)]
pub struct DefinitionsSummary {
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms_opt")]
    pub latest_update: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub signature_count: u64,
}

impl From<Option<DefinitionUpdate>> for DefinitionsSummary {
    fn from(update: Option<DefinitionUpdate>) -> Self {
        match update {
            Some(update) => Self {
                latest_update: Some(update.created_at),
                version: Some(update.version),
                signature_count: update.signature_count,
            },
            None => Self {
                latest_update: None,
                version: None,
                signature_count: 0,
            },
        }
    }
}

pub async fn get_statistics(
    _admin: AdminIdentity,
    State(state): State<AppState>,
) -> Result<Json<StatisticsResponse>, LicensingServiceError> {
    let usecase = GetStatisticsUseCase {
        licenses: state.license_repo(),
        signatures: state.signature_repo(),
        definitions: state.definition_repo(),
        clock: state.clock(),
    };
    let stats = usecase.execute().await?;
    Ok(Json(StatisticsResponse {
        licenses: stats.licenses,
        signatures: stats.signatures,
        definitions: stats.latest_definitions.into(),
    }))
}
