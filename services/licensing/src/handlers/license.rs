use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use zari_auth_types::identity::AdminIdentity;

use crate::domain::types::{
    DEFAULT_LICENSE_DAYS, LicenseFilter, LicenseKey, VerificationResult, VerifyFailure,
};
use crate::error::LicensingServiceError;
use crate::state::AppState;
use crate::usecase::license::{
    CreateLicenseInput, CreateLicenseUseCase, DeleteLicenseUseCase, ListLicensesUseCase,
    RevokeLicenseUseCase, VerifyLicenseInput, VerifyLicenseUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LicenseResponse {
    pub id: Uuid,
    pub key: String,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub device_id: Option<String>,
    pub is_active: bool,
    pub is_bound: bool,
}

impl LicenseResponse {
    fn new(license: LicenseKey, now: DateTime<Utc>) -> Self {
        Self {
            is_active: license.is_active(now),
            is_bound: license.is_bound(),
            id: license.id,
            key: license.key,
            created_at: license.created_at,
            expires_at: license.expires_at,
            device_id: license.device_id,
        }
    }
}

// ── POST /api/verify-license ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyLicenseRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyLicenseResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<VerifyFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "zari_core::serde::to_rfc3339_ms_opt"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Refusals are reported as `200 {"valid": false, ...}`; only malformed input is a 4xx.
pub async fn verify_license(
    State(state): State<AppState>,
    Json(body): Json<VerifyLicenseRequest>,
) -> Result<Json<VerifyLicenseResponse>, LicensingServiceError> {
    let usecase = VerifyLicenseUseCase {
        repo: state.license_repo(),
        clock: state.clock(),
    };
    let result = usecase
        .execute(VerifyLicenseInput {
            key: body.key,
            device_id: body.device_id,
        })
        .await?;

    let reason = result.reason();
    let expires_at = match result {
        VerificationResult::Valid { expires_at } => Some(expires_at),
        VerificationResult::Invalid(_) => None,
    };
    Ok(Json(VerifyLicenseResponse {
        valid: reason.is_none(),
        reason,
        message: reason.map(VerifyFailure::message),
        expires_at,
    }))
}

// ── GET /api/license/licenses ────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct LicenseListQuery {
    pub status: Option<LicenseFilter>,
}

#[derive(Serialize)]
pub struct LicenseListResponse {
    pub licenses: Vec<LicenseResponse>,
    pub total: usize,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms")]
    pub evaluated_at: DateTime<Utc>,
}

pub async fn list_licenses(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<LicenseListQuery>,
) -> Result<Json<LicenseListResponse>, LicensingServiceError> {
    let usecase = ListLicensesUseCase {
        repo: state.license_repo(),
        clock: state.clock(),
    };
    let output = usecase.execute(query.status).await?;
    let now = output.evaluated_at;
    let licenses: Vec<_> = output
        .licenses
        .into_iter()
        .map(|license| LicenseResponse::new(license, now))
        .collect();

    Ok(Json(LicenseListResponse {
        total: licenses.len(),
        licenses,
        evaluated_at: now,
    }))
}

// ── POST /api/license/licenses ───────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CreateLicenseRequest {
    /// Days until expiry. Signed so that negative input maps to `INVALID_DURATION`.
    #[serde(default, alias = "duration")]
    pub duration_days: Option<i64>,
}

#[derive(Serialize)]
pub struct CreateLicenseResponse {
    #[serde(flatten)]
    pub license: LicenseResponse,
    pub duration_days: u32,
}

pub async fn create_license(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateLicenseRequest>,
) -> Result<(StatusCode, Json<CreateLicenseResponse>), LicensingServiceError> {
    let usecase = CreateLicenseUseCase {
        repo: state.license_repo(),
        clock: state.clock(),
        keys: state.key_generator(),
    };
    let duration_days = body
        .duration_days
        .map(u32::try_from)
        .transpose()
        .map_err(|_| LicensingServiceError::InvalidDuration)?;
    let license = usecase
        .execute(CreateLicenseInput { duration_days })
        .await?;

    let now = license.created_at;
    Ok((
        StatusCode::CREATED,
        Json(CreateLicenseResponse {
            license: LicenseResponse::new(license, now),
            duration_days: duration_days.unwrap_or(DEFAULT_LICENSE_DAYS),
        }),
    ))
}

// ── DELETE /api/license/licenses/{id} ────────────────────────────────────────

pub async fn delete_license(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, LicensingServiceError> {
    let usecase = DeleteLicenseUseCase {
        repo: state.license_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/license/licenses/revoke/{id} ───────────────────────────────────

pub async fn revoke_license(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, LicensingServiceError> {
    let usecase = RevokeLicenseUseCase {
        repo: state.license_repo(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
