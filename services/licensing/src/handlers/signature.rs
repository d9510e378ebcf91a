use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use zari_auth_types::identity::AdminIdentity;

use crate::domain::types::{
    PatternData, PatternLogic, ScanVerdict, Severity, SignatureBody, SignatureKind,
    VirusSignature,
};
use crate::error::LicensingServiceError;
use crate::state::AppState;
use crate::usecase::signature::{
    AddSignatureInput, AddSignatureUseCase, CheckHashUseCase, DeleteSignatureUseCase,
    ListSignaturesUseCase, ScanFileUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SignatureResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SignatureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_data: Option<PatternData>,
    pub severity: Severity,
    pub description: String,
    #[serde(serialize_with = "zari_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<VirusSignature> for SignatureResponse {
    fn from(sig: VirusSignature) -> Self {
        let kind = sig.body.kind();
        let (hash_value, signature_id, pattern_data) = match sig.body {
            SignatureBody::Hash { hash_value } => (Some(hash_value), None, None),
            SignatureBody::Pattern { signature_id, data } => (None, Some(signature_id), Some(data)),
        };
        Self {
            id: sig.id,
            name: sig.name,
            kind,
            hash_value,
            signature_id,
            pattern_data,
            severity: sig.severity,
            description: sig.description,
            created_at: sig.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub sha256: String,
    pub is_infected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threat_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl From<ScanVerdict> for ScanResponse {
    fn from(verdict: ScanVerdict) -> Self {
        let is_infected = verdict.is_infected();
        let (threat_name, severity) = verdict.threat.unzip();
        Self {
            sha256: verdict.sha256,
            is_infected,
            threat_name,
            severity,
        }
    }
}

// ── GET /api/signatures ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct SignatureListQuery {
    #[serde(rename = "type")]
    pub kind: Option<SignatureKind>,
}

#[derive(Serialize)]
pub struct SignatureListResponse {
    pub signatures: Vec<SignatureResponse>,
    pub total: usize,
}

pub async fn list_signatures(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Query(query): Query<SignatureListQuery>,
) -> Result<Json<SignatureListResponse>, LicensingServiceError> {
    let usecase = ListSignaturesUseCase {
        repo: state.signature_repo(),
    };
    let signatures: Vec<SignatureResponse> = usecase
        .execute(query.kind)
        .await?
        .into_iter()
        .map(SignatureResponse::from)
        .collect();

    Ok(Json(SignatureListResponse {
        total: signatures.len(),
        signatures,
    }))
}

// ── POST /api/signatures ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddSignatureRequest {
    Hash {
        #[serde(default)]
        name: String,
        #[serde(default)]
        hash: String,
        severity: Option<Severity>,
        description: Option<String>,
    },
    Pattern {
        #[serde(default)]
        name: String,
        #[serde(default)]
        patterns: Vec<String>,
        logic: Option<PatternLogic>,
        severity: Option<Severity>,
        description: Option<String>,
    },
}

pub async fn add_signature(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<AddSignatureRequest>,
) -> Result<(StatusCode, Json<SignatureResponse>), LicensingServiceError> {
    let input = match body {
        AddSignatureRequest::Hash {
            name,
            hash,
            severity,
            description,
        } => AddSignatureInput::Hash {
            name,
            hash,
            severity,
            description,
        },
        AddSignatureRequest::Pattern {
            name,
            patterns,
            logic,
            severity,
            description,
        } => AddSignatureInput::Pattern {
            name,
            patterns,
            logic,
            severity,
            description,
        },
    };

    let usecase = AddSignatureUseCase {
        repo: state.signature_repo(),
        definitions: state.definition_repo(),
        clock: state.clock(),
    };
    let signature = usecase.execute(input).await?;
    Ok((StatusCode::CREATED, Json(signature.into())))
}

// ── DELETE /api/signatures/{id} ──────────────────────────────────────────────

pub async fn delete_signature(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, LicensingServiceError> {
    let usecase = DeleteSignatureUseCase {
        repo: state.signature_repo(),
        definitions: state.definition_repo(),
        clock: state.clock(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/check-file ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckFileRequest {
    #[serde(default)]
    pub hash: String,
}

pub async fn check_file(
    State(state): State<AppState>,
    Json(body): Json<CheckFileRequest>,
) -> Result<Json<ScanResponse>, LicensingServiceError> {
    let usecase = CheckHashUseCase {
        repo: state.signature_repo(),
    };
    let verdict = usecase.execute(&body.hash).await?;
    Ok(Json(verdict.into()))
}

// ── POST /api/scan ───────────────────────────────────────────────────────────

/// Raw request body is the file content.
pub async fn scan_file(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScanResponse>, LicensingServiceError> {
    if body.is_empty() {
        return Err(LicensingServiceError::MissingData);
    }
    let usecase = ScanFileUseCase {
        repo: state.signature_repo(),
    };
    let verdict = usecase.execute(&body).await?;
    Ok(Json(verdict.into()))
}
